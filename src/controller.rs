use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::constants::{
    DELIVERED_TEXT, EMPTY_MESSAGE_TEXT, FAILED_TEXT, LIMIT_REACHED_TEXT, MIN_MESSAGE_CHARS, TOO_SHORT_TEXT,
};
use crate::error::{AppError, ValidationError};
use crate::notifier::Severity;
use crate::payload::SubmissionPayload;
use crate::quota::QuotaTracker;
use crate::sanitize::{char_len, clamp_input, sanitize};
use crate::state::{AttemptPhase, SubmissionViewState};
use crate::traits::{Clock, MessageTransport, Notifier};

/// Invoked once per delivered message so the host can swap to its
/// confirmation view.
pub(crate) type CompletionCallback = Box<dyn Fn() + Send + Sync>;

/// Terminal result of one call to [`SubmissionController::attempt_send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AttemptOutcome {
    /// Another attempt was still in flight; nothing happened.
    Busy,
    Blocked { alerted: bool },
    Rejected(ValidationError),
    Delivered { sent_today: u32 },
    Failed,
}

impl AttemptOutcome {
    fn phase(&self) -> Option<AttemptPhase> {
        match self {
            AttemptOutcome::Busy => None,
            AttemptOutcome::Blocked { .. } => Some(AttemptPhase::Blocked),
            AttemptOutcome::Rejected(_) => Some(AttemptPhase::Rejected),
            AttemptOutcome::Delivered { .. } => Some(AttemptPhase::Delivered),
            AttemptOutcome::Failed => Some(AttemptPhase::Failed),
        }
    }
}

/// Sanitize a draft and check it is long enough to send.
pub(crate) fn prepare_message(draft: &str) -> Result<String, ValidationError> {
    let message = sanitize(clamp_input(draft));
    let len = char_len(&message);
    if len == 0 {
        return Err(ValidationError::Empty);
    }
    if len < MIN_MESSAGE_CHARS {
        return Err(ValidationError::TooShort { len });
    }
    Ok(message)
}

/// Runs the quota check, validation, delivery and bookkeeping for each
/// submission attempt, one attempt at a time.
pub(crate) struct SubmissionController {
    tracker: QuotaTracker,
    transport: Box<dyn MessageTransport>,
    notifier: Box<dyn Notifier>,
    clock: Arc<dyn Clock>,
    on_delivered: CompletionCallback,
    view: Mutex<SubmissionViewState>,
}

impl SubmissionController {
    pub(crate) fn new(
        tracker: QuotaTracker,
        transport: Box<dyn MessageTransport>,
        notifier: Box<dyn Notifier>,
        clock: Arc<dyn Clock>,
        on_delivered: CompletionCallback,
    ) -> Self {
        Self {
            tracker,
            transport,
            notifier,
            clock,
            on_delivered,
            view: Mutex::new(SubmissionViewState::default()),
        }
    }

    pub(crate) fn tracker(&self) -> &QuotaTracker {
        &self.tracker
    }

    /// Snapshot of the view state for rendering.
    pub(crate) fn view(&self) -> SubmissionViewState {
        self.lock_view().clone()
    }

    pub(crate) fn focus(&self) {
        self.lock_view().focus();
    }

    pub(crate) fn blur(&self) {
        self.lock_view().blur();
    }

    pub(crate) fn input(&self, raw: &str) {
        self.lock_view().input(raw);
    }

    /// Mount-time check: roll the day over, set the blocked flag, and show the
    /// limit alert if it is due. Returns whether sending is blocked.
    pub(crate) fn mount(&self) -> bool {
        let blocked = self.tracker.is_limit_reached();
        self.lock_view().rate_limit_reached = blocked;
        if blocked {
            self.alert_limit_once();
        }
        blocked
    }

    /// Attempt to send whatever is currently in the draft.
    pub(crate) async fn submit(&self) -> AttemptOutcome {
        let draft = self.lock_view().draft.clone();
        self.attempt_send(&draft).await
    }

    pub(crate) async fn attempt_send(&self, draft: &str) -> AttemptOutcome {
        let Some(guard) = AttemptGuard::enter(&self.view) else {
            debug!("Attempt ignored, previous attempt still in flight");
            return AttemptOutcome::Busy;
        };

        let span = info_span!("attempt", attempt_id = %uuid::Uuid::new_v4());
        let outcome = async {
            let result = self.run(draft).await;
            let outcome = self.report(result);
            info!(?outcome, "Attempt finished");
            outcome
        }
        .instrument(span)
        .await;

        if let Some(phase) = outcome.phase() {
            guard.finish(phase);
        }
        outcome
    }

    async fn run(&self, draft: &str) -> Result<u32, AppError> {
        self.set_phase(AttemptPhase::Checking);
        if self.tracker.is_limit_reached() {
            self.set_phase(AttemptPhase::Blocked);
            return Err(AppError::QuotaExceeded);
        }

        self.set_phase(AttemptPhase::Validating);
        let message = prepare_message(draft).inspect_err(|_| self.set_phase(AttemptPhase::Rejected))?;

        self.set_phase(AttemptPhase::Sending);
        let payload = SubmissionPayload::new(message, self.clock.now());
        debug!(chars = char_len(&payload.message), "Delivering message");
        if let Err(e) = self.transport.deliver(&payload).await {
            self.set_phase(AttemptPhase::Failed);
            return Err(e);
        }

        self.set_phase(AttemptPhase::Delivered);
        self.notifier.notify(Severity::Success, DELIVERED_TEXT);
        (self.on_delivered)();
        let sent_today = self.tracker.record_successful_send();

        let mut view = self.lock_view();
        view.draft.clear();
        if sent_today >= self.tracker.max_per_day() {
            view.rate_limit_reached = true;
        }
        Ok(sent_today)
    }

    /// Turn the attempt result into exactly one user notice and an outcome.
    fn report(&self, result: Result<u32, AppError>) -> AttemptOutcome {
        match result {
            Ok(sent_today) => AttemptOutcome::Delivered { sent_today },
            Err(AppError::QuotaExceeded) => {
                self.lock_view().rate_limit_reached = true;
                let alerted = self.alert_limit_once();
                AttemptOutcome::Blocked { alerted }
            }
            Err(AppError::Validation(reason)) => {
                debug!(%reason, "Draft rejected");
                match reason {
                    ValidationError::Empty => {
                        self.notifier.notify(Severity::Warning, EMPTY_MESSAGE_TEXT);
                        self.lock_view().show_retry_prompt();
                    }
                    ValidationError::TooShort { .. } => {
                        self.notifier.notify(Severity::Warning, TOO_SHORT_TEXT);
                    }
                }
                AttemptOutcome::Rejected(reason)
            }
            Err(e) => {
                error!("Delivery failed: {e}");
                self.notifier.notify(Severity::Error, FAILED_TEXT);
                AttemptOutcome::Failed
            }
        }
    }

    fn alert_limit_once(&self) -> bool {
        if !self.tracker.should_show_limit_alert() {
            return false;
        }
        warn!(limit = self.tracker.max_per_day(), "Daily message limit reached");
        self.notifier.notify(Severity::Warning, LIMIT_REACHED_TEXT);
        self.tracker.mark_alert_shown();
        true
    }

    fn set_phase(&self, phase: AttemptPhase) {
        debug!(%phase, "Attempt phase");
        self.lock_view().phase = phase;
    }

    fn lock_view(&self) -> MutexGuard<'_, SubmissionViewState> {
        self.view.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Holds the loading flag for one attempt. Dropping it without `finish`
/// (the attempt future was dropped mid-flight) still clears the flag.
struct AttemptGuard<'a> {
    view: &'a Mutex<SubmissionViewState>,
    finished: bool,
}

impl<'a> AttemptGuard<'a> {
    fn enter(view: &'a Mutex<SubmissionViewState>) -> Option<Self> {
        let mut state = view.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if state.is_loading {
            return None;
        }
        state.is_loading = true;
        Some(Self { view, finished: false })
    }

    fn finish(mut self, outcome: AttemptPhase) {
        debug_assert!(outcome.is_terminal());
        self.lock().finish(outcome);
        self.finished = true;
    }

    fn lock(&self) -> MutexGuard<'a, SubmissionViewState> {
        self.view.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            let mut state = self.lock();
            state.is_loading = false;
            state.phase = AttemptPhase::Idle;
        }
    }
}
