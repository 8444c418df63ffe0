use std::fmt;

use crate::constants::{DEFAULT_PLACEHOLDER, RETRY_PLACEHOLDER};
use crate::sanitize::clamp_input;

/// Where the current attempt is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttemptPhase {
    Idle,
    Checking,
    Blocked,
    Validating,
    Rejected,
    Sending,
    Delivered,
    Failed,
}

impl AttemptPhase {
    pub(crate) fn is_terminal(self) -> bool {
        matches!(
            self,
            AttemptPhase::Blocked | AttemptPhase::Rejected | AttemptPhase::Delivered | AttemptPhase::Failed
        )
    }
}

impl fmt::Display for AttemptPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Presentation-facing form state. The controller writes it; the front end
/// reads it to decide what to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SubmissionViewState {
    pub(crate) draft: String,
    pub(crate) is_focused: bool,
    pub(crate) is_loading: bool,
    pub(crate) placeholder: String,
    /// Daily cap hit: the form is replaced by the come-back-tomorrow text.
    pub(crate) rate_limit_reached: bool,
    pub(crate) phase: AttemptPhase,
    /// Terminal phase of the most recent finished attempt.
    pub(crate) last_outcome: Option<AttemptPhase>,
}

impl Default for SubmissionViewState {
    fn default() -> Self {
        Self {
            draft: String::new(),
            is_focused: false,
            is_loading: false,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            rate_limit_reached: false,
            phase: AttemptPhase::Idle,
            last_outcome: None,
        }
    }
}

impl SubmissionViewState {
    pub(crate) fn focus(&mut self) {
        self.is_focused = true;
        self.placeholder = DEFAULT_PLACEHOLDER.to_string();
    }

    pub(crate) fn blur(&mut self) {
        self.is_focused = false;
    }

    pub(crate) fn input(&mut self, raw: &str) {
        self.draft = clamp_input(raw).to_string();
    }

    /// Placeholder as rendered: hidden while the input has focus.
    pub(crate) fn visible_placeholder(&self) -> &str {
        if self.is_focused {
            ""
        } else {
            &self.placeholder
        }
    }

    /// Mirrors the send button's enabled state.
    pub(crate) fn can_submit(&self) -> bool {
        self.is_focused && !self.is_loading && !self.rate_limit_reached
    }

    pub(crate) fn show_retry_prompt(&mut self) {
        self.is_focused = false;
        self.placeholder = RETRY_PLACEHOLDER.to_string();
    }

    pub(crate) fn finish(&mut self, outcome: AttemptPhase) {
        self.last_outcome = Some(outcome);
        self.phase = AttemptPhase::Idle;
        self.is_loading = false;
    }
}
