use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::constants::DATE_KEY_FORMAT;
use crate::store::StoreKey;
use crate::traits::{Clock, QuotaStore};

/// Quota entries as read for one decision, already rolled over to today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QuotaState {
    pub(crate) last_send_date: NaiveDate,
    pub(crate) message_count: u32,
    pub(crate) alert_shown_on: Option<NaiveDate>,
}

impl QuotaState {
    fn fresh(today: NaiveDate) -> Self {
        Self {
            last_send_date: today,
            message_count: 0,
            alert_shown_on: None,
        }
    }
}

/// Daily send counter with lazy midnight rollover and once-a-day alert
/// bookkeeping.
///
/// Reads fail open: a missing store, an unparsable date or a garbage count
/// all read as "nothing sent today". Write failures are logged and swallowed.
pub(crate) struct QuotaTracker {
    store: Box<dyn QuotaStore>,
    clock: Arc<dyn Clock>,
    max_per_day: u32,
}

impl QuotaTracker {
    pub(crate) fn new(store: Box<dyn QuotaStore>, clock: Arc<dyn Clock>, max_per_day: u32) -> Self {
        Self {
            store,
            clock,
            max_per_day,
        }
    }

    pub(crate) fn max_per_day(&self) -> u32 {
        self.max_per_day
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.clock.now().date()
    }

    /// Reset the counters if the stored day is not today. Returns the state
    /// to decide on.
    pub(crate) fn refresh_for_today(&self) -> QuotaState {
        let today = self.today();
        let last = self.read_date(StoreKey::LastSendDate);

        if last != Some(today) {
            info!(
                previous = ?last,
                today = %today,
                "New quota day, resetting message count"
            );
            self.write(StoreKey::MessageCount, "0");
            self.write(StoreKey::LastSendDate, &date_key(today));
            self.erase(StoreKey::AlertShownOn);
            return QuotaState::fresh(today);
        }

        QuotaState {
            last_send_date: today,
            message_count: self.read_count(),
            alert_shown_on: self.read_date(StoreKey::AlertShownOn),
        }
    }

    pub(crate) fn sent_today(&self) -> u32 {
        self.refresh_for_today().message_count
    }

    pub(crate) fn is_limit_reached(&self) -> bool {
        self.sent_today() >= self.max_per_day
    }

    /// Count one delivered message. Returns the new count for today.
    pub(crate) fn record_successful_send(&self) -> u32 {
        let state = self.refresh_for_today();
        let count = state.message_count.saturating_add(1);
        self.write(StoreKey::MessageCount, &count.to_string());
        self.write(StoreKey::LastSendDate, &date_key(state.last_send_date));
        debug!(count, limit = self.max_per_day, "Recorded successful send");
        count
    }

    pub(crate) fn should_show_limit_alert(&self) -> bool {
        let state = self.refresh_for_today();
        state.message_count >= self.max_per_day && state.alert_shown_on != Some(state.last_send_date)
    }

    pub(crate) fn mark_alert_shown(&self) {
        self.write(StoreKey::AlertShownOn, &date_key(self.today()));
    }

    fn read(&self, key: StoreKey) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = key.as_str(), "Quota store read failed, assuming empty: {e}");
                None
            }
        }
    }

    fn read_date(&self, key: StoreKey) -> Option<NaiveDate> {
        let raw = self.read(key)?;
        match NaiveDate::parse_from_str(raw.trim(), DATE_KEY_FORMAT) {
            Ok(date) => Some(date),
            Err(_) => {
                warn!(key = key.as_str(), value = %raw, "Ignoring malformed quota date");
                None
            }
        }
    }

    fn read_count(&self) -> u32 {
        let Some(raw) = self.read(StoreKey::MessageCount) else {
            return 0;
        };
        raw.trim().parse().unwrap_or_else(|_| {
            warn!(value = %raw, "Ignoring malformed message count");
            0
        })
    }

    fn write(&self, key: StoreKey, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            warn!(key = key.as_str(), "Quota store write failed: {e}");
        }
    }

    fn erase(&self, key: StoreKey) {
        if let Err(e) = self.store.remove(key) {
            warn!(key = key.as_str(), "Quota store remove failed: {e}");
        }
    }
}

pub(crate) fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}
