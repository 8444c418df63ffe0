use crate::quota::{date_key, QuotaTracker};

/// Today's quota usage as reported by `--status`.
pub(crate) fn build_status_json(tracker: &QuotaTracker) -> serde_json::Value {
    let state = tracker.refresh_for_today();
    let limit = tracker.max_per_day();
    serde_json::json!({
        "date": date_key(state.last_send_date),
        "sent_today": state.message_count,
        "daily_limit": limit,
        "remaining": limit.saturating_sub(state.message_count),
        "limit_reached": state.message_count >= limit,
        "alert_shown_today": state.alert_shown_on == Some(state.last_send_date),
        "version": env!("CARGO_PKG_VERSION"),
    })
}
