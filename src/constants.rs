/// Maximum raw draft length in characters, enforced at input time.
pub(crate) const MAX_INPUT_CHARS: usize = 115;

/// Minimum sanitized message length in characters.
pub(crate) const MIN_MESSAGE_CHARS: usize = 20;

/// Default location of the quota database.
pub(crate) const DEFAULT_DB_PATH: &str = "anon-note-quota.db";

/// Date-only key format used for persisted quota dates.
pub(crate) const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

pub(crate) const DEFAULT_PLACEHOLDER: &str = "send anonymous message here!";
pub(crate) const RETRY_PLACEHOLDER: &str = "do you want to try one more time?";

pub(crate) const LIMIT_REACHED_TEXT: &str = "you have reached the daily limit of messages per day";
pub(crate) const EMPTY_MESSAGE_TEXT: &str = "Please enter a message before sending.";
pub(crate) const TOO_SHORT_TEXT: &str = "Send a message of at least 1 sentence";
pub(crate) const DELIVERED_TEXT: &str = "Anonymous message successfully sent!";
pub(crate) const FAILED_TEXT: &str = "Something went wrong! Please try again.";

/// Shown in place of the form once the daily cap is hit.
pub(crate) const COME_BACK_TOMORROW_TEXT: &str = "come back tomorrow to send more messages!";

/// Confirmation shown once the form is swapped out after a delivery.
pub(crate) const MESSAGE_SENT_TEXT: &str = "Your anonymous message has been sent.";
