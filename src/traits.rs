use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::AppError;
use crate::notifier::Severity;
use crate::payload::SubmissionPayload;
use crate::store::StoreKey;

/// Device-scoped string storage for the three quota entries.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait QuotaStore: Send + Sync {
    fn get(&self, key: StoreKey) -> Result<Option<String>, AppError>;
    fn set(&self, key: StoreKey, value: &str) -> Result<(), AppError>;
    fn remove(&self, key: StoreKey) -> Result<(), AppError>;
}

/// Modal feedback to the user. Fire-and-forget.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Notifier: Send + Sync {
    fn notify(&self, severity: Severity, message: &str);
}

/// Delivers one payload to the collection endpoint and returns the parsed
/// JSON response.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub(crate) trait MessageTransport: Send + Sync {
    async fn deliver(&self, payload: &SubmissionPayload) -> Result<serde_json::Value, AppError>;
}

/// Device-local wall clock.
pub(crate) trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

pub(crate) struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}
