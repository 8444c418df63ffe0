use thiserror::Error;

use crate::constants::MIN_MESSAGE_CHARS;

/// Why a draft was turned away before reaching the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ValidationError {
    #[error("message is empty after sanitization")]
    Empty,
    #[error("message has {len} characters, need at least {min}", min = MIN_MESSAGE_CHARS)]
    TooShort { len: usize },
}

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("daily message limit reached")]
    QuotaExceeded,

    #[error("invalid message: {0}")]
    Validation(#[from] ValidationError),

    /// Request failed or the response body was not JSON.
    #[error("network error: {0}")]
    Network(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("quota storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::StorageUnavailable(e.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Network(format!("response is not JSON: {e}"))
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(e: serde_yaml::Error) -> Self {
        AppError::Config(format!("invalid config file: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_short_message_mentions_minimum() {
        let err = AppError::from(ValidationError::TooShort { len: 10 });
        let text = err.to_string();
        assert!(text.contains("10 characters"), "got: {text}");
        assert!(text.contains("at least 20"), "got: {text}");
    }

    #[test]
    fn test_json_error_maps_to_network() {
        let parse_err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        assert!(matches!(AppError::from(parse_err), AppError::Network(_)));
    }

    #[test]
    fn test_yaml_error_maps_to_config() {
        let parse_err = serde_yaml::from_str::<std::collections::HashMap<String, u32>>("a: [").unwrap_err();
        assert!(matches!(AppError::from(parse_err), AppError::Config(_)));
    }
}
