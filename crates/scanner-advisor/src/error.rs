//! Error Types for the Scanner Advisor

use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

/// Backend call failures
///
/// These never leave the backend client as errors; they are folded into
/// `{success: false, error}` results for the model.
#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Backend returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdvisorError {
    /// Whether the failure was a timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Network(e) => e.is_timeout(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_keeps_sub_second_precision() {
        let err = AdvisorError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "Backend request timed out after 1.5s");
        assert!(err.is_timeout());

        let short = AdvisorError::Timeout(Duration::from_millis(100));
        assert!(!short.to_string().contains("0 seconds"));
        assert!(short.to_string().ends_with("100ms"));
    }
}
