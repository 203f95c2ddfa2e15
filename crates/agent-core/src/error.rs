//! Error Types

use std::time::Duration;

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
///
/// Only faults of the model transport and of the loop itself surface here.
/// Backend failures inside tools are reported to the model as tool results.
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider returned an error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Tool not found in registry
    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    /// Tool execution failed
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// The model kept requesting tools past the round limit
    #[error("Tool loop exceeded max rounds ({0})")]
    MaxRounds(usize),

    /// Tool results do not line up with the invocations they answer
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Whole exchange exceeded the caller-level deadline
    #[error("Exchange timed out after {0:?}")]
    Timeout(Duration),

    /// Session error
    #[error("Session error: {0}")]
    Session(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Check if error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_) | Self::RateLimited(_) | Self::Timeout(_)
        )
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(_)
            | Self::ProviderUnavailable(_)
            | Self::RateLimited(_)
            | Self::Auth(_)
            | Self::Timeout(_) => {
                "❌ Sorry, I couldn't process your message right now. Please try again in a moment.".into()
            }
            Self::MaxRounds(_) => {
                "The request needed too many steps to answer. Please try a simpler query.".into()
            }
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
