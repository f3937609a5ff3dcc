//! Flashbook error types

use std::time::Duration;

/// Flashbook error types
#[derive(Debug, thiserror::Error)]
pub enum FlashbookError {
    // Generator/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    // Soft errors
    #[error("empty response from model")]
    EmptyResponse,

    #[error("content filtered: {reason}")]
    ContentFiltered { reason: String },

    /// The request failed shape checks before reaching the summarizer.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    // Configuration errors
    #[error("no generator configured")]
    NoGenerator,

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl FlashbookError {
    /// Whether a retry has a reasonable chance of succeeding.
    ///
    /// Rate limits, transport failures, timeouts and 5xx API responses are
    /// transient. Authentication, missing models, filtered content and
    /// caller mistakes are not.
    pub fn is_transient(&self) -> bool {
        match self {
            FlashbookError::RateLimited { .. }
            | FlashbookError::Http(_)
            | FlashbookError::Timeout(_) => true,
            FlashbookError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Provider-supplied backoff hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            FlashbookError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FlashbookError {
    fn from(err: reqwest::Error) -> Self {
        FlashbookError::Http(err.to_string())
    }
}

/// Result type alias for Flashbook operations
pub type Result<T> = std::result::Result<T, FlashbookError>;
