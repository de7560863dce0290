//! Fetch error types.

use tele2usage_core::UsageError;
use thiserror::Error;

/// Error type for fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Credentials rejected (401/403).
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Non-success HTTP status.
    #[error("Unexpected status code: {0}")]
    Status(u16),

    /// Response body did not contain what we need.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured API base cannot be used to build request URLs.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<FetchError> for UsageError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::AuthenticationFailed(msg) => UsageError::Authentication(msg),
            FetchError::Http(ref e) if e.is_timeout() => {
                UsageError::Network(format!("request timed out: {e}"))
            }
            FetchError::Http(ref e) if e.is_decode() => {
                UsageError::MalformedResponse(format!("HTTP error: {e}"))
            }
            e @ (FetchError::Http(_) | FetchError::Status(_)) => UsageError::Network(e.to_string()),
            e @ (FetchError::InvalidResponse(_) | FetchError::Json(_)) => {
                UsageError::MalformedResponse(e.to_string())
            }
            FetchError::InvalidUrl(msg) => UsageError::Configuration(msg),
        }
    }
}
