//! Core error types for tele2usage.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while talking to the remote usage API or resolving an
/// account's subscription.
#[derive(Debug, Clone, Error)]
pub enum UsageError {
    /// Credentials were rejected.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Timeout, connection failure or non-2xx response.
    #[error("Network error: {0}")]
    Network(String),

    /// The remote payload was missing expected fields or had bad values.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The account cannot be configured (e.g. no subscription resolved).
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl UsageError {
    /// Returns the payload-free kind of this error.
    pub fn kind(&self) -> UsageErrorKind {
        match self {
            Self::Authentication(_) => UsageErrorKind::Authentication,
            Self::Network(_) => UsageErrorKind::Network,
            Self::MalformedResponse(_) => UsageErrorKind::MalformedResponse,
            Self::Configuration(_) => UsageErrorKind::Configuration,
        }
    }
}

impl From<serde_json::Error> for UsageError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

/// Kind of the last fetch failure, as recorded on a [`crate::UsageSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageErrorKind {
    /// Credentials rejected during polling.
    Authentication,
    /// Transient network failure.
    Network,
    /// Unexpected payload.
    MalformedResponse,
    /// Account configuration problem.
    Configuration,
}

impl UsageErrorKind {
    /// Returns a short human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication failed",
            Self::Network => "network unavailable",
            Self::MalformedResponse => "unexpected response",
            Self::Configuration => "configuration error",
        }
    }
}

impl fmt::Display for UsageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
