//! Store error types.

use tele2usage_core::UsageError;
use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No account with this name or subscription id.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// The subscription is already configured.
    #[error("Account already configured: {0}")]
    DuplicateAccount(String),

    /// An option value is out of range.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Setup could not resolve the account.
    #[error("Setup failed: {0}")]
    Setup(#[from] UsageError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns true if the error came from rejected credentials during setup.
    pub fn is_auth(&self) -> bool {
        matches!(self, StoreError::Setup(UsageError::Authentication(_)))
    }
}
