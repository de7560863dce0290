//! Account setup.
//!
//! Validates user input, resolves the subscription against the remote API,
//! and records the account. Nothing is written unless every step succeeds.

use tele2usage_core::{Credentials, UsageApi};
use tele2usage_fetch::{DEFAULT_API_BASE, resolve_subscription};
use tracing::{info, instrument};

use crate::error::StoreError;
use crate::settings_store::{AccountConfig, DEFAULT_NAME, DEFAULT_POLL_INTERVAL_SECS, SettingsStore};

/// User input for setting up an account.
#[derive(Clone, Default)]
pub struct SetupInput {
    /// Display name; defaults to [`DEFAULT_NAME`].
    pub name: Option<String>,
    /// Login username.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Poll interval in seconds; defaults to [`DEFAULT_POLL_INTERVAL_SECS`].
    pub poll_interval_secs: Option<u64>,
    /// Subscription to poll; defaults to the first one on the account.
    pub subscription_id: Option<String>,
    /// Base URL of the API; defaults to [`DEFAULT_API_BASE`].
    pub api_base: Option<String>,
}

impl SetupInput {
    fn validate(&self) -> Result<(), StoreError> {
        if self.username.trim().is_empty() {
            return Err(StoreError::InvalidOption("username must not be empty".to_string()));
        }
        if self.poll_interval_secs == Some(0) {
            return Err(StoreError::InvalidOption(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Sets up an account and persists it.
///
/// `api` must already point at `input.api_base`.
///
/// # Errors
///
/// Returns [`StoreError::InvalidOption`] for bad input, [`StoreError::Setup`]
/// when login or subscription resolution fails, and
/// [`StoreError::DuplicateAccount`] when the subscription is already
/// configured.
#[instrument(level = "debug", skip_all, fields(username = %input.username))]
pub async fn configure_account<A: UsageApi>(
    api: &A,
    settings: &SettingsStore,
    input: SetupInput,
) -> Result<AccountConfig, StoreError> {
    input.validate()?;

    let credentials = Credentials::new(input.username, input.password);
    let identity =
        resolve_subscription(api, &credentials, input.subscription_id.as_deref()).await?;

    let account = AccountConfig {
        name: input.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
        username: credentials.username,
        password: credentials.password,
        subscription_id: identity.subscription_id,
        subscription_model: identity.subscription_model,
        poll_interval_secs: input.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
        api_base: input.api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
    };
    account.api_base_url()?;

    settings.add_account(account.clone()).await?;
    if let Err(e) = settings.save().await {
        settings.remove_account(&account.subscription_id).await?;
        return Err(e);
    }

    info!(name = %account.name, subscription = %account.subscription_id, "Account configured");
    Ok(account)
}

// ============================================================================
// Tests
// ============================================================================
