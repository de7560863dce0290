//! CLI command implementations.

pub mod accounts;
pub mod config;
pub mod options;
pub mod remove;
pub mod setup;
pub mod usage;
pub mod watch;

use anyhow::Result;
use tele2usage_store::{AccountConfig, SettingsStore, StoreError, Tele2Account};

/// Selects accounts by name or subscription id, or all of them.
pub(crate) async fn select_accounts(
    settings: &SettingsStore,
    key: Option<&str>,
) -> Result<Vec<AccountConfig>> {
    let configs = match key {
        Some(key) => vec![
            settings
                .find(key)
                .await
                .ok_or_else(|| StoreError::AccountNotFound(key.to_string()))?,
        ],
        None => settings.accounts().await,
    };

    if configs.is_empty() {
        anyhow::bail!("No accounts configured. Run `tele2usage setup` first.");
    }
    Ok(configs)
}

/// Starts accounts concurrently; each performs its initial poll.
pub(crate) async fn start_accounts(configs: Vec<AccountConfig>) -> Result<Vec<Tele2Account>> {
    let started = futures::future::join_all(configs.into_iter().map(Tele2Account::start_tele2)).await;
    Ok(started.into_iter().collect::<Result<Vec<_>, _>>()?)
}
