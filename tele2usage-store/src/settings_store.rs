//! Configured accounts.
//!
//! Manages the account list with persistence.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tele2usage_core::{Credentials, SubscriptionIdentity};
use tele2usage_fetch::DEFAULT_API_BASE;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_json, save_json};

/// Default account display name.
pub const DEFAULT_NAME: &str = "Tele2 Data";

/// Default poll interval, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 1800;

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

// ============================================================================
// Account Config
// ============================================================================

/// One configured Tele2 subscription.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Display name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Login username.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Subscription polled by this account.
    pub subscription_id: String,
    /// Subscription model, shown as device model.
    #[serde(default)]
    pub subscription_model: String,
    /// Poll interval, in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Base URL of the Tele2 API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl AccountConfig {
    /// The poll interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Login credentials.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.password)
    }

    /// The polled subscription.
    pub fn identity(&self) -> SubscriptionIdentity {
        SubscriptionIdentity {
            subscription_id: self.subscription_id.clone(),
            subscription_model: self.subscription_model.clone(),
        }
    }

    /// Checks values that setup and the options step never accept.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidOption`] for a zero poll interval.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.poll_interval_secs == 0 {
            return Err(StoreError::InvalidOption(format!(
                "account {:?}: poll interval must be greater than zero",
                self.subscription_id
            )));
        }
        Ok(())
    }

    /// Parses the API base URL.
    pub fn api_base_url(&self) -> Result<Url, StoreError> {
        Url::parse(&self.api_base)
            .map_err(|e| StoreError::Config(format!("invalid api_base {:?}: {e}", self.api_base)))
    }
}

impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("subscription_id", &self.subscription_id)
            .field("subscription_model", &self.subscription_model)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Persisted settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Configured accounts.
    pub accounts: Vec<AccountConfig>,
}

// ============================================================================
// Settings Store
// ============================================================================

/// Account settings with persistence.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
}

impl SettingsStore {
    /// Creates an empty store backed by `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            settings: Arc::new(RwLock::new(Settings::default())),
            path,
        }
    }

    /// Loads settings from the default path.
    ///
    /// # Errors
    ///
    /// Returns error if an existing settings file cannot be read or parsed.
    pub async fn load_default() -> Result<Self, StoreError> {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path. A missing file yields no accounts.
    ///
    /// # Errors
    ///
    /// Returns error if an existing settings file cannot be read or parsed,
    /// or holds an account that fails [`AccountConfig::validate`].
    pub async fn load(path: PathBuf) -> Result<Self, StoreError> {
        let settings = if tokio::fs::try_exists(&path).await? {
            info!(path = %path.display(), "Loading settings");
            let settings: Settings = load_json(&path).await.inspect_err(|e| {
                warn!(path = %path.display(), error = %e, "Failed to load settings");
            })?;
            for account in &settings.accounts {
                account.validate().inspect_err(|e| {
                    warn!(path = %path.display(), error = %e, "Invalid account in settings");
                })?;
            }
            settings
        } else {
            debug!(path = %path.display(), "Settings file not found, no accounts configured");
            Settings::default()
        };

        Ok(Self {
            settings: Arc::new(RwLock::new(settings)),
            path,
        })
    }

    /// Path of the settings file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Gets a copy of the configured accounts.
    pub async fn accounts(&self) -> Vec<AccountConfig> {
        self.settings.read().await.accounts.clone()
    }

    /// Finds an account by name or subscription id.
    ///
    /// A subscription id match wins over a name match.
    pub async fn find(&self, key: &str) -> Option<AccountConfig> {
        let settings = self.settings.read().await;
        Self::position(&settings, key).map(|i| settings.accounts[i].clone())
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be written to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    /// Adds an account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateAccount`] if the subscription is already
    /// configured.
    pub async fn add_account(&self, account: AccountConfig) -> Result<(), StoreError> {
        let mut settings = self.settings.write().await;
        if settings
            .accounts
            .iter()
            .any(|a| a.subscription_id == account.subscription_id)
        {
            return Err(StoreError::DuplicateAccount(account.subscription_id));
        }
        info!(name = %account.name, subscription = %account.subscription_id, "Account added");
        settings.accounts.push(account);
        Ok(())
    }

    /// Removes an account by name or subscription id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AccountNotFound`] if nothing matches.
    pub async fn remove_account(&self, key: &str) -> Result<AccountConfig, StoreError> {
        let mut settings = self.settings.write().await;
        let index = Self::position(&settings, key)
            .ok_or_else(|| StoreError::AccountNotFound(key.to_string()))?;
        let removed = settings.accounts.remove(index);
        info!(name = %removed.name, subscription = %removed.subscription_id, "Account removed");
        Ok(removed)
    }

    /// Sets the poll interval of an account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidOption`] for a zero interval and
    /// [`StoreError::AccountNotFound`] if nothing matches.
    pub async fn set_poll_interval(
        &self,
        key: &str,
        poll_interval_secs: u64,
    ) -> Result<AccountConfig, StoreError> {
        if poll_interval_secs == 0 {
            return Err(StoreError::InvalidOption(
                "poll interval must be greater than zero".to_string(),
            ));
        }

        let mut settings = self.settings.write().await;
        let index = Self::position(&settings, key)
            .ok_or_else(|| StoreError::AccountNotFound(key.to_string()))?;
        let account = &mut settings.accounts[index];
        account.poll_interval_secs = poll_interval_secs;
        debug!(name = %account.name, poll_interval_secs, "Poll interval updated");
        Ok(account.clone())
    }

    fn position(settings: &Settings, key: &str) -> Option<usize> {
        settings
            .accounts
            .iter()
            .position(|a| a.subscription_id == key)
            .or_else(|| settings.accounts.iter().position(|a| a.name == key))
    }
}

// ============================================================================
// Tests
// ============================================================================
