//! One running account: coordinator, store and sensors for a subscription.

use std::sync::Arc;
use std::time::Duration;
use tele2usage_core::UsageSource;
use tele2usage_fetch::{AccountUsageSource, Tele2Api};
use tracing::{info, instrument};

use crate::coordinator::{PollCoordinator, PollOutcome};
use crate::error::StoreError;
use crate::sensor::{DeviceInfo, SENSORS, Sensor};
use crate::settings_store::AccountConfig;
use crate::usage_store::UsageStore;

/// An account backed by the Tele2 API.
pub type Tele2Account = Account<AccountUsageSource<Tele2Api>>;

/// A configured subscription with its own poll coordinator.
pub struct Account<S: UsageSource> {
    config: AccountConfig,
    coordinator: Arc<PollCoordinator<S>>,
}

impl<S: UsageSource> Account<S> {
    /// Creates an account polling `source`. Nothing is fetched yet.
    pub fn new(config: AccountConfig, source: S) -> Self {
        let coordinator = Arc::new(PollCoordinator::new(
            source,
            UsageStore::new(),
            config.poll_interval(),
        ));
        Self {
            config,
            coordinator,
        }
    }

    /// Performs the initial poll.
    ///
    /// The outcome is informational; failures are already recorded in the
    /// store.
    #[instrument(level = "debug", skip(self), fields(subscription = %self.config.subscription_id))]
    pub async fn start(&self) -> PollOutcome {
        let outcome = self.coordinator.maybe_update().await;
        info!(name = %self.config.name, ?outcome, "Account started");
        outcome
    }

    /// Creates the sensors of this account.
    pub fn sensors(&self) -> Vec<Sensor<S>> {
        let device = self.device_info();
        SENSORS
            .iter()
            .map(|description| {
                Sensor::new(*description, Arc::clone(&self.coordinator), device.clone())
            })
            .collect()
    }

    /// Device all sensors of this account belong to.
    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo::new(&self.config.name, &self.config.identity())
    }

    /// Applies a new poll interval without touching credentials.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidOption`] for a zero interval.
    pub fn apply_options(&mut self, poll_interval_secs: u64) -> Result<(), StoreError> {
        if poll_interval_secs == 0 {
            return Err(StoreError::InvalidOption(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        self.config.poll_interval_secs = poll_interval_secs;
        self.coordinator
            .set_interval(Duration::from_secs(poll_interval_secs));
        Ok(())
    }

    /// The account configuration.
    pub fn config(&self) -> &AccountConfig {
        &self.config
    }

    /// The poll coordinator.
    pub fn coordinator(&self) -> &Arc<PollCoordinator<S>> {
        &self.coordinator
    }

    /// The usage store.
    pub fn store(&self) -> &UsageStore {
        self.coordinator.store()
    }
}

impl Tele2Account {
    /// Builds an account talking to the configured Tele2 API.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidOption`] for a zero poll interval and
    /// [`StoreError::Config`] if `api_base` is not a valid URL.
    pub fn from_config(config: AccountConfig) -> Result<Self, StoreError> {
        config.validate()?;
        let api = Tele2Api::new(config.api_base_url()?);
        let source = AccountUsageSource::new(api, config.credentials(), &config.subscription_id);
        Ok(Self::new(config, source))
    }

    /// Builds an account and performs the initial poll.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if `api_base` is not a valid URL.
    pub async fn start_tele2(config: AccountConfig) -> Result<Self, StoreError> {
        let account = Self::from_config(config)?;
        account.start().await;
        Ok(account)
    }
}

// ============================================================================
// Tests
// ============================================================================
