// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # tele2usage Store
//!
//! State management for tele2usage.
//!
//! This crate provides:
//!
//! - **UsageStore**: The latest usage snapshot of one account, with watch channels
//! - **PollCoordinator**: Decides when to fetch, guards against overlapping
//!   fetches, and adapts the cadence to the usage trend
//! - **Sensor**: Per-field readers that poll opportunistically before reading
//! - **Account**: Wires config, coordinator and sensors for one subscription
//! - **SettingsStore**: Configured accounts with persistence
//!
//! ## Usage
//!
//! ```ignore
//! use tele2usage_store::{Account, SettingsStore};
//!
//! let settings = SettingsStore::load_default().await?;
//! for config in settings.accounts().await {
//!     let account = Account::start_tele2(config).await?;
//!     for mut sensor in account.sensors() {
//!         sensor.update().await;
//!         println!("{}: {:?}", sensor.name(), sensor.value());
//!     }
//! }
//! ```

pub mod account;
pub mod config_flow;
pub mod coordinator;
pub mod error;
pub mod persistence;
pub mod sensor;
pub mod settings_store;
pub mod usage_store;

pub use account::{Account, Tele2Account};
pub use config_flow::{configure_account, SetupInput};
pub use coordinator::{PollCoordinator, PollOutcome, PollStatus, DECREASE_FACTOR};
pub use error::StoreError;
pub use persistence::{default_config_dir, default_settings_path, load_json, save_json};
pub use sensor::{DeviceInfo, Sensor, SensorClass, SensorDescription, SENSORS};
pub use settings_store::{AccountConfig, Settings, SettingsStore, DEFAULT_NAME, DEFAULT_POLL_INTERVAL_SECS};
pub use usage_store::UsageStore;
