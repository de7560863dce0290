// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # tele2usage Core
//!
//! Core types, models, and traits shared by the tele2usage crates.
//!
//! ## Key Types
//!
//! ### Usage Types
//! - [`UsageSnapshot`] - One reading of mobile data usage
//! - [`DataLimit`] - Package limit in megabytes, or unlimited
//! - [`UsageField`] / [`FieldValue`] - Per-field access for sensor rendering
//!
//! ### Subscription Types
//! - [`Credentials`] - Username/password pair
//! - [`SubscriptionSummary`] - One entry of the remote subscription list
//! - [`SubscriptionIdentity`] - The subscription an account is bound to
//!
//! ### Errors
//! - [`UsageError`] - Setup and fetch failures
//! - [`UsageErrorKind`] - Payload-free failure kind stored on snapshots
//!
//! ### Traits
//! - [`UsageApi`] - Remote API: authenticate, list subscriptions, fetch usage
//! - [`UsageSource`] - Per-account fetch used by the poll coordinator

pub mod error;
pub mod models;
pub mod traits;

pub use error::{UsageError, UsageErrorKind};

pub use models::{
    // Usage types
    DataLimit,
    FieldValue,
    UsageField,
    UsageSnapshot,
    // Subscription types
    Credentials,
    SubscriptionIdentity,
    SubscriptionSummary,
};

pub use traits::{UsageApi, UsageSource};
