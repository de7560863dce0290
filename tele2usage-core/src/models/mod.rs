//! Domain models for tele2usage.
//!
//! ## Submodules
//!
//! - [`usage`] - Usage snapshot and per-field access
//! - [`subscription`] - Credentials and subscription identity

mod subscription;
mod usage;

pub use subscription::{Credentials, SubscriptionIdentity, SubscriptionSummary};
pub use usage::{DataLimit, FieldValue, UsageField, UsageSnapshot};
