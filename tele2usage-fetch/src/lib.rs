// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # tele2usage Fetch
//!
//! Remote usage client for the tele2usage workspace.
//!
//! - [`http::HttpClient`] - Cookie-session HTTP wrapper with tracing
//! - [`api::Tele2Api`] - Tele2 web API (login, subscriptions, data usage)
//! - [`source::AccountUsageSource`] - Per-account fetch with session reuse
//! - [`subscription::resolve_subscription`] - Setup-time subscription lookup
//!
//! ## Example
//!
//! ```ignore
//! use tele2usage_core::{Credentials, UsageSource};
//! use tele2usage_fetch::{resolve_subscription, AccountUsageSource, Tele2Api};
//!
//! let api = Tele2Api::new(Tele2Api::default_base());
//! let credentials = Credentials::new("user", "secret");
//! let identity = resolve_subscription(&api, &credentials, None).await?;
//!
//! let source = AccountUsageSource::new(api, credentials, identity.subscription_id);
//! let snapshot = source.fetch_usage().await?;
//! ```

pub mod api;
pub mod error;
pub mod http;
pub mod source;
pub mod subscription;

pub use api::{DataUsageResponse, Tele2Api, Tele2Session, DEFAULT_API_BASE};
pub use error::FetchError;
pub use http::HttpClient;
pub use source::AccountUsageSource;
pub use subscription::resolve_subscription;
