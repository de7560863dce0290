//! Trait definitions for tele2usage.
//!
//! The remote API and the per-account fetch are collaborators of the poll
//! coordinator; these traits are the seams where tests plug in fakes.

use std::future::Future;

use crate::error::UsageError;
use crate::models::{SubscriptionSummary, UsageSnapshot};

/// Remote usage API.
///
/// Implementors are responsible for:
/// - Authenticating with the provider
/// - Listing the subscriptions visible to the credentials
/// - Fetching and normalizing usage into a [`UsageSnapshot`]
///
/// Request timeouts are the implementor's responsibility and surface as
/// [`UsageError::Network`].
pub trait UsageApi: Send + Sync {
    /// Authenticated session handle.
    type Session: Send + Sync;

    /// Logs in with a username/password pair.
    fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<Self::Session, UsageError>> + Send;

    /// Lists the subscriptions visible to the session.
    fn list_subscriptions(
        &self,
        session: &Self::Session,
    ) -> impl Future<Output = Result<Vec<SubscriptionSummary>, UsageError>> + Send;

    /// Fetches current usage for a subscription.
    fn fetch_usage(
        &self,
        session: &Self::Session,
        subscription_id: &str,
    ) -> impl Future<Output = Result<UsageSnapshot, UsageError>> + Send;
}

/// Fetches usage for one configured account.
///
/// The poll coordinator owns exactly one source and calls it at most once
/// at a time.
pub trait UsageSource: Send + Sync {
    /// Fetches a fresh snapshot.
    fn fetch_usage(&self) -> impl Future<Output = Result<UsageSnapshot, UsageError>> + Send;
}
