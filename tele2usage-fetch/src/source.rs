//! Per-account usage source.

use std::sync::Arc;
use tele2usage_core::{Credentials, UsageApi, UsageError, UsageSnapshot, UsageSource};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Fetches usage for one account, reusing the login between polls.
///
/// The session is created lazily on the first fetch and dropped after an
/// authentication failure, so the next poll logs in again.
pub struct AccountUsageSource<A: UsageApi> {
    api: A,
    credentials: Credentials,
    subscription_id: String,
    session: Mutex<Option<Arc<A::Session>>>,
}

impl<A: UsageApi> AccountUsageSource<A> {
    /// Creates a source for `subscription_id`.
    pub fn new(api: A, credentials: Credentials, subscription_id: impl Into<String>) -> Self {
        Self {
            api,
            credentials,
            subscription_id: subscription_id.into(),
            session: Mutex::new(None),
        }
    }

    /// Returns the subscription this source polls.
    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// Returns true if a logged-in session is cached.
    pub async fn has_session(&self) -> bool {
        self.session.lock().await.is_some()
    }

    async fn session(&self) -> Result<Arc<A::Session>, UsageError> {
        let mut slot = self.session.lock().await;
        if let Some(session) = slot.as_ref() {
            return Ok(Arc::clone(session));
        }

        debug!(username = %self.credentials.username, "Authenticating");
        let session = Arc::new(
            self.api
                .authenticate(&self.credentials.username, &self.credentials.password)
                .await?,
        );
        *slot = Some(Arc::clone(&session));
        Ok(session)
    }
}

impl<A: UsageApi> UsageSource for AccountUsageSource<A> {
    async fn fetch_usage(&self) -> Result<UsageSnapshot, UsageError> {
        let session = self.session().await?;
        let result = self.api.fetch_usage(&session, &self.subscription_id).await;

        if let Err(UsageError::Authentication(ref msg)) = result {
            warn!(subscription = %self.subscription_id, error = %msg, "Session rejected, will log in again");
            self.session.lock().await.take();
        }
        result
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tele2usage_core::SubscriptionSummary;

    #[derive(Default)]
    struct FakeApi {
        logins: AtomicUsize,
        fetches: AtomicUsize,
        reject_fetch: std::sync::atomic::AtomicBool,
    }

    impl UsageApi for FakeApi {
        type Session = usize;

        async fn authenticate(&self, username: &str, password: &str) -> Result<usize, UsageError> {
            if username == "user" && password == "secret" {
                Ok(self.logins.fetch_add(1, Ordering::SeqCst) + 1)
            } else {
                Err(UsageError::Authentication("bad credentials".into()))
            }
        }

        async fn list_subscriptions(
            &self,
            _session: &usize,
        ) -> Result<Vec<SubscriptionSummary>, UsageError> {
            Ok(Vec::new())
        }

        async fn fetch_usage(
            &self,
            _session: &usize,
            _subscription_id: &str,
        ) -> Result<UsageSnapshot, UsageError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.reject_fetch.load(Ordering::SeqCst) {
                return Err(UsageError::Authentication("expired".into()));
            }
            Ok(UsageSnapshot {
                data_used_mb: Some(100.0),
                ..UsageSnapshot::placeholder()
            })
        }
    }

    fn source(password: &str) -> AccountUsageSource<FakeApi> {
        AccountUsageSource::new(FakeApi::default(), Credentials::new("user", password), "sub-1")
    }

    #[tokio::test]
    async fn test_session_is_reused() {
        let source = source("secret");

        source.fetch_usage().await.unwrap();
        source.fetch_usage().await.unwrap();

        assert_eq!(source.api.logins.load(Ordering::SeqCst), 1);
        assert_eq!(source.api.fetches.load(Ordering::SeqCst), 2);
        assert!(source.has_session().await);
    }

    #[tokio::test]
    async fn test_login_failure_is_reported() {
        let source = source("wrong");

        let err = source.fetch_usage().await.unwrap_err();
        assert!(matches!(err, UsageError::Authentication(_)));
        assert!(!source.has_session().await);
        assert_eq!(source.api.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejected_session_is_dropped() {
        let source = source("secret");
        source.fetch_usage().await.unwrap();

        source.api.reject_fetch.store(true, Ordering::SeqCst);
        assert!(source.fetch_usage().await.is_err());
        assert!(!source.has_session().await);

        source.api.reject_fetch.store(false, Ordering::SeqCst);
        source.fetch_usage().await.unwrap();
        assert_eq!(source.api.logins.load(Ordering::SeqCst), 2);
    }
}
