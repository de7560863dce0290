//! Credentials and subscription types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Username/password pair used to log in to the remote API.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Creates a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Keeps passwords out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One entry of the remote subscription list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionSummary {
    /// Remote subscription identifier.
    pub subscription_id: String,
    /// Plan/product name.
    pub name: String,
}

/// The subscription an account is bound to.
///
/// Resolved once during setup and stored with the account configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionIdentity {
    /// Remote subscription identifier.
    pub subscription_id: String,
    /// Plan/product name.
    pub subscription_model: String,
}

impl From<SubscriptionSummary> for SubscriptionIdentity {
    fn from(summary: SubscriptionSummary) -> Self {
        Self {
            subscription_id: summary.subscription_id,
            subscription_model: summary.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let credentials = Credentials::new("user@example.com", "hunter2");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("user@example.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_identity_from_summary() {
        let identity = SubscriptionIdentity::from(SubscriptionSummary {
            subscription_id: "1234".into(),
            name: "Fast 20GB".into(),
        });
        assert_eq!(identity.subscription_id, "1234");
        assert_eq!(identity.subscription_model, "Fast 20GB");
    }
}
