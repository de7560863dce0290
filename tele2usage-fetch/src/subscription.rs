//! Setup-time subscription resolution.

use tele2usage_core::{Credentials, SubscriptionIdentity, UsageApi, UsageError};
use tracing::{debug, info, instrument};

/// Logs in and picks the subscription an account will poll.
///
/// Selects `preferred` when given, otherwise the first subscription listed.
/// Rejected credentials are returned as [`UsageError::Authentication`]; any
/// other failure becomes [`UsageError::Configuration`]. Nothing is retried.
///
/// # Errors
///
/// Returns an error if login fails, the list cannot be fetched, the account
/// has no subscriptions, or `preferred` is not among them.
#[instrument(level = "debug", skip(api, credentials), fields(username = %credentials.username))]
pub async fn resolve_subscription<A: UsageApi>(
    api: &A,
    credentials: &Credentials,
    preferred: Option<&str>,
) -> Result<SubscriptionIdentity, UsageError> {
    let session = api
        .authenticate(&credentials.username, &credentials.password)
        .await
        .map_err(into_setup_error)?;

    let subscriptions = api
        .list_subscriptions(&session)
        .await
        .map_err(into_setup_error)?;
    debug!(count = subscriptions.len(), "Subscriptions available");

    let selected = match preferred {
        Some(id) => subscriptions
            .into_iter()
            .find(|s| s.subscription_id == id)
            .ok_or_else(|| UsageError::Configuration(format!("subscription {id} not found")))?,
        None => subscriptions
            .into_iter()
            .next()
            .ok_or_else(|| UsageError::Configuration("no subscriptions on account".to_string()))?,
    };

    info!(subscription = %selected.subscription_id, model = %selected.name, "Resolved subscription");
    Ok(selected.into())
}

fn into_setup_error(err: UsageError) -> UsageError {
    match err {
        UsageError::Authentication(_) | UsageError::Configuration(_) => err,
        other => UsageError::Configuration(format!("cannot reach Tele2: {other}")),
    }
}

// ============================================================================
// Tests
// ============================================================================
