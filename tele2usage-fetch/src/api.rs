//! Tele2 web API client.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tele2usage_core::{DataLimit, SubscriptionSummary, UsageApi, UsageError, UsageSnapshot};
use tracing::{debug, info, instrument};
use url::Url;

use crate::error::FetchError;
use crate::http::HttpClient;

// ============================================================================
// Constants
// ============================================================================

/// Tele2 API base URL.
pub const DEFAULT_API_BASE: &str = "https://my.tele2.se";

/// Login endpoint.
const LOGIN_PATH: &[&str] = &["auth", "login"];

/// Subscription list endpoint.
const SUBSCRIPTIONS_PATH: &[&str] = &["api", "subscriptions"];

/// Per-subscription data usage resource.
const DATA_USAGE_RESOURCE: &str = "data-usage";

/// Date format used by the billing period buckets.
const BUCKET_DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Entry of the subscription list response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    /// Subscription identifier.
    #[serde(alias = "subsId")]
    pub subscription_id: String,

    /// Plan/product name.
    #[serde(default)]
    pub name: String,
}

impl From<SubscriptionResponse> for SubscriptionSummary {
    fn from(response: SubscriptionResponse) -> Self {
        Self {
            subscription_id: response.subscription_id,
            name: response.name,
        }
    }
}

/// Billing period bucket.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageBucket {
    /// Period start, `YYYY-MM-DD`.
    #[serde(default)]
    pub start_date: Option<String>,

    /// Period end, `YYYY-MM-DD`.
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Response from the data usage endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataUsageResponse {
    /// Unlimited plan flag.
    #[serde(default)]
    pub has_unlimited_data: bool,

    /// Package limit in megabytes.
    #[serde(default)]
    pub package_limit: Option<f64>,

    /// Data used in megabytes.
    #[serde(default)]
    pub usage: Option<f64>,

    /// Data remaining in megabytes.
    #[serde(default)]
    pub remaining: Option<f64>,

    /// Billing period buckets; only the first one is used.
    #[serde(default)]
    pub buckets: Vec<UsageBucket>,
}

impl DataUsageResponse {
    /// Converts the response into a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidResponse`] when `usage` is missing, when a
    /// limited plan has no `packageLimit`, or when a bucket date is not
    /// `YYYY-MM-DD`.
    pub fn to_snapshot(&self) -> Result<UsageSnapshot, FetchError> {
        let used = self
            .usage
            .ok_or_else(|| FetchError::InvalidResponse("missing usage".to_string()))?;

        let limit = if self.has_unlimited_data {
            DataLimit::Unlimited
        } else {
            let mb = self.package_limit.ok_or_else(|| {
                FetchError::InvalidResponse("missing packageLimit".to_string())
            })?;
            DataLimit::Megabytes(mb)
        };

        let bucket = self.buckets.first();
        let period_start = parse_date(bucket.and_then(|b| b.start_date.as_deref()))?;
        let period_end = parse_date(bucket.and_then(|b| b.end_date.as_deref()))?;

        Ok(UsageSnapshot {
            data_limit: Some(limit),
            data_used_mb: Some(used),
            data_left_mb: self.remaining,
            period_start,
            period_end,
            is_unlimited: self.has_unlimited_data,
            error: None,
            updated_at: Some(chrono::Utc::now()),
        })
    }
}

fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>, FetchError> {
    raw.map(|s| {
        NaiveDate::parse_from_str(s, BUCKET_DATE_FORMAT)
            .map_err(|e| FetchError::InvalidResponse(format!("bad date {s:?}: {e}")))
    })
    .transpose()
}

// ============================================================================
// API Client
// ============================================================================

/// Logged-in Tele2 session.
///
/// Holds the HTTP client whose cookie jar carries the login.
#[derive(Debug, Clone)]
pub struct Tele2Session {
    http: HttpClient,
}

/// Tele2 web API client.
#[derive(Debug, Clone)]
pub struct Tele2Api {
    base: Url,
}

impl Tele2Api {
    /// Creates a client for the given API base.
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    /// Returns the default API base.
    ///
    /// # Panics
    ///
    /// Never panics; the default base is a valid constant URL.
    pub fn default_base() -> Url {
        Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL")
    }

    /// Returns the API base.
    pub fn base(&self) -> &Url {
        &self.base
    }

    #[instrument(level = "debug", skip(self, password))]
    async fn login(&self, username: &str, password: &str) -> Result<Tele2Session, FetchError> {
        // Fresh client per login so sessions never share cookies.
        let http = HttpClient::new(self.base.clone())?;
        http.post_json(LOGIN_PATH, &LoginRequest { username, password })
            .await?;
        info!("Logged in to Tele2");
        Ok(Tele2Session { http })
    }

    #[instrument(skip(self, session))]
    async fn subscriptions(
        &self,
        session: &Tele2Session,
    ) -> Result<Vec<SubscriptionSummary>, FetchError> {
        let list: Vec<SubscriptionResponse> = session.http.get_json(SUBSCRIPTIONS_PATH).await?;
        debug!(count = list.len(), "Fetched subscriptions");
        Ok(list.into_iter().map(SubscriptionSummary::from).collect())
    }

    #[instrument(skip(self, session))]
    async fn data_usage(
        &self,
        session: &Tele2Session,
        subscription_id: &str,
    ) -> Result<UsageSnapshot, FetchError> {
        let segments = [
            SUBSCRIPTIONS_PATH[0],
            SUBSCRIPTIONS_PATH[1],
            subscription_id,
            DATA_USAGE_RESOURCE,
        ];
        let response: DataUsageResponse = session.http.get_json(&segments).await?;
        let snapshot = response.to_snapshot()?;
        debug!(
            used_mb = ?snapshot.data_used_mb,
            left_mb = ?snapshot.data_left_mb,
            unlimited = snapshot.is_unlimited,
            "Fetched data usage"
        );
        Ok(snapshot)
    }
}

impl Default for Tele2Api {
    fn default() -> Self {
        Self::new(Self::default_base())
    }
}

impl UsageApi for Tele2Api {
    type Session = Tele2Session;

    async fn authenticate(&self, username: &str, password: &str) -> Result<Tele2Session, UsageError> {
        Ok(self.login(username, password).await?)
    }

    async fn list_subscriptions(
        &self,
        session: &Tele2Session,
    ) -> Result<Vec<SubscriptionSummary>, UsageError> {
        Ok(self.subscriptions(session).await?)
    }

    async fn fetch_usage(
        &self,
        session: &Tele2Session,
        subscription_id: &str,
    ) -> Result<UsageSnapshot, UsageError> {
        Ok(self.data_usage(session, subscription_id).await?)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_limited_plan() {
        let json = r#"{
            "hasUnlimitedData": false,
            "packageLimit": 20480,
            "usage": 5120.5,
            "remaining": 15359.5,
            "buckets": [
                {"startDate": "2024-05-01", "endDate": "2024-05-31"},
                {"startDate": "2024-06-01", "endDate": "2024-06-30"}
            ]
        }"#;

        let response: DataUsageResponse = serde_json::from_str(json).unwrap();
        let snapshot = response.to_snapshot().unwrap();

        assert_eq!(snapshot.data_limit, Some(DataLimit::Megabytes(20480.0)));
        assert_eq!(snapshot.data_used_mb, Some(5120.5));
        assert_eq!(snapshot.data_left_mb, Some(15359.5));
        assert_eq!(snapshot.period_start, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(snapshot.period_end, NaiveDate::from_ymd_opt(2024, 5, 31));
        assert!(!snapshot.is_unlimited);
        assert!(snapshot.error.is_none());
    }

    #[test]
    fn test_parse_unlimited_plan() {
        let json = r#"{"hasUnlimitedData": true, "usage": 80000, "buckets": []}"#;

        let response: DataUsageResponse = serde_json::from_str(json).unwrap();
        let snapshot = response.to_snapshot().unwrap();

        assert_eq!(snapshot.data_limit, Some(DataLimit::Unlimited));
        assert!(snapshot.is_unlimited);
        assert_eq!(snapshot.data_left_mb, None);
        assert_eq!(snapshot.period_start, None);
    }

    #[test]
    fn test_missing_usage_is_invalid() {
        let response: DataUsageResponse =
            serde_json::from_str(r#"{"packageLimit": 1000}"#).unwrap();
        assert!(matches!(
            response.to_snapshot(),
            Err(FetchError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_limited_plan_without_limit_is_invalid() {
        let response: DataUsageResponse = serde_json::from_str(r#"{"usage": 10}"#).unwrap();
        assert!(response.to_snapshot().is_err());
    }

    #[test]
    fn test_bad_bucket_date_is_invalid() {
        let json = r#"{
            "packageLimit": 1000,
            "usage": 10,
            "buckets": [{"startDate": "01/05/2024"}]
        }"#;
        let response: DataUsageResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            response.to_snapshot(),
            Err(FetchError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_parse_subscription_list() {
        let json = r#"[
            {"subscriptionId": "123", "name": "Fast 20GB"},
            {"subsId": "456"}
        ]"#;
        let list: Vec<SubscriptionResponse> = serde_json::from_str(json).unwrap();
        let summaries: Vec<SubscriptionSummary> =
            list.into_iter().map(SubscriptionSummary::from).collect();

        assert_eq!(summaries[0].subscription_id, "123");
        assert_eq!(summaries[0].name, "Fast 20GB");
        assert_eq!(summaries[1].subscription_id, "456");
        assert_eq!(summaries[1].name, "");
    }

    #[test]
    fn test_default_base() {
        let api = Tele2Api::default();
        assert_eq!(api.base().as_str(), "https://my.tele2.se/");
    }
}
