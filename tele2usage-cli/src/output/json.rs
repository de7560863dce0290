//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};
use tele2usage_core::{FieldValue, UsageErrorKind, UsageSnapshot, UsageSource};
use tele2usage_store::{AccountConfig, PollStatus, Sensor};

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for one account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUsageOutput {
    pub name: String,
    pub subscription_id: String,
    pub model: String,
    pub sensors: Vec<SensorOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<UsageErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_datetime_opt")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend_decreasing: Option<bool>,
}

/// One sensor value.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorOutput {
    pub unique_id: String,
    pub name: String,
    pub state: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
}

/// Account list entry. Credentials are never printed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfoOutput {
    pub name: String,
    pub username: String,
    pub subscription_id: String,
    pub model: String,
    pub poll_interval_secs: u64,
    pub api_base: String,
}

impl From<&AccountConfig> for AccountInfoOutput {
    fn from(config: &AccountConfig) -> Self {
        Self {
            name: config.name.clone(),
            username: config.username.clone(),
            subscription_id: config.subscription_id.clone(),
            model: config.subscription_model.clone(),
            poll_interval_secs: config.poll_interval_secs,
            api_base: config.api_base.clone(),
        }
    }
}

// ============================================================================
// Serialization helpers
// ============================================================================

fn serialize_datetime_opt<S>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => s.serialize_str(&dt.to_rfc3339()),
        None => s.serialize_none(),
    }
}

/// Maps a sensor value to a JSON state; unknown values are `null`.
pub fn state_value(value: Option<FieldValue>) -> serde_json::Value {
    match value {
        None => serde_json::Value::Null,
        Some(FieldValue::Megabytes(mb)) => serde_json::json!(mb),
        Some(FieldValue::Unlimited) => serde_json::json!("unlimited"),
        Some(FieldValue::Date(date)) if date == NaiveDate::MIN => serde_json::Value::Null,
        Some(FieldValue::Date(date)) => serde_json::json!(date.to_string()),
        Some(FieldValue::Flag(on)) => serde_json::json!(on),
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats a list, unwrapping a single entry.
    pub fn format_list<T: Serialize>(&self, items: &[T]) -> Result<String> {
        if let [single] = items {
            self.format(single)
        } else {
            self.format(&items)
        }
    }

    /// Builds the output of one account from its sensors.
    pub fn account_output<S: UsageSource>(
        &self,
        config: &AccountConfig,
        snapshot: &UsageSnapshot,
        sensors: &[Sensor<S>],
        status: Option<&PollStatus>,
    ) -> AccountUsageOutput {
        AccountUsageOutput {
            name: config.name.clone(),
            subscription_id: config.subscription_id.clone(),
            model: config.subscription_model.clone(),
            sensors: sensors
                .iter()
                .map(|sensor| SensorOutput {
                    unique_id: sensor.unique_id().to_string(),
                    name: sensor.name().to_string(),
                    state: state_value(sensor.value()),
                    unit: sensor.unit_of_measurement(),
                })
                .collect(),
            error: snapshot.error,
            updated_at: snapshot.updated_at,
            poll_interval_secs: status.map(|s| s.effective_interval.as_secs()),
            trend_decreasing: status.map(|s| s.trend_decreasing),
        }
    }
}
