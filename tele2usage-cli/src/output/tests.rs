//! CLI output formatting tests.

use std::time::Duration;

use chrono::NaiveDate;
use tele2usage_core::{
    DataLimit, FieldValue, UsageError, UsageErrorKind, UsageSnapshot, UsageSource,
};
use tele2usage_store::{Account, AccountConfig, PollCoordinator, PollStatus, UsageStore};

use super::json::state_value;
use super::text::{format_data, format_duration};
use super::{JsonFormatter, TextFormatter};

struct FixedSource(UsageSnapshot);

impl UsageSource for FixedSource {
    async fn fetch_usage(&self) -> Result<UsageSnapshot, UsageError> {
        Ok(self.0.clone())
    }
}

fn config() -> AccountConfig {
    AccountConfig {
        name: "Phone".into(),
        username: "user".into(),
        password: "hunter2".into(),
        subscription_id: "4711".into(),
        subscription_model: "Fast 20GB".into(),
        poll_interval_secs: 1800,
        api_base: "https://my.tele2.se".into(),
    }
}

fn limited() -> UsageSnapshot {
    UsageSnapshot {
        data_limit: Some(DataLimit::Megabytes(20000.0)),
        data_used_mb: Some(5000.0),
        data_left_mb: Some(15000.0),
        period_start: NaiveDate::from_ymd_opt(2024, 3, 9),
        period_end: NaiveDate::from_ymd_opt(2024, 4, 8),
        ..UsageSnapshot::placeholder()
    }
}

// ============================================================================
// Text Formatter
// ============================================================================

#[test]
fn test_progress_bar_boundary_values() {
    let formatter = TextFormatter::new(false);

    let test_cases = vec![
        (0.0, "░░░░░░░░░░"),
        (25.0, "███░░░░░░░"),
        (75.0, "████████░░"),
        (100.0, "██████████"),
        (140.0, "██████████"),
    ];

    for (percent, expected) in test_cases {
        assert_eq!(formatter.progress_bar(percent), expected, "Failed for {percent}%");
    }
}

#[test]
fn test_progress_bar_colors() {
    let formatter = TextFormatter::new(true);
    assert!(formatter.progress_bar(10.0).contains("\x1b[31m"));
    assert!(formatter.progress_bar(30.0).contains("\x1b[33m"));
    assert!(formatter.progress_bar(80.0).contains("\x1b[32m"));
}

#[test]
fn test_format_data() {
    assert_eq!(format_data(512.0), "512 MB");
    assert_eq!(format_data(15360.0), "15.4 GB");
    assert_eq!(format_data(1000.0), "1.0 GB");
}

#[test]
fn test_format_duration() {
    assert_eq!(format_duration(Duration::from_secs(45)), "45s");
    assert_eq!(format_duration(Duration::from_secs(450)), "7m 30s");
    assert_eq!(format_duration(Duration::from_secs(1800)), "30m");
    assert_eq!(format_duration(Duration::from_secs(3600)), "1h");
    assert_eq!(format_duration(Duration::from_secs(5400)), "1h 30m");
}

#[test]
fn test_format_account_limited() {
    let formatter = TextFormatter::new(false);
    let output = formatter.format_account(&config(), &limited());

    assert!(output.starts_with("Phone (Fast 20GB, 4711)"));
    assert!(output.contains("75% left"));
    assert!(output.contains("15.0 GB of 20.0 GB"));
    assert!(output.contains("2024-03-09 to 2024-04-08"));
    assert!(!output.contains("failed"));
}

#[test]
fn test_format_account_unlimited() {
    let formatter = TextFormatter::new(false);
    let snapshot = UsageSnapshot {
        data_limit: Some(DataLimit::Unlimited),
        data_used_mb: Some(52000.0),
        is_unlimited: true,
        ..UsageSnapshot::placeholder()
    };

    let output = formatter.format_account(&config(), &snapshot);
    assert!(output.contains("Unlimited (52.0 GB used)"));
}

#[test]
fn test_format_account_without_data() {
    let formatter = TextFormatter::new(false);
    let snapshot = UsageSnapshot::placeholder().with_error(UsageErrorKind::Authentication);

    let output = formatter.format_account(&config(), &snapshot);
    assert!(output.contains("No usage data yet"));
    assert!(output.contains("Last update failed"));
}

#[test]
fn test_format_value() {
    let formatter = TextFormatter::new(false);
    assert_eq!(formatter.format_value(None), "unknown");
    assert_eq!(formatter.format_value(Some(FieldValue::Date(NaiveDate::MIN))), "unknown");
    assert_eq!(formatter.format_value(Some(FieldValue::Megabytes(2500.0))), "2.5 GB");
    assert_eq!(formatter.format_value(Some(FieldValue::Unlimited)), "Unlimited");
}

#[test]
fn test_accounts_list_hides_password() {
    let formatter = TextFormatter::new(false);
    let line = formatter.format_account_line(&config());
    assert!(line.contains("4711"));
    assert!(!line.contains("hunter2"));
}

#[tokio::test]
async fn test_poll_status_shows_faster_cadence() {
    let formatter = TextFormatter::new(false);
    let coordinator = PollCoordinator::new(
        FixedSource(limited()),
        UsageStore::new(),
        Duration::from_secs(1800),
    );
    coordinator.maybe_update().await;

    let status = PollStatus {
        trend_decreasing: true,
        effective_interval: Duration::from_secs(450),
        ..coordinator.status()
    };
    assert_eq!(
        formatter.format_poll_status(&status),
        "Polling every 7m 30s (data left falling)"
    );
    assert_eq!(
        formatter.format_poll_status(&coordinator.status()),
        "Polling every 30m"
    );
}

// ============================================================================
// JSON Formatter
// ============================================================================

#[test]
fn test_format_pretty_and_compact() {
    let data = serde_json::json!({"key": "value"});
    assert!(JsonFormatter::new(true).format(&data).unwrap().contains('\n'));
    assert!(!JsonFormatter::new(false).format(&data).unwrap().contains('\n'));
}

#[test]
fn test_format_list_unwraps_single_entry() {
    let formatter = JsonFormatter::new(false);
    assert_eq!(formatter.format_list(&[1]).unwrap(), "1");
    assert_eq!(formatter.format_list(&[1, 2]).unwrap(), "[1,2]");
}

#[test]
fn test_state_values() {
    assert_eq!(state_value(None), serde_json::Value::Null);
    assert_eq!(state_value(Some(FieldValue::Megabytes(512.0))), serde_json::json!(512.0));
    assert_eq!(state_value(Some(FieldValue::Unlimited)), serde_json::json!("unlimited"));
    assert_eq!(
        state_value(Some(FieldValue::Date(NaiveDate::MIN))),
        serde_json::Value::Null
    );
    assert_eq!(state_value(Some(FieldValue::Flag(true))), serde_json::json!(true));
}

#[tokio::test]
async fn test_account_output() {
    let account = Account::new(config(), FixedSource(limited()));
    account.start().await;
    let mut sensors = account.sensors();
    sensors.iter_mut().for_each(|s| s.refresh());

    let formatter = JsonFormatter::new(false);
    let output = formatter.account_output(
        account.config(),
        &account.store().snapshot(),
        &sensors,
        Some(&account.coordinator().status()),
    );
    let json: serde_json::Value =
        serde_json::from_str(&formatter.format(&output).unwrap()).unwrap();

    assert_eq!(json["subscriptionId"], "4711");
    assert_eq!(json["sensors"][0]["uniqueId"], "tele2.dataleft.4711");
    assert_eq!(json["sensors"][0]["state"], 15000.0);
    assert_eq!(json["sensors"][0]["unit"], "MB");
    assert_eq!(json["sensors"][3]["state"], "2024-03-09");
    assert_eq!(json["sensors"][5]["state"], false);
    assert_eq!(json["pollIntervalSecs"], 1800);
    assert!(json.get("error").is_none());
    assert!(!json.to_string().contains("hunter2"));
}
