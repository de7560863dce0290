//! Usage-related types.
//!
//! This module contains types related to mobile data usage:
//! - [`UsageSnapshot`] - One reading of the account's data usage
//! - [`DataLimit`] - Package limit
//! - [`UsageField`] - Names of the fields sensors read
//! - [`FieldValue`] - Value of a single field

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::UsageErrorKind;

// ============================================================================
// Data Limit
// ============================================================================

/// Package limit of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataLimit {
    /// Limited package, in megabytes.
    Megabytes(f64),
    /// Unlimited data plan.
    Unlimited,
}

impl DataLimit {
    /// Returns the limit in megabytes, or `None` for unlimited plans.
    pub fn megabytes(&self) -> Option<f64> {
        match self {
            Self::Megabytes(mb) => Some(*mb),
            Self::Unlimited => None,
        }
    }
}

impl fmt::Display for DataLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Megabytes(mb) => write!(f, "{mb} MB"),
            Self::Unlimited => f.write_str("Unlimited"),
        }
    }
}

// ============================================================================
// Usage Snapshot
// ============================================================================

/// One self-consistent reading of mobile data usage.
///
/// A snapshot produced by a successful fetch has `data_used_mb` and
/// `data_limit` set and no `error`. After a failed fetch the previous
/// snapshot is kept and only `error` changes, see [`UsageSnapshot::with_error`].
/// The default value is the placeholder held before the first poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Package limit.
    pub data_limit: Option<DataLimit>,
    /// Data used in the current period, in megabytes.
    pub data_used_mb: Option<f64>,
    /// Data left in the current period, in megabytes.
    pub data_left_mb: Option<f64>,
    /// First day of the billing period.
    pub period_start: Option<NaiveDate>,
    /// Last day of the billing period.
    pub period_end: Option<NaiveDate>,
    /// Whether the plan has unlimited data.
    pub is_unlimited: bool,
    /// Kind of the most recent fetch failure, if the last poll failed.
    pub error: Option<UsageErrorKind>,
    /// When the numeric fields were fetched.
    pub updated_at: Option<DateTime<Utc>>,
}

impl UsageSnapshot {
    /// Creates the placeholder snapshot held before the first poll.
    pub fn placeholder() -> Self {
        Self::default()
    }

    /// Returns true once a successful fetch has populated the snapshot.
    pub fn has_data(&self) -> bool {
        self.data_used_mb.is_some()
    }

    /// Returns a copy carrying `kind` as the last error.
    ///
    /// Every known value is retained.
    pub fn with_error(&self, kind: UsageErrorKind) -> Self {
        Self {
            error: Some(kind),
            ..self.clone()
        }
    }

    /// Compares `data_left_mb` against `previous`.
    ///
    /// Returns `Some(true)` when data left went down, `Some(false)` when it
    /// did not, and `None` when either side is unknown.
    pub fn is_decreasing_from(&self, previous: &UsageSnapshot) -> Option<bool> {
        match (previous.data_left_mb, self.data_left_mb) {
            (Some(old), Some(new)) => Some(new < old),
            _ => None,
        }
    }

    /// Returns used data as a percentage of the package, if limited.
    pub fn used_percent(&self) -> Option<f64> {
        let used = self.data_used_mb?;
        let limit = self.data_limit?.megabytes()?;
        if limit > 0.0 {
            Some((used / limit * 100.0).clamp(0.0, 100.0))
        } else {
            None
        }
    }

    /// Returns the value of a single field.
    pub fn get(&self, field: UsageField) -> Option<FieldValue> {
        match field {
            UsageField::DataLeft => self.data_left_mb.map(FieldValue::Megabytes),
            UsageField::DataUsed => self.data_used_mb.map(FieldValue::Megabytes),
            UsageField::DataTotal => self.data_limit.map(|limit| match limit {
                DataLimit::Megabytes(mb) => FieldValue::Megabytes(mb),
                DataLimit::Unlimited => FieldValue::Unlimited,
            }),
            UsageField::PeriodStart => self.period_start.map(FieldValue::Date),
            UsageField::PeriodEnd => self.period_end.map(FieldValue::Date),
            UsageField::Unlimited => Some(FieldValue::Flag(self.is_unlimited)),
        }
    }
}

// ============================================================================
// Field Access
// ============================================================================

/// Fields of a [`UsageSnapshot`] exposed to sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageField {
    /// Data left in the period.
    DataLeft,
    /// Data used in the period.
    DataUsed,
    /// Package limit.
    DataTotal,
    /// Billing period start.
    PeriodStart,
    /// Billing period end.
    PeriodEnd,
    /// Unlimited plan flag.
    Unlimited,
}

impl UsageField {
    /// All fields, in sensor order.
    pub fn all() -> &'static [UsageField] {
        &[
            UsageField::DataLeft,
            UsageField::DataUsed,
            UsageField::DataTotal,
            UsageField::PeriodStart,
            UsageField::PeriodEnd,
            UsageField::Unlimited,
        ]
    }
}

/// Value of a single usage field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    /// Amount of data in megabytes.
    Megabytes(f64),
    /// Unlimited package marker.
    Unlimited,
    /// Calendar date.
    Date(NaiveDate),
    /// On/off state.
    Flag(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Megabytes(mb) => write!(f, "{mb} MB"),
            Self::Unlimited => f.write_str("Unlimited"),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Flag(true) => f.write_str("on"),
            Self::Flag(false) => f.write_str("off"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
