//! Sensor readers.
//!
//! Each sensor exposes one field of an account's usage snapshot. Updating a
//! sensor first gives the coordinator a chance to poll, then reads the store.

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tele2usage_core::{FieldValue, SubscriptionIdentity, UsageField, UsageSource};
use tracing::trace;

use crate::coordinator::{PollCoordinator, PollOutcome};

/// Integration domain, used in device identifiers.
pub const DOMAIN: &str = "tele2_datausage";

/// Manufacturer shown in device info.
pub const MANUFACTURER: &str = "Tele2";

/// Unit of data sensors.
pub const DATA_UNIT: &str = "MB";

/// Suggested display unit of data sensors.
pub const SUGGESTED_DATA_UNIT: &str = "GB";

// ============================================================================
// Sensor Descriptions
// ============================================================================

/// How a sensor's value is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorClass {
    /// Amount of data, in megabytes.
    DataSize,
    /// Calendar date.
    Date,
    /// On/off state.
    Binary,
}

/// Static description of one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorDescription {
    /// Display name.
    pub name: &'static str,
    /// Identifier prefix of the unique id.
    pub identifier: &'static str,
    /// Field read from the store.
    pub field: UsageField,
    /// Presentation class.
    pub class: SensorClass,
}

/// The sensors created for every account.
pub const SENSORS: [SensorDescription; 6] = [
    SensorDescription {
        name: "Tele2 Data Left",
        identifier: "tele2.dataleft",
        field: UsageField::DataLeft,
        class: SensorClass::DataSize,
    },
    SensorDescription {
        name: "Tele2 Data Used",
        identifier: "tele2.datausage",
        field: UsageField::DataUsed,
        class: SensorClass::DataSize,
    },
    SensorDescription {
        name: "Tele2 Data Total",
        identifier: "tele2.datatotal",
        field: UsageField::DataTotal,
        class: SensorClass::DataSize,
    },
    SensorDescription {
        name: "Tele2 Data Period Start",
        identifier: "tele2.dataperiodstart",
        field: UsageField::PeriodStart,
        class: SensorClass::Date,
    },
    SensorDescription {
        name: "Tele2 Data Period End",
        identifier: "tele2.dataperiodend",
        field: UsageField::PeriodEnd,
        class: SensorClass::Date,
    },
    SensorDescription {
        name: "Tele2 Unlimited Data",
        identifier: "tele2.unlimiteddata",
        field: UsageField::Unlimited,
        class: SensorClass::Binary,
    },
];

/// Device the sensors of one account belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// `(domain, subscription id)`.
    pub identifiers: (String, String),
    /// Account display name.
    pub name: String,
    /// Manufacturer.
    pub manufacturer: String,
    /// Subscription model.
    pub model: String,
}

impl DeviceInfo {
    /// Builds device info for a subscription.
    pub fn new(name: impl Into<String>, identity: &SubscriptionIdentity) -> Self {
        Self {
            identifiers: (DOMAIN.to_string(), identity.subscription_id.clone()),
            name: name.into(),
            manufacturer: MANUFACTURER.to_string(),
            model: identity.subscription_model.clone(),
        }
    }
}

// ============================================================================
// Sensor
// ============================================================================

/// A reader of one usage field.
pub struct Sensor<S: UsageSource> {
    description: SensorDescription,
    coordinator: Arc<PollCoordinator<S>>,
    unique_id: String,
    device: DeviceInfo,
    value: Option<FieldValue>,
}

impl<S: UsageSource> Clone for Sensor<S> {
    fn clone(&self) -> Self {
        Self {
            description: self.description,
            coordinator: Arc::clone(&self.coordinator),
            unique_id: self.unique_id.clone(),
            device: self.device.clone(),
            value: self.value,
        }
    }
}

impl<S: UsageSource> Sensor<S> {
    /// Creates a sensor reading through `coordinator`.
    pub fn new(
        description: SensorDescription,
        coordinator: Arc<PollCoordinator<S>>,
        device: DeviceInfo,
    ) -> Self {
        let value = match description.class {
            SensorClass::DataSize => coordinator.store().read(description.field),
            SensorClass::Date => Some(FieldValue::Date(NaiveDate::MIN)),
            SensorClass::Binary => Some(FieldValue::Flag(false)),
        };
        let unique_id = format!("{}.{}", description.identifier, device.identifiers.1);

        Self {
            description,
            coordinator,
            unique_id,
            device,
            value,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.description.name
    }

    /// Stable unique id, `<identifier>.<subscription id>`.
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Device this sensor belongs to.
    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }

    /// Current value.
    pub fn value(&self) -> Option<FieldValue> {
        self.value
    }

    /// On/off state of binary sensors.
    pub fn is_on(&self) -> Option<bool> {
        match self.value {
            Some(FieldValue::Flag(on)) => Some(on),
            _ => None,
        }
    }

    /// Native unit of measurement.
    pub fn unit_of_measurement(&self) -> Option<&'static str> {
        (self.description.class == SensorClass::DataSize).then_some(DATA_UNIT)
    }

    /// Suggested display unit.
    pub fn suggested_unit(&self) -> Option<&'static str> {
        (self.description.class == SensorClass::DataSize).then_some(SUGGESTED_DATA_UNIT)
    }

    /// Gives the coordinator a chance to poll, then refreshes the value.
    pub async fn update(&mut self) -> PollOutcome {
        let outcome = self.coordinator.maybe_update().await;
        self.refresh();
        trace!(sensor = %self.unique_id, ?outcome, value = ?self.value, "Sensor updated");
        outcome
    }

    /// Re-reads the store without polling.
    ///
    /// An absent field leaves the current value untouched.
    pub fn refresh(&mut self) {
        if let Some(value) = self.coordinator.store().read(self.description.field) {
            self.value = Some(value);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage_store::UsageStore;
    use std::sync::Mutex;
    use std::time::Duration;
    use tele2usage_core::{DataLimit, UsageError, UsageSnapshot};

    struct QueueSource(Mutex<Vec<Result<UsageSnapshot, UsageError>>>);

    impl UsageSource for QueueSource {
        async fn fetch_usage(&self) -> Result<UsageSnapshot, UsageError> {
            self.0.lock().unwrap().remove(0)
        }
    }

    fn identity() -> SubscriptionIdentity {
        SubscriptionIdentity {
            subscription_id: "4711".into(),
            subscription_model: "Fast 20GB".into(),
        }
    }

    fn snapshot(left: Option<f64>) -> UsageSnapshot {
        UsageSnapshot {
            data_limit: Some(DataLimit::Megabytes(20480.0)),
            data_used_mb: Some(1024.0),
            data_left_mb: left,
            period_start: NaiveDate::from_ymd_opt(2024, 5, 1),
            period_end: NaiveDate::from_ymd_opt(2024, 5, 31),
            ..UsageSnapshot::placeholder()
        }
    }

    fn coordinator(
        responses: Vec<Result<UsageSnapshot, UsageError>>,
    ) -> Arc<PollCoordinator<QueueSource>> {
        Arc::new(PollCoordinator::new(
            QueueSource(Mutex::new(responses)),
            UsageStore::new(),
            Duration::ZERO,
        ))
    }

    fn sensor(
        description: SensorDescription,
        coordinator: &Arc<PollCoordinator<QueueSource>>,
    ) -> Sensor<QueueSource> {
        Sensor::new(
            description,
            Arc::clone(coordinator),
            DeviceInfo::new("Tele2 Data", &identity()),
        )
    }

    #[test]
    fn test_unique_ids() {
        let coordinator = coordinator(vec![]);
        let ids: Vec<String> = SENSORS
            .iter()
            .map(|d| sensor(*d, &coordinator).unique_id().to_string())
            .collect();
        assert_eq!(ids[0], "tele2.dataleft.4711");
        assert_eq!(ids[5], "tele2.unlimiteddata.4711");
    }

    #[test]
    fn test_initial_values() {
        let coordinator = coordinator(vec![]);
        let data_left = sensor(SENSORS[0], &coordinator);
        let period_end = sensor(SENSORS[4], &coordinator);
        let unlimited = sensor(SENSORS[5], &coordinator);

        assert_eq!(data_left.value(), None);
        assert_eq!(period_end.value(), Some(FieldValue::Date(NaiveDate::MIN)));
        assert_eq!(unlimited.is_on(), Some(false));
    }

    #[test]
    fn test_units() {
        let coordinator = coordinator(vec![]);
        let data_used = sensor(SENSORS[1], &coordinator);
        let period_start = sensor(SENSORS[3], &coordinator);

        assert_eq!(data_used.unit_of_measurement(), Some("MB"));
        assert_eq!(data_used.suggested_unit(), Some("GB"));
        assert_eq!(period_start.unit_of_measurement(), None);
    }

    #[test]
    fn test_device_info() {
        let device = DeviceInfo::new("My phone", &identity());
        assert_eq!(device.identifiers, (DOMAIN.to_string(), "4711".to_string()));
        assert_eq!(device.manufacturer, "Tele2");
        assert_eq!(device.model, "Fast 20GB");
    }

    #[tokio::test]
    async fn test_update_reads_fresh_value() {
        let coordinator = coordinator(vec![Ok(snapshot(Some(19456.0)))]);
        let mut data_left = sensor(SENSORS[0], &coordinator);
        let mut period_start = sensor(SENSORS[3], &coordinator);

        assert_eq!(data_left.update().await, PollOutcome::Updated);
        assert_eq!(data_left.value(), Some(FieldValue::Megabytes(19456.0)));

        // Already polled; the second sensor only reads.
        coordinator.set_interval(Duration::from_secs(1800));
        assert!(!period_start.update().await.fetched());
        assert_eq!(
            period_start.value(),
            NaiveDate::from_ymd_opt(2024, 5, 1).map(FieldValue::Date)
        );
    }

    #[tokio::test]
    async fn test_absent_field_keeps_value() {
        let coordinator = coordinator(vec![Ok(snapshot(Some(500.0))), Ok(snapshot(None))]);
        let mut data_left = sensor(SENSORS[0], &coordinator);

        data_left.update().await;
        data_left.update().await;

        assert_eq!(data_left.value(), Some(FieldValue::Megabytes(500.0)));
        assert_eq!(coordinator.store().read(UsageField::DataLeft), None);
    }

    #[tokio::test]
    async fn test_failed_poll_keeps_value() {
        let coordinator = coordinator(vec![
            Ok(snapshot(Some(500.0))),
            Err(UsageError::Network("down".into())),
        ]);
        let mut data_used = sensor(SENSORS[1], &coordinator);

        data_used.update().await;
        let outcome = data_used.update().await;

        assert!(matches!(outcome, PollOutcome::Failed(_)));
        assert_eq!(data_used.value(), Some(FieldValue::Megabytes(1024.0)));
    }
}
