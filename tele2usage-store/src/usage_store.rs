//! Usage state store.
//!
//! Holds the single latest snapshot of one account. The poll coordinator is
//! the only writer; sensors and renderers read it.

use std::sync::Arc;
use tele2usage_core::{FieldValue, UsageField, UsageSnapshot};
use tokio::sync::watch;
use tracing::debug;

/// Latest usage snapshot of one account, observable via a watch channel.
///
/// Writes replace the whole snapshot, so a reader sees either the old or the
/// new snapshot, never a mix. Cloning shares the same state.
#[derive(Debug, Clone)]
pub struct UsageStore {
    tx: Arc<watch::Sender<Arc<UsageSnapshot>>>,
}

impl Default for UsageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageStore {
    /// Creates a store holding the placeholder snapshot.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(UsageSnapshot::placeholder()));
        Self { tx: Arc::new(tx) }
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Arc<UsageSnapshot> {
        Arc::clone(&self.tx.borrow())
    }

    /// Reads one field of the current snapshot.
    pub fn read(&self, field: UsageField) -> Option<FieldValue> {
        self.tx.borrow().get(field)
    }

    /// Replaces the snapshot and notifies subscribers.
    pub(crate) fn replace(&self, snapshot: UsageSnapshot) {
        debug!(
            has_data = snapshot.has_data(),
            error = ?snapshot.error,
            "Snapshot replaced"
        );
        self.tx.send_replace(Arc::new(snapshot));
    }

    /// Subscribes to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<UsageSnapshot>> {
        self.tx.subscribe()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tele2usage_core::{DataLimit, UsageErrorKind};

    fn reading(left: f64) -> UsageSnapshot {
        UsageSnapshot {
            data_limit: Some(DataLimit::Megabytes(1000.0)),
            data_used_mb: Some(1000.0 - left),
            data_left_mb: Some(left),
            ..UsageSnapshot::placeholder()
        }
    }

    #[test]
    fn test_new_store_holds_placeholder() {
        let store = UsageStore::new();
        assert!(!store.snapshot().has_data());
        assert_eq!(store.read(UsageField::DataLeft), None);
    }

    #[test]
    fn test_replace_is_visible_to_clones() {
        let store = UsageStore::new();
        let reader = store.clone();

        store.replace(reading(400.0));
        assert_eq!(reader.read(UsageField::DataLeft), Some(FieldValue::Megabytes(400.0)));
    }

    #[test]
    fn test_held_snapshot_is_not_mutated() {
        let store = UsageStore::new();
        store.replace(reading(400.0));
        let held = store.snapshot();

        store.replace(reading(300.0).with_error(UsageErrorKind::Network));

        assert_eq!(held.data_left_mb, Some(400.0));
        assert_eq!(held.error, None);
        assert_eq!(store.snapshot().data_left_mb, Some(300.0));
    }

    #[tokio::test]
    async fn test_subscribers_are_notified() {
        let store = UsageStore::new();
        let mut rx = store.subscribe();

        store.replace(reading(250.0));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().data_left_mb, Some(250.0));
    }
}
