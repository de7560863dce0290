//! Poll coordinator.
//!
//! Decides on every call whether to hit the remote API, makes sure at most
//! one fetch per account is outstanding, and merges the result into the
//! account's [`UsageStore`].
//!
//! ## Cadence
//!
//! A fetch is allowed once the effective interval has elapsed since the last
//! poll. The effective interval is the configured one, divided by
//! [`DECREASE_FACTOR`] while data left is going down (an active session),
//! so the sensors track consumption closely and back off when usage is flat.
//! Failed polls consume a slot too; there is no retry beyond the interval.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tele2usage_core::{UsageErrorKind, UsageSource};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::usage_store::UsageStore;

/// Divisor applied to the poll interval while usage is decreasing.
pub const DECREASE_FACTOR: u32 = 4;

// ============================================================================
// Outcome & Status
// ============================================================================

/// What a [`PollCoordinator::maybe_update`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Another fetch was outstanding; nothing happened.
    InFlight,
    /// The effective interval has not elapsed yet.
    TooSoon {
        /// Time until the next poll is allowed.
        remaining: Duration,
    },
    /// A fetch succeeded and the store was replaced.
    Updated,
    /// A fetch failed; the error was recorded and old values kept.
    Failed(UsageErrorKind),
}

impl PollOutcome {
    /// Returns true if this call performed a fetch.
    pub fn fetched(&self) -> bool {
        matches!(self, Self::Updated | Self::Failed(_))
    }
}

/// Point-in-time view of the coordinator's poll state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollStatus {
    /// When the last fetch (successful or not) finished.
    pub last_poll_at: Option<Instant>,
    /// Whether a fetch is outstanding.
    pub in_flight: bool,
    /// Whether data left went down in the last comparable fetch.
    pub trend_decreasing: bool,
    /// Configured interval.
    pub interval: Duration,
    /// Interval currently applied by the gate.
    pub effective_interval: Duration,
}

#[derive(Debug)]
struct PollState {
    last_poll_at: Option<Instant>,
    trend_decreasing: bool,
    interval: Duration,
}

impl PollState {
    fn effective_interval(&self) -> Duration {
        if self.trend_decreasing {
            self.interval / DECREASE_FACTOR
        } else {
            self.interval
        }
    }
}

/// Clears the in-flight flag when dropped, including on cancellation.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ============================================================================
// Poll Coordinator
// ============================================================================

/// Owns one account's poll policy and is the only writer of its store.
///
/// Safe to call from any number of sensors; share it behind an `Arc`.
pub struct PollCoordinator<S: UsageSource> {
    source: S,
    store: UsageStore,
    in_flight: AtomicBool,
    state: Mutex<PollState>,
}

impl<S: UsageSource> PollCoordinator<S> {
    /// Creates a coordinator that has never polled.
    pub fn new(source: S, store: UsageStore, interval: Duration) -> Self {
        Self {
            source,
            store,
            in_flight: AtomicBool::new(false),
            state: Mutex::new(PollState {
                last_poll_at: None,
                trend_decreasing: false,
                interval,
            }),
        }
    }

    /// Returns the store this coordinator writes.
    pub fn store(&self) -> &UsageStore {
        &self.store
    }

    /// Returns the usage source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the configured interval.
    pub fn interval(&self) -> Duration {
        self.state().interval
    }

    /// Replaces the configured interval; takes effect on the next call.
    pub fn set_interval(&self, interval: Duration) {
        info!(interval_secs = interval.as_secs(), "Poll interval changed");
        self.state().interval = interval;
    }

    /// Returns the current poll state.
    pub fn status(&self) -> PollStatus {
        let state = self.state();
        PollStatus {
            last_poll_at: state.last_poll_at,
            in_flight: self.in_flight.load(Ordering::Acquire),
            trend_decreasing: state.trend_decreasing,
            interval: state.interval,
            effective_interval: state.effective_interval(),
        }
    }

    fn state(&self) -> MutexGuard<'_, PollState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(&self.in_flight))
    }

    /// Fetches fresh usage if no fetch is outstanding and the effective
    /// interval has elapsed; otherwise does nothing.
    ///
    /// Fetch errors never escape: they are recorded on the stored snapshot
    /// and every known value is kept.
    pub async fn maybe_update(&self) -> PollOutcome {
        // Claimed before the only suspension point below.
        let Some(_guard) = self.try_begin() else {
            debug!("Poll already in flight");
            return PollOutcome::InFlight;
        };

        {
            let state = self.state();
            if let Some(last) = state.last_poll_at {
                let elapsed = Instant::now().saturating_duration_since(last);
                let effective = state.effective_interval();
                if elapsed < effective {
                    return PollOutcome::TooSoon {
                        remaining: effective - elapsed,
                    };
                }
            }
        }

        debug!("Polling usage");
        let result = self.source.fetch_usage().await;

        let mut state = self.state();
        let previous = self.store.snapshot();
        let outcome = match result {
            Ok(snapshot) => {
                if let Some(decreasing) = snapshot.is_decreasing_from(&previous) {
                    state.trend_decreasing = decreasing;
                }
                debug!(
                    left_mb = ?snapshot.data_left_mb,
                    trend_decreasing = state.trend_decreasing,
                    "Usage updated"
                );
                self.store.replace(snapshot);
                PollOutcome::Updated
            }
            Err(e) => {
                warn!(error = %e, "Usage fetch failed, keeping previous values");
                self.store.replace(previous.with_error(e.kind()));
                PollOutcome::Failed(e.kind())
            }
        };
        state.last_poll_at = Some(Instant::now());
        outcome
    }
}

// ============================================================================
// Tests
// ============================================================================
