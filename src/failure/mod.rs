//! Persistent failure tracking.
//!
//! Counts consecutive request failures across calls. Repeated failures
//! usually mean the client is talking to a retired API surface, so crossing
//! the threshold raises a one-time "update required" notice instead of
//! retrying forever.

mod config;
mod notify;

#[cfg(test)]
mod tests;

pub use config::*;
pub use notify::*;

use crate::clock::{Clock, SystemClock};
use crate::store::{self, KeyValueStore, FAILURE_STATE_KEY};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// Mutable counter state. Persisted as-is when a store is attached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureState {
    pub consecutive_failures: u32,
    pub last_failure_at: Option<DateTime<Utc>>,
    pub threshold_notice_shown: bool,
}

/// Snapshot returned by `FailureTracker::status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureStatus {
    pub consecutive_failures: u32,
    pub last_failure_at: Option<DateTime<Utc>>,
    pub threshold_notice_shown: bool,
    pub over_threshold: bool,
}

/// Tracks consecutive failed requests.
///
/// # Examples
///
/// ```
/// use paperscope::failure::{FailureConfig, FailureTracker};
///
/// let tracker = FailureTracker::new(FailureConfig {
///     threshold: 2,
///     reset_window_seconds: 600,
/// });
///
/// tracker.record_failure();
/// assert!(!tracker.status().over_threshold);
/// tracker.record_failure();
/// assert!(tracker.status().over_threshold);
///
/// tracker.record_success();
/// assert_eq!(tracker.status().consecutive_failures, 0);
/// ```
pub struct FailureTracker {
    config: FailureConfig,
    state: Mutex<FailureState>,
    notifier: Arc<dyn UpdateNotifier>,
    clock: Arc<dyn Clock>,
    store: Option<Arc<dyn KeyValueStore>>,
}

impl FailureTracker {
    /// Create a tracker that logs the update notice.
    pub fn new(config: FailureConfig) -> Self {
        Self {
            config,
            state: Mutex::new(FailureState::default()),
            notifier: Arc::new(LogNotifier),
            clock: Arc::new(SystemClock),
            store: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn UpdateNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Persist the counter through `store` and restore any record whose last
    /// failure is still inside the reset window.
    ///
    /// Call after `with_clock` so the restore uses the right time source.
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        match store::get_typed::<FailureState>(store.as_ref(), FAILURE_STATE_KEY) {
            Ok(Some(persisted)) => {
                let within_window = persisted
                    .last_failure_at
                    .map(|at| self.clock.now() - at <= self.config.reset_window())
                    .unwrap_or(false);
                if within_window {
                    tracing::debug!(
                        consecutive_failures = persisted.consecutive_failures,
                        "Restored persisted failure state"
                    );
                    *self.lock_state() = persisted;
                }
            }
            Ok(None) => {}
            Err(e) => tracing::debug!(error = %e, "Failed to read persisted failure state"),
        }
        self.store = Some(store);
        self
    }

    /// A request succeeded: full reset.
    pub fn record_success(&self) -> FailureStatus {
        let snapshot = {
            let mut state = self.lock_state();
            if *state == FailureState::default() {
                return self.to_status(&state);
            }
            *state = FailureState::default();
            state.clone()
        };

        tracing::debug!("Failure counter reset after success");
        self.persist(&snapshot);
        self.to_status(&snapshot)
    }

    /// A request failed.
    ///
    /// A failure more than the reset window after the previous one counts as
    /// the first of a new run. Crossing the threshold notifies once per run.
    pub fn record_failure(&self) -> FailureStatus {
        let now = self.clock.now();

        let (snapshot, notice) = {
            let mut state = self.lock_state();

            if let Some(last) = state.last_failure_at {
                if now - last > self.config.reset_window() {
                    state.consecutive_failures = 0;
                    state.threshold_notice_shown = false;
                }
            }

            state.consecutive_failures = state.consecutive_failures.saturating_add(1);
            state.last_failure_at = Some(now);

            let notice = if state.consecutive_failures >= self.config.threshold
                && !state.threshold_notice_shown
            {
                state.threshold_notice_shown = true;
                Some(UpdateNotice {
                    consecutive_failures: state.consecutive_failures,
                    threshold: self.config.threshold,
                    raised_at: now,
                })
            } else {
                None
            };

            (state.clone(), notice)
        };

        tracing::debug!(
            consecutive_failures = snapshot.consecutive_failures,
            threshold = self.config.threshold,
            "Request failure recorded"
        );
        self.persist(&snapshot);

        if let Some(notice) = notice {
            metrics::counter!("paperscope_update_notices_total").increment(1);
            if let Err(e) = self.notifier.notify(&notice) {
                tracing::debug!(error = %e, "Update notice not delivered");
            }
        }

        self.to_status(&snapshot)
    }

    pub fn status(&self) -> FailureStatus {
        let state = self.lock_state();
        self.to_status(&state)
    }

    pub fn config(&self) -> &FailureConfig {
        &self.config
    }

    fn to_status(&self, state: &FailureState) -> FailureStatus {
        FailureStatus {
            consecutive_failures: state.consecutive_failures,
            last_failure_at: state.last_failure_at,
            threshold_notice_shown: state.threshold_notice_shown,
            over_threshold: state.consecutive_failures >= self.config.threshold,
        }
    }

    fn persist(&self, state: &FailureState) {
        if let Some(store) = &self.store {
            if let Err(e) = store::set_typed(store.as_ref(), FAILURE_STATE_KEY, state) {
                tracing::debug!(error = %e, "Failed to persist failure state");
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, FailureState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("Failure state lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}
