use super::*;
use crate::clock::ManualClock;
use crate::store::MemoryStore;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct CountingNotifier {
    count: AtomicUsize,
}

impl UpdateNotifier for CountingNotifier {
    fn notify(&self, _notice: &UpdateNotice) -> Result<(), NotifyError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FailingNotifier;

impl UpdateNotifier for FailingNotifier {
    fn notify(&self, _notice: &UpdateNotice) -> Result<(), NotifyError> {
        Err(NotifyError::Delivery("popup closed".to_string()))
    }
}

fn config() -> FailureConfig {
    FailureConfig {
        threshold: 3,
        reset_window_seconds: 600,
    }
}

fn tracker(clock: Arc<ManualClock>, notifier: Arc<CountingNotifier>) -> FailureTracker {
    FailureTracker::new(config())
        .with_clock(clock)
        .with_notifier(notifier)
}

#[test]
fn test_config_defaults() {
    let config = FailureConfig::default();
    assert_eq!(config.threshold, 3);
    assert_eq!(config.reset_window_seconds, 1800);
}

#[test]
fn test_initial_status() {
    let status = FailureTracker::new(config()).status();
    assert_eq!(status.consecutive_failures, 0);
    assert!(status.last_failure_at.is_none());
    assert!(!status.threshold_notice_shown);
    assert!(!status.over_threshold);
}

#[test]
fn test_threshold_notifies_exactly_once() {
    let clock = Arc::new(ManualClock::new());
    let notifier = Arc::new(CountingNotifier::default());
    let tracker = tracker(clock.clone(), notifier.clone());

    tracker.record_failure();
    tracker.record_failure();
    assert!(!tracker.status().over_threshold);
    assert_eq!(notifier.count.load(Ordering::SeqCst), 0);

    let status = tracker.record_failure();
    assert!(status.over_threshold);
    assert!(status.threshold_notice_shown);
    assert_eq!(notifier.count.load(Ordering::SeqCst), 1);

    let status = tracker.record_failure();
    assert_eq!(status.consecutive_failures, 4);
    assert_eq!(notifier.count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_success_resets_everything() {
    let clock = Arc::new(ManualClock::new());
    let notifier = Arc::new(CountingNotifier::default());
    let tracker = tracker(clock.clone(), notifier.clone());

    for _ in 0..4 {
        clock.advance_secs(10);
        tracker.record_failure();
    }

    let status = tracker.record_success();
    assert_eq!(status.consecutive_failures, 0);
    assert!(status.last_failure_at.is_none());
    assert!(!status.threshold_notice_shown);
    assert!(!status.over_threshold);

    // A new run can notify again.
    for _ in 0..3 {
        tracker.record_failure();
    }
    assert_eq!(notifier.count.load(Ordering::SeqCst), 2);
}

#[test]
fn test_failure_after_reset_window_restarts_count() {
    let clock = Arc::new(ManualClock::new());
    let notifier = Arc::new(CountingNotifier::default());
    let tracker = tracker(clock.clone(), notifier.clone());

    tracker.record_failure();
    tracker.record_failure();
    assert_eq!(tracker.status().consecutive_failures, 2);

    clock.advance_secs(601);
    let status = tracker.record_failure();
    assert_eq!(status.consecutive_failures, 1);
    assert_eq!(status.last_failure_at, Some(clock.now()));
}

#[test]
fn test_failure_at_exact_window_edge_keeps_counting() {
    let clock = Arc::new(ManualClock::new());
    let tracker = tracker(clock.clone(), Arc::new(CountingNotifier::default()));

    tracker.record_failure();
    clock.advance_secs(600);
    assert_eq!(tracker.record_failure().consecutive_failures, 2);
}

#[test]
fn test_reset_window_clears_notice_flag() {
    let clock = Arc::new(ManualClock::new());
    let notifier = Arc::new(CountingNotifier::default());
    let tracker = tracker(clock.clone(), notifier.clone());

    for _ in 0..3 {
        tracker.record_failure();
    }
    assert_eq!(notifier.count.load(Ordering::SeqCst), 1);

    clock.advance_secs(700);
    let status = tracker.record_failure();
    assert!(!status.threshold_notice_shown);
    assert!(!status.over_threshold);

    tracker.record_failure();
    tracker.record_failure();
    assert_eq!(notifier.count.load(Ordering::SeqCst), 2);
}

#[test]
fn test_notifier_errors_are_swallowed() {
    let tracker = FailureTracker::new(FailureConfig {
        threshold: 1,
        reset_window_seconds: 600,
    })
    .with_notifier(Arc::new(FailingNotifier));

    let status = tracker.record_failure();
    assert!(status.over_threshold);
    assert!(status.threshold_notice_shown);
}

#[test]
fn test_broadcast_notifier_delivers() {
    let notifier = BroadcastNotifier::new(4);
    let mut rx = notifier.subscribe();

    let tracker = FailureTracker::new(FailureConfig {
        threshold: 2,
        reset_window_seconds: 600,
    })
    .with_notifier(Arc::new(notifier));

    tracker.record_failure();
    assert!(rx.try_recv().is_err());
    tracker.record_failure();

    let notice = rx.try_recv().unwrap();
    assert_eq!(notice.consecutive_failures, 2);
    assert_eq!(notice.threshold, 2);
}

#[test]
fn test_broadcast_notifier_without_listeners() {
    let notifier = BroadcastNotifier::new(1);
    let notice = UpdateNotice {
        consecutive_failures: 3,
        threshold: 3,
        raised_at: chrono::Utc::now(),
    };
    assert!(matches!(
        notifier.notify(&notice),
        Err(NotifyError::NoListeners)
    ));
}

#[test]
fn test_state_persists_and_restores() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new());

    let first = FailureTracker::new(config())
        .with_clock(clock.clone())
        .with_store(store.clone());
    first.record_failure();
    first.record_failure();

    clock.advance_secs(30);
    let second = FailureTracker::new(config())
        .with_clock(clock.clone())
        .with_store(store.clone());
    assert_eq!(second.status().consecutive_failures, 2);

    second.record_success();
    let third = FailureTracker::new(config())
        .with_clock(clock)
        .with_store(store);
    assert_eq!(third.status().consecutive_failures, 0);
}

#[test]
fn test_stale_persisted_state_is_ignored() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new());

    let first = FailureTracker::new(config())
        .with_clock(clock.clone())
        .with_store(store.clone());
    first.record_failure();

    clock.advance_secs(601);
    let second = FailureTracker::new(config())
        .with_clock(clock)
        .with_store(store);
    assert_eq!(second.status().consecutive_failures, 0);
}

#[test]
fn test_oversized_reset_window_keeps_counting() {
    let clock = Arc::new(ManualClock::new());
    let tracker = FailureTracker::new(FailureConfig {
        threshold: 3,
        reset_window_seconds: u64::MAX,
    })
    .with_clock(clock.clone());

    tracker.record_failure();
    clock.advance_secs(86_400);
    tracker.record_failure();

    assert_eq!(tracker.status().consecutive_failures, 2);
}
