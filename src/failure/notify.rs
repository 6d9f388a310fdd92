//! Delivery of the "update required" notice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

/// Raised once when consecutive failures reach the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateNotice {
    pub consecutive_failures: u32,
    pub threshold: u32,
    pub raised_at: DateTime<Utc>,
}

/// Notice delivery failure. Logged by the tracker, never propagated.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("no listener is subscribed to update notices")]
    NoListeners,

    #[error("notification failed: {0}")]
    Delivery(String),
}

/// Delivers update notices to the user-facing layer.
pub trait UpdateNotifier: Send + Sync {
    fn notify(&self, notice: &UpdateNotice) -> Result<(), NotifyError>;
}

/// Emits the notice as a warning log event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl UpdateNotifier for LogNotifier {
    fn notify(&self, notice: &UpdateNotice) -> Result<(), NotifyError> {
        tracing::warn!(
            consecutive_failures = notice.consecutive_failures,
            threshold = notice.threshold,
            "Backend requests keep failing; this client may be out of date. Please update paperscope."
        );
        Ok(())
    }
}

/// Publishes notices on a broadcast channel for UI surfaces to consume.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<UpdateNotice>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UpdateNotice> {
        self.sender.subscribe()
    }
}

impl UpdateNotifier for BroadcastNotifier {
    fn notify(&self, notice: &UpdateNotice) -> Result<(), NotifyError> {
        self.sender
            .send(notice.clone())
            .map(|_| ())
            .map_err(|_| NotifyError::NoListeners)
    }
}
