//! Configuration for persistent failure tracking.

use serde::{Deserialize, Serialize};

/// When repeated request failures should prompt the user to update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailureConfig {
    /// Consecutive failures before the update notice fires
    pub threshold: u32,
    /// A failure this long after the previous one starts a fresh count
    pub reset_window_seconds: u64,
}

impl FailureConfig {
    pub fn reset_window(&self) -> chrono::Duration {
        crate::clock::window(self.reset_window_seconds)
    }
}

impl Default for FailureConfig {
    fn default() -> Self {
        Self {
            threshold: 3,
            reset_window_seconds: 1800,
        }
    }
}
