//! Configuration for health probing.

use crate::registry::BackendDescriptor;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeouts for `GET /health` probes.
///
/// Loopback backends get the shorter timeout so an absent local dev server
/// is skipped quickly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Probe timeout for loopback backends
    pub local_timeout_ms: u64,
    /// Probe timeout for remote backends
    pub remote_timeout_ms: u64,
}

impl ProbeConfig {
    pub fn timeout_for(&self, descriptor: &BackendDescriptor) -> Duration {
        if descriptor.is_local() {
            Duration::from_millis(self.local_timeout_ms)
        } else {
            Duration::from_millis(self.remote_timeout_ms)
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            local_timeout_ms: 3_000,
            remote_timeout_ms: 10_000,
        }
    }
}
