//! Configuration for API requests.

use crate::registry::BackendDescriptor;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-attempt deadlines and credential lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Deadline for requests to loopback backends
    pub local_timeout_seconds: u64,
    /// Deadline for requests to remote backends
    pub remote_timeout_seconds: u64,
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
}

impl RequestConfig {
    pub fn timeout_for(&self, descriptor: &BackendDescriptor) -> Duration {
        if descriptor.is_local() {
            Duration::from_secs(self.local_timeout_seconds)
        } else {
            Duration::from_secs(self.remote_timeout_seconds)
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            local_timeout_seconds: 60,
            remote_timeout_seconds: 180,
            api_key_env: Some("PAPERSCOPE_API_KEY".to_string()),
        }
    }
}
