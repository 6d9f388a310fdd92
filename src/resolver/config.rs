//! Configuration for backend resolution.

use serde::{Deserialize, Serialize};

/// How long a probed resolution stays valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Seconds a probed backend is reused before re-probing
    pub cache_duration_seconds: u64,
}

impl ResolverConfig {
    pub fn cache_duration(&self) -> chrono::Duration {
        crate::clock::window(self.cache_duration_seconds)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_duration_seconds: 300,
        }
    }
}
