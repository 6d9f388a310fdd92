//! Backend configuration

use crate::registry::BackendDescriptor;
use serde::{Deserialize, Serialize};

/// One `[[backends]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub key: String,
    pub url: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_priority() -> i32 {
    50
}

fn default_enabled() -> bool {
    true
}

impl BackendConfig {
    pub fn new(key: impl Into<String>, url: impl Into<String>, priority: i32) -> Self {
        Self {
            key: key.into(),
            url: url.into(),
            display_name: None,
            priority,
            enabled: true,
        }
    }

    /// Descriptor for the registry. URL checks happen in `BackendRegistry::new`.
    pub fn to_descriptor(&self) -> BackendDescriptor {
        BackendDescriptor::new(
            self.key.clone(),
            self.url.clone(),
            self.display_name.clone().unwrap_or_default(),
            self.priority,
        )
        .with_enabled(self.enabled)
    }
}
