//! Configuration module for paperscope
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`PAPERSCOPE_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use paperscope::config::PaperscopeConfig;
//!
//! let config = PaperscopeConfig::default();
//! assert_eq!(config.resolver.cache_duration_seconds, 300);
//!
//! let toml = r#"
//! [[backends]]
//! key = "cloud"
//! url = "https://api.example.com"
//! priority = 2
//! "#;
//! let config: PaperscopeConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.backends.len(), 1);
//! assert_eq!(config.failure.threshold, 3);
//! ```

pub mod backend;
pub mod error;
pub mod logging;
pub mod store;

pub use backend::BackendConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use store::StoreConfig;

pub use crate::executor::RequestConfig;
pub use crate::failure::FailureConfig;
pub use crate::health::ProbeConfig;
pub use crate::resolver::ResolverConfig;

use crate::clock::MAX_WINDOW_SECONDS;
use crate::registry::BackendRegistry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default backend when no `[[backends]]` are configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Unified configuration for the paperscope client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperscopeConfig {
    /// Candidate analysis backends
    pub backends: Vec<BackendConfig>,
    /// Probed-resolution cache
    pub resolver: ResolverConfig,
    /// Health probe timeouts
    pub probe: ProbeConfig,
    /// Request timeouts and credentials
    pub request: RequestConfig,
    /// Persistent-failure tracking
    pub failure: FailureConfig,
    /// Persistent state
    pub store: StoreConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for PaperscopeConfig {
    fn default() -> Self {
        let mut local = BackendConfig::new("local", DEFAULT_BACKEND_URL, 1);
        local.display_name = Some("Local".to_string());

        Self {
            backends: vec![local],
            resolver: ResolverConfig::default(),
            probe: ProbeConfig::default(),
            request: RequestConfig::default(),
            failure: FailureConfig::default(),
            store: StoreConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl PaperscopeConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports PAPERSCOPE_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(level) = std::env::var("PAPERSCOPE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("PAPERSCOPE_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(secs) = std::env::var("PAPERSCOPE_CACHE_DURATION") {
            if let Ok(s) = secs.parse() {
                self.resolver.cache_duration_seconds = s;
            }
        }
        if let Ok(threshold) = std::env::var("PAPERSCOPE_FAILURE_THRESHOLD") {
            if let Ok(t) = threshold.parse() {
                self.failure.threshold = t;
            }
        }
        if let Ok(secs) = std::env::var("PAPERSCOPE_REQUEST_TIMEOUT") {
            if let Ok(s) = secs.parse::<u64>() {
                self.request.local_timeout_seconds = s;
                self.request.remote_timeout_seconds = s;
            }
        }

        if let Ok(path) = std::env::var("PAPERSCOPE_STORE_PATH") {
            if !path.is_empty() {
                self.store.path = Some(PathBuf::from(path));
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, backend) in self.backends.iter().enumerate() {
            if backend.key.trim().is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("backends[{}].key", i),
                    message: "key cannot be empty".to_string(),
                });
            }
            if backend.url.is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("backends[{}].url", i),
                    message: "URL cannot be empty".to_string(),
                });
            }
        }

        if self.failure.threshold == 0 {
            return Err(ConfigError::Validation {
                field: "failure.threshold".to_string(),
                message: "threshold must be at least 1".to_string(),
            });
        }
        if self.resolver.cache_duration_seconds > MAX_WINDOW_SECONDS {
            return Err(ConfigError::Validation {
                field: "resolver.cache_duration_seconds".to_string(),
                message: format!("must be at most {} seconds", MAX_WINDOW_SECONDS),
            });
        }
        if self.failure.reset_window_seconds > MAX_WINDOW_SECONDS {
            return Err(ConfigError::Validation {
                field: "failure.reset_window_seconds".to_string(),
                message: format!("must be at most {} seconds", MAX_WINDOW_SECONDS),
            });
        }
        if self.probe.local_timeout_ms == 0 || self.probe.remote_timeout_ms == 0 {
            return Err(ConfigError::Validation {
                field: "probe".to_string(),
                message: "probe timeouts must be non-zero".to_string(),
            });
        }
        if self.request.local_timeout_seconds == 0 || self.request.remote_timeout_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "request".to_string(),
                message: "request timeouts must be non-zero".to_string(),
            });
        }

        Ok(())
    }

    /// Build the validated backend registry.
    pub fn registry(&self) -> Result<BackendRegistry, ConfigError> {
        let descriptors = self.backends.iter().map(BackendConfig::to_descriptor).collect();
        Ok(BackendRegistry::new(descriptors)?)
    }
}
