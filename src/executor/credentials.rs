//! Bearer credential lookup.

use crate::store::KeyValueStore;
use std::sync::Arc;

/// Key under which a stored API key is kept.
pub const API_KEY_STORE_KEY: &str = "api_key";

/// Source of the API key attached as `Authorization: Bearer`.
pub trait CredentialStore: Send + Sync {
    /// The key, if one is configured. Blank keys are treated as absent.
    fn api_key(&self) -> Option<String>;
}

/// A fixed key (or none).
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials(Option<String>);

impl StaticCredentials {
    pub fn new(key: impl Into<String>) -> Self {
        Self(Some(key.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl CredentialStore for StaticCredentials {
    fn api_key(&self) -> Option<String> {
        non_blank(self.0.clone())
    }
}

/// Reads the key from an environment variable on every request.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialStore for EnvCredentials {
    fn api_key(&self) -> Option<String> {
        non_blank(std::env::var(&self.var).ok())
    }
}

/// Reads the key from the shared key-value store.
pub struct StoredCredentials {
    store: Arc<dyn KeyValueStore>,
}

impl StoredCredentials {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl CredentialStore for StoredCredentials {
    fn api_key(&self) -> Option<String> {
        match self.store.get(API_KEY_STORE_KEY) {
            Ok(Some(serde_json::Value::String(key))) => non_blank(Some(key)),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to read stored API key");
                None
            }
        }
    }
}

/// Tries each source in order.
pub struct ChainedCredentials {
    sources: Vec<Arc<dyn CredentialStore>>,
}

impl ChainedCredentials {
    pub fn new(sources: Vec<Arc<dyn CredentialStore>>) -> Self {
        Self { sources }
    }
}

impl CredentialStore for ChainedCredentials {
    fn api_key(&self) -> Option<String> {
        self.sources.iter().find_map(|source| source.api_key())
    }
}

fn non_blank(key: Option<String>) -> Option<String> {
    key.filter(|k| !k.trim().is_empty())
}
