//! Persistent store configuration

use crate::store::{JsonFileStore, KeyValueStore, MemoryStore};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Where resolver, failure and analysis state is kept between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file backing the store; in-memory only when unset
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn open(&self) -> Arc<dyn KeyValueStore> {
        match &self.path {
            Some(path) => Arc::new(JsonFileStore::new(path.clone())),
            None => Arc::new(MemoryStore::new()),
        }
    }
}
