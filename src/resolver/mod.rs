//! Backend resolution.
//!
//! Picks the backend an API call should go to. `Fast` resolution trusts the
//! registry's priority order without touching the network; `Probed`
//! resolution health-checks candidates in order and caches the first healthy
//! one for the configured duration.

mod config;
mod error;


pub use config::*;
pub use error::*;

use crate::clock::{Clock, SystemClock};
use crate::health::{ProbeConfig, Prober};
use crate::registry::{BackendDescriptor, BackendRegistry};
use crate::store::{self, KeyValueStore, BACKEND_CACHE_KEY};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Resolution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    /// Highest-priority enabled backend, no health probe
    Fast,
    /// First backend in priority order that passes a health probe
    Probed,
}

/// A probed backend together with when it was selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedBackend {
    pub descriptor: BackendDescriptor,
    pub resolved_at: DateTime<Utc>,
}

/// Shape of the shared read-through cache entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedBackend {
    key: String,
    url: String,
    resolved_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// Selects backends for API calls.
pub struct BackendResolver {
    registry: Arc<BackendRegistry>,
    prober: Arc<dyn Prober>,
    probe_config: ProbeConfig,
    config: ResolverConfig,
    clock: Arc<dyn Clock>,
    store: Option<Arc<dyn KeyValueStore>>,
    cached: RwLock<Option<ResolvedBackend>>,
    /// Serialises cold-cache probe sequences
    probe_gate: tokio::sync::Mutex<()>,
}

impl BackendResolver {
    pub fn new(
        registry: Arc<BackendRegistry>,
        prober: Arc<dyn Prober>,
        probe_config: ProbeConfig,
        config: ResolverConfig,
    ) -> Self {
        Self {
            registry,
            prober,
            probe_config,
            config,
            clock: Arc::new(SystemClock),
            store: None,
            cached: RwLock::new(None),
            probe_gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Share resolutions with other processes through a persisted store.
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Resolve a backend using the given strategy.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::NoBackendAvailable` if no enabled backend
    /// exists or, in `Probed` mode, none passes its probe. Callers treat this
    /// as terminal for the current operation.
    pub async fn resolve(&self, mode: ResolveMode) -> Result<BackendDescriptor, ResolveError> {
        let result = match mode {
            ResolveMode::Fast => self
                .registry
                .list_enabled()
                .into_iter()
                .next()
                .ok_or(ResolveError::NoBackendAvailable),
            ResolveMode::Probed => self.resolve_excluding(&[]).await,
        };

        let outcome = if result.is_ok() { "resolved" } else { "none" };
        let mode_label = match mode {
            ResolveMode::Fast => "fast",
            ResolveMode::Probed => "probed",
        };
        metrics::counter!("paperscope_resolutions_total",
            "mode" => mode_label,
            "outcome" => outcome
        )
        .increment(1);

        result
    }

    /// Probed resolution that skips the given backend keys.
    ///
    /// Used by the request executor to fail over to candidates the current
    /// call has not tried yet.
    pub async fn resolve_excluding(
        &self,
        excluded: &[String],
    ) -> Result<BackendDescriptor, ResolveError> {
        if let Some(hit) = self.fresh_cached(excluded) {
            return Ok(hit);
        }

        let candidates: Vec<BackendDescriptor> = self
            .registry
            .list_enabled()
            .into_iter()
            .filter(|b| !excluded.contains(&b.key))
            .collect();
        if candidates.is_empty() {
            return Err(ResolveError::NoBackendAvailable);
        }

        let _gate = self.probe_gate.lock().await;

        // Another task may have finished probing while we waited.
        if let Some(hit) = self.fresh_cached(excluded) {
            return Ok(hit);
        }
        if let Some(hit) = self.adopt_persisted(excluded) {
            return Ok(hit);
        }

        for candidate in candidates {
            let timeout = self.probe_config.timeout_for(&candidate);
            if self.prober.probe(&candidate, timeout).await {
                tracing::info!(
                    backend = %candidate.key,
                    url = %candidate.url,
                    "Selected backend"
                );
                self.store_resolution(candidate.clone());
                return Ok(candidate);
            }
            tracing::debug!(backend = %candidate.key, "Skipping unhealthy backend");
        }

        tracing::warn!(excluded = excluded.len(), "No healthy backend available");
        Err(ResolveError::NoBackendAvailable)
    }

    /// Drop the cached resolution so the next probed call re-probes.
    pub fn invalidate(&self) {
        *self.write_cache() = None;

        if let Some(store) = &self.store {
            if let Err(e) = store.remove(BACKEND_CACHE_KEY) {
                tracing::debug!(error = %e, "Failed to clear persisted backend cache");
            }
        }
        tracing::debug!("Backend cache invalidated");
    }

    /// The cached resolution, fresh or stale.
    pub fn current(&self) -> Option<ResolvedBackend> {
        self.read_cache().clone()
    }

    fn is_fresh(&self, resolved_at: DateTime<Utc>) -> bool {
        self.clock.now() - resolved_at < self.config.cache_duration()
    }

    fn fresh_cached(&self, excluded: &[String]) -> Option<BackendDescriptor> {
        let cached = self.read_cache();
        let resolved = cached.as_ref()?;
        if self.is_fresh(resolved.resolved_at) && !excluded.contains(&resolved.descriptor.key) {
            Some(resolved.descriptor.clone())
        } else {
            None
        }
    }

    fn adopt_persisted(&self, excluded: &[String]) -> Option<BackendDescriptor> {
        let store = self.store.as_ref()?;
        let persisted: PersistedBackend =
            match store::get_typed(store.as_ref(), BACKEND_CACHE_KEY) {
                Ok(entry) => entry?,
                Err(e) => {
                    tracing::debug!(error = %e, "Failed to read persisted backend cache");
                    return None;
                }
            };

        if self.clock.now() >= persisted.expires_at || excluded.contains(&persisted.key) {
            return None;
        }

        let descriptor = self
            .registry
            .get(&persisted.key)
            .filter(|b| b.enabled && b.url == persisted.url)?
            .clone();

        tracing::debug!(backend = %descriptor.key, "Adopted persisted backend selection");
        *self.write_cache() = Some(ResolvedBackend {
            descriptor: descriptor.clone(),
            resolved_at: persisted.resolved_at,
        });
        Some(descriptor)
    }

    fn store_resolution(&self, descriptor: BackendDescriptor) {
        let resolved_at = self.clock.now();

        if let Some(store) = &self.store {
            let entry = PersistedBackend {
                key: descriptor.key.clone(),
                url: descriptor.url.clone(),
                resolved_at,
                expires_at: resolved_at + self.config.cache_duration(),
            };
            if let Err(e) = store::set_typed(store.as_ref(), BACKEND_CACHE_KEY, &entry) {
                tracing::debug!(error = %e, "Failed to persist backend cache");
            }
        }

        *self.write_cache() = Some(ResolvedBackend {
            descriptor,
            resolved_at,
        });
    }

    fn read_cache(&self) -> std::sync::RwLockReadGuard<'_, Option<ResolvedBackend>> {
        match self.cached.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("Backend cache lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write_cache(&self) -> std::sync::RwLockWriteGuard<'_, Option<ResolvedBackend>> {
        match self.cached.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("Backend cache lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}
