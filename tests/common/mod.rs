//! Shared test utilities for paperscope integration tests.
//!
//! Provides mock backends and a fully wired executor stack so each test
//! file only describes the scenario it cares about.

#![allow(dead_code)]

use paperscope::executor::{CredentialStore, RequestConfig, RequestExecutor, StaticCredentials};
use paperscope::failure::{BroadcastNotifier, FailureConfig, FailureTracker};
use paperscope::health::{HttpProber, ProbeConfig};
use paperscope::registry::{BackendDescriptor, BackendRegistry};
use paperscope::resolver::{BackendResolver, ResolverConfig};
use paperscope::store::{KeyValueStore, MemoryStore};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Well-Known Test Constants
// =============================================================================

/// Probe deadline used by every test stack
pub const TEST_PROBE_TIMEOUT_MS: u64 = 500;

// =============================================================================
// Mock Backends
// =============================================================================

/// Start a mock backend whose `/health` answers with `status`.
pub async fn mock_backend(health_status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(health_status).set_body_json(serde_json::json!({"status": "ok"})),
        )
        .mount(&server)
        .await;
    server
}

/// Descriptor pointing at a mock server.
pub fn descriptor(key: &str, server: &MockServer, priority: i32) -> BackendDescriptor {
    BackendDescriptor::new(key, server.uri(), key, priority)
}

// =============================================================================
// Executor Stack
// =============================================================================

/// Everything a test may want to inspect after sending requests.
pub struct TestStack {
    pub executor: RequestExecutor,
    pub resolver: Arc<BackendResolver>,
    pub failures: Arc<FailureTracker>,
    pub notifier: Arc<BroadcastNotifier>,
    pub store: Arc<MemoryStore>,
}

/// Builder for [`TestStack`] with short timeouts.
pub struct StackBuilder {
    backends: Vec<BackendDescriptor>,
    credentials: Arc<dyn CredentialStore>,
    request: RequestConfig,
    failure: FailureConfig,
    store: Arc<MemoryStore>,
}

impl StackBuilder {
    pub fn new(backends: Vec<BackendDescriptor>) -> Self {
        Self {
            backends,
            credentials: Arc::new(StaticCredentials::none()),
            request: RequestConfig {
                local_timeout_seconds: 2,
                remote_timeout_seconds: 2,
                api_key_env: None,
            },
            failure: FailureConfig::default(),
            store: Arc::new(MemoryStore::new()),
        }
    }

    pub fn credentials(mut self, credentials: impl CredentialStore + 'static) -> Self {
        self.credentials = Arc::new(credentials);
        self
    }

    pub fn request_timeout_seconds(mut self, seconds: u64) -> Self {
        self.request.local_timeout_seconds = seconds;
        self.request.remote_timeout_seconds = seconds;
        self
    }

    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.failure.threshold = threshold;
        self
    }

    pub fn store(mut self, store: Arc<MemoryStore>) -> Self {
        self.store = store;
        self
    }

    pub fn build(self) -> TestStack {
        let registry = Arc::new(BackendRegistry::new(self.backends).unwrap());
        let store: Arc<dyn KeyValueStore> = self.store.clone();

        let resolver = Arc::new(
            BackendResolver::new(
                registry,
                Arc::new(HttpProber::new()),
                ProbeConfig {
                    local_timeout_ms: TEST_PROBE_TIMEOUT_MS,
                    remote_timeout_ms: TEST_PROBE_TIMEOUT_MS,
                },
                ResolverConfig::default(),
            )
            .with_store(store.clone()),
        );

        let notifier = Arc::new(BroadcastNotifier::new(8));
        let failures = Arc::new(
            FailureTracker::new(self.failure)
                .with_notifier(notifier.clone())
                .with_store(store),
        );

        let executor = RequestExecutor::new(
            resolver.clone(),
            failures.clone(),
            self.credentials,
            self.request,
        );

        TestStack {
            executor,
            resolver,
            failures,
            notifier,
            store: self.store,
        }
    }
}

/// Number of requests a mock server received for `route`.
pub async fn hits(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == route)
        .count()
}
