//! Health probing for candidate backends.
//!
//! A probe is a single bounded `GET {url}/health`. It answers healthy or not
//! and never fails the caller.

mod config;
mod error;


pub use config::*;
pub use error::*;

use crate::registry::BackendDescriptor;
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Health check endpoint served by every backend.
pub const HEALTH_ENDPOINT: &str = "/health";

/// Checks whether a candidate backend is reachable.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Returns `true` iff the backend answered 2xx before `timeout`.
    async fn probe(&self, descriptor: &BackendDescriptor, timeout: Duration) -> bool;
}

/// Details of a successful probe.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub latency_ms: u64,
    /// Parsed body, when the backend returned JSON
    pub body: Option<serde_json::Value>,
}

/// Prober that issues real HTTP requests.
#[derive(Debug, Clone, Default)]
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a prober with a custom HTTP client (shares its connection pool).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Probe a backend and report why it failed, if it did.
    pub async fn check(
        &self,
        descriptor: &BackendDescriptor,
        timeout: Duration,
    ) -> Result<ProbeReport, ProbeError> {
        let url = descriptor.endpoint_url(HEALTH_ENDPOINT);
        let start = Instant::now();

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(e, timeout))?;

        let latency_ms = start.elapsed().as_millis() as u64;
        metrics::histogram!("paperscope_probe_latency_seconds",
            "backend" => descriptor.key.clone()
        )
        .record(latency_ms as f64 / 1000.0);

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::HttpError(status.as_u16()));
        }

        // The body is informational only; a 2xx with garbage is still healthy.
        let body = response.json::<serde_json::Value>().await.ok();

        Ok(ProbeReport { latency_ms, body })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, descriptor: &BackendDescriptor, timeout: Duration) -> bool {
        match self.check(descriptor, timeout).await {
            Ok(report) => {
                tracing::debug!(
                    backend = %descriptor.key,
                    latency_ms = report.latency_ms,
                    body = ?report.body,
                    "Backend healthy"
                );
                true
            }
            Err(error) => {
                tracing::debug!(
                    backend = %descriptor.key,
                    url = %descriptor.url,
                    error = %error,
                    "Backend unhealthy"
                );
                false
            }
        }
    }
}

/// Classify reqwest error into ProbeError.
fn classify_error(e: reqwest::Error, timeout: Duration) -> ProbeError {
    if e.is_timeout() {
        ProbeError::Timeout(timeout.as_millis() as u64)
    } else {
        ProbeError::ConnectionFailed(e.to_string())
    }
}
