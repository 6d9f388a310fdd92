//! Resilient request execution.
//!
//! Sends one logical API call to a resolved backend, classifies the outcome,
//! feeds the failure tracker and, in `Probed` mode, fails over to the next
//! untried candidate. The attempt count of a call never exceeds the number
//! of enabled backends.

mod config;
mod credentials;
mod error;
mod request;

pub use config::*;
pub use credentials::*;
pub use error::*;
pub use request::*;

use crate::failure::FailureTracker;
use crate::registry::BackendDescriptor;
use crate::resolver::{BackendResolver, ResolveMode};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Issues API requests against resolved backends.
pub struct RequestExecutor {
    client: reqwest::Client,
    resolver: Arc<BackendResolver>,
    failures: Arc<FailureTracker>,
    credentials: Arc<dyn CredentialStore>,
    config: RequestConfig,
}

impl RequestExecutor {
    pub fn new(
        resolver: Arc<BackendResolver>,
        failures: Arc<FailureTracker>,
        credentials: Arc<dyn CredentialStore>,
        config: RequestConfig,
    ) -> Self {
        Self::with_client(
            reqwest::Client::new(),
            resolver,
            failures,
            credentials,
            config,
        )
    }

    /// Create an executor with a custom HTTP client (shares its connection pool).
    pub fn with_client(
        client: reqwest::Client,
        resolver: Arc<BackendResolver>,
        failures: Arc<FailureTracker>,
        credentials: Arc<dyn CredentialStore>,
        config: RequestConfig,
    ) -> Self {
        Self {
            client,
            resolver,
            failures,
            credentials,
            config,
        }
    }

    pub fn resolver(&self) -> &Arc<BackendResolver> {
        &self.resolver
    }

    pub fn failures(&self) -> &Arc<FailureTracker> {
        &self.failures
    }

    /// Send `options` to `endpoint` on a backend chosen with `mode`.
    ///
    /// # Returns
    ///
    /// - `Ok(ApiResponse)` for any HTTP response, including non-2xx ones
    ///   once failover is exhausted
    /// - `Err(RequestError::NoBackendAvailable)` if resolution finds nothing
    /// - `Err(RequestError::Network)` if the last attempt never got a response
    pub async fn send(
        &self,
        endpoint: &str,
        options: RequestOptions,
        mode: ResolveMode,
    ) -> Result<ApiResponse, RequestError> {
        let request_id = crate::logging::generate_request_id();
        let span = tracing::info_span!(
            "api_request",
            request_id = %request_id,
            endpoint = %endpoint,
            mode = ?mode,
        );

        self.send_with_failover(endpoint, &options, mode)
            .instrument(span)
            .await
    }

    async fn send_with_failover(
        &self,
        endpoint: &str,
        options: &RequestOptions,
        mode: ResolveMode,
    ) -> Result<ApiResponse, RequestError> {
        let max_attempts = match mode {
            ResolveMode::Fast => 1,
            ResolveMode::Probed => self.resolver.registry().enabled_count().max(1) as u32,
        };

        let mut tried: Vec<String> = Vec::new();
        let mut last_outcome: Option<Result<ApiResponse, RequestError>> = None;

        for attempt in 1..=max_attempts {
            let resolved = if tried.is_empty() {
                self.resolver.resolve(mode).await
            } else {
                self.resolver.resolve_excluding(&tried).await
            };

            let backend = match resolved {
                Ok(backend) => backend,
                Err(_) => {
                    return match last_outcome {
                        Some(outcome) => {
                            tracing::warn!(attempt, "No further backend to fail over to");
                            outcome
                        }
                        None => Err(RequestError::NoBackendAvailable),
                    };
                }
            };
            tried.push(backend.key.clone());

            let outcome = self.attempt(&backend, endpoint, options, attempt).await;

            let done = match &outcome {
                Ok(response) if response.is_success() => {
                    metrics::counter!("paperscope_requests_total", "outcome" => "success")
                        .increment(1);
                    self.failures.record_success();
                    true
                }
                Ok(response) => {
                    metrics::counter!("paperscope_requests_total",
                        "outcome" => "http_error",
                        "status" => crate::logging::status_class(response.status.as_u16())
                    )
                    .increment(1);
                    tracing::warn!(
                        backend = %backend.key,
                        status = response.status.as_u16(),
                        attempt,
                        "Backend returned error status"
                    );
                    self.failures.record_failure();
                    false
                }
                // Not the backend's fault; another candidate would fail the same way.
                Err(RequestError::InvalidRequest(_)) => true,
                Err(error) => {
                    metrics::counter!("paperscope_requests_total", "outcome" => "network_error")
                        .increment(1);
                    tracing::warn!(
                        backend = %backend.key,
                        error = %error,
                        attempt,
                        "Request to backend failed"
                    );
                    self.failures.record_failure();
                    false
                }
            };

            if done || mode == ResolveMode::Fast {
                return outcome;
            }

            self.resolver.invalidate();
            if attempt < max_attempts {
                metrics::counter!("paperscope_failovers_total").increment(1);
            }
            last_outcome = Some(outcome);
        }

        last_outcome.unwrap_or(Err(RequestError::NoBackendAvailable))
    }

    async fn attempt(
        &self,
        backend: &BackendDescriptor,
        endpoint: &str,
        options: &RequestOptions,
        attempt: u32,
    ) -> Result<ApiResponse, RequestError> {
        let url = backend.endpoint_url(endpoint);
        let timeout = self.config.timeout_for(backend);
        let start = Instant::now();

        let mut request = self
            .client
            .request(options.method.clone(), &url)
            .headers(options.headers.clone())
            .timeout(timeout);

        if let Some(api_key) = self.credentials.api_key() {
            request = request.bearer_auth(api_key);
        }

        request = match &options.body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(value),
            RequestBody::Multipart(form) => request.multipart(form.to_form()),
        };

        tracing::debug!(
            backend = %backend.key,
            url = %url,
            timeout_ms = timeout.as_millis() as u64,
            attempt,
            "Sending request"
        );

        let response = request
            .send()
            .await
            .map_err(|e| classify_error(backend, e, timeout))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(backend, e, timeout))?
            .to_vec();

        tracing::debug!(
            backend = %backend.key,
            status = status.as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Response received"
        );

        Ok(ApiResponse {
            status,
            headers,
            body,
            backend: backend.clone(),
            attempt,
        })
    }
}

/// Classify reqwest error into RequestError.
fn classify_error(
    backend: &BackendDescriptor,
    e: reqwest::Error,
    timeout: Duration,
) -> RequestError {
    let reason = if e.is_timeout() {
        NetworkFailure::Timeout(timeout.as_millis() as u64)
    } else if e.is_connect() {
        NetworkFailure::Connect(e.to_string())
    } else if e.is_builder() {
        return RequestError::InvalidRequest(e.to_string());
    } else {
        NetworkFailure::Other(e.to_string())
    };

    RequestError::Network {
        backend: backend.key.clone(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_reason_displays_as_timeout() {
        let err = RequestError::Network {
            backend: "cloud".to_string(),
            reason: NetworkFailure::Timeout(180_000),
        };
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "network error from backend 'cloud': timeout");
    }

    #[test]
    fn test_connect_reason_is_not_timeout() {
        let err = RequestError::Network {
            backend: "local".to_string(),
            reason: NetworkFailure::Connect("refused".to_string()),
        };
        assert!(!err.is_timeout());
        assert!(err.to_string().contains("connection failed: refused"));
    }

    #[test]
    fn test_request_timeout_for_local_and_remote() {
        let config = RequestConfig::default();
        let local = BackendDescriptor::new("l", "http://127.0.0.1:8000", "L", 1);
        let remote = BackendDescriptor::new("r", "https://api.example.com", "R", 2);
        assert_eq!(config.timeout_for(&local), Duration::from_secs(60));
        assert_eq!(config.timeout_for(&remote), Duration::from_secs(180));
        assert!(config.timeout_for(&local) < config.timeout_for(&remote));
    }

    #[test]
    fn test_request_config_partial_toml() {
        let config: RequestConfig = toml::from_str("remote_timeout_seconds = 30").unwrap();
        assert_eq!(config.remote_timeout_seconds, 30);
        assert_eq!(config.local_timeout_seconds, 60);
        assert_eq!(config.api_key_env.as_deref(), Some("PAPERSCOPE_API_KEY"));
    }

    #[test]
    fn test_multipart_form_builder() {
        let form = MultipartForm::new()
            .text("hash", "abc")
            .file("file", "paper.pdf", vec![1, 2, 3]);
        assert_eq!(form.fields.len(), 2);
        assert_eq!(form.fields[0], ("hash".to_string(), FormValue::Text("abc".to_string())));
    }

    #[test]
    fn test_request_options_constructors() {
        assert_eq!(RequestOptions::get().method, reqwest::Method::GET);
        let post = RequestOptions::post_json(serde_json::json!({"a": 1}));
        assert_eq!(post.method, reqwest::Method::POST);
        assert_eq!(post.body, RequestBody::Json(serde_json::json!({"a": 1})));
    }
}
