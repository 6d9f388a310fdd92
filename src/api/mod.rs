//! Typed client for the paper analysis backend.
//!
//! Every call goes through [`RequestExecutor`], so backend selection,
//! failover and failure tracking apply uniformly. Bodies are decoded here
//! and non-2xx responses become [`ApiError::Http`].

mod cache;
mod error;
pub mod types;

pub use cache::AnalysisCache;
pub use error::ApiError;
pub use types::*;

use crate::config::{ConfigError, PaperscopeConfig};
use crate::executor::{
    ApiResponse, ChainedCredentials, CredentialStore, EnvCredentials, MultipartForm,
    RequestError, RequestExecutor, RequestOptions, StoredCredentials,
};
use crate::failure::{FailureStatus, FailureTracker, LogNotifier, UpdateNotifier};
use crate::health::{HttpProber, HEALTH_ENDPOINT};
use crate::logging::truncate_text;
use crate::resolver::{BackendResolver, ResolveMode, ResolvedBackend};
use crate::store::KeyValueStore;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Longest backend error message carried into an `ApiError`.
const MAX_ERROR_MESSAGE_CHARS: usize = 500;

/// Resolution and failure state at a glance.
#[derive(Debug, Clone, Serialize)]
pub struct ClientStatus {
    pub mode: ResolveMode,
    pub current: Option<ResolvedBackend>,
    pub failures: FailureStatus,
}

/// Client for `/analyze`, `/chat` and the other backend endpoints.
#[derive(Clone)]
pub struct PaperscopeClient {
    executor: Arc<RequestExecutor>,
    cache: Option<AnalysisCache>,
    mode: ResolveMode,
}

impl PaperscopeClient {
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self {
            executor,
            cache: None,
            mode: ResolveMode::Probed,
        }
    }

    /// Wire up registry, resolver, failure tracker and store from configuration.
    ///
    /// Threshold notices go to the log unless `notifier` is given.
    pub fn from_config(
        config: &PaperscopeConfig,
        notifier: Option<Arc<dyn UpdateNotifier>>,
    ) -> Result<Self, ConfigError> {
        let registry = Arc::new(config.registry()?);
        let store = config.store.open();

        let resolver = BackendResolver::new(
            registry,
            Arc::new(HttpProber::new()),
            config.probe.clone(),
            config.resolver.clone(),
        )
        .with_store(store.clone());

        let failures = FailureTracker::new(config.failure.clone())
            .with_notifier(notifier.unwrap_or_else(|| Arc::new(LogNotifier)))
            .with_store(store.clone());

        let executor = RequestExecutor::new(
            Arc::new(resolver),
            Arc::new(failures),
            credentials_for(config, store.clone()),
            config.request.clone(),
        );

        Ok(Self::new(Arc::new(executor)).with_cache(AnalysisCache::new(store)))
    }

    pub fn with_mode(mut self, mode: ResolveMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_cache(mut self, cache: AnalysisCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn mode(&self) -> ResolveMode {
        self.mode
    }

    pub fn executor(&self) -> &Arc<RequestExecutor> {
        &self.executor
    }

    pub fn cache(&self) -> Option<&AnalysisCache> {
        self.cache.as_ref()
    }

    pub fn status(&self) -> ClientStatus {
        ClientStatus {
            mode: self.mode,
            current: self.executor.resolver().current(),
            failures: self.executor.failures().status(),
        }
    }

    /// `GET /health` on the backend selected by the client's mode.
    pub async fn health(&self) -> Result<HealthReport, ApiError> {
        let response = self.send(HEALTH_ENDPOINT, RequestOptions::get()).await?;
        let response = ensure_success(response)?;
        let body = if response.body.is_empty() {
            serde_json::Value::Null
        } else {
            decode(&response)?
        };

        Ok(HealthReport {
            backend: response.backend.key,
            body,
        })
    }

    /// Summarize a paper. The result is recorded in the analysis cache.
    pub async fn analyze(&self, content: &PaperContent) -> Result<AnalysisRecord, ApiError> {
        let body = to_json(&AnalyzeRequest { content })?;
        let response = self.send("/analyze", RequestOptions::post_json(body)).await?;
        let response = ensure_success(response)?;
        let parsed: AnalyzeResponse = decode(&response)?;

        if let Some(error) = parsed.error {
            return Err(ApiError::Backend(error));
        }
        let summary = parsed
            .summary
            .ok_or_else(|| ApiError::Decode("response has neither summary nor error".to_string()))?;

        let record = AnalysisRecord {
            title: content.title.clone(),
            summary,
            url: content.url.clone(),
            paper_id: content.paper_id.clone(),
            backend: response.backend.key.clone(),
            analyzed_at: Utc::now(),
        };

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.record(&record) {
                tracing::warn!(error = %e, "Failed to cache analysis");
            }
        }

        Ok(record)
    }

    /// Run the streaming analysis and collect every event.
    pub async fn analyze_stream(
        &self,
        request: &AnalyzeStreamRequest,
    ) -> Result<StreamAnalysis, ApiError> {
        let body = to_json(request)?;
        let response = self.send("/analyze-stream", RequestOptions::post_json(body)).await?;
        let response = ensure_success(response)?;

        let events = parse_events(&response.text())?;
        if let Some(error) = events
            .iter()
            .find_map(|event| event.get("error").and_then(|e| e.as_str()))
        {
            return Err(ApiError::Backend(error.to_string()));
        }

        tracing::debug!(events = events.len(), "Stream analysis complete");
        Ok(StreamAnalysis { events })
    }

    /// Ask a question about a paper.
    pub async fn chat(&self, message: &str, paper: &ChatPaper) -> Result<String, ApiError> {
        let body = to_json(&ChatRequest { message, paper })?;
        let response = self.send("/chat", RequestOptions::post_json(body)).await?;
        let response = ensure_success(response)?;
        let parsed: ChatResponse = decode(&response)?;

        match (parsed.response, parsed.error) {
            (_, Some(error)) => Err(ApiError::Backend(error)),
            (Some(reply), None) => Ok(reply),
            (None, None) => Err(ApiError::Decode(
                "response has neither response nor error".to_string(),
            )),
        }
    }

    /// Profile the authors of a paper.
    pub async fn analyze_authors(
        &self,
        authors: &[String],
        affiliations: &[String],
    ) -> Result<AuthorAnalysis, ApiError> {
        let body = to_json(&AuthorsRequest {
            authors,
            affiliations,
        })?;
        let response = self.send("/analyze-authors", RequestOptions::post_json(body)).await?;
        let response = ensure_success(response)?;

        if let Ok(types::ErrorBody {
            error: Some(error), ..
        }) = response.json::<types::ErrorBody>()
        {
            return Err(ApiError::Backend(error));
        }
        decode(&response)
    }

    /// Extracted markdown for a previously uploaded paper, or `None` if the
    /// backend does not know it.
    pub async fn markdown(&self, paper_id: &str) -> Result<Option<PaperMarkdown>, ApiError> {
        let endpoint = markdown_endpoint(paper_id)?;
        let response = self.send(&endpoint, RequestOptions::get()).await?;

        if response.status == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(paper_id, "No markdown for paper");
            return Ok(None);
        }
        let response = ensure_success(response)?;
        decode(&response).map(Some)
    }

    /// Hand a PDF to the backend for later processing.
    ///
    /// Failures are logged and otherwise ignored; callers never wait on the
    /// backend's verdict.
    pub async fn upload(&self, request: &UploadRequest) {
        let mut form = MultipartForm::new()
            .text("hash", request.hash.clone())
            .text("url", request.url.clone())
            .text("fallback", request.fallback.to_string());
        if let Some((file_name, bytes)) = &request.file {
            form = form.file("file", file_name.clone(), bytes.clone());
        }

        match self
            .send("/upload", RequestOptions::post_multipart(form))
            .await
        {
            Ok(response) if response.is_success() => {
                tracing::debug!(
                    hash = %request.hash,
                    backend = %response.backend.key,
                    "Upload accepted"
                );
            }
            Ok(response) => {
                tracing::warn!(
                    hash = %request.hash,
                    status = response.status.as_u16(),
                    "Upload rejected"
                );
            }
            Err(e) => {
                tracing::warn!(hash = %request.hash, error = %e, "Upload failed");
            }
        }
    }

    /// Run [`upload`](Self::upload) on a background task.
    pub fn spawn_upload(&self, request: UploadRequest) -> tokio::task::JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move { client.upload(&request).await })
    }

    async fn send(&self, endpoint: &str, options: RequestOptions) -> Result<ApiResponse, ApiError> {
        Ok(self.executor.send(endpoint, options, self.mode).await?)
    }
}

/// Environment key first, then a key saved in the store.
fn credentials_for(
    config: &PaperscopeConfig,
    store: Arc<dyn KeyValueStore>,
) -> Arc<dyn CredentialStore> {
    let mut sources: Vec<Arc<dyn CredentialStore>> = Vec::new();
    if let Some(var) = &config.request.api_key_env {
        sources.push(Arc::new(EnvCredentials::new(var.clone())));
    }
    sources.push(Arc::new(StoredCredentials::new(store)));
    Arc::new(ChainedCredentials::new(sources))
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

fn decode<T: DeserializeOwned>(response: &ApiResponse) -> Result<T, ApiError> {
    response.json().map_err(|e| ApiError::Decode(e.to_string()))
}

/// Turn a non-2xx response into `ApiError::Http`, preferring the backend's
/// own error message over the raw body.
fn ensure_success(response: ApiResponse) -> Result<ApiResponse, ApiError> {
    if response.is_success() {
        return Ok(response);
    }

    let message = match response.json::<types::ErrorBody>() {
        Ok(types::ErrorBody {
            error: Some(message),
            ..
        })
        | Ok(types::ErrorBody {
            detail: Some(message),
            ..
        }) => message,
        _ => truncate_text(&response.text(), MAX_ERROR_MESSAGE_CHARS),
    };

    Err(ApiError::Http {
        status: response.status.as_u16(),
        message,
    })
}

/// Parse a stream response: one JSON document, or SSE `data:` lines, or
/// newline-delimited JSON.
fn parse_events(text: &str) -> Result<Vec<serde_json::Value>, ApiError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return Ok(match value {
            serde_json::Value::Array(events) => events,
            other => vec![other],
        });
    }

    let mut events = Vec::new();
    for line in trimmed.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let payload = match line.strip_prefix("data:") {
            Some(data) => data.trim(),
            // Other SSE fields (event:, id:, retry:)
            None if is_sse_field(line) => continue,
            None => line,
        };
        if payload.is_empty() || payload == "[DONE]" {
            continue;
        }
        let event = serde_json::from_str(payload).map_err(|e| {
            ApiError::Decode(format!(
                "invalid stream event '{}': {}",
                truncate_text(payload, 80),
                e
            ))
        })?;
        events.push(event);
    }

    Ok(events)
}

/// `/markdown/{id}` with the id encoded as a single path segment.
fn markdown_endpoint(paper_id: &str) -> Result<String, ApiError> {
    let mut url = reqwest::Url::parse("http://backend/markdown")
        .map_err(|e| RequestError::InvalidRequest(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| RequestError::InvalidRequest("cannot build markdown path".to_string()))?
        .push(paper_id);
    Ok(url.path().to_string())
}

fn is_sse_field(line: &str) -> bool {
    ["event:", "id:", "retry:"]
        .iter()
        .any(|prefix| line.starts_with(prefix))
}
