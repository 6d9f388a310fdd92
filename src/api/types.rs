//! Request and response bodies of the analysis backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata scraped from a paper page or PDF.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperContent {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affiliations: Vec<String>,
    /// Page the metadata was scraped from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Backend-assigned paper identifier (e.g., for `/markdown/{id}`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_id: Option<String>,
    /// Extracted full text, when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
}

/// `POST /analyze` body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AnalyzeRequest<'a> {
    pub content: &'a PaperContent,
}

/// `POST /analyze` response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AnalyzeResponse {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /analyze-stream` body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeStreamRequest {
    pub content: PaperContent,
    pub model: String,
    #[serde(default)]
    pub user_scholar_url: String,
    #[serde(default)]
    pub research_interests: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_content: Option<String>,
    /// Provider keys, serialized as `<provider>_api_key` fields
    #[serde(flatten)]
    pub api_keys: BTreeMap<String, String>,
}

impl AnalyzeStreamRequest {
    pub fn new(content: PaperContent, model: impl Into<String>) -> Self {
        Self {
            content,
            model: model.into(),
            ..Default::default()
        }
    }

    /// Attach a provider key, e.g. `("openai", "sk-...")` → `openai_api_key`.
    pub fn with_provider_key(mut self, provider: &str, key: impl Into<String>) -> Self {
        self.api_keys
            .insert(format!("{}_api_key", provider.to_lowercase()), key.into());
        self
    }
}

/// Events returned by `POST /analyze-stream`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamAnalysis {
    pub events: Vec<serde_json::Value>,
}

impl StreamAnalysis {
    /// The last event, which carries the final result.
    pub fn final_event(&self) -> Option<&serde_json::Value> {
        self.events.last()
    }

    /// The most recent `summary` field found in any event.
    pub fn summary(&self) -> Option<&str> {
        self.events
            .iter()
            .rev()
            .find_map(|event| event.get("summary").and_then(|s| s.as_str()))
    }
}

/// Paper context sent alongside a chat message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatPaper {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    #[serde(rename = "paperContent", default)]
    pub paper_content: String,
    #[serde(default)]
    pub summary: String,
}

/// `POST /chat` body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub message: &'a str,
    pub paper: &'a ChatPaper,
}

/// `POST /chat` response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /analyze-authors` body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AuthorsRequest<'a> {
    pub authors: &'a [String],
    pub affiliations: &'a [String],
}

/// `POST /analyze-authors` response.
///
/// Aggregates and per-author profiles are passed through as JSON; the
/// backend owns their shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorAnalysis {
    #[serde(default)]
    pub summary: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub authors: Vec<serde_json::Value>,
}

/// `GET /markdown/{paper_id}` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperMarkdown {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub markdown_content: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub sections_count: Option<u32>,
    #[serde(default)]
    pub tables_count: Option<u32>,
    #[serde(default)]
    pub figures_count: Option<u32>,
}

/// PDF upload sent as multipart form to `POST /upload`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadRequest {
    /// Content hash of the PDF
    pub hash: String,
    /// Page the PDF came from
    pub url: String,
    /// Whether the backend should fetch the PDF itself
    pub fallback: bool,
    /// `(file name, bytes)` when the client holds the PDF
    pub file: Option<(String, Vec<u8>)>,
}

/// `GET /health` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub backend: String,
    pub body: serde_json::Value,
}

/// Last analysis of a page, as kept in the analysis cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub title: String,
    pub summary: String,
    pub url: Option<String>,
    pub paper_id: Option<String>,
    pub backend: String,
    pub analyzed_at: DateTime<Utc>,
}

/// Error payload returned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}
