//! Output formatting helpers for CLI commands

use crate::api::{AnalysisRecord, AuthorAnalysis, PaperMarkdown};
use crate::registry::BackendDescriptor;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

/// View model for backend display
#[derive(Debug, Clone, serde::Serialize)]
pub struct BackendView {
    pub key: String,
    pub display_name: String,
    pub url: String,
    pub priority: i32,
    pub enabled: bool,
    pub local: bool,
}

impl From<&BackendDescriptor> for BackendView {
    fn from(backend: &BackendDescriptor) -> Self {
        Self {
            key: backend.key.clone(),
            display_name: backend.display_name.clone(),
            url: backend.url.clone(),
            priority: backend.priority,
            enabled: backend.enabled,
            local: backend.is_local(),
        }
    }
}

/// Result of probing one backend
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthView {
    pub key: String,
    pub url: String,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timeout_ms: u64,
}

/// Format backends as a table
pub fn format_backends_table(backends: &[BackendView]) -> String {
    if backends.is_empty() {
        return "No backends configured.".to_string();
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Key", "Name", "URL", "Priority", "Location", "Enabled"]);

    for b in backends {
        let enabled = if b.enabled {
            "yes".green().to_string()
        } else {
            "no".red().to_string()
        };
        let location = if b.local { "local" } else { "remote" };

        table.add_row(vec![
            Cell::new(&b.key),
            Cell::new(&b.display_name),
            Cell::new(&b.url),
            Cell::new(b.priority),
            Cell::new(location),
            Cell::new(enabled),
        ]);
    }

    table.to_string()
}

/// Format backends as JSON
pub fn format_backends_json(backends: &[BackendView]) -> String {
    pretty_json(&json!({ "backends": backends }))
}

/// Format probe results as a table, followed by the selected backend
pub fn format_health_table(results: &[HealthView], selected: Option<&str>) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["", "Key", "URL", "Status", "Latency", "Timeout"]);

    for r in results {
        let status = if r.healthy {
            "Healthy".green().to_string()
        } else {
            match &r.error {
                Some(error) => format!("{} ({})", "Unhealthy".red(), error),
                None => "Unhealthy".red().to_string(),
            }
        };
        let marker = if selected == Some(r.key.as_str()) {
            "→"
        } else {
            ""
        };

        table.add_row(vec![
            Cell::new(marker),
            Cell::new(&r.key),
            Cell::new(&r.url),
            Cell::new(status),
            Cell::new(
                r.latency_ms
                    .map(|ms| format!("{}ms", ms))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(format!("{}ms", r.timeout_ms)),
        ]);
    }

    let footer = match selected {
        Some(key) => format!("Selected backend: {}", key.bold()),
        None => "No backend available".red().to_string(),
    };

    format!("{}\n{}", table, footer)
}

/// Format probe results as JSON
pub fn format_health_json(results: &[HealthView], selected: Option<&str>) -> String {
    pretty_json(&json!({
        "selected": selected,
        "backends": results,
    }))
}

/// Human-readable analysis result
pub fn format_analysis(record: &AnalysisRecord) -> String {
    format!(
        "{}\n\n{}\n\n{}",
        record.title.bold(),
        record.summary,
        format!("(via {})", record.backend).dimmed()
    )
}

/// Author profiles as a table, aggregates listed above it
pub fn format_authors_table(analysis: &AuthorAnalysis) -> String {
    let mut lines = Vec::new();
    for (name, value) in &analysis.summary {
        lines.push(format!("{}: {}", name.bold(), display_value(value)));
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Author", "Affiliation", "h-index", "Citations"]);

    for author in &analysis.authors {
        table.add_row(vec![
            Cell::new(field(author, &["name"])),
            Cell::new(field(author, &["affiliation", "affiliations"])),
            Cell::new(field(author, &["h_index", "hIndex"])),
            Cell::new(field(author, &["citations", "citation_count"])),
        ]);
    }

    lines.push(table.to_string());
    lines.join("\n")
}

/// Markdown body with a one-line header of its statistics
pub fn format_markdown(markdown: &PaperMarkdown) -> String {
    let mut stats = Vec::new();
    if let Some(pages) = markdown.total_pages {
        stats.push(format!("{} pages", pages));
    }
    if let Some(sections) = markdown.sections_count {
        stats.push(format!("{} sections", sections));
    }
    if let Some(tables) = markdown.tables_count {
        stats.push(format!("{} tables", tables));
    }
    if let Some(figures) = markdown.figures_count {
        stats.push(format!("{} figures", figures));
    }

    let header = match (&markdown.title, stats.is_empty()) {
        (Some(title), false) => format!("<!-- {} | {} -->\n", title, stats.join(", ")),
        (Some(title), true) => format!("<!-- {} -->\n", title),
        (None, false) => format!("<!-- {} -->\n", stats.join(", ")),
        (None, true) => String::new(),
    };

    format!("{}{}", header, markdown.markdown_content)
}

pub fn pretty_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

/// First present key, rendered for a table cell.
fn field(value: &serde_json::Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| value.get(*key))
        .map(display_value)
        .unwrap_or_else(|| "-".to_string())
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "-".to_string(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
