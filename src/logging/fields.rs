//! Field helpers for structured logging

/// Truncate backend-supplied text for log fields and error messages.
///
/// Cuts on a character boundary and appends `...` when shortened.
///
/// # Examples
///
/// ```
/// use paperscope::logging::truncate_text;
///
/// assert_eq!(truncate_text("short", 10), "short");
/// assert_eq!(truncate_text("abcdefghij", 4), "abcd...");
/// ```
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

/// Label for an HTTP status in metrics and logs
pub fn status_class(status: u16) -> &'static str {
    match status {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}
