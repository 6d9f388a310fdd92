use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// A candidate analysis backend.
///
/// Descriptors are built once from configuration and never mutated. The
/// `url` is a base URL without a trailing slash; endpoint paths are appended
/// to it verbatim.
///
/// # Examples
///
/// ```
/// use paperscope::registry::BackendDescriptor;
///
/// let backend = BackendDescriptor::new("local", "http://localhost:8000", "Local", 1);
/// assert!(backend.enabled);
/// assert!(backend.is_local());
/// assert_eq!(backend.endpoint_url("/health"), "http://localhost:8000/health");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendDescriptor {
    /// Unique key (e.g., "local", "cloud")
    pub key: String,
    /// Base URL for API requests
    pub url: String,
    /// Human-readable name
    pub display_name: String,
    /// Selection priority (lower = prefer)
    pub priority: i32,
    /// Disabled backends are never selected
    pub enabled: bool,
}

impl BackendDescriptor {
    /// Create an enabled descriptor.
    pub fn new(
        key: impl Into<String>,
        url: impl Into<String>,
        display_name: impl Into<String>,
        priority: i32,
    ) -> Self {
        Self {
            key: key.into(),
            url: url.into(),
            display_name: display_name.into(),
            priority,
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Join an endpoint path onto the base URL.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.url, endpoint)
        } else {
            format!("{}/{}", self.url, endpoint)
        }
    }

    /// Whether the backend is hosted on a loopback address.
    ///
    /// Local development servers get shorter probe and request timeouts than
    /// remote deployments.
    pub fn is_local(&self) -> bool {
        let Ok(url) = reqwest::Url::parse(&self.url) else {
            return false;
        };
        let Some(host) = url.host_str() else {
            return false;
        };

        let host_lower = host.to_ascii_lowercase();
        if host_lower == "localhost" || host_lower.ends_with(".localhost") {
            return true;
        }

        host.trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .map(|ip| ip.is_loopback() || ip.is_unspecified())
            .unwrap_or(false)
    }
}
