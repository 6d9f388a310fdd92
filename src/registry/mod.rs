//! Backend Registry module.
//!
//! Holds the static, validated list of candidate analysis backends and
//! answers the one question the resolver asks of it: which candidates are
//! eligible, and in what order.

mod backend;
mod error;
#[cfg(test)]
mod tests;

pub use backend::*;
pub use error::*;

use std::collections::HashSet;

/// The ordered set of configured backends.
///
/// Built once at startup. Construction validates every descriptor so a bad
/// configuration fails immediately rather than on the first request.
///
/// # Examples
///
/// ```
/// use paperscope::registry::{BackendDescriptor, BackendRegistry};
///
/// let registry = BackendRegistry::new(vec![
///     BackendDescriptor::new("cloud", "https://api.example.com/", "Cloud", 2),
///     BackendDescriptor::new("local", "http://localhost:8000", "Local", 1),
/// ])
/// .unwrap();
///
/// let enabled = registry.list_enabled();
/// assert_eq!(enabled[0].key, "local");
/// assert_eq!(enabled[1].url, "https://api.example.com");
/// ```
#[derive(Debug, Clone)]
pub struct BackendRegistry {
    backends: Vec<BackendDescriptor>,
}

impl BackendRegistry {
    /// Validate and store the descriptors in declaration order.
    ///
    /// # Errors
    ///
    /// - `RegistryError::EmptyKey` if a key is blank
    /// - `RegistryError::DuplicateBackend` if two descriptors share a key
    /// - `RegistryError::InvalidUrl` if a URL is not an absolute http(s) URL
    pub fn new(descriptors: Vec<BackendDescriptor>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        let mut backends = Vec::with_capacity(descriptors.len());

        for mut descriptor in descriptors {
            if descriptor.key.trim().is_empty() {
                return Err(RegistryError::EmptyKey);
            }
            if !seen.insert(descriptor.key.clone()) {
                return Err(RegistryError::DuplicateBackend(descriptor.key));
            }

            descriptor.url = normalize_url(&descriptor.key, &descriptor.url)?;
            if descriptor.display_name.is_empty() {
                descriptor.display_name = descriptor.key.clone();
            }

            backends.push(descriptor);
        }

        Ok(Self { backends })
    }

    /// Enabled descriptors, ascending by priority.
    ///
    /// Equal priorities keep their declaration order.
    pub fn list_enabled(&self) -> Vec<BackendDescriptor> {
        let mut enabled: Vec<BackendDescriptor> =
            self.backends.iter().filter(|b| b.enabled).cloned().collect();
        // sort_by_key is stable
        enabled.sort_by_key(|b| b.priority);
        enabled
    }

    /// All descriptors in declaration order, including disabled ones.
    pub fn list_all(&self) -> &[BackendDescriptor] {
        &self.backends
    }

    pub fn get(&self, key: &str) -> Option<&BackendDescriptor> {
        self.backends.iter().find(|b| b.key == key)
    }

    pub fn enabled_count(&self) -> usize {
        self.backends.iter().filter(|b| b.enabled).count()
    }

    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }
}

fn normalize_url(key: &str, raw: &str) -> Result<String, RegistryError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = reqwest::Url::parse(trimmed).map_err(|e| RegistryError::InvalidUrl {
        key: key.to_string(),
        message: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(RegistryError::InvalidUrl {
                key: key.to_string(),
                message: format!("unsupported scheme '{}'", other),
            })
        }
    }
    if parsed.host_str().is_none() {
        return Err(RegistryError::InvalidUrl {
            key: key.to_string(),
            message: "missing host".to_string(),
        });
    }

    Ok(trimmed.to_string())
}
