//! Error types for backend resolution.

use thiserror::Error;

/// Errors returned by `BackendResolver`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Every enabled candidate failed its probe, or none is enabled
    #[error("no backend available")]
    NoBackendAvailable,
}
