//! Error types for request execution.

use std::fmt;
use thiserror::Error;

/// Why a request never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkFailure {
    /// The request exceeded its deadline and was aborted
    Timeout(u64),
    /// DNS resolution or TCP/TLS connection failed
    Connect(String),
    /// Any other transport failure (reset, truncated body, ...)
    Other(String),
}

impl fmt::Display for NetworkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkFailure::Timeout(_) => write!(f, "timeout"),
            NetworkFailure::Connect(msg) => write!(f, "connection failed: {}", msg),
            NetworkFailure::Other(msg) => write!(f, "{}", msg),
        }
    }
}

/// Errors returned by `RequestExecutor::send`.
///
/// A non-2xx response is not an error: it comes back as an `ApiResponse`
/// for the caller to inspect.
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    /// Timeout, abort, DNS or connection failure
    #[error("network error from backend '{backend}': {reason}")]
    Network {
        backend: String,
        reason: NetworkFailure,
    },

    /// No enabled backend is configured, or every candidate failed its probe
    #[error("no backend available")]
    NoBackendAvailable,

    /// The request could not be built (e.g., an invalid header)
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl RequestError {
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            RequestError::Network {
                reason: NetworkFailure::Timeout(_),
                ..
            }
        )
    }
}
