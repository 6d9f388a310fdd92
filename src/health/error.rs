//! Error types for health probing.

use thiserror::Error;

/// Why a probe reported a backend as unhealthy.
///
/// Never surfaced by `Prober::probe`, which collapses every failure to
/// `false`; kept for logging and the CLI health report.
#[derive(Debug, Clone, Error)]
pub enum ProbeError {
    /// Request timeout
    #[error("request timeout after {0}ms")]
    Timeout(u64),

    /// Connection failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// HTTP error
    #[error("HTTP error: {0}")]
    HttpError(u16),
}
