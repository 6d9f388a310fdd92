//! Error types for the analysis API client.

use crate::executor::RequestError;
use crate::store::StoreError;
use thiserror::Error;

/// Errors returned by `PaperscopeClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a usable response
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Backend answered with a non-2xx status
    #[error("backend returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Backend answered 2xx but reported an error in the body
    #[error("backend error: {0}")]
    Backend(String),

    /// Response body did not match the expected shape
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Analysis cache could not be read or written
    #[error("analysis cache error: {0}")]
    Cache(#[from] StoreError),
}

impl ApiError {
    /// HTTP status, for errors that carry one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
