/// Errors raised while building the backend registry
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("backend already exists: {0}")]
    DuplicateBackend(String),

    #[error("backend key cannot be empty")]
    EmptyKey,

    #[error("invalid URL for backend '{key}': {message}")]
    InvalidUrl { key: String, message: String },
}
