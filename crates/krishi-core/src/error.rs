use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Embedding backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Failed to load corpus from {path}: {reason}")]
    Corpus { path: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
