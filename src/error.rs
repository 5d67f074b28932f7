use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriterError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Transport error: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("Upstream error: {0}")]
    UpstreamError(String),

    /// An explicit `{"error": ...}` frame from the backend
    #[error("{0}")]
    GenerationError(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Generation attempt {0} was cancelled")]
    Cancelled(u64),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl WriterError {
    /// Cancellation is a normal outcome of superseding an attempt, not a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WriterError::Cancelled(_))
    }
}

pub type Result<T> = std::result::Result<T, WriterError>;
