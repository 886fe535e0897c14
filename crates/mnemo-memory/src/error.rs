//! Error types for memory service calls.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to the memory or embedding service.
#[derive(Error, Debug)]
pub enum MemoryError {
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("memory service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A required argument was absent. The message is shown to callers as-is.
    #[error("{0}")]
    MissingArgument(String),

    /// An argument was present but not acceptable. Shown to callers as-is.
    #[error("{0}")]
    InvalidArgument(String),

    /// The call did not settle within its timeout scope.
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Failed to generate embeddings.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to serialize/deserialize data.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MemoryError {
    pub fn missing(message: impl Into<String>) -> Self {
        Self::MissingArgument(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Whether this error came from a timeout scope expiring.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<reqwest::Error> for MemoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Result type alias for memory operations.
pub type Result<T> = std::result::Result<T, MemoryError>;
