//! Error types for the agent crate.

use thiserror::Error;

/// Errors that can occur while an agent processes a request.
#[derive(Error, Debug)]
pub enum AgentError {
    /// The agent did not finish within its configured timeout.
    #[error("{agent} timeout")]
    Timeout {
        /// Name of the agent that timed out.
        agent: String,
    },

    /// The request is missing or has malformed input. Shown to callers as-is.
    #[error("{0}")]
    InvalidInput(String),

    /// The requested operation is not offered by this agent.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Memory service call failed.
    #[error(transparent)]
    Memory(#[from] mnemo_memory::MemoryError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AgentError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;
    use mnemo_memory::MemoryError;

    #[test]
    fn test_error_display() {
        let err = AgentError::Timeout {
            agent: "execution".into(),
        };
        assert_eq!(err.to_string(), "execution timeout");

        let err = AgentError::invalid("Batch operations required");
        assert_eq!(err.to_string(), "Batch operations required");

        let err = AgentError::UnsupportedOperation("teleport".into());
        assert_eq!(err.to_string(), "unsupported operation: teleport");
    }

    #[test]
    fn test_memory_error_is_transparent() {
        let err: AgentError = MemoryError::missing("Memory ID required").into();
        assert_eq!(err.to_string(), "Memory ID required");
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: AgentError = json_err.into();
        assert!(matches!(err, AgentError::Serialization(_)));
    }
}
