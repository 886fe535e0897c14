//! Error types for the orchestrator.

use mnemo_memory::MemoryError;
use thiserror::Error;

/// Orchestrator-specific errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// No command could be derived from the input.
    #[error(transparent)]
    Resolution(#[from] mnemo_core::ResolutionError),

    /// The dispatch table has no handler for the command's tool.
    #[error("Tool not found: {tool} (known tools: {})", .known.join(", "))]
    ToolNotFound {
        tool: String,
        /// Registered tool names, sorted.
        known: Vec<String>,
    },

    /// The handler ran and failed.
    #[error("{0}")]
    Execution(String),

    /// The command's arguments were rejected before any I/O.
    #[error("{0}")]
    InvalidArguments(String),
}

impl From<MemoryError> for OrchestratorError {
    fn from(err: MemoryError) -> Self {
        match err {
            MemoryError::MissingArgument(message) | MemoryError::InvalidArgument(message) => {
                Self::InvalidArguments(message)
            }
            other => Self::Execution(other.to_string()),
        }
    }
}

/// Result type for orchestrator operations.
pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[cfg(test)]
mod tests {
    use super::*;
    use mnemo_core::ResolutionError;

    #[test]
    fn test_tool_not_found_lists_known_tools() {
        let err = OrchestratorError::ToolNotFound {
            tool: "stripe".into(),
            known: vec!["memory".into(), "ui".into()],
        };
        assert_eq!(err.to_string(), "Tool not found: stripe (known tools: memory, ui)");
    }

    #[test]
    fn test_resolution_message() {
        let err: OrchestratorError = ResolutionError::unresolvable("?").into();
        assert_eq!(err.to_string(), "Could not resolve command");
    }

    #[test]
    fn test_memory_error_mapping() {
        let err: OrchestratorError = MemoryError::missing("Memory ID required").into();
        assert!(matches!(err, OrchestratorError::InvalidArguments(_)));
        assert_eq!(err.to_string(), "Memory ID required");

        let err: OrchestratorError = MemoryError::invalid("Unsupported HTTP method: TRACE").into();
        assert!(matches!(err, OrchestratorError::InvalidArguments(_)));

        let err: OrchestratorError = MemoryError::Status {
            status: 503,
            body: "down".into(),
        }
        .into();
        assert!(matches!(err, OrchestratorError::Execution(_)));
        assert!(err.to_string().contains("503"));
    }
}
