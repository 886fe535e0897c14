//! Error types for command resolution.

use thiserror::Error;

/// Raised when free text cannot be turned into a command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// No category rule matched and the fallback heuristic rejected the text.
    #[error("Could not resolve command")]
    Unresolvable {
        /// The input as given by the caller.
        input: String,
    },
}

impl ResolutionError {
    /// Create an error for the given input.
    pub fn unresolvable(input: impl Into<String>) -> Self {
        Self::Unresolvable {
            input: input.into(),
        }
    }

    /// The input that failed to resolve.
    pub fn input(&self) -> &str {
        match self {
            Self::Unresolvable { input } => input,
        }
    }
}

/// Result type for resolution.
pub type Result<T> = std::result::Result<T, ResolutionError>;
