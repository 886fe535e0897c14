//! The envelope returned for every orchestrated input.

use chrono::{DateTime, Utc};
use mnemo_core::ParsedCommand;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

/// Per-call bookkeeping attached to every result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub request_id: Uuid,
    pub confidence: f32,
    pub started_at: DateTime<Utc>,
    /// Set when session context filled in a missing argument.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub context_applied: bool,
}

impl ResultMetadata {
    pub fn new(confidence: f32, started_at: DateTime<Utc>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            confidence,
            started_at,
            context_applied: false,
        }
    }
}

/// Outcome of one orchestration: always produced, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,

    /// The command that was (or would have been) dispatched.
    pub command: ParsedCommand,

    /// Wall-clock milliseconds, always reported.
    pub execution_time: u64,

    pub metadata: ResultMetadata,
}

impl OrchestratorResult {
    pub fn success(
        command: ParsedCommand,
        data: Value,
        elapsed: Duration,
        started_at: DateTime<Utc>,
    ) -> Self {
        let metadata = ResultMetadata::new(command.confidence, started_at);
        Self {
            success: true,
            data: Some(data),
            error: None,
            command,
            execution_time: elapsed.as_millis() as u64,
            metadata,
        }
    }

    pub fn failure(
        command: ParsedCommand,
        error: impl Into<String>,
        elapsed: Duration,
        started_at: DateTime<Utc>,
    ) -> Self {
        let metadata = ResultMetadata::new(command.confidence, started_at);
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            command,
            execution_time: elapsed.as_millis() as u64,
            metadata,
        }
    }

    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or_default()
    }

    /// A field of the returned data, if any.
    pub fn data_field(&self, key: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|d| d.get(key))
    }
}
