//! Agent response type.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome of one agent request.
///
/// Failures are values, not errors: `success` is false and `error` carries
/// the message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Map::is_empty", default)]
    pub metadata: Map<String, Value>,

    /// Agents suggested to continue the work.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub next_agents: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub confidence: Option<f32>,

    /// Wall-clock milliseconds, set by the managed wrapper.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub processing_time: Option<u64>,
}

impl AgentResponse {
    pub fn success(data: impl Into<Value>) -> Self {
        Self {
            success: true,
            data: Some(data.into()),
            ..Self::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Attach data to a response of either outcome.
    pub fn with_data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }

    pub fn with_next_agent(mut self, agent: impl Into<String>) -> Self {
        self.next_agents.push(agent.into());
        self
    }

    pub fn with_processing_time(mut self, elapsed: Duration) -> Self {
        self.processing_time = Some(elapsed.as_millis() as u64);
        self
    }

    /// The error message, or an empty string for successes.
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or_default()
    }
}
