//! Agent request type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::AgentContext;

/// Caller-declared urgency of a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

/// A unit of work for an agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentRequest {
    /// Free-text input.
    pub input: String,

    #[serde(default)]
    pub context: AgentContext,

    /// Structured parameters, e.g. `operation`, `id`, `texts`.
    #[serde(skip_serializing_if = "Map::is_empty", default)]
    pub parameters: Map<String, Value>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub urgency: Option<Urgency>,
}

impl AgentRequest {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    pub fn with_context(mut self, context: AgentContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Merge parameters, overriding existing keys.
    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = Some(urgency);
        self
    }

    pub fn parameter(&self, key: &str) -> Option<&Value> {
        self.parameters.get(key)
    }

    /// A string parameter, trimmed, ignoring blanks.
    pub fn parameter_str(&self, key: &str) -> Option<&str> {
        self.parameters
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The explicit `operation` parameter.
    pub fn operation(&self) -> Option<&str> {
        self.parameter_str("operation")
    }

    pub fn user_id(&self) -> Option<&str> {
        self.context.user_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parameters() {
        let request = AgentRequest::new("delete it")
            .with_parameter("operation", "delete")
            .with_parameter("id", "m-1")
            .with_parameter("blank", "  ");

        assert_eq!(request.operation(), Some("delete"));
        assert_eq!(request.parameter_str("id"), Some("m-1"));
        assert_eq!(request.parameter_str("blank"), None);
        assert_eq!(request.parameter("missing"), None);
    }

    #[test]
    fn test_deserialize_minimal() {
        let request: AgentRequest = serde_json::from_value(json!({"input": "hi"})).unwrap();
        assert_eq!(request.input, "hi");
        assert!(request.parameters.is_empty());
        assert!(request.urgency.is_none());
    }

    #[test]
    fn test_urgency_ordering() {
        assert!(Urgency::Critical > Urgency::High);
        assert_eq!(Urgency::default(), Urgency::Normal);
    }
}
