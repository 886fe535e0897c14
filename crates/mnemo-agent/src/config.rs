//! Static agent configuration.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::Serialize;

/// Default time an agent may spend on one request.
pub const DEFAULT_AGENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default scheduling priority (1 = lowest, 10 = highest).
pub const DEFAULT_PRIORITY: u8 = 5;

/// Identity and limits of an agent. Fixed once the agent is wrapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentConfig {
    pub name: String,
    pub description: String,
    /// Lowercase capability tokens.
    pub capabilities: BTreeSet<String>,
    pub priority: u8,
    #[serde(rename = "timeout_ms", serialize_with = "serialize_millis")]
    pub timeout: Duration,
    /// Advisory only; requests are never retried.
    pub retries: u32,
}

impl AgentConfig {
    /// Create a configuration with default priority, timeout and retries.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            capabilities: BTreeSet::new(),
            priority: DEFAULT_PRIORITY,
            timeout: DEFAULT_AGENT_TIMEOUT,
            retries: 0,
        }
    }

    pub fn with_capability(mut self, capability: impl AsRef<str>) -> Self {
        let token = capability.as_ref().trim().to_lowercase();
        if !token.is_empty() {
            self.capabilities.insert(token);
        }
        self
    }

    pub fn with_capabilities<I, S>(self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        capabilities
            .into_iter()
            .fold(self, |config, c| config.with_capability(c))
    }

    /// Set priority, clamped to 1..=10.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority.clamp(1, 10);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(&capability.to_lowercase())
    }
}

fn serialize_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AgentConfig::new("execution", "Runs memory operations");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retries, 0);
        assert_eq!(config.priority, 5);
        assert!(config.capabilities.is_empty());
    }

    #[test]
    fn test_builder() {
        let config = AgentConfig::new("embedding", "Vectors")
            .with_capabilities(["Embedding", "similarity", " "])
            .with_priority(42)
            .with_timeout(Duration::from_millis(250))
            .with_retries(2);

        assert_eq!(config.capabilities.len(), 2);
        assert!(config.has_capability("EMBEDDING"));
        assert_eq!(config.priority, 10);
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.retries, 2);
    }

    #[test]
    fn test_serializes_timeout_as_millis() {
        let config = AgentConfig::new("a", "b").with_timeout(Duration::from_secs(2));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["timeout_ms"], 2000);
        assert!(json.get("timeout").is_none());
    }
}
