//! Core Agent trait definition.
//!
//! An [`Agent`] only knows how to process a request. Timeouts, statistics,
//! activation and capability matching are added uniformly by
//! [`ManagedAgent`](crate::ManagedAgent), which is the only entry point
//! callers use.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::config::AgentConfig;
use crate::error::Result;
use crate::request::AgentRequest;
use crate::response::AgentResponse;

/// Result of an agent health probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthStatus {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            healthy: true,
            message: None,
            details: None,
        }
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            healthy: false,
            message: Some(message.into()),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// A pluggable worker.
///
/// # Object Safety
///
/// This trait is object-safe, so agents can be stored as `Box<dyn Agent>`.
///
/// # Example
///
/// ```ignore
/// struct Echo { config: AgentConfig }
///
/// #[async_trait]
/// impl Agent for Echo {
///     fn config(&self) -> &AgentConfig { &self.config }
///
///     async fn process(&self, request: &AgentRequest) -> Result<AgentResponse> {
///         Ok(AgentResponse::success(request.input.clone()))
///     }
/// }
/// ```
#[async_trait]
pub trait Agent: Send + Sync {
    /// Static configuration of this agent.
    fn config(&self) -> &AgentConfig;

    /// Do the agent's work.
    ///
    /// An `Err` is reported to callers as a failed response carrying the
    /// error message. Returning `Ok` with `success == false` is also allowed,
    /// e.g. for partially failed batches that still carry data.
    async fn process(&self, request: &AgentRequest) -> Result<AgentResponse>;

    /// Probe the agent's dependencies.
    async fn health_check(&self) -> HealthStatus {
        HealthStatus::healthy()
    }
}

#[async_trait]
impl<A: Agent + ?Sized> Agent for Box<A> {
    fn config(&self) -> &AgentConfig {
        (**self).config()
    }

    async fn process(&self, request: &AgentRequest) -> Result<AgentResponse> {
        (**self).process(request).await
    }

    async fn health_check(&self) -> HealthStatus {
        (**self).health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo {
        config: AgentConfig,
    }

    #[async_trait]
    impl Agent for Echo {
        fn config(&self) -> &AgentConfig {
            &self.config
        }

        async fn process(&self, request: &AgentRequest) -> Result<AgentResponse> {
            Ok(AgentResponse::success(request.input.clone()))
        }
    }

    #[tokio::test]
    async fn test_default_health_and_boxed_dispatch() {
        let agent: Box<dyn Agent> = Box::new(Echo {
            config: AgentConfig::new("echo", "Echoes input"),
        });

        assert!(agent.health_check().await.healthy);
        assert_eq!(agent.config().name, "echo");

        let response = agent.process(&AgentRequest::new("hi")).await.unwrap();
        assert_eq!(response.data, Some(Value::from("hi")));
    }

    #[test]
    fn test_health_status_serialization() {
        let status = HealthStatus::unhealthy("down");
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json, serde_json::json!({"healthy": false, "message": "down"}));
    }
}
