use std::sync::Arc;

use async_trait::async_trait;
use mnemo_agent::{Agent, AgentContext, AgentRequest, ManagedAgent};
use mnemo_core::CommandArgs;
use serde_json::Value;
use tracing::debug;

use crate::dispatch::ToolHandler;
use crate::error::{OrchestratorError, Result};

/// Arguments consulted, in order, for the agent's free-text input.
const INPUT_KEYS: [&str; 4] = ["input", "content", "query", "text"];

/// Routes a tool's commands through a managed agent.
///
/// The command's action becomes the `operation` parameter and its arguments
/// the remaining parameters. A failed agent response is an execution error.
pub struct AgentTool<A: Agent> {
    agent: Arc<ManagedAgent<A>>,
    user_id: Option<String>,
}

impl<A: Agent> AgentTool<A> {
    pub fn new(agent: Arc<ManagedAgent<A>>) -> Self {
        Self {
            agent,
            user_id: None,
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn agent(&self) -> &Arc<ManagedAgent<A>> {
        &self.agent
    }

    fn request(&self, action: &str, args: &CommandArgs) -> AgentRequest {
        let input = INPUT_KEYS
            .iter()
            .find_map(|key| args.get(*key).and_then(Value::as_str))
            .unwrap_or_default();

        let mut request = AgentRequest::new(input)
            .with_parameters(args.clone())
            .with_parameter("operation", action);
        if let Some(user_id) = &self.user_id {
            request = request.with_context(AgentContext::for_user(user_id.as_str()));
        }
        request
    }
}

#[async_trait]
impl<A: Agent + 'static> ToolHandler for AgentTool<A> {
    async fn handle(&self, action: &str, args: &CommandArgs) -> Result<Value> {
        let request = self.request(action, args);
        let response = self.agent.execute(&request).await;
        debug!(
            agent = %self.agent.name(),
            action,
            success = response.success,
            processing_ms = response.processing_time.unwrap_or_default(),
            "Agent tool call"
        );

        if response.success {
            Ok(response.data.unwrap_or(Value::Null))
        } else {
            Err(OrchestratorError::Execution(response.error_message().to_string()))
        }
    }
}
