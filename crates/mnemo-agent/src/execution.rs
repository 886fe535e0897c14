//! Execution agent: memory service operations and batches.
//!
//! The operation comes from the `operation` parameter. Without one, a small
//! keyword heuristic on the input picks `create`, `list` or `search`.
//! Remaining parameters become the operation's arguments; `create` and
//! `search` fall back to the raw input for their content and query.

use std::sync::LazyLock;

use async_trait::async_trait;
use mnemo_core::CommandArgs;
use mnemo_memory::{MemoryClient, MemoryOperation};
use regex::Regex;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::agent::{Agent, HealthStatus};
use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::request::AgentRequest;
use crate::response::AgentResponse;

pub const EXECUTION_AGENT_NAME: &str = "execution";

pub const EXECUTION_CAPABILITIES: [&str; 5] = ["execute", "api", "memory", "crud", "database"];

const MSG_BATCH_REQUIRED: &str = "Batch operations required";

static CREATE_INTENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(create|add|save|store|remember|record|note)\b").expect("Invalid create intent regex")
});

static LIST_INTENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(list|show|display)\b|\b(all|recent|latest)\s+(memories|notes)\b")
        .expect("Invalid list intent regex")
});

/// Agent that performs memory service calls.
pub struct ExecutionAgent {
    config: AgentConfig,
    client: MemoryClient,
}

impl ExecutionAgent {
    pub fn new(client: MemoryClient) -> Self {
        let config = AgentConfig::new(
            EXECUTION_AGENT_NAME,
            "Executes memory service operations, generic API calls and batches",
        )
        .with_capabilities(EXECUTION_CAPABILITIES)
        .with_timeout(client.request_timeout());
        Self { config, client }
    }

    /// Replace the default configuration (name and capabilities included).
    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Pick an operation for free text without an explicit `operation`.
    pub fn infer_operation(input: &str) -> &'static str {
        if CREATE_INTENT_REGEX.is_match(input) {
            "create"
        } else if LIST_INTENT_REGEX.is_match(input) {
            "list"
        } else {
            "search"
        }
    }

    async fn run(&self, operation: &str, args: CommandArgs, user_id: Option<&str>) -> Result<Value> {
        let op = MemoryOperation::from_args(operation, &args)?;
        debug!(operation = op.name(), "Executing memory operation");
        Ok(self.client.execute(op, user_id).await?)
    }

    async fn run_batch(&self, request: &AgentRequest) -> Result<AgentResponse> {
        let operations = request
            .parameter("operations")
            .and_then(Value::as_array)
            .filter(|ops| !ops.is_empty())
            .ok_or_else(|| AgentError::invalid(MSG_BATCH_REQUIRED))?;

        let mut results = Vec::with_capacity(operations.len());
        let mut errors = 0usize;

        for (index, item) in operations.iter().enumerate() {
            let mut args = item.as_object().cloned().unwrap_or_default();
            let operation = args
                .remove("operation")
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_else(|| "unknown".to_string());

            let outcome = if operation == "batch" {
                Err(AgentError::invalid("Nested batch operations are not supported"))
            } else {
                self.run(&operation, args, request.user_id()).await
            };

            match outcome {
                Ok(data) => results.push(json!({
                    "index": index,
                    "operation": operation,
                    "success": true,
                    "data": data,
                })),
                Err(err) => {
                    errors += 1;
                    debug!(index, operation = %operation, error = %err, "Batch operation failed");
                    results.push(json!({
                        "index": index,
                        "operation": operation,
                        "success": false,
                        "error": err.to_string(),
                    }));
                }
            }
        }

        let total = results.len();
        let succeeded = total - errors;
        let success_rate = succeeded as f64 * 100.0 / total as f64;
        info!(total, errors, "Batch finished");

        let data = json!({
            "results": results,
            "summary": {
                "total": total,
                "success": succeeded,
                "errors": errors,
                "success_rate": success_rate,
            },
        });

        let response = if errors == 0 {
            AgentResponse::success(data)
        } else {
            AgentResponse::failure(format!("{} of {} batch operations failed", errors, total))
                .with_data(data)
        };
        Ok(response.with_metadata("operation", "batch"))
    }
}

#[async_trait]
impl Agent for ExecutionAgent {
    fn config(&self) -> &AgentConfig {
        &self.config
    }

    async fn process(&self, request: &AgentRequest) -> Result<AgentResponse> {
        let operation = match request.operation() {
            Some(op) => op.to_string(),
            None => Self::infer_operation(&request.input).to_string(),
        };

        if operation == "batch" {
            return self.run_batch(request).await;
        }

        let mut args = request.parameters.clone();
        args.remove("operation");
        args.remove("capability");
        let input = request.input.trim();
        if !input.is_empty() {
            let key = match operation.as_str() {
                "create" => Some("content"),
                "search" => Some("query"),
                _ => None,
            };
            if let Some(key) = key {
                args.entry(key).or_insert_with(|| json!(input));
            }
        }

        let data = self.run(&operation, args, request.user_id()).await?;
        Ok(AgentResponse::success(data).with_metadata("operation", operation))
    }

    async fn health_check(&self) -> HealthStatus {
        match self.client.health().await {
            Ok(details) => HealthStatus::healthy().with_details(details),
            Err(err) => HealthStatus::unhealthy(err.to_string()),
        }
    }
}
