//! Resolve free text, dispatch it, and wrap the outcome in an envelope.

use chrono::{DateTime, Utc};
use mnemo_core::{CommandResolver, ParsedCommand, ServiceConfig};
use mnemo_memory::MemoryClient;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::connectors::standard_table;
use crate::dispatch::DispatchTable;
use crate::error::Result;
use crate::result::OrchestratorResult;

/// Stateless orchestrator over an injected dispatch table.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    resolver: CommandResolver,
    table: DispatchTable,
}

impl Orchestrator {
    pub fn new(table: DispatchTable) -> Self {
        info!(tools = ?table.tool_names(), "Initializing Orchestrator");
        Self {
            resolver: CommandResolver::new(),
            table,
        }
    }

    /// Orchestrator over the built-in connectors for the configured services.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let client = MemoryClient::from_config(config)?;
        Ok(Self::new(standard_table(client, &config.app_url)))
    }

    pub fn with_resolver(mut self, resolver: CommandResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    /// Resolve without dispatching.
    pub fn parse_only(&self, text: &str) -> Result<ParsedCommand> {
        Ok(self.resolver.resolve(text)?)
    }

    /// Resolve and dispatch one input.
    ///
    /// Never fails: resolution errors, unknown tools and handler errors all
    /// produce a failed result carrying the command (or its stub).
    pub async fn orchestrate(&self, text: &str) -> OrchestratorResult {
        let started = Instant::now();
        let started_at = Utc::now();

        match self.parse_only(text) {
            Ok(command) => self.dispatch_timed(command, started, started_at).await,
            Err(err) => {
                debug!(input_len = text.len(), error = %err, "Resolution failed");
                OrchestratorResult::failure(
                    ParsedCommand::unresolved(text),
                    err.to_string(),
                    started.elapsed(),
                    started_at,
                )
            }
        }
    }

    /// Orchestrate inputs one after another, results in input order.
    pub async fn orchestrate_batch<S: AsRef<str>>(&self, inputs: &[S]) -> Vec<OrchestratorResult> {
        let mut results = Vec::with_capacity(inputs.len());
        for input in inputs {
            results.push(self.orchestrate(input.as_ref()).await);
        }
        results
    }

    /// Dispatch an already-resolved command.
    pub async fn dispatch(&self, command: ParsedCommand) -> OrchestratorResult {
        self.dispatch_timed(command, Instant::now(), Utc::now()).await
    }

    pub(crate) async fn dispatch_timed(
        &self,
        command: ParsedCommand,
        started: Instant,
        started_at: DateTime<Utc>,
    ) -> OrchestratorResult {
        let handler = match self.table.lookup(&command.tool) {
            Ok(handler) => handler,
            Err(err) => {
                warn!(command = %command.qualified_name(), "No handler for tool");
                return OrchestratorResult::failure(command, err.to_string(), started.elapsed(), started_at);
            }
        };

        let outcome = handler.handle(&command.action, &command.args).await;
        let elapsed = started.elapsed();
        match outcome {
            Ok(data) => {
                debug!(
                    command = %command.qualified_name(),
                    confidence = command.confidence,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Command dispatched"
                );
                OrchestratorResult::success(command, data, elapsed, started_at)
            }
            Err(err) => {
                warn!(command = %command.qualified_name(), error = %err, "Command failed");
                OrchestratorResult::failure(command, err.to_string(), elapsed, started_at)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use mnemo_core::CommandArgs;
    use serde_json::{json, Value};
    use tokio::sync::Mutex;

    use crate::dispatch::ToolHandler;
    use crate::error::OrchestratorError;

    /// Records calls; fails for the `delete` action; sleeps for `slow`.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(String, CommandArgs)>>,
    }

    #[async_trait]
    impl ToolHandler for Recorder {
        async fn handle(&self, action: &str, args: &CommandArgs) -> crate::Result<Value> {
            self.calls.lock().await.push((action.to_string(), args.clone()));
            match action {
                "delete" => Err(OrchestratorError::Execution("delete refused".into())),
                "slow" => {
                    tokio::time::sleep(Duration::from_millis(250)).await;
                    Ok(json!({"slow": true}))
                }
                _ => Ok(json!({"action": action})),
            }
        }
    }

    fn orchestrator() -> (Arc<Recorder>, Orchestrator) {
        let recorder = Arc::new(Recorder::default());
        let table = DispatchTable::new()
            .with_handler("memory", recorder.clone())
            .with_handler("ui", recorder.clone());
        (recorder, Orchestrator::new(table))
    }

    #[tokio::test]
    async fn test_orchestrate_success() {
        let (recorder, orchestrator) = orchestrator();
        let result = orchestrator.orchestrate("search for onboarding docs").await;

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.command.action, "search");
        assert_eq!(result.data, Some(json!({"action": "search"})));
        assert_eq!(result.metadata.confidence, result.command.confidence);

        let calls = recorder.calls.lock().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1["query"], "onboarding docs");
    }

    #[tokio::test]
    async fn test_unresolvable_input_gets_stub_command() {
        let (recorder, orchestrator) = orchestrator();
        let result = orchestrator.orchestrate("??").await;

        assert!(!result.success);
        assert_eq!(result.error_message(), "Could not resolve command");
        assert!(result.command.is_unresolved());
        assert_eq!(result.command.original_input, "??");
        assert_eq!(result.command.confidence, 0.0);
        assert!(recorder.calls.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_tool_lists_known_tools() {
        let (_, orchestrator) = orchestrator();
        let result = orchestrator.orchestrate("refund ch_3MmlLrLkdIwHu7ix").await;

        assert!(!result.success);
        assert_eq!(result.command.tool, "stripe");
        assert_eq!(
            result.error_message(),
            "Tool not found: stripe (known tools: memory, ui)"
        );
    }

    #[tokio::test]
    async fn test_handler_error_becomes_failure() {
        let (_, orchestrator) = orchestrator();
        let command = ParsedCommand::new("memory", "delete", CommandArgs::new(), 0.6, "delete it");
        let result = orchestrator.dispatch(command).await;
        assert!(!result.success);
        assert_eq!(result.error_message(), "delete refused");
        assert_eq!(result.command.action, "delete");
    }

    #[tokio::test(start_paused = true)]
    async fn test_execution_time_measured() {
        let (_, orchestrator) = orchestrator();
        let command = ParsedCommand::new("memory", "slow", CommandArgs::new(), 0.9, "slow");
        let result = orchestrator.dispatch(command).await;
        assert!(result.success);
        assert!(result.execution_time >= 250, "{}", result.execution_time);
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let (_, orchestrator) = orchestrator();
        let inputs = ["open dashboard", "??", "search for cats"];
        let results = orchestrator.orchestrate_batch(&inputs).await;

        assert_eq!(results.len(), 3);
        for (result, input) in results.iter().zip(inputs) {
            assert_eq!(result.command.original_input, input);
        }
        assert!(results[0].success);
        assert!(!results[1].success);
        assert!(results[2].success);
    }

    #[test]
    fn test_parse_only_does_not_dispatch() {
        let (_, orchestrator) = orchestrator();
        let command = orchestrator.parse_only("open settings").unwrap();
        assert_eq!(command.tool, "ui");
        assert_eq!(command.action, "open-settings");
        assert!(orchestrator.parse_only("").is_err());
    }

    #[tokio::test]
    async fn test_custom_resolver_limit() {
        let (recorder, orchestrator) = orchestrator();
        let orchestrator = orchestrator.with_resolver(CommandResolver::new().with_default_limit(3));
        orchestrator.orchestrate("search for cats").await;
        assert_eq!(recorder.calls.lock().await[0].1["limit"], 3);
    }

    #[test]
    fn test_from_config_registers_builtin_tools() {
        let orchestrator = Orchestrator::from_config(&ServiceConfig::default()).unwrap();
        assert_eq!(orchestrator.table().tool_names(), vec!["memory", "ui"]);
    }
}
