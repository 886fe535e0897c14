//! Orchestration with a per-session memory of recent results.
//!
//! After each successful call the session remembers the last memory id, the
//! ids of the last search results and the last navigation. Follow-up update
//! or delete commands that name no memory act on the last one.

use chrono::Utc;
use mnemo_core::{ParsedCommand, TOOL_MEMORY, TOOL_UI};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use crate::orchestrator::Orchestrator;
use crate::result::OrchestratorResult;

/// What the session remembers between calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_memory_id: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub last_search_results: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_ui_action: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_url: Option<String>,
}

impl SessionContext {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Actions that act on one existing memory.
const ID_ACTIONS: [&str; 2] = ["update", "delete"];

/// An [`Orchestrator`] that carries [`SessionContext`] across calls.
#[derive(Debug)]
pub struct ContextualOrchestrator {
    inner: Orchestrator,
    context: SessionContext,
}

impl ContextualOrchestrator {
    pub fn new(inner: Orchestrator) -> Self {
        Self {
            inner,
            context: SessionContext::default(),
        }
    }

    pub fn inner(&self) -> &Orchestrator {
        &self.inner
    }

    /// Replace the whole session context.
    pub fn set_context(&mut self, context: SessionContext) {
        self.context = context;
    }

    pub fn get_context(&self) -> &SessionContext {
        &self.context
    }

    pub fn clear_context(&mut self) {
        self.context = SessionContext::default();
    }

    /// Resolve, apply session context, dispatch, then learn from the result.
    pub async fn orchestrate(&mut self, text: &str) -> OrchestratorResult {
        let started = Instant::now();
        let started_at = Utc::now();

        let command = match self.inner.parse_only(text) {
            Ok(command) => command,
            Err(err) => {
                return OrchestratorResult::failure(
                    ParsedCommand::unresolved(text),
                    err.to_string(),
                    started.elapsed(),
                    started_at,
                )
            }
        };

        let (command, applied) = self.apply_context(command);
        let mut result = self.inner.dispatch_timed(command, started, started_at).await;
        result.metadata.context_applied = applied;

        if result.success {
            self.learn(&result);
        }
        result
    }

    /// Orchestrate inputs in order; each call sees context from the previous ones.
    pub async fn orchestrate_batch<S: AsRef<str>>(&mut self, inputs: &[S]) -> Vec<OrchestratorResult> {
        let mut results = Vec::with_capacity(inputs.len());
        for input in inputs {
            results.push(self.orchestrate(input.as_ref()).await);
        }
        results
    }

    fn apply_context(&self, command: ParsedCommand) -> (ParsedCommand, bool) {
        let needs_id = command.tool == TOOL_MEMORY
            && ID_ACTIONS.contains(&command.action.as_str())
            && !command.has_arg("id");
        match (&self.context.last_memory_id, needs_id) {
            (Some(id), true) => {
                debug!(command = %command.qualified_name(), id = %id, "Using last memory id");
                (command.with_arg("id", id.as_str()), true)
            }
            _ => (command, false),
        }
    }

    fn learn(&mut self, result: &OrchestratorResult) {
        let command = &result.command;
        if command.tool == TOOL_MEMORY {
            if let Some(id) = result.data_field("id").and_then(id_string) {
                self.context.last_memory_id = Some(id);
            }
        }

        let ids: Vec<String> = result
            .data_field("memories")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|m| m.get("id").and_then(id_string))
                    .collect()
            })
            .unwrap_or_default();
        if !ids.is_empty() {
            self.context.last_search_results = ids;
        }

        if command.tool == TOOL_UI {
            self.context.last_ui_action = Some(command.action.clone());
            if let Some(url) = result.data_field("url").and_then(Value::as_str) {
                self.context.last_url = Some(url.to_string());
            }
        }
    }
}

/// Ids arrive as strings or numbers.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use mnemo_core::CommandArgs;
    use serde_json::json;
    use tokio::sync::Mutex;

    use crate::connectors::UiConnector;
    use crate::dispatch::{DispatchTable, ToolHandler};
    use crate::error::OrchestratorError;

    /// Memory handler answering like the memory service.
    #[derive(Default)]
    struct FakeMemory {
        calls: Mutex<Vec<(String, CommandArgs)>>,
    }

    #[async_trait]
    impl ToolHandler for FakeMemory {
        async fn handle(&self, action: &str, args: &CommandArgs) -> crate::Result<Value> {
            self.calls.lock().await.push((action.to_string(), args.clone()));
            match action {
                "create" => Ok(json!({"id": "mem-1", "title": args.get("title")})),
                "search" => Ok(json!({"memories": [{"id": "a"}, {"id": 7}, {"title": "no id"}]})),
                "delete" | "update" => match args.get("id") {
                    Some(id) => Ok(json!({"id": id, "ok": true})),
                    None => Err(OrchestratorError::InvalidArguments("Memory ID required".into())),
                },
                "list" => Err(OrchestratorError::Execution("service down".into())),
                _ => Ok(Value::Null),
            }
        }
    }

    fn contextual() -> (Arc<FakeMemory>, ContextualOrchestrator) {
        let memory = Arc::new(FakeMemory::default());
        let table = DispatchTable::new()
            .with_handler("memory", memory.clone())
            .with_handler("ui", Arc::new(UiConnector::new("https://app.test")));
        (memory, ContextualOrchestrator::new(Orchestrator::new(table)))
    }

    #[tokio::test]
    async fn test_create_then_delete_uses_last_id() {
        let (memory, mut orchestrator) = contextual();

        let created = orchestrator.orchestrate(r#"create memory "Plan" "Ship it""#).await;
        assert!(created.success, "{:?}", created.error);
        assert_eq!(orchestrator.get_context().last_memory_id.as_deref(), Some("mem-1"));

        let deleted = orchestrator.orchestrate("delete that memory").await;
        assert!(deleted.success, "{:?}", deleted.error);
        assert!(deleted.metadata.context_applied);
        assert_eq!(deleted.command.arg_str("id"), Some("mem-1"));

        let calls = memory.calls.lock().await;
        assert_eq!(calls[1].0, "delete");
        assert_eq!(calls[1].1["id"], "mem-1");
    }

    #[tokio::test]
    async fn test_explicit_id_is_not_replaced() {
        let (_, mut orchestrator) = contextual();
        orchestrator.set_context(SessionContext {
            last_memory_id: Some("old".into()),
            ..SessionContext::default()
        });

        let result = orchestrator.orchestrate("delete memory abc123").await;
        assert!(result.success);
        assert!(!result.metadata.context_applied);
        assert_eq!(result.command.arg_str("id"), Some("abc123"));
        assert_eq!(orchestrator.get_context().last_memory_id.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_without_context_delete_fails() {
        let (_, mut orchestrator) = contextual();
        let result = orchestrator.orchestrate("delete that memory").await;
        assert!(!result.success);
        assert_eq!(result.error_message(), "Memory ID required");
        assert!(!result.metadata.context_applied);
        assert!(orchestrator.get_context().is_empty());
    }

    #[tokio::test]
    async fn test_search_results_projected_to_ids() {
        let (_, mut orchestrator) = contextual();
        orchestrator.orchestrate("search for rust notes").await;
        assert_eq!(orchestrator.get_context().last_search_results, vec!["a", "7"]);
    }

    #[tokio::test]
    async fn test_ui_navigation_is_remembered() {
        let (_, mut orchestrator) = contextual();
        let result = orchestrator.orchestrate("open settings").await;
        assert!(result.success);

        let context = orchestrator.get_context();
        assert_eq!(context.last_ui_action.as_deref(), Some("open-settings"));
        assert_eq!(
            context.last_url.as_deref(),
            Some("https://app.test/dashboard/settings")
        );
    }

    #[tokio::test]
    async fn test_failures_leave_context_untouched() {
        let (_, mut orchestrator) = contextual();
        let before = SessionContext {
            last_memory_id: Some("keep".into()),
            last_search_results: vec!["x".into()],
            ..SessionContext::default()
        };
        orchestrator.set_context(before.clone());

        assert!(!orchestrator.orchestrate("list memories").await.success);
        assert!(!orchestrator.orchestrate("??").await.success);
        assert_eq!(orchestrator.get_context(), &before);
    }

    #[tokio::test]
    async fn test_batch_threads_context_and_clear() {
        let (_, mut orchestrator) = contextual();
        let results = orchestrator
            .orchestrate_batch(&[r#"create memory "A" "first""#, "delete that memory"])
            .await;
        assert!(results.iter().all(|r| r.success));
        assert!(results[1].metadata.context_applied);

        orchestrator.clear_context();
        assert!(orchestrator.get_context().is_empty());
    }
}
