//! Tool dispatch table.
//!
//! The table is built explicitly and handed to the orchestrator; there is no
//! global registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use mnemo_core::CommandArgs;
use serde_json::Value;

use crate::error::{OrchestratorError, Result};

/// Handler for every action of one tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Perform `action` with the command's arguments and return its data.
    async fn handle(&self, action: &str, args: &CommandArgs) -> Result<Value>;
}

/// Mapping from tool name to handler.
#[derive(Clone, Default)]
pub struct DispatchTable {
    handlers: BTreeMap<String, Arc<dyn ToolHandler>>,
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchTable")
            .field("tools", &self.tool_names())
            .finish()
    }
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous handler for the tool.
    pub fn with_handler(mut self, tool: impl Into<String>, handler: Arc<dyn ToolHandler>) -> Self {
        self.register(tool, handler);
        self
    }

    pub fn register(&mut self, tool: impl Into<String>, handler: Arc<dyn ToolHandler>) {
        self.handlers.insert(tool.into(), handler);
    }

    pub fn get(&self, tool: &str) -> Option<Arc<dyn ToolHandler>> {
        self.handlers.get(tool).cloned()
    }

    /// Look up a handler, failing with the sorted list of known tools.
    pub fn lookup(&self, tool: &str) -> Result<Arc<dyn ToolHandler>> {
        self.get(tool).ok_or_else(|| OrchestratorError::ToolNotFound {
            tool: tool.to_string(),
            known: self.tool_names(),
        })
    }

    /// Registered tool names, sorted.
    pub fn tool_names(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    pub fn contains(&self, tool: &str) -> bool {
        self.handlers.contains_key(tool)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
