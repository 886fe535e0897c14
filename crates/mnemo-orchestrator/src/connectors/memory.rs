use async_trait::async_trait;
use mnemo_core::CommandArgs;
use mnemo_memory::{MemoryClient, MemoryOperation};
use serde_json::Value;
use tracing::debug;

use crate::dispatch::ToolHandler;
use crate::error::Result;

/// Memory-domain handler calling the memory service directly.
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    client: MemoryClient,
    user_id: Option<String>,
}

impl MemoryConnector {
    pub fn new(client: MemoryClient) -> Self {
        Self {
            client,
            user_id: None,
        }
    }

    /// Send calls on behalf of this user (the `X-User-ID` header).
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

#[async_trait]
impl ToolHandler for MemoryConnector {
    async fn handle(&self, action: &str, args: &CommandArgs) -> Result<Value> {
        let operation = MemoryOperation::from_args(action, args)?;
        debug!(operation = operation.name(), "Memory connector call");
        Ok(self.client.execute(operation, self.user_id.as_deref()).await?)
    }
}
