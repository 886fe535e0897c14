//! Tool handlers bridging resolved commands to their collaborators.

mod agent;
mod memory;
mod ui;

pub use agent::AgentTool;
pub use memory::MemoryConnector;
pub use ui::{UiAction, UiConnector};

use std::sync::Arc;

use mnemo_core::{TOOL_MEMORY, TOOL_UI};
use mnemo_memory::MemoryClient;

use crate::dispatch::DispatchTable;

/// Table with the built-in memory and UI connectors.
///
/// The payment domain has no built-in handler.
pub fn standard_table(client: MemoryClient, app_url: &str) -> DispatchTable {
    DispatchTable::new()
        .with_handler(TOOL_MEMORY, Arc::new(MemoryConnector::new(client)))
        .with_handler(TOOL_UI, Arc::new(UiConnector::new(app_url)))
}
