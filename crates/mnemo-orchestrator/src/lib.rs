//! Mnemo Orchestrator - from free text to dispatched tool calls.
//!
//! - **dispatch**: `ToolHandler` trait and the injected `DispatchTable`
//! - **connectors**: built-in memory, UI and agent-backed handlers
//! - **orchestrator**: stateless resolve, dispatch and measure
//! - **contextual**: session memory across calls
//!
//! # Example
//!
//! ```no_run
//! use mnemo_core::ServiceConfig;
//! use mnemo_orchestrator::{ContextualOrchestrator, Orchestrator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = Orchestrator::from_config(&ServiceConfig::from_env())?;
//! let mut session = ContextualOrchestrator::new(orchestrator);
//!
//! session.orchestrate(r#"create memory "Launch" "Ship v2 by Friday""#).await;
//! let result = session.orchestrate("delete that memory").await;
//! println!("{}", serde_json::to_string_pretty(&result)?);
//! # Ok(())
//! # }
//! ```

pub mod connectors;
pub mod contextual;
pub mod dispatch;
pub mod error;
pub mod orchestrator;
pub mod result;

pub use connectors::{standard_table, AgentTool, MemoryConnector, UiAction, UiConnector};
pub use contextual::{ContextualOrchestrator, SessionContext};
pub use dispatch::{DispatchTable, ToolHandler};
pub use error::{OrchestratorError, Result};
pub use orchestrator::Orchestrator;
pub use result::{OrchestratorResult, ResultMetadata};
