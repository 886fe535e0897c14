//! Agent execution substrate for Mnemo.
//!
//! Agents implement the small [`Agent`] trait; [`ManagedAgent`] wraps any of
//! them with timeout enforcement, capability matching, activation and running
//! statistics. Two agents are built in:
//!
//! - [`ExecutionAgent`]: memory service operations and sequential batches
//! - [`EmbeddingAgent`]: embeddings, similarity and ranking with an LRU cache
//!
//! # Example
//!
//! ```no_run
//! use mnemo_agent::{AgentContext, AgentRequest, ExecutionAgent, ManagedAgent};
//! use mnemo_core::ServiceConfig;
//! use mnemo_memory::MemoryClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MemoryClient::from_config(&ServiceConfig::from_env())?;
//! let agent = ManagedAgent::new(ExecutionAgent::new(client));
//!
//! let request = AgentRequest::new("Ship v2 by Friday")
//!     .with_context(AgentContext::for_user("user-1"))
//!     .with_parameter("operation", "create");
//!
//! let response = agent.execute(&request).await;
//! println!("success={} in {:?}ms", response.success, response.processing_time);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod context;
pub mod embedding;
pub mod error;
pub mod execution;
pub mod managed;
pub mod request;
pub mod response;
pub mod stats;

pub use agent::{Agent, HealthStatus};
pub use config::{AgentConfig, DEFAULT_AGENT_TIMEOUT, DEFAULT_PRIORITY};
pub use context::{AgentContext, ConversationMessage, MemoryReference, MessageRole};
pub use embedding::{interpret_similarity, EmbeddingAgent, EMBEDDING_AGENT_NAME};
pub use error::{AgentError, Result};
pub use execution::{ExecutionAgent, EXECUTION_AGENT_NAME};
pub use managed::{AgentInfo, ManagedAgent};
pub use request::{AgentRequest, Urgency};
pub use response::AgentResponse;
pub use stats::{RunningStats, StatsSnapshot};
