//! Memory service client and embedding provider for Mnemo.
//!
//! - **operation**: Typed [`MemoryOperation`]s validated from command arguments
//!   and translated into [`ApiRequest`]s
//! - **client**: [`MemoryClient`] adds identity headers and timeout scopes
//! - **transport**: The [`ApiTransport`] seam and its reqwest implementation
//! - **embedding**: [`Embedder`] trait, [`EmbeddingGenerator`] and
//!   [`cosine_similarity`]
//!
//! # Example
//!
//! ```no_run
//! use mnemo_core::{CommandArgs, ServiceConfig};
//! use mnemo_memory::{MemoryClient, MemoryOperation};
//!
//! # async fn example() -> mnemo_memory::Result<()> {
//! let client = MemoryClient::from_config(&ServiceConfig::from_env())?;
//!
//! let mut args = CommandArgs::new();
//! args.insert("query".into(), "onboarding docs".into());
//! let op = MemoryOperation::from_args("search", &args)?;
//!
//! let results = client.execute(op, Some("user-1")).await?;
//! println!("{}", results);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod embedding;
pub mod error;
pub mod operation;
pub mod request;
pub mod transport;

pub use client::{MemoryClient, API_KEY_HEADER, USER_ID_HEADER};
pub use embedding::{cosine_similarity, Embedder, EmbeddingGenerator, EmbeddingProvider};
pub use error::{MemoryError, Result};
pub use operation::MemoryOperation;
pub use request::{ApiRequest, HttpMethod};
pub use transport::{ApiTransport, HttpTransport};
