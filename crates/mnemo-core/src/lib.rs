//! Mnemo Core - command resolution and configuration shared by every Mnemo crate.
//!
//! - **command**: The `ParsedCommand` produced by resolution
//! - **config**: Service endpoints, timeouts and `.env.local` loading
//! - **resolver**: Free text to confidence-scored command
//! - **view**: Dashboard views the UI domain can navigate to

pub mod command;
pub mod config;
pub mod error;
pub mod resolver;
pub mod view;

pub use command::{CommandArgs, ParsedCommand, TOOL_MEMORY, TOOL_STRIPE, TOOL_UI, TOOL_UNKNOWN};
pub use config::{config_dir, config_dir_from, env_file, load_env, load_env_with, ServiceConfig};
pub use error::{ResolutionError, Result};
pub use resolver::{resolve, CommandResolver};
pub use view::UiView;
