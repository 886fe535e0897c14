//! Command-line interface definition using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Version string with git hash and build date, e.g. "0.1.0 (abc1234, 2026-10-18)".
fn version_string() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const BUILD_DATE: &str = env!("BUILD_DATE");

    static VERSION_STRING: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} ({}, {})", VERSION, GIT_HASH, BUILD_DATE))
}

/// Mnemo - natural-language commands for the memory service
#[derive(Parser, Debug)]
#[command(name = "mnemo")]
#[command(author, version = version_string(), about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Memory service base URL (overrides MNEMO_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// User the memory service acts for (X-User-ID)
    #[arg(short, long, env = "MNEMO_USER_ID", global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve text into a command without running it
    Parse {
        /// Free text (joined with spaces)
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Run each input in order, sharing session context
    Run {
        /// One input per argument
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Run every non-empty line of a file
    Batch {
        /// File with one input per line
        #[arg(required = true)]
        file: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Check the memory service and embedding agent
    Health,
}

/// Output format for orchestration results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Cli {
    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
