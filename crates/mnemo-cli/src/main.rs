//! Mnemo CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use mnemo_cli::cli::Cli;
use mnemo_cli::commands;

#[tokio::main]
async fn main() {
    let loaded = mnemo_core::load_env();

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt().with_env_filter(filter).with_target(false).init();
    tracing::debug!(loaded, "Environment loaded");

    if let Err(e) = commands::execute(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
