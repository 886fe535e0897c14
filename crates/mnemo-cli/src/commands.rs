//! Command handlers for CLI subcommands.

use std::path::Path;
use std::sync::Arc;

use mnemo_agent::{EmbeddingAgent, ExecutionAgent, ManagedAgent};
use mnemo_core::{ServiceConfig, TOOL_MEMORY, TOOL_UI};
use mnemo_memory::{EmbeddingGenerator, MemoryClient};
use mnemo_orchestrator::{
    AgentTool, ContextualOrchestrator, DispatchTable, Orchestrator, OrchestratorResult, UiConnector,
};
use tracing::{info, warn};

use crate::cli::{Cli, Commands, OutputFormat};

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Collaborators wired from configuration.
pub struct Services {
    pub execution: Arc<ManagedAgent<ExecutionAgent>>,
    pub embedding: Arc<ManagedAgent<EmbeddingAgent>>,
    pub orchestrator: Orchestrator,
}

impl Services {
    /// Memory commands go through the execution agent so its timeout and
    /// statistics apply; UI commands produce dashboard links.
    pub fn from_config(config: &ServiceConfig, user: Option<&str>) -> Result<Self> {
        let client = MemoryClient::from_config(config)?;
        let execution = Arc::new(ManagedAgent::new(ExecutionAgent::new(client)));

        let generator = EmbeddingGenerator::from_config(config)?;
        let embedding = Arc::new(ManagedAgent::new(EmbeddingAgent::with_cache_size(
            Arc::new(generator),
            config.embedding_cache_size,
        )));

        let mut memory_tool = AgentTool::new(execution.clone());
        if let Some(user) = user {
            memory_tool = memory_tool.with_user_id(user);
        }
        let table = DispatchTable::new()
            .with_handler(TOOL_MEMORY, Arc::new(memory_tool))
            .with_handler(TOOL_UI, Arc::new(UiConnector::new(&config.app_url)));

        Ok(Self {
            execution,
            embedding,
            orchestrator: Orchestrator::new(table),
        })
    }
}

/// Execute a CLI command.
pub async fn execute(cli: Cli) -> Result<()> {
    let mut config = ServiceConfig::from_env();
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url.as_str());
    }

    match cli.command {
        Commands::Parse { text } => cmd_parse(&text.join(" ")),
        Commands::Run { inputs, format } => {
            let services = Services::from_config(&config, cli.user.as_deref())?;
            cmd_run(services, &inputs, format).await
        }
        Commands::Batch { file, format } => {
            let inputs = read_inputs(&file)?;
            let services = Services::from_config(&config, cli.user.as_deref())?;
            cmd_run(services, &inputs, format).await
        }
        Commands::Health => {
            let services = Services::from_config(&config, cli.user.as_deref())?;
            cmd_health(&services).await
        }
    }
}

fn cmd_parse(text: &str) -> Result<()> {
    let command = mnemo_core::resolve(text)?;
    println!("{}", serde_json::to_string_pretty(&command)?);
    Ok(())
}

async fn cmd_run(services: Services, inputs: &[String], format: OutputFormat) -> Result<()> {
    info!(count = inputs.len(), "Running inputs");
    let mut session = ContextualOrchestrator::new(services.orchestrator);
    let results = session.orchestrate_batch(inputs).await;

    for result in &results {
        println!("{}", render(result, format)?);
    }

    let failed = results.iter().filter(|r| !r.success).count();
    if failed > 0 {
        return Err(format!("{} of {} commands failed", failed, results.len()).into());
    }
    Ok(())
}

async fn cmd_health(services: &Services) -> Result<()> {
    let memory = services.execution.health_check().await;
    let embedding = services.embedding.health_check().await;

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "memory": memory,
            "embedding": embedding,
        }))?
    );

    if !memory.healthy {
        warn!(message = ?memory.message, "Memory service unhealthy");
        return Err(memory
            .message
            .unwrap_or_else(|| "memory service unhealthy".to_string())
            .into());
    }
    Ok(())
}

/// Non-empty lines of a file, skipping `#` comments.
pub fn read_inputs(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}

/// One result as a line of text or a JSON document.
pub fn render(result: &OrchestratorResult, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string(result)?);
    }

    let status = if result.success { "ok" } else { "error" };
    let mut line = format!(
        "[{}] {} ({}ms)",
        status, result.command, result.execution_time
    );
    match (&result.data, &result.error) {
        (_, Some(error)) => line.push_str(&format!(": {}", error)),
        (Some(data), None) => line.push_str(&format!(": {}", serde_json::to_string(data)?)),
        (None, None) => {}
    }
    Ok(line)
}
