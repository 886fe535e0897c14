//! Managed agent wrapper.
//!
//! [`ManagedAgent`] decorates any [`Agent`] with the behavior every agent
//! shares: capability matching, activation, a timeout around `process`, and
//! running statistics.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::agent::{Agent, HealthStatus};
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::request::AgentRequest;
use crate::response::AgentResponse;
use crate::stats::{RunningStats, StatsSnapshot};

/// Description of a managed agent, as reported by [`ManagedAgent::get_info`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentInfo {
    #[serde(flatten)]
    pub config: AgentConfig,
    pub active: bool,
    pub stats: StatsSnapshot,
}

/// An agent plus its activation flag and statistics.
pub struct ManagedAgent<A: Agent> {
    agent: A,
    active: AtomicBool,
    stats: Mutex<RunningStats>,
}

impl<A: Agent> ManagedAgent<A> {
    /// Wrap an agent; it starts active with empty statistics.
    pub fn new(agent: A) -> Self {
        Self {
            agent,
            active: AtomicBool::new(true),
            stats: Mutex::new(RunningStats::new()),
        }
    }

    pub fn config(&self) -> &AgentConfig {
        self.agent.config()
    }

    pub fn name(&self) -> &str {
        &self.agent.config().name
    }

    /// The wrapped agent.
    pub fn inner(&self) -> &A {
        &self.agent
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
        debug!(agent = %self.name(), active, "Agent activation changed");
    }

    /// Whether this agent is active and applicable to the request.
    ///
    /// Applicable means a capability token appears in the lowercased input,
    /// or the `capability` parameter names one of the agent's capabilities.
    pub fn can_handle(&self, request: &AgentRequest) -> bool {
        if !self.is_active() {
            return false;
        }
        let config = self.config();
        let input = request.input.to_lowercase();
        config.capabilities.iter().any(|c| input.contains(c.as_str()))
            || request
                .parameter_str("capability")
                .is_some_and(|c| config.has_capability(c))
    }

    /// Process a request with timeout enforcement and statistics.
    ///
    /// Never fails: errors and timeouts become failed responses. The
    /// response is annotated with the elapsed wall-clock time.
    pub async fn execute(&self, request: &AgentRequest) -> AgentResponse {
        let name = self.name().to_string();
        let timeout = self.config().timeout;
        self.stats.lock().await.begin();

        let started = Instant::now();
        let outcome = tokio::time::timeout(timeout, self.agent.process(request)).await;
        let elapsed = started.elapsed();

        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                warn!(agent = %name, error = %err, "Agent processing failed");
                AgentResponse::failure(err.to_string())
            }
            Err(_) => {
                warn!(agent = %name, timeout_ms = timeout.as_millis() as u64, "Agent timed out");
                AgentResponse::failure(AgentError::Timeout { agent: name.clone() }.to_string())
            }
        };

        self.stats.lock().await.finish(response.success, elapsed);
        debug!(
            agent = %name,
            success = response.success,
            elapsed_ms = elapsed.as_millis() as u64,
            "Agent request finished"
        );
        response.with_processing_time(elapsed)
    }

    /// Configuration, activation state and a live statistics snapshot.
    pub async fn get_info(&self) -> AgentInfo {
        AgentInfo {
            config: self.config().clone(),
            active: self.is_active(),
            stats: self.stats.lock().await.snapshot(),
        }
    }

    pub async fn stats(&self) -> StatsSnapshot {
        self.stats.lock().await.snapshot()
    }

    pub async fn reset_stats(&self) {
        self.stats.lock().await.reset();
    }

    pub async fn health_check(&self) -> HealthStatus {
        self.agent.health_check().await
    }
}
