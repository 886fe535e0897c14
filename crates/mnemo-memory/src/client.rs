//! Memory service client.
//!
//! Adds identity and auth headers to every request and runs each call inside
//! its own timeout scope. When the scope expires the in-flight future is
//! dropped and [`MemoryError::Timeout`] is returned.

use std::sync::Arc;
use std::time::Duration;

use mnemo_core::config::{DEFAULT_HEALTH_TIMEOUT, DEFAULT_REQUEST_TIMEOUT};
use mnemo_core::ServiceConfig;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{MemoryError, Result};
use crate::operation::MemoryOperation;
use crate::request::ApiRequest;
use crate::transport::{ApiTransport, HttpTransport};

pub const USER_ID_HEADER: &str = "X-User-ID";
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Client for the memory service.
#[derive(Clone)]
pub struct MemoryClient {
    transport: Arc<dyn ApiTransport>,
    api_key: Option<String>,
    request_timeout: Duration,
    health_timeout: Duration,
}

impl std::fmt::Debug for MemoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryClient")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .field("health_timeout", &self.health_timeout)
            .finish()
    }
}

impl MemoryClient {
    /// Create a client over an arbitrary transport with default timeouts.
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self {
            transport,
            api_key: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
        }
    }

    /// Create an HTTP client from service configuration.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config.api_url, config.request_timeout)?;
        let mut client = Self::new(Arc::new(transport))
            .with_request_timeout(config.request_timeout)
            .with_health_timeout(config.health_timeout);
        client.api_key = config.api_key.clone();
        Ok(client)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Perform one operation on behalf of `user_id`.
    pub async fn execute(&self, operation: MemoryOperation, user_id: Option<&str>) -> Result<Value> {
        let timeout = if operation.is_health() {
            self.health_timeout
        } else {
            self.request_timeout
        };
        let request = self.prepare(operation.into_request(), user_id);
        self.send_within(request, timeout).await
    }

    /// Probe `GET /health` with the health timeout.
    pub async fn health(&self) -> Result<Value> {
        self.execute(MemoryOperation::Health, None).await
    }

    fn prepare(&self, request: ApiRequest, user_id: Option<&str>) -> ApiRequest {
        let mut request = request.with_header("Content-Type", "application/json");
        if let Some(user_id) = user_id.filter(|u| !u.is_empty()) {
            request = request.with_header(USER_ID_HEADER, user_id);
        }
        if let Some(key) = &self.api_key {
            request = request.with_header(API_KEY_HEADER, key.as_str());
        }
        request
    }

    async fn send_within(&self, request: ApiRequest, timeout: Duration) -> Result<Value> {
        let label = request.to_string();
        debug!(request = %label, timeout_ms = timeout.as_millis() as u64, "Memory service call");

        match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(request = %label, timeout_ms = timeout.as_millis() as u64, "Memory service call timed out");
                Err(MemoryError::Timeout(timeout))
            }
        }
    }
}
