//! Transport seam between the memory client and the network.
//!
//! [`MemoryClient`](crate::MemoryClient) builds [`ApiRequest`]s and hands
//! them to an [`ApiTransport`]. [`HttpTransport`] issues them with reqwest;
//! tests substitute an in-memory implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{MemoryError, Result};
use crate::request::ApiRequest;

/// Sends one request and returns the decoded JSON body.
///
/// Implementations map a non-success status to [`MemoryError::Status`] and an
/// empty body to [`Value::Null`].
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Value>;
}

/// reqwest-backed transport rooted at the memory service base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a transport for `base_url`.
    ///
    /// `timeout` is a hard ceiling on the socket; callers apply their own
    /// (usually shorter) scope on top.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| MemoryError::Config(format!("invalid base URL {}: {}", base_url, e)))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MemoryError::Config(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url> {
        let joined = format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            request.path
        );
        let mut url = Url::parse(&joined)
            .map_err(|e| MemoryError::Config(format!("invalid request URL {}: {}", joined, e)))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value> {
        let url = self.url_for(&request)?;
        debug!(method = %request.method, url = %url, "Sending memory service request");

        let mut builder = self.client.request(request.method.into(), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(MemoryError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| MemoryError::InvalidResponse(e.to_string()))
    }
}
