//! Shared configuration for Mnemo.
//!
//! Configuration is environment-first. A `.env.local` file in the Mnemo
//! config directory (or the working directory) is loaded before the
//! environment is read, so secrets never need to be exported by hand.
//!
//! # Environment Variables
//!
//! - `MNEMO_CONFIG_DIR`: Override the config directory (default `~/.mnemo/config`)
//! - `MNEMO_API_URL`: Base URL of the memory service
//! - `MNEMO_API_KEY`: API key sent to the memory service
//! - `MNEMO_APP_URL`: Base URL of the dashboard used for navigation links
//! - `MNEMO_REQUEST_TIMEOUT_SECS`: Budget for a single outbound call
//! - `MNEMO_HEALTH_TIMEOUT_SECS`: Budget for a health check
//! - `MNEMO_EMBEDDING_URL` / `MNEMO_EMBEDDING_MODEL`: Embedding endpoint and model
//! - `OPENAI_API_KEY`: Key for the embedding endpoint
//! - `MNEMO_EMBEDDING_CACHE_SIZE`: Maximum cached embeddings per agent

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, warn};

/// Environment variable for custom config directory.
pub const CONFIG_DIR_ENV: &str = "MNEMO_CONFIG_DIR";

/// Environment variable for the memory service base URL.
pub const API_URL_ENV: &str = "MNEMO_API_URL";

/// Environment variable for the memory service API key.
pub const API_KEY_ENV: &str = "MNEMO_API_KEY";

/// Environment variable for the dashboard base URL.
pub const APP_URL_ENV: &str = "MNEMO_APP_URL";

/// Environment variable for the single-call timeout, in seconds.
pub const REQUEST_TIMEOUT_ENV: &str = "MNEMO_REQUEST_TIMEOUT_SECS";

/// Environment variable for the health-check timeout, in seconds.
pub const HEALTH_TIMEOUT_ENV: &str = "MNEMO_HEALTH_TIMEOUT_SECS";

/// Environment variable for the embedding endpoint.
pub const EMBEDDING_URL_ENV: &str = "MNEMO_EMBEDDING_URL";

/// Environment variable for the embedding model.
pub const EMBEDDING_MODEL_ENV: &str = "MNEMO_EMBEDDING_MODEL";

/// Environment variable for the embedding API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable for the embedding cache capacity.
pub const EMBEDDING_CACHE_SIZE_ENV: &str = "MNEMO_EMBEDDING_CACHE_SIZE";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".mnemo";

const CONFIG_SUBDIR: &str = "config";

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/v1";
pub const DEFAULT_APP_URL: &str = "http://localhost:5173";
pub const DEFAULT_EMBEDDING_URL: &str = "https://api.openai.com/v1/embeddings";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_EMBEDDING_CACHE_SIZE: usize = 1000;

/// Get the Mnemo config directory.
///
/// Determined by:
/// 1. `MNEMO_CONFIG_DIR` environment variable if set
/// 2. `~/.mnemo/config` if a home directory is available
/// 3. `.mnemo/config` in the current directory as fallback
pub fn config_dir() -> PathBuf {
    config_dir_from(|key| std::env::var(key).ok())
}

/// [`config_dir`] over an arbitrary key lookup.
pub fn config_dir_from<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup(CONFIG_DIR_ENV)
        .filter(|dir| !dir.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(DEFAULT_STATE_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
                .join(CONFIG_SUBDIR)
        })
}

/// Get the .env.local file path inside the config directory.
pub fn env_file() -> PathBuf {
    config_dir().join(".env.local")
}

/// Load `.env.local` from the config directory, then from the working directory.
///
/// Existing environment variables are never overridden. Returns the number
/// of files that were found and loaded.
pub fn load_env() -> usize {
    load_env_with(
        |key| std::env::var(key).ok(),
        |key, value| std::env::set_var(key, value),
    )
}

/// [`load_env`] with the environment read through `lookup` and written
/// through `set`. Keys that `lookup` already knows are skipped.
pub fn load_env_with<L, S>(lookup: L, mut set: S) -> usize
where
    L: Fn(&str) -> Option<String>,
    S: FnMut(&str, &str),
{
    let mut loaded = 0;
    for path in [config_dir_from(&lookup).join(".env.local"), PathBuf::from(".env.local")] {
        let Ok(entries) = dotenvy::from_path_iter(&path) else {
            continue;
        };
        for entry in entries {
            match entry {
                Ok((key, value)) => {
                    if lookup(key.as_str()).is_none() {
                        set(&key, &value);
                    }
                }
                Err(err) => warn!(path = %path.display(), error = %err, "Skipping malformed env line"),
            }
        }
        debug!(path = %path.display(), "Loaded environment file");
        loaded += 1;
    }
    loaded
}

/// Endpoints, credentials and budgets for the external collaborators.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL of the memory service (no trailing slash).
    pub api_url: String,

    /// API key for the memory service, if any.
    pub api_key: Option<String>,

    /// Base URL of the dashboard (used to build navigation links).
    pub app_url: String,

    /// Budget for a single outbound call.
    pub request_timeout: Duration,

    /// Budget for a health check.
    pub health_timeout: Duration,

    /// Embedding endpoint.
    pub embedding_url: String,

    /// Embedding model identifier.
    pub embedding_model: String,

    /// Key for the embedding endpoint. Without one, embeddings are hash-based.
    pub embedding_api_key: Option<String>,

    /// Maximum number of cached embeddings per agent.
    pub embedding_cache_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            app_url: DEFAULT_APP_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
            embedding_url: DEFAULT_EMBEDDING_URL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_api_key: None,
            embedding_cache_size: DEFAULT_EMBEDDING_CACHE_SIZE,
        }
    }
}

impl ServiceConfig {
    /// Build configuration from the process environment.
    ///
    /// Never fails: missing variables use defaults, unparsable numbers are
    /// logged and replaced by their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            api_url: non_empty(API_URL_ENV)
                .map(|u| trim_url(&u))
                .unwrap_or(defaults.api_url),
            api_key: non_empty(API_KEY_ENV),
            app_url: non_empty(APP_URL_ENV)
                .map(|u| trim_url(&u))
                .unwrap_or(defaults.app_url),
            request_timeout: parse_secs(REQUEST_TIMEOUT_ENV, non_empty(REQUEST_TIMEOUT_ENV))
                .unwrap_or(defaults.request_timeout),
            health_timeout: parse_secs(HEALTH_TIMEOUT_ENV, non_empty(HEALTH_TIMEOUT_ENV))
                .unwrap_or(defaults.health_timeout),
            embedding_url: non_empty(EMBEDDING_URL_ENV).unwrap_or(defaults.embedding_url),
            embedding_model: non_empty(EMBEDDING_MODEL_ENV).unwrap_or(defaults.embedding_model),
            embedding_api_key: non_empty(OPENAI_API_KEY_ENV),
            embedding_cache_size: parse_number(
                EMBEDDING_CACHE_SIZE_ENV,
                non_empty(EMBEDDING_CACHE_SIZE_ENV),
            )
            .filter(|n| *n > 0)
            .unwrap_or(defaults.embedding_cache_size),
        }
    }

    /// Set the memory service base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = trim_url(&url.into());
        self
    }

    /// Set the memory service API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the dashboard base URL.
    pub fn with_app_url(mut self, url: impl Into<String>) -> Self {
        self.app_url = trim_url(&url.into());
        self
    }

    /// Set the single-call timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the health-check timeout.
    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    /// Set the embedding cache capacity (at least one entry).
    pub fn with_embedding_cache_size(mut self, size: usize) -> Self {
        self.embedding_cache_size = size.max(1);
        self
    }
}

fn trim_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_number(key: &str, value: Option<String>) -> Option<usize> {
    let value = value?;
    match value.trim().parse::<usize>() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(key, value = %value, "Ignoring unparsable number");
            None
        }
    }
}

fn parse_secs(key: &str, value: Option<String>) -> Option<Duration> {
    parse_number(key, value)
        .filter(|n| *n > 0)
        .map(|n| Duration::from_secs(n as u64))
}
