//! Embedding generation and vector similarity.
//!
//! [`EmbeddingGenerator`] talks to an OpenAI-compatible `/embeddings`
//! endpoint (`{model, input}` in, `{data: [{embedding}]}` out). Without an API
//! key it falls back to deterministic hash-based vectors, which keeps the
//! pipeline usable offline and in tests but carries no semantics.

use std::time::Duration;

use async_trait::async_trait;
use mnemo_core::ServiceConfig;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::{MemoryError, Result};

/// Dimension of `text-embedding-3-small` vectors.
pub const DEFAULT_EMBEDDING_DIM: usize = 1536;

/// Source of embedding vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts with one upstream call, preserving order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Model name reported alongside generated vectors.
    fn model(&self) -> &str;
}

/// Embedding provider configuration.
#[derive(Debug, Clone)]
pub enum EmbeddingProvider {
    /// OpenAI-compatible HTTP endpoint.
    OpenAi {
        url: String,
        api_key: String,
        model: String,
    },
    /// Hash-based fake embeddings.
    HashBased { dimension: usize },
}

impl EmbeddingProvider {
    /// Pick a provider from configuration: HTTP when a key is present,
    /// otherwise the hash-based fallback.
    pub fn from_config(config: &ServiceConfig) -> Self {
        match &config.embedding_api_key {
            Some(api_key) => {
                debug!(model = %config.embedding_model, "Using HTTP embedding provider");
                Self::OpenAi {
                    url: config.embedding_url.clone(),
                    api_key: api_key.clone(),
                    model: config.embedding_model.clone(),
                }
            }
            None => {
                warn!("No embedding API key configured, using hash-based embeddings");
                Self::HashBased {
                    dimension: DEFAULT_EMBEDDING_DIM,
                }
            }
        }
    }

    pub fn is_real(&self) -> bool {
        !matches!(self, Self::HashBased { .. })
    }
}

/// Generates embeddings through the configured provider.
#[derive(Clone)]
pub struct EmbeddingGenerator {
    provider: EmbeddingProvider,
    client: reqwest::Client,
}

impl EmbeddingGenerator {
    pub fn new(provider: EmbeddingProvider, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MemoryError::Config(e.to_string()))?;
        Ok(Self { provider, client })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Self::new(EmbeddingProvider::from_config(config), config.request_timeout)
    }

    /// Offline generator producing `dimension`-sized hash vectors.
    pub fn hash_based(dimension: usize) -> Self {
        Self {
            provider: EmbeddingProvider::HashBased { dimension },
            client: reqwest::Client::new(),
        }
    }

    pub fn is_real(&self) -> bool {
        self.provider.is_real()
    }

    async fn request(&self, url: &str, api_key: &str, model: &str, input: Value) -> Result<Value> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&json!({ "model": model, "input": input }))
            .send()
            .await
            .map_err(|e| MemoryError::Embedding(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MemoryError::Embedding(format!(
                "embedding API error {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| MemoryError::Embedding(e.to_string()))
    }
}

#[async_trait]
impl Embedder for EmbeddingGenerator {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        match &self.provider {
            EmbeddingProvider::OpenAi { url, api_key, model } => {
                let json = self.request(url, api_key, model, json!(text)).await?;
                let mut vectors = parse_embedding_response(&json)?;
                if vectors.is_empty() {
                    return Err(MemoryError::Embedding("empty embedding response".into()));
                }
                Ok(vectors.swap_remove(0))
            }
            EmbeddingProvider::HashBased { dimension } => Ok(hash_based_embedding(text, *dimension)),
        }
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        match &self.provider {
            EmbeddingProvider::OpenAi { url, api_key, model } => {
                let json = self.request(url, api_key, model, json!(texts)).await?;
                let vectors = parse_embedding_response(&json)?;
                if vectors.len() != texts.len() {
                    return Err(MemoryError::Embedding(format!(
                        "expected {} embeddings, got {}",
                        texts.len(),
                        vectors.len()
                    )));
                }
                Ok(vectors)
            }
            EmbeddingProvider::HashBased { dimension } => Ok(texts
                .iter()
                .map(|t| hash_based_embedding(t, *dimension))
                .collect()),
        }
    }

    fn model(&self) -> &str {
        match &self.provider {
            EmbeddingProvider::OpenAi { model, .. } => model,
            EmbeddingProvider::HashBased { .. } => "hash-based",
        }
    }
}

/// Parse `{data: [{index?, embedding}]}`, ordering entries by `index` when
/// the service supplies it.
pub fn parse_embedding_response(json: &Value) -> Result<Vec<Vec<f32>>> {
    let data = json["data"]
        .as_array()
        .ok_or_else(|| MemoryError::Embedding("Invalid response format".to_string()))?;

    let mut indexed = data
        .iter()
        .enumerate()
        .map(|(position, item)| {
            let index = item["index"].as_u64().map_or(position, |i| i as usize);
            let embedding = item["embedding"]
                .as_array()
                .ok_or_else(|| MemoryError::Embedding("Invalid embedding format".to_string()))?
                .iter()
                .map(|v| {
                    v.as_f64()
                        .map(|f| f as f32)
                        .ok_or_else(|| MemoryError::Embedding("Invalid embedding value".to_string()))
                })
                .collect::<Result<Vec<f32>>>()?;
            Ok((index, embedding))
        })
        .collect::<Result<Vec<(usize, Vec<f32>)>>>()?;

    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, e)| e).collect())
}

/// Deterministic unit vector derived from SHA-256 blocks of the text.
pub fn hash_based_embedding(text: &str, dimension: usize) -> Vec<f32> {
    let mut embedding = Vec::with_capacity(dimension);
    let mut block = 0u32;

    while embedding.len() < dimension {
        let digest = Sha256::new()
            .chain_update(text.as_bytes())
            .chain_update(block.to_le_bytes())
            .finalize();
        for chunk in digest.chunks_exact(4) {
            if embedding.len() == dimension {
                break;
            }
            let raw = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            embedding.push(((raw as f64 / u32::MAX as f64) * 2.0 - 1.0) as f32);
        }
        block += 1;
    }

    let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for x in &mut embedding {
            *x /= magnitude;
        }
    }
    embedding
}

/// Cosine similarity of two vectors. Mismatched lengths or a zero norm give 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_based_embedding_deterministic() {
        assert_eq!(hash_based_embedding("test text", 10), hash_based_embedding("test text", 10));
        assert_ne!(hash_based_embedding("hello", 10), hash_based_embedding("world", 10));
    }

    #[test]
    fn test_hash_based_embedding_normalized() {
        let embedding = hash_based_embedding("test", 100);
        assert_eq!(embedding.len(), 100);
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity() {
        let v = vec![0.5, 0.5, 0.5, 0.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 0.0001);
        assert_eq!(cosine_similarity(&v, &[0.0; 4]), 0.0);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 0.0001);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 0.0001);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_parse_response_orders_by_index() {
        let json = json!({"data": [
            {"index": 1, "embedding": [0.0, 1.0]},
            {"index": 0, "embedding": [1.0, 0.0]},
        ]});
        let vectors = parse_embedding_response(&json).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_parse_response_rejects_bad_shape() {
        assert!(parse_embedding_response(&json!({"error": "nope"})).is_err());
        assert!(parse_embedding_response(&json!({"data": [{"embedding": ["x"]}]})).is_err());
    }

    #[test]
    fn test_provider_from_config() {
        let config = ServiceConfig::default();
        assert!(!EmbeddingProvider::from_config(&config).is_real());
    }

    #[tokio::test]
    async fn test_hash_generator_batch_matches_single() {
        let generator = EmbeddingGenerator::hash_based(16);
        let texts = vec!["alpha".to_string(), "beta".to_string()];
        let batch = generator.embed_batch(&texts).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1], generator.embed("beta").await.unwrap());
        assert_eq!(generator.model(), "hash-based");
    }
}
