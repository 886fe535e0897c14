//! Embedding agent: vectors, similarity and ranking with a content-hash cache.
//!
//! # Operations
//!
//! Selected by the `operation` parameter (default `generate`):
//!
//! - `generate`: embed `text` (or the input); cache hits skip the service
//! - `similarity`: cosine similarity of two texts or two vectors
//! - `batch_generate`: embed `texts`, with one upstream call for cache misses
//! - `find_similar`: rank `candidates` against `query` (or the input)
//! - `cache_stats` / `clear_cache`

mod cache;
#[cfg(test)]
mod tests;

pub use cache::{content_key, EmbeddingCache};

use std::sync::Arc;

use async_trait::async_trait;
use mnemo_core::config::DEFAULT_EMBEDDING_CACHE_SIZE;
use mnemo_memory::{cosine_similarity, Embedder};
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;
use tracing::debug;

use crate::agent::{Agent, HealthStatus};
use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::request::AgentRequest;
use crate::response::AgentResponse;

pub const EMBEDDING_AGENT_NAME: &str = "embedding";

pub const EMBEDDING_CAPABILITIES: [&str; 5] = ["embedding", "similarity", "semantic", "vector", "search"];

/// Human-readable label for a cosine similarity score.
pub fn interpret_similarity(score: f32) -> &'static str {
    match score {
        s if s >= 0.9 => "nearly identical",
        s if s >= 0.8 => "very similar",
        s if s >= 0.7 => "similar",
        s if s >= 0.6 => "moderately similar",
        s if s >= 0.5 => "somewhat similar",
        s if s >= 0.3 => "slightly similar",
        _ => "not similar",
    }
}

/// A vector and whether it came from the cache.
struct Embedded {
    vector: Vec<f32>,
    cached: bool,
}

/// Agent computing embeddings through an [`Embedder`].
pub struct EmbeddingAgent {
    config: AgentConfig,
    embedder: Arc<dyn Embedder>,
    cache: Mutex<EmbeddingCache>,
}

impl EmbeddingAgent {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self::with_cache_size(embedder, DEFAULT_EMBEDDING_CACHE_SIZE)
    }

    pub fn with_cache_size(embedder: Arc<dyn Embedder>, capacity: usize) -> Self {
        let config = AgentConfig::new(
            EMBEDDING_AGENT_NAME,
            "Generates embeddings and computes semantic similarity",
        )
        .with_capabilities(EMBEDDING_CAPABILITIES);
        Self {
            config,
            embedder,
            cache: Mutex::new(EmbeddingCache::new(capacity)),
        }
    }

    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Embed one text, consulting the cache first.
    async fn embed_one(&self, text: &str) -> Result<Embedded> {
        if let Some(vector) = self.cache.lock().await.get(text) {
            return Ok(Embedded { vector, cached: true });
        }
        let vector = self.embedder.embed(text).await?;
        self.cache.lock().await.insert(text, vector.clone());
        Ok(Embedded { vector, cached: false })
    }

    /// Embed many texts in input order with at most one upstream call.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Embedded>> {
        let mut slots: Vec<Option<Embedded>> = Vec::with_capacity(texts.len());
        let mut missing: Vec<String> = Vec::new();
        {
            let mut cache = self.cache.lock().await;
            for text in texts {
                match cache.get(text) {
                    Some(vector) => slots.push(Some(Embedded { vector, cached: true })),
                    None => {
                        if !missing.contains(text) {
                            missing.push(text.clone());
                        }
                        slots.push(None);
                    }
                }
            }
        }

        if !missing.is_empty() {
            debug!(uncached = missing.len(), total = texts.len(), "Embedding batch");
            let vectors = self.embedder.embed_batch(&missing).await?;
            if vectors.len() != missing.len() {
                return Err(AgentError::invalid(format!(
                    "embedding service returned {} vectors for {} texts",
                    vectors.len(),
                    missing.len()
                )));
            }
            let mut cache = self.cache.lock().await;
            for (text, vector) in missing.iter().zip(&vectors) {
                cache.insert(text, vector.clone());
            }
            for (slot, text) in slots.iter_mut().zip(texts) {
                if slot.is_none() {
                    let position = missing.iter().position(|m| m == text);
                    *slot = position.map(|p| Embedded {
                        vector: vectors[p].clone(),
                        cached: false,
                    });
                }
            }
        }

        slots
            .into_iter()
            .map(|slot| slot.ok_or_else(|| AgentError::invalid("missing embedding for batch entry")))
            .collect()
    }

    async fn generate(&self, request: &AgentRequest) -> Result<Value> {
        let text = request
            .parameter_str("text")
            .or_else(|| Some(request.input.trim()).filter(|t| !t.is_empty()))
            .ok_or_else(|| AgentError::invalid("Text is required for embedding generation"))?;

        let embedded = self.embed_one(text).await?;
        Ok(json!({
            "dimensions": embedded.vector.len(),
            "embedding": embedded.vector,
            "cached": embedded.cached,
            "model": self.embedder.model(),
        }))
    }

    async fn similarity(&self, request: &AgentRequest) -> Result<Value> {
        let mut vectors = Vec::with_capacity(2);
        for (vec_key, text_key) in [("vec1", "text1"), ("vec2", "text2")] {
            if let Some(vector) = request.parameter(vec_key).and_then(vector_from_value) {
                vectors.push(vector);
            } else if let Some(text) = request.parameter_str(text_key) {
                vectors.push(self.embed_one(text).await?.vector);
            }
        }

        let [a, b] = vectors.as_slice() else {
            return Err(AgentError::invalid(
                "Two texts or embeddings required for similarity",
            ));
        };
        let score = cosine_similarity(a, b);
        Ok(json!({
            "similarity": score,
            "interpretation": interpret_similarity(score),
        }))
    }

    async fn batch_generate(&self, request: &AgentRequest) -> Result<Value> {
        let texts = strings_from_value(request.parameter("texts"))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AgentError::invalid("Texts array required"))?;

        let embedded = self.embed_many(&texts).await?;
        let cached_count = embedded.iter().filter(|e| e.cached).count();
        let embeddings: Vec<Value> = texts
            .iter()
            .zip(&embedded)
            .map(|(text, e)| json!({"text": text, "embedding": e.vector, "cached": e.cached}))
            .collect();

        Ok(json!({
            "embeddings": embeddings,
            "total_count": texts.len(),
            "cached_count": cached_count,
            "model": self.embedder.model(),
        }))
    }

    async fn find_similar(&self, request: &AgentRequest) -> Result<Value> {
        let query = request
            .parameter_str("query")
            .or_else(|| Some(request.input.trim()).filter(|t| !t.is_empty()))
            .ok_or_else(|| AgentError::invalid("Query is required for similarity search"))?;

        let candidates: Vec<Candidate> = request
            .parameter("candidates")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Candidate::from_value).collect())
            .filter(|c: &Vec<Candidate>| !c.is_empty())
            .ok_or_else(|| AgentError::invalid("Candidates required"))?;

        let query_vector = self.embed_one(query).await?.vector;

        let to_embed: Vec<String> = candidates
            .iter()
            .filter(|c| c.embedding.is_none())
            .map(|c| c.text.clone())
            .collect();
        let mut generated = if to_embed.is_empty() {
            Vec::new()
        } else {
            self.embed_many(&to_embed).await?
        }
        .into_iter();

        let mut ranked = Vec::with_capacity(candidates.len());
        for (index, candidate) in candidates.into_iter().enumerate() {
            let vector = match candidate.embedding {
                Some(vector) => vector,
                None => generated
                    .next()
                    .map(|e| e.vector)
                    .ok_or_else(|| AgentError::invalid("missing embedding for candidate"))?,
            };
            let similarity = cosine_similarity(&query_vector, &vector);
            ranked.push((similarity, index, candidate.id, candidate.text));
        }
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

        let results: Vec<Value> = ranked
            .into_iter()
            .map(|(similarity, index, id, text)| {
                let mut entry = Map::new();
                entry.insert("index".into(), json!(index));
                if let Some(id) = id {
                    entry.insert("id".into(), id);
                }
                entry.insert("text".into(), json!(text));
                entry.insert("similarity".into(), json!(similarity));
                entry.insert("interpretation".into(), json!(interpret_similarity(similarity)));
                Value::Object(entry)
            })
            .collect();

        Ok(json!({
            "query": query,
            "top_match": results.first().cloned(),
            "total_candidates": results.len(),
            "results": results,
        }))
    }

    async fn cache_stats(&self) -> Value {
        let cache = self.cache.lock().await;
        json!({"entries": cache.len(), "capacity": cache.capacity()})
    }

    async fn clear_cache(&self) -> Value {
        let cleared = self.cache.lock().await.clear();
        debug!(cleared, "Embedding cache cleared");
        json!({"cleared": cleared})
    }
}

#[async_trait]
impl Agent for EmbeddingAgent {
    fn config(&self) -> &AgentConfig {
        &self.config
    }

    async fn process(&self, request: &AgentRequest) -> Result<AgentResponse> {
        let operation = request.operation().unwrap_or("generate");
        let data = match operation {
            "generate" => self.generate(request).await?,
            "similarity" => self.similarity(request).await?,
            "batch_generate" => self.batch_generate(request).await?,
            "find_similar" => self.find_similar(request).await?,
            "cache_stats" => self.cache_stats().await,
            "clear_cache" => self.clear_cache().await,
            other => return Err(AgentError::UnsupportedOperation(other.to_string())),
        };
        Ok(AgentResponse::success(data).with_metadata("operation", operation))
    }

    async fn health_check(&self) -> HealthStatus {
        HealthStatus::healthy().with_details(json!({
            "model": self.embedder.model(),
            "cache": self.cache_stats().await,
        }))
    }
}

/// A `find_similar` candidate: a string, or `{id?, text, embedding?}`.
struct Candidate {
    id: Option<Value>,
    text: String,
    embedding: Option<Vec<f32>>,
}

impl Candidate {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Self {
                id: None,
                text: text.clone(),
                embedding: None,
            }),
            Value::Object(obj) => {
                let embedding = obj.get("embedding").and_then(vector_from_value);
                let text = obj
                    .get("text")
                    .or_else(|| obj.get("content"))
                    .and_then(Value::as_str)
                    .map(String::from);
                if text.is_none() && embedding.is_none() {
                    return None;
                }
                Some(Self {
                    id: obj.get("id").cloned(),
                    text: text.unwrap_or_default(),
                    embedding,
                })
            }
            _ => None,
        }
    }
}

fn vector_from_value(value: &Value) -> Option<Vec<f32>> {
    let items = value.as_array()?;
    if items.is_empty() {
        return None;
    }
    items.iter().map(|v| v.as_f64().map(|f| f as f32)).collect()
}

fn strings_from_value(value: Option<&Value>) -> Option<Vec<String>> {
    value?
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(String::from))
        .collect()
}
