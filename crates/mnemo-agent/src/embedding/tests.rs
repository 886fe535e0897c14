//! Tests for the embedding agent.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use super::*;
use crate::managed::ManagedAgent;

/// Deterministic embedder counting upstream calls.
///
/// Texts containing "cat" point one way, "car" another, everything else a
/// third, so similarity rankings are predictable.
#[derive(Default)]
struct CountingEmbedder {
    single_calls: AtomicUsize,
    batch_calls: AtomicUsize,
    batch_sizes: std::sync::Mutex<Vec<usize>>,
}

impl CountingEmbedder {
    fn vector_for(text: &str) -> Vec<f32> {
        if text.contains("cat") {
            vec![1.0, 0.1, 0.0]
        } else if text.contains("car") {
            vec![0.0, 1.0, 0.1]
        } else {
            vec![0.1, 0.0, 1.0]
        }
    }

    fn calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst) + self.batch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for CountingEmbedder {
    async fn embed(&self, text: &str) -> mnemo_memory::Result<Vec<f32>> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector_for(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> mnemo_memory::Result<Vec<Vec<f32>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.batch_sizes.lock().unwrap().push(texts.len());
        Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
    }

    fn model(&self) -> &str {
        "counting"
    }
}

fn agent() -> (Arc<CountingEmbedder>, ManagedAgent<EmbeddingAgent>) {
    let embedder = Arc::new(CountingEmbedder::default());
    let agent = ManagedAgent::new(EmbeddingAgent::new(embedder.clone()));
    (embedder, agent)
}

fn op(operation: &str) -> AgentRequest {
    AgentRequest::new("").with_parameter("operation", operation)
}

#[test]
fn test_interpret_similarity_buckets() {
    let cases = [
        (0.95, "nearly identical"),
        (0.9, "nearly identical"),
        (0.85, "very similar"),
        (0.75, "similar"),
        (0.65, "moderately similar"),
        (0.55, "somewhat similar"),
        (0.35, "slightly similar"),
        (0.1, "not similar"),
        (-0.5, "not similar"),
    ];
    for (score, label) in cases {
        assert_eq!(interpret_similarity(score), label, "{score}");
    }
}

#[tokio::test]
async fn test_generate_twice_hits_cache() {
    let (embedder, agent) = agent();
    let request = AgentRequest::new("a cat on a mat");

    let first = agent.execute(&request).await;
    let second = agent.execute(&request).await;

    assert!(first.success && second.success);
    assert_eq!(first.data.as_ref().unwrap()["cached"], false);
    assert_eq!(second.data.as_ref().unwrap()["cached"], true);
    assert_eq!(second.data.as_ref().unwrap()["dimensions"], 3);
    assert_eq!(embedder.calls(), 1);
}

#[tokio::test]
async fn test_generate_requires_text() {
    let (embedder, agent) = agent();
    let response = agent.execute(&AgentRequest::new("   ")).await;
    assert!(!response.success);
    assert!(response.error_message().contains("required"));
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn test_similarity_from_vectors() {
    let (embedder, agent) = agent();
    let response = agent
        .execute(
            &op("similarity")
                .with_parameter("vec1", json!([1.0, 0.0]))
                .with_parameter("vec2", json!([1.0, 0.0])),
        )
        .await;
    let data = response.data.unwrap();
    assert!((data["similarity"].as_f64().unwrap() - 1.0).abs() < 1e-6);
    assert_eq!(data["interpretation"], "nearly identical");
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn test_similarity_from_texts_and_zero_vector() {
    let (_, agent) = agent();
    let response = agent
        .execute(
            &op("similarity")
                .with_parameter("text1", "a cat")
                .with_parameter("text2", "a fast car"),
        )
        .await;
    assert!(response.success);
    assert_eq!(response.data.unwrap()["interpretation"], "not similar");

    let response = agent
        .execute(
            &op("similarity")
                .with_parameter("vec1", json!([0.0, 0.0]))
                .with_parameter("vec2", json!([1.0, 2.0])),
        )
        .await;
    assert_eq!(response.data.unwrap()["similarity"], 0.0);
}

#[tokio::test]
async fn test_similarity_needs_two_inputs() {
    let (_, agent) = agent();
    let response = agent
        .execute(&op("similarity").with_parameter("text1", "only one"))
        .await;
    assert!(!response.success);
    assert_eq!(
        response.error_message(),
        "Two texts or embeddings required for similarity"
    );
}

#[tokio::test]
async fn test_batch_generate_single_call_for_misses() {
    let (embedder, agent) = agent();
    agent.execute(&AgentRequest::new("the cat")).await;
    assert_eq!(embedder.calls(), 1);

    let response = agent
        .execute(
            &op("batch_generate")
                .with_parameter("texts", json!(["the cat", "red car", "blue sky", "red car"])),
        )
        .await;
    assert!(response.success);

    let data = response.data.unwrap();
    assert_eq!(data["total_count"], 4);
    assert_eq!(data["cached_count"], 1);
    let embeddings = data["embeddings"].as_array().unwrap();
    assert_eq!(embeddings[0]["text"], "the cat");
    assert_eq!(embeddings[0]["cached"], true);
    assert_eq!(
        embeddings[1]["embedding"],
        json!(CountingEmbedder::vector_for("red car"))
    );
    assert_eq!(embeddings[3]["embedding"], embeddings[1]["embedding"]);

    assert_eq!(embedder.batch_calls.load(Ordering::SeqCst), 1);
    // duplicates are sent once
    assert_eq!(*embedder.batch_sizes.lock().unwrap(), vec![2]);
}

#[tokio::test]
async fn test_batch_generate_all_cached_skips_upstream() {
    let (embedder, agent) = agent();
    let request = op("batch_generate").with_parameter("texts", json!(["x", "y"]));
    agent.execute(&request).await;
    agent.execute(&request).await;

    assert_eq!(embedder.batch_calls.load(Ordering::SeqCst), 1);
    let data = agent.execute(&request).await.data.unwrap();
    assert_eq!(data["cached_count"], 2);
}

#[tokio::test]
async fn test_batch_generate_requires_texts() {
    let (_, agent) = agent();
    let response = agent.execute(&op("batch_generate")).await;
    assert_eq!(response.error_message(), "Texts array required");
}

#[tokio::test]
async fn test_find_similar_ranks_candidates() {
    let (embedder, agent) = agent();
    let response = agent
        .execute(
            &op("find_similar")
                .with_parameter("query", "my cat")
                .with_parameter(
                    "candidates",
                    json!([
                        {"id": "m1", "text": "a red car"},
                        {"id": "m2", "text": "precomputed", "embedding": [1.0, 0.1, 0.0]},
                        "the weather",
                        {"id": "m4", "text": "cat food"},
                    ]),
                ),
        )
        .await;
    assert!(response.success, "{:?}", response.error);

    let data = response.data.unwrap();
    let results = data["results"].as_array().unwrap();
    assert_eq!(results.len(), 4);
    assert_eq!(data["total_candidates"], 4);

    // m2 and m4 tie at 1.0; ties keep candidate order
    assert_eq!(results[0]["id"], "m2");
    assert_eq!(results[1]["id"], "m4");
    assert_eq!(data["top_match"]["id"], "m2");
    let scores: Vec<f64> = results
        .iter()
        .map(|r| r["similarity"].as_f64().unwrap())
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));

    // one call for the query, one batch for the three candidates without vectors
    assert_eq!(embedder.single_calls.load(Ordering::SeqCst), 1);
    assert_eq!(embedder.batch_calls.load(Ordering::SeqCst), 1);
    assert_eq!(*embedder.batch_sizes.lock().unwrap(), vec![3]);
}

#[tokio::test]
async fn test_find_similar_requires_candidates() {
    let (_, agent) = agent();
    let response = agent
        .execute(&op("find_similar").with_parameter("query", "cat"))
        .await;
    assert_eq!(response.error_message(), "Candidates required");
}

#[tokio::test]
async fn test_cache_stats_and_clear() {
    let embedder = Arc::new(CountingEmbedder::default());
    let agent = ManagedAgent::new(EmbeddingAgent::with_cache_size(embedder.clone(), 2));

    for text in ["one", "two", "three"] {
        agent.execute(&AgentRequest::new(text)).await;
    }
    let stats = agent.execute(&op("cache_stats")).await.data.unwrap();
    assert_eq!(stats, json!({"entries": 2, "capacity": 2}));

    let cleared = agent.execute(&op("clear_cache")).await.data.unwrap();
    assert_eq!(cleared["cleared"], 2);

    agent.execute(&AgentRequest::new("one")).await;
    assert_eq!(embedder.calls(), 4);
}

#[tokio::test]
async fn test_unknown_operation() {
    let (_, agent) = agent();
    let response = agent.execute(&op("teleport")).await;
    assert_eq!(response.error_message(), "unsupported operation: teleport");
}

#[tokio::test]
async fn test_can_handle_and_health() {
    let (_, agent) = agent();
    assert!(agent.can_handle(&AgentRequest::new("semantic lookup")));
    assert!(!agent.can_handle(&AgentRequest::new("delete record")));

    let health = agent.health_check().await;
    assert!(health.healthy);
    assert_eq!(health.details.unwrap()["model"], "counting");
}
