//! Embedding client for the fallback tier (Ollama-compatible API).

use std::time::Duration;

use brandvet_common::{EngineError, TierError};
use serde::Deserialize;

use super::{build_http_client, send_with_retry};

/// Client for an Ollama-compatible embeddings endpoint.
pub struct EmbeddingClient {
    endpoint: String,
    model: String,
    http: reqwest::Client,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f64>,
}

impl EmbeddingClient {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            endpoint: endpoint.into(),
            model: model.into(),
            http: build_http_client(timeout)?,
            timeout,
        })
    }

    /// Embed a single text.
    pub async fn embed(&self, text: &str) -> Result<Vec<f64>, TierError> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": text,
        });

        let response = send_with_retry(
            self.http
                .post(format!("{}/api/embeddings", self.endpoint))
                .json(&body),
            self.timeout,
        )
        .await?;

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| TierError::Parse(format!("embedding response: {}", e)))?;

        if parsed.embedding.is_empty() {
            return Err(TierError::Parse("embedding response has no vector".into()));
        }

        Ok(parsed.embedding)
    }
}

/// Cosine similarity between two vectors, 0 when either has no magnitude
/// or the dimensions disagree.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
