//! Vector index client - top-k label similarity lookup.

use std::time::Duration;

use brandvet_common::{EngineError, LabelMatch, TierError};
use serde::Deserialize;

use super::{build_http_client, send_with_retry};

/// Client for the label vector index service.
pub struct VectorIndexClient {
    endpoint: String,
    http: reqwest::Client,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    matches: Vec<MatchDto>,
}

#[derive(Debug, Deserialize)]
struct MatchDto {
    label: String,
    score: f64,
}

impl VectorIndexClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, EngineError> {
        Ok(Self {
            endpoint: endpoint.into(),
            http: build_http_client(timeout)?,
            timeout,
        })
    }

    /// Query the index for the labels most similar to `query`.
    pub async fn top_matches(&self, query: &str, k: usize) -> Result<Vec<LabelMatch>, TierError> {
        let body = serde_json::json!({
            "query": query,
            "top_k": k,
        });

        let response = send_with_retry(
            self.http
                .post(format!("{}/search", self.endpoint))
                .json(&body),
            self.timeout,
        )
        .await?;

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| TierError::Parse(format!("vector index response: {}", e)))?;

        Ok(parsed
            .matches
            .into_iter()
            .map(|m| LabelMatch {
                label: m.label,
                score: m.score.clamp(0.0, 1.0),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_decoding() {
        let raw = r#"{"matches":[{"label":"Nike","score":0.91},{"label":"Adidas","score":0.44}]}"#;
        let parsed: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.matches.len(), 2);
        assert_eq!(parsed.matches[0].label, "Nike");
    }

    #[test]
    fn test_response_tolerates_missing_matches() {
        let parsed: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.matches.is_empty());
    }
}
