//! LLM client for the AI summarizer tier (Ollama-compatible API).

use std::time::Duration;

use brandvet_common::{EngineError, LlmJudgment, TierError};
use serde::Deserialize;

use super::{build_http_client, send_with_retry};

/// Client for an Ollama-compatible generate endpoint.
pub struct LlmClient {
    endpoint: String,
    model: String,
    http: reqwest::Client,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// The strict JSON answer the summarizer prompt demands.
#[derive(Debug, Deserialize)]
struct JudgmentDto {
    label: String,
    confidence: f64,
    #[serde(default)]
    rationale: String,
}

impl LlmClient {
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

    /// Run the prompt and parse the model's JSON judgment.
    pub async fn judge(&self, prompt: &str) -> Result<LlmJudgment, TierError> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "format": "json",
        });

        let response = send_with_retry(
            self.http
                .post(format!("{}/api/generate", self.endpoint))
                .json(&body),
            self.timeout,
        )
        .await?;

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| TierError::Parse(format!("generate response: {}", e)))?;

        let judgment: JudgmentDto = serde_json::from_str(generated.response.trim())
            .map_err(|e| TierError::Parse(format!("model judgment JSON: {}", e)))?;

        if judgment.label.trim().is_empty() {
            return Err(TierError::Parse("model judgment has empty label".into()));
        }

        Ok(LlmJudgment {
            label: judgment.label,
            confidence: judgment.confidence.clamp(0.0, 1.0),
            rationale: judgment.rationale,
        })
    }
}
