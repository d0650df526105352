//! Vision classifier client - logo/brand reads over image URLs.

use std::time::Duration;

use brandvet_common::{EngineError, LogoRead, TierError};
use serde::Deserialize;

use super::{build_http_client, send_with_retry};

/// Client for the vision logo classification service.
pub struct VisionClient {
    endpoint: String,
    api_key: Option<String>,
    http: reqwest::Client,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    #[serde(default)]
    predictions: Vec<PredictionDto>,
}

#[derive(Debug, Deserialize)]
struct PredictionDto {
    label: String,
    confidence: f64,
    #[serde(default)]
    image_url: String,
}

impl VisionClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            endpoint: endpoint.into(),
            api_key,
            http: build_http_client(timeout)?,
            timeout,
        })
    }

    /// Classify logos across the given image URLs.
    pub async fn classify(&self, image_urls: &[String]) -> Result<Vec<LogoRead>, TierError> {
        let body = serde_json::json!({ "image_urls": image_urls });

        let mut builder = self
            .http
            .post(format!("{}/classify", self.endpoint))
            .json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = send_with_retry(builder, self.timeout).await?;

        let parsed: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| TierError::Parse(format!("vision response: {}", e)))?;

        Ok(parsed
            .predictions
            .into_iter()
            .map(|p| LogoRead {
                label: p.label,
                confidence: p.confidence.clamp(0.0, 1.0),
                image_url: p.image_url,
            })
            .collect())
    }
}
