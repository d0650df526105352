//! Web search client.
//!
//! Search APIs return snippets with embedded markup; snippets are run
//! through `html2text` so downstream matching sees clean text.

use std::time::Duration;

use brandvet_common::{EngineError, SearchHit, TierError};
use serde::Deserialize;

use super::{build_http_client, send_with_retry};

const SNIPPET_WIDTH: usize = 200;

/// Client for the general web search service.
pub struct SearchClient {
    endpoint: String,
    api_key: Option<String>,
    http: reqwest::Client,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<HitDto>,
}

#[derive(Debug, Deserialize)]
struct HitDto {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    images: Vec<String>,
}

impl SearchClient {
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

    /// Run a web search and return sanitized hits.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, TierError> {
        let mut builder = self
            .http
            .get(format!("{}/search", self.endpoint))
            .query(&[("q", query), ("limit", &limit.to_string())]);
        if let Some(key) = &self.api_key {
            builder = builder.header("X-API-Key", key);
        }

        let response = send_with_retry(builder, self.timeout).await?;

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| TierError::Parse(format!("search response: {}", e)))?;

        Ok(parsed
            .results
            .into_iter()
            .map(|hit| SearchHit {
                title: sanitize_snippet(&hit.title),
                snippet: sanitize_snippet(&hit.snippet),
                url: hit.url,
                image_urls: hit.images,
            })
            .collect())
    }
}

/// Strip markup from a search snippet.
fn sanitize_snippet(raw: &str) -> String {
    if !raw.contains('<') {
        return raw.trim().to_string();
    }
    html2text::from_read(raw.as_bytes(), SNIPPET_WIDTH)
        .trim()
        .to_string()
}
