//! Knowledge-graph client - structured entity lookup.

use std::time::Duration;

use brandvet_common::{EngineError, EntityRecord, TierError};
use serde::Deserialize;

use super::{build_http_client, send_with_retry};

/// Client for the structured knowledge-graph lookup service.
pub struct KnowledgeGraphClient {
    endpoint: String,
    http: reqwest::Client,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    entities: Vec<EntityDto>,
}

#[derive(Debug, Deserialize)]
struct EntityDto {
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    score: f64,
}

impl KnowledgeGraphClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, EngineError> {
        Ok(Self {
            endpoint: endpoint.into(),
            http: build_http_client(timeout)?,
            timeout,
        })
    }

    /// Look up the best entity for a name, if the graph knows one.
    ///
    /// Obscure brands legitimately return nothing; that is a successful
    /// empty lookup, not an error.
    pub async fn lookup(&self, name: &str) -> Result<Option<EntityRecord>, TierError> {
        let response = send_with_retry(
            self.http
                .get(format!("{}/entities", self.endpoint))
                .query(&[("query", name), ("limit", "1")]),
            self.timeout,
        )
        .await?;

        let parsed: LookupResponse = response
            .json()
            .await
            .map_err(|e| TierError::Parse(format!("knowledge graph response: {}", e)))?;

        Ok(parsed.entities.into_iter().next().map(|e| EntityRecord {
            name: e.name,
            aliases: e.aliases,
            score: e.score.clamp(0.0, 1.0),
        }))
    }
}
