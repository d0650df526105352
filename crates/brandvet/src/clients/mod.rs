//! Typed HTTP clients for the external evidence services.
//!
//! One client per service, constructed once at engine startup and shared
//! read-only across requests. Clients translate every transport, status,
//! and decode failure into the `TierError` taxonomy; the tier adapters
//! above them decide what a failure means for the verdict.

pub mod embedding;
pub mod kgraph;
pub mod llm;
pub mod search;
pub mod vector;
pub mod vision;

pub use embedding::EmbeddingClient;
pub use kgraph::KnowledgeGraphClient;
pub use llm::LlmClient;
pub use search::SearchClient;
pub use vector::VectorIndexClient;
pub use vision::VisionClient;

use std::time::Duration;

use brandvet_common::{EngineError, TierError};
use tracing::debug;

/// Shared user agent for all outbound calls.
const USER_AGENT: &str = concat!("brandvet/", env!("CARGO_PKG_VERSION"));

/// Cap on error-body text folded into `TierError::Api`.
const MAX_ERROR_BODY: usize = 300;

/// Build a reqwest client with the given per-request timeout.
pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, EngineError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| EngineError::Config(format!("cannot build HTTP client: {}", e)))
}

/// Map a reqwest transport error onto the tier error taxonomy.
pub(crate) fn map_transport_error(err: &reqwest::Error, budget: Duration) -> TierError {
    if err.is_timeout() {
        TierError::Timeout(budget.as_millis() as u64)
    } else {
        TierError::Network(err.to_string())
    }
}

/// Send a request, retrying once on a transient transport failure.
///
/// The retry shares the caller's budget: the client-level timeout still
/// bounds each attempt, and the orchestrator's per-tier timeout bounds the
/// pair. Non-2xx responses become `TierError::Api` with a truncated body.
pub(crate) async fn send_with_retry(
    builder: reqwest::RequestBuilder,
    budget: Duration,
) -> Result<reqwest::Response, TierError> {
    let retry = builder.try_clone();

    let response = match builder.send().await {
        Ok(response) => response,
        Err(err) => {
            let mapped = map_transport_error(&err, budget);
            let Some(retry) = retry.filter(|_| mapped.is_transient()) else {
                return Err(mapped);
            };
            debug!("Retrying after transient transport error: {}", err);
            retry
                .send()
                .await
                .map_err(|err| map_transport_error(&err, budget))?
        }
    };

    let status = response.status();
    if !status.is_success() {
        let mut body = response.text().await.unwrap_or_default();
        body.truncate(MAX_ERROR_BODY);
        return Err(TierError::Api {
            status: status.as_u16(),
            message: body,
        });
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_carries_version() {
        assert!(USER_AGENT.starts_with("brandvet/"));
        assert!(USER_AGENT.len() > "brandvet/".len());
    }
}
