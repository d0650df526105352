//! Vector-similarity tier.
//!
//! Queries the label vector index with the candidate label and proposes the
//! top match. A near-synonym in the index will surface here with a high
//! score, which is exactly why this tier alone is not trusted to validate.

use std::time::Instant;

use async_trait::async_trait;

use brandvet_common::{EvidencePayload, TierKind, TierResult, ValidationRequest};

use crate::clients::VectorIndexClient;
use crate::tier::{fold_error, EvidenceTier};

const TOP_K: usize = 5;

pub struct VectorSimilarityTier {
    client: VectorIndexClient,
}

impl VectorSimilarityTier {
    pub fn new(client: VectorIndexClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EvidenceTier for VectorSimilarityTier {
    fn kind(&self) -> TierKind {
        TierKind::VectorSimilarity
    }

    async fn evaluate(&self, request: &ValidationRequest, _images: &[String]) -> TierResult {
        let started = Instant::now();

        match self.client.top_matches(&request.candidate_label, TOP_K).await {
            Ok(matches) => {
                let latency = started.elapsed().as_millis() as u64;
                let top = matches.first().cloned();
                let (label, confidence) = match top {
                    Some(m) => (Some(m.label), m.score),
                    None => (None, 0.0),
                };
                TierResult::succeeded(
                    self.kind(),
                    EvidencePayload::Matches { matches },
                    label,
                    confidence,
                    latency,
                )
            }
            Err(err) => fold_error(self.kind(), err, started.elapsed().as_millis() as u64),
        }
    }
}
