//! Knowledge-graph tier.
//!
//! Structured entity lookup on the candidate label. When the graph knows
//! the entity - under its canonical name or an alias - this is the
//! highest-trust confirmation the engine has. Lookups are deterministic,
//! so successful results go through the shared evidence cache.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use brandvet_common::{label, EvidencePayload, TierKind, TierResult, ValidationRequest};

use crate::cache::EvidenceCache;
use crate::clients::KnowledgeGraphClient;
use crate::tier::{fold_error, EvidenceTier};

pub struct KnowledgeGraphTier {
    client: KnowledgeGraphClient,
    cache: Option<Arc<EvidenceCache>>,
}

impl KnowledgeGraphTier {
    pub fn new(client: KnowledgeGraphClient, cache: Option<Arc<EvidenceCache>>) -> Self {
        Self { client, cache }
    }
}

#[async_trait]
impl EvidenceTier for KnowledgeGraphTier {
    fn kind(&self) -> TierKind {
        TierKind::KnowledgeGraph
    }

    async fn evaluate(&self, request: &ValidationRequest, _images: &[String]) -> TierResult {
        let started = Instant::now();
        let cache_key = EvidenceCache::key(
            self.kind(),
            &[&label::normalize(&request.candidate_label)],
        );

        if let Some(cache) = &self.cache {
            if let Some(mut hit) = cache.get(&cache_key) {
                hit.latency_ms = started.elapsed().as_millis() as u64;
                return hit;
            }
        }

        let result = match self.client.lookup(&request.candidate_label).await {
            Ok(Some(entity)) => {
                let latency = started.elapsed().as_millis() as u64;
                // Propose the candidate itself when the graph confirms it
                // (canonical name or alias); otherwise surface the graph's
                // different opinion.
                let label = if label::matches_any(
                    &request.candidate_label,
                    &entity.name,
                    &entity.aliases,
                ) {
                    request.candidate_label.clone()
                } else {
                    entity.name.clone()
                };
                let confidence = entity.score;
                TierResult::succeeded(
                    self.kind(),
                    EvidencePayload::Entity { entity },
                    Some(label),
                    confidence,
                    latency,
                )
            }
            Ok(None) => {
                // Obscure brands legitimately come back empty.
                let latency = started.elapsed().as_millis() as u64;
                TierResult::succeeded(self.kind(), EvidencePayload::Empty, None, 0.0, latency)
            }
            Err(err) => fold_error(self.kind(), err, started.elapsed().as_millis() as u64),
        };

        if let Some(cache) = &self.cache {
            cache.put(cache_key, &result);
        }

        result
    }
}
