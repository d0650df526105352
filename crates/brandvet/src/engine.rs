//! The validation engine.
//!
//! Owns the tier set and the configuration. Clients are constructed once
//! at startup (or injected as fakes) and shared read-only across requests;
//! every request's results are request-local.

use std::collections::HashMap;
use std::sync::Arc;

use brandvet_common::{
    EngineConfig, EngineError, TierKind, ValidationRequest, ValidationVerdict,
};
use chrono::Utc;
use tracing::{debug, info};

use crate::aggregator;
use crate::cache::EvidenceCache;
use crate::classifier;
use crate::clients::{
    EmbeddingClient, KnowledgeGraphClient, LlmClient, SearchClient, VectorIndexClient,
    VisionClient,
};
use crate::formatter;
use crate::orchestrator;
use crate::tier::EvidenceTier;
use crate::tiers::{
    AiSummaryTier, EmbeddingFallbackTier, KnowledgeGraphTier, VectorSimilarityTier,
    VisionLogoTier, WebSearchTier,
};

/// Multi-tier label validation engine.
pub struct ValidationEngine {
    config: EngineConfig,
    tiers: HashMap<TierKind, Arc<dyn EvidenceTier>>,
}

impl ValidationEngine {
    /// Build an engine from an explicit tier set (dependency injection;
    /// tests pass fakes here). Requires a valid config and exactly one
    /// provider per tier.
    pub fn new(
        config: EngineConfig,
        tiers: Vec<Arc<dyn EvidenceTier>>,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let mut by_kind: HashMap<TierKind, Arc<dyn EvidenceTier>> = HashMap::new();
        for tier in tiers {
            let kind = tier.kind();
            if by_kind.insert(kind, tier).is_some() {
                return Err(EngineError::Config(format!(
                    "duplicate provider for tier {}",
                    kind
                )));
            }
        }
        for kind in TierKind::ALL {
            if !by_kind.contains_key(&kind) {
                return Err(EngineError::Config(format!(
                    "no provider registered for tier {}",
                    kind
                )));
            }
        }

        Ok(Self {
            config,
            tiers: by_kind,
        })
    }

    /// Build an engine wired to the real external services from config.
    pub fn with_default_tiers(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let services = &config.services;
        let timeouts = &config.timeouts;

        let cache = EvidenceCache::with_capacity(config.cache.capacity).map(Arc::new);

        let tiers: Vec<Arc<dyn EvidenceTier>> = vec![
            Arc::new(VectorSimilarityTier::new(VectorIndexClient::new(
                &services.vector_endpoint,
                timeouts.for_tier(TierKind::VectorSimilarity),
            )?)),
            Arc::new(WebSearchTier::new(SearchClient::new(
                &services.search_endpoint,
                services.search_api_key.clone(),
                timeouts.for_tier(TierKind::WebSearch),
            )?)),
            Arc::new(AiSummaryTier::new(LlmClient::new(
                &services.llm_endpoint,
                &services.llm_model,
                timeouts.for_tier(TierKind::AiSummary),
            )?)),
            Arc::new(VisionLogoTier::new(VisionClient::new(
                &services.vision_endpoint,
                services.vision_api_key.clone(),
                timeouts.for_tier(TierKind::VisionLogo),
            )?)),
            Arc::new(KnowledgeGraphTier::new(
                KnowledgeGraphClient::new(
                    &services.knowledge_graph_endpoint,
                    timeouts.for_tier(TierKind::KnowledgeGraph),
                )?,
                cache.clone(),
            )),
            Arc::new(EmbeddingFallbackTier::new(
                EmbeddingClient::new(
                    &services.embedding_endpoint,
                    &services.embedding_model,
                    timeouts.for_tier(TierKind::EmbeddingFallback),
                )?,
                cache,
            )),
        ];

        Self::new(config, tiers)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate one request: fan out, aggregate, classify, format.
    ///
    /// Always returns a complete verdict when dispatch happened - even in
    /// the worst case of every tier failing, the verdict is
    /// `unclear_result` at confidence 0. The error paths are request and
    /// bookkeeping faults only.
    pub async fn validate(
        &self,
        request: ValidationRequest,
    ) -> Result<ValidationVerdict, EngineError> {
        debug!(
            "Validation started: request={} label='{}' category='{}'",
            request.id, request.candidate_label, request.category.name
        );

        let results = orchestrator::run_tiers(&self.tiers, &self.config, &request).await?;
        let evidence = aggregator::aggregate(results, &request.candidate_label, &self.config);
        let (pattern, confidence) = classifier::classify(&evidence, &self.config);
        let reasoning = formatter::build_reasoning(&evidence, pattern, &request.candidate_label);

        info!(
            "Validation complete: request={} pattern={} confidence={:.2} succeeded={} agreeing={} disagreeing={}",
            request.id,
            pattern,
            confidence,
            evidence.succeeded_count(),
            evidence.agreeing.len(),
            evidence.disagreeing.len()
        );

        Ok(ValidationVerdict {
            request_id: request.id,
            pattern,
            confidence,
            reasoning,
            evidence,
            evaluated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{unanimous_tiers, FakeTier};

    fn as_dyn(tiers: Vec<FakeTier>) -> Vec<Arc<dyn EvidenceTier>> {
        tiers
            .into_iter()
            .map(|t| Arc::new(t) as Arc<dyn EvidenceTier>)
            .collect()
    }

    #[test]
    fn test_rejects_missing_tier() {
        let mut tiers = unanimous_tiers("Nike", 0.9);
        tiers.pop();
        let err = ValidationEngine::new(EngineConfig::default(), as_dyn(tiers));
        assert!(matches!(err, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_rejects_duplicate_tier() {
        let mut tiers = unanimous_tiers("Nike", 0.9);
        tiers.push(FakeTier::succeeding(TierKind::WebSearch, "Nike", 0.5));
        let err = ValidationEngine::new(EngineConfig::default(), as_dyn(tiers));
        assert!(matches!(err, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.weights.vision_logo = 2.0;
        let err = ValidationEngine::new(config, as_dyn(unanimous_tiers("Nike", 0.9)));
        assert!(matches!(err, Err(EngineError::Config(_))));
    }
}
