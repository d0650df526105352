//! Embedding-fallback tier.
//!
//! Embeds the response text and every label admissible for the category
//! (candidate included), then proposes the label whose embedding sits
//! nearest the text. Catches the cases the structured lookups miss:
//! obscure brands, misspellings, responses that describe a product rather
//! than naming it.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use brandvet_common::{
    label, EvidencePayload, LabelMatch, TierError, TierKind, TierResult, ValidationRequest,
};

use crate::cache::EvidenceCache;
use crate::clients::embedding::cosine_similarity;
use crate::clients::EmbeddingClient;
use crate::tier::{fold_error, EvidenceTier};

pub struct EmbeddingFallbackTier {
    client: EmbeddingClient,
    cache: Option<Arc<EvidenceCache>>,
}

impl EmbeddingFallbackTier {
    pub fn new(client: EmbeddingClient, cache: Option<Arc<EvidenceCache>>) -> Self {
        Self { client, cache }
    }

    /// Candidate plus allowed labels, deduplicated after normalization.
    fn comparison_labels(request: &ValidationRequest) -> Vec<String> {
        let mut labels = vec![request.candidate_label.clone()];
        for allowed in &request.category.allowed_labels {
            if !labels.iter().any(|l| label::labels_match(l, allowed)) {
                labels.push(allowed.clone());
            }
        }
        labels
    }

    async fn rank_labels(
        &self,
        request: &ValidationRequest,
    ) -> Result<Vec<LabelMatch>, TierError> {
        let text_embedding = self.client.embed(request.effective_text()).await?;

        let mut matches = Vec::new();
        for candidate in Self::comparison_labels(request) {
            let label_embedding = self.client.embed(&candidate).await?;
            let score = cosine_similarity(&text_embedding, &label_embedding).clamp(0.0, 1.0);
            matches.push(LabelMatch {
                label: candidate,
                score,
            });
        }

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(matches)
    }
}

#[async_trait]
impl EvidenceTier for EmbeddingFallbackTier {
    fn kind(&self) -> TierKind {
        TierKind::EmbeddingFallback
    }

    async fn evaluate(&self, request: &ValidationRequest, _images: &[String]) -> TierResult {
        let started = Instant::now();
        let cache_key = EvidenceCache::key(
            self.kind(),
            &[
                &label::normalize(&request.candidate_label),
                request.effective_text(),
            ],
        );

        if let Some(cache) = &self.cache {
            if let Some(mut hit) = cache.get(&cache_key) {
                hit.latency_ms = started.elapsed().as_millis() as u64;
                return hit;
            }
        }

        let result = match self.rank_labels(request).await {
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
        };

        if let Some(cache) = &self.cache {
            cache.put(cache_key, &result);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandvet_common::CategoryContext;

    #[test]
    fn test_comparison_labels_dedupe_candidate() {
        let request = ValidationRequest::new(
            "Nike",
            "I bought Nike shoes",
            CategoryContext::new(
                "sportswear",
                vec!["nike, inc.".into(), "Adidas".into()],
            ),
        )
        .unwrap();

        let labels = EmbeddingFallbackTier::comparison_labels(&request);
        assert_eq!(labels, vec!["Nike".to_string(), "Adidas".to_string()]);
    }

    #[test]
    fn test_comparison_labels_without_allowed_list() {
        let request = ValidationRequest::new(
            "Obscure Brand",
            "loved it",
            CategoryContext::new("misc", vec![]),
        )
        .unwrap();

        let labels = EmbeddingFallbackTier::comparison_labels(&request);
        assert_eq!(labels, vec!["Obscure Brand".to_string()]);
    }
}
