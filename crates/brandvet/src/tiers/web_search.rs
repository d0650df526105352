//! Web-search tier.
//!
//! The least trusted evidence source, but the only one that discovers
//! image URLs for the two dependent tiers. Confidence comes from how many
//! of the top hits actually mention the candidate label; free-text search
//! is capped below certainty no matter how unanimous the hits are.

use std::time::Instant;

use async_trait::async_trait;

use brandvet_common::{label, EvidencePayload, SearchHit, TierKind, TierResult, ValidationRequest};

use crate::clients::SearchClient;
use crate::tier::{fold_error, EvidenceTier};

const HIT_LIMIT: usize = 10;

/// Ceiling on web-search confidence.
const MAX_CONFIDENCE: f64 = 0.9;

/// Mention ratio at which the tier commits to proposing the candidate.
const PROPOSAL_RATIO: f64 = 0.3;

/// Cap on image URLs forwarded to the dependent tiers.
const MAX_IMAGE_URLS: usize = 8;

pub struct WebSearchTier {
    client: SearchClient,
}

impl WebSearchTier {
    pub fn new(client: SearchClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EvidenceTier for WebSearchTier {
    fn kind(&self) -> TierKind {
        TierKind::WebSearch
    }

    async fn evaluate(&self, request: &ValidationRequest, _images: &[String]) -> TierResult {
        let started = Instant::now();
        let query = format!(
            "\"{}\" {}",
            request.candidate_label, request.category.name
        );

        match self.client.search(&query, HIT_LIMIT).await {
            Ok(hits) => {
                let latency = started.elapsed().as_millis() as u64;
                let ratio = mention_ratio(&hits, &request.candidate_label);
                let image_urls = collect_image_urls(&hits);

                let label = if ratio >= PROPOSAL_RATIO {
                    Some(request.candidate_label.clone())
                } else {
                    None
                };

                TierResult::succeeded(
                    self.kind(),
                    EvidencePayload::SearchHits { hits, image_urls },
                    label,
                    MAX_CONFIDENCE * ratio,
                    latency,
                )
            }
            Err(err) => fold_error(self.kind(), err, started.elapsed().as_millis() as u64),
        }
    }
}

/// Fraction of hits whose title or snippet mentions the candidate label.
fn mention_ratio(hits: &[SearchHit], candidate: &str) -> f64 {
    if hits.is_empty() {
        return 0.0;
    }
    let needle = label::normalize(candidate);
    if needle.is_empty() {
        return 0.0;
    }
    let mentions = hits
        .iter()
        .filter(|hit| {
            let haystack = label::normalize(&format!("{} {}", hit.title, hit.snippet));
            haystack.contains(&needle)
        })
        .count();
    mentions as f64 / hits.len() as f64
}

/// Deduplicated image URLs across hits, in discovery order.
fn collect_image_urls(hits: &[SearchHit]) -> Vec<String> {
    let mut seen = Vec::new();
    for hit in hits {
        for url in &hit.image_urls {
            if seen.len() == MAX_IMAGE_URLS {
                return seen;
            }
            if !seen.contains(url) {
                seen.push(url.clone());
            }
        }
    }
    seen
}
