//! Vision-logo tier.
//!
//! Classifies logos across the discovered image URLs and proposes the
//! highest-confidence read. Runs in phase two; with no images it reports
//! `Skipped` without calling out.

use std::time::Instant;

use async_trait::async_trait;

use brandvet_common::{EvidencePayload, TierKind, TierResult, ValidationRequest};

use crate::clients::VisionClient;
use crate::tier::{fold_error, EvidenceTier};

pub struct VisionLogoTier {
    client: VisionClient,
}

impl VisionLogoTier {
    pub fn new(client: VisionClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EvidenceTier for VisionLogoTier {
    fn kind(&self) -> TierKind {
        TierKind::VisionLogo
    }

    async fn evaluate(&self, _request: &ValidationRequest, images: &[String]) -> TierResult {
        if images.is_empty() {
            return TierResult::skipped(self.kind(), "no image URLs available");
        }

        let started = Instant::now();

        match self.client.classify(images).await {
            Ok(reads) => {
                let latency = started.elapsed().as_millis() as u64;
                let best = reads
                    .iter()
                    .max_by(|a, b| {
                        a.confidence
                            .partial_cmp(&b.confidence)
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .cloned();
                let (label, confidence) = match best {
                    Some(read) => (Some(read.label), read.confidence),
                    None => (None, 0.0),
                };
                TierResult::succeeded(
                    self.kind(),
                    EvidencePayload::LogoReads { reads },
                    label,
                    confidence,
                    latency,
                )
            }
            Err(err) => fold_error(self.kind(), err, started.elapsed().as_millis() as u64),
        }
    }
}
