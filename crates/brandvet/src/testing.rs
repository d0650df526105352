//! Fake tiers for deterministic testing.
//!
//! No network, no clocks beyond optional artificial delays. Production
//! code injects real adapters; tests inject these and assert on call
//! counts and verdicts. Exported so downstream callers can drive the
//! engine in their own tests too.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use brandvet_common::{EvidencePayload, TierError, TierKind, TierResult, ValidationRequest};

use crate::tier::EvidenceTier;

/// A tier with a pre-configured result.
///
/// Honors the image contract of the real adapters: image-dependent kinds
/// report `Skipped` on an empty image list without counting a call.
pub struct FakeTier {
    kind: TierKind,
    result: TierResult,
    delay: Option<Duration>,
    calls: Arc<Mutex<usize>>,
}

impl FakeTier {
    /// A tier that succeeds with the given label and confidence.
    pub fn succeeding(kind: TierKind, label: &str, confidence: f64) -> Self {
        Self::from_result(TierResult::succeeded(
            kind,
            EvidencePayload::Empty,
            Some(label.to_string()),
            confidence,
            5,
        ))
    }

    /// A tier that succeeds with an explicit payload.
    pub fn succeeding_with_payload(
        kind: TierKind,
        label: &str,
        confidence: f64,
        payload: EvidencePayload,
    ) -> Self {
        Self::from_result(TierResult::succeeded(
            kind,
            payload,
            Some(label.to_string()),
            confidence,
            5,
        ))
    }

    /// A tier that succeeds without proposing a label.
    pub fn silent(kind: TierKind, confidence: f64) -> Self {
        Self::from_result(TierResult::succeeded(
            kind,
            EvidencePayload::Empty,
            None,
            confidence,
            5,
        ))
    }

    /// A tier that fails with a network error description.
    pub fn failing(kind: TierKind, message: &str) -> Self {
        Self::from_result(TierResult::failed(
            kind,
            &TierError::Network(message.to_string()),
            5,
        ))
    }

    /// Build a fake around any pre-made result.
    pub fn from_result(result: TierResult) -> Self {
        Self {
            kind: result.kind,
            result,
            delay: None,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Delay the response, for timeout and deadline tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Handle on the call counter; a skip does not count as a call.
    pub fn call_counter(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl EvidenceTier for FakeTier {
    fn kind(&self) -> TierKind {
        self.kind
    }

    async fn evaluate(&self, _request: &ValidationRequest, images: &[String]) -> TierResult {
        if self.kind.requires_images() && images.is_empty() {
            return TierResult::skipped(self.kind, "no image URLs available");
        }

        *self.calls.lock().unwrap() += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.result.clone()
    }
}

/// One succeeding fake per tier, all proposing the same label.
pub fn unanimous_tiers(label: &str, confidence: f64) -> Vec<FakeTier> {
    TierKind::ALL
        .into_iter()
        .map(|kind| FakeTier::succeeding(kind, label, confidence))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandvet_common::{CategoryContext, TierStatus};

    fn request() -> ValidationRequest {
        ValidationRequest::new(
            "Nike",
            "I bought Nike shoes",
            CategoryContext::new("sportswear", vec![]),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_fake_returns_configured_result() {
        let fake = FakeTier::succeeding(TierKind::KnowledgeGraph, "Nike", 0.93);
        let result = fake.evaluate(&request(), &[]).await;
        assert_eq!(result.status, TierStatus::Succeeded);
        assert_eq!(result.label.as_deref(), Some("Nike"));
        assert_eq!(result.confidence, Some(0.93));
    }

    #[tokio::test]
    async fn test_fake_honors_image_contract() {
        let fake = FakeTier::succeeding(TierKind::VisionLogo, "Nike", 1.0);
        let counter = fake.call_counter();

        let skipped = fake.evaluate(&request(), &[]).await;
        assert_eq!(skipped.status, TierStatus::Skipped);
        assert_eq!(*counter.lock().unwrap(), 0);

        let ran = fake
            .evaluate(&request(), &["https://img.example/a.png".into()])
            .await;
        assert_eq!(ran.status, TierStatus::Succeeded);
        assert_eq!(*counter.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failing_fake() {
        let fake = FakeTier::failing(TierKind::WebSearch, "connection refused");
        let result = fake.evaluate(&request(), &[]).await;
        assert_eq!(result.status, TierStatus::Failed);
        assert!(result.error.as_deref().unwrap().contains("connection refused"));
    }
}
