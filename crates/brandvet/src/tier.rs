//! The evidence tier contract.
//!
//! Production code uses the adapters in [`crate::tiers`], each wrapping one
//! external service client. Test code uses [`crate::testing::FakeTier`]
//! with pre-configured results. The orchestrator only ever sees this trait.

use async_trait::async_trait;

use brandvet_common::{TierError, TierKind, TierResult, ValidationRequest};

/// One independent evidence provider.
///
/// `evaluate` must never panic or error past its own boundary: any internal
/// failure is folded into a `TierResult` with status `Failed` or
/// `TimedOut`. Image-dependent tiers receive the URLs discovered by web
/// search (merged with the request's known URLs) and must return `Skipped`
/// without any network call when the list is empty.
#[async_trait]
pub trait EvidenceTier: Send + Sync {
    /// Which tier this provider implements.
    fn kind(&self) -> TierKind;

    /// Produce this tier's evidence for one request.
    async fn evaluate(&self, request: &ValidationRequest, images: &[String]) -> TierResult;
}

/// Fold a client-level error into the tier's terminal result.
///
/// A client-side timeout keeps its own status so operators can tell
/// "provider too slow" from "provider broken" in the breakdown.
pub(crate) fn fold_error(kind: TierKind, err: TierError, latency_ms: u64) -> TierResult {
    match err {
        TierError::Timeout(budget_ms) => TierResult::timed_out(kind, budget_ms),
        other => TierResult::failed(kind, &other, latency_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandvet_common::TierStatus;

    #[test]
    fn test_fold_timeout_keeps_timeout_status() {
        let result = fold_error(TierKind::VisionLogo, TierError::Timeout(12_000), 12_000);
        assert_eq!(result.status, TierStatus::TimedOut);
    }

    #[test]
    fn test_fold_api_error_is_failed() {
        let err = TierError::Api {
            status: 429,
            message: "rate limited".into(),
        };
        let result = fold_error(TierKind::WebSearch, err, 140);
        assert_eq!(result.status, TierStatus::Failed);
        assert!(result.error.as_deref().unwrap().contains("429"));
    }
}
