//! Tier orchestration.
//!
//! Runs all six tiers with maximum applicable parallelism: phase one
//! spawns at t=0, phase two spawns the moment the web-search result lands,
//! alongside whatever phase-one tiers are still in flight. Each tier gets
//! its own timeout; the request as a whole gets a global deadline. A tier
//! failing, timing out, or being skipped never aborts the request -
//! absence of evidence is input to the aggregator, not an error.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use brandvet_common::{EngineConfig, EngineError, TierKind, TierResult, ValidationRequest};
use tokio::task::JoinSet;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, warn};

use crate::plan::ExecutionPlan;
use crate::tier::EvidenceTier;

/// Execute the plan and return one result per tier, in canonical order.
///
/// The only error path is a bookkeeping fault (a panicked tier task);
/// provider failures of any kind come back as `TierResult`s.
pub async fn run_tiers(
    tiers: &HashMap<TierKind, Arc<dyn EvidenceTier>>,
    config: &EngineConfig,
    request: &ValidationRequest,
) -> Result<Vec<TierResult>, EngineError> {
    let plan = ExecutionPlan::standard();
    let deadline = Instant::now() + config.timeouts.global_deadline();
    let request = Arc::new(request.clone());

    let mut inflight: JoinSet<(TierKind, TierResult)> = JoinSet::new();
    for &kind in &plan.phase_one {
        spawn_tier(
            &mut inflight,
            tier_for(tiers, kind)?,
            Arc::clone(&request),
            config.timeouts.for_tier(kind),
            request.known_image_urls.clone(),
        );
    }

    let mut collected: HashMap<TierKind, TierResult> = HashMap::new();
    let mut phase_two_started = false;

    while collected.len() < plan.total_tiers() {
        match timeout_at(deadline, inflight.join_next()).await {
            Ok(Some(Ok((kind, result)))) => {
                if kind == plan.trigger && !phase_two_started {
                    phase_two_started = true;
                    let images = merged_image_urls(&request, &result);
                    debug!(
                        "Trigger tier resolved with {} image URLs, starting phase two",
                        images.len()
                    );
                    for &dependent in &plan.phase_two {
                        spawn_tier(
                            &mut inflight,
                            tier_for(tiers, dependent)?,
                            Arc::clone(&request),
                            config.timeouts.for_tier(dependent),
                            images.clone(),
                        );
                    }
                }
                collected.insert(kind, result);
            }
            Ok(Some(Err(join_err))) => {
                // A tier task panicked: that is our bug, not evidence.
                inflight.abort_all();
                return Err(EngineError::Internal(format!(
                    "tier task failed: {}",
                    join_err
                )));
            }
            Ok(None) => break,
            Err(_) => {
                // Global deadline. Cancel what is still in flight and keep
                // everything that finished.
                warn!(
                    "Global deadline hit for request {} with {} of {} tiers finished",
                    request.id,
                    collected.len(),
                    plan.total_tiers()
                );
                inflight.abort_all();
                break;
            }
        }
    }

    let deadline_ms = config.timeouts.global_deadline().as_millis() as u64;
    let mut results: Vec<TierResult> = plan
        .all_tiers()
        .map(|kind| {
            collected
                .remove(&kind)
                .unwrap_or_else(|| TierResult::timed_out(kind, deadline_ms))
        })
        .collect();
    results.sort_by_key(|r| r.kind);

    Ok(results)
}

fn tier_for(
    tiers: &HashMap<TierKind, Arc<dyn EvidenceTier>>,
    kind: TierKind,
) -> Result<Arc<dyn EvidenceTier>, EngineError> {
    tiers
        .get(&kind)
        .cloned()
        .ok_or_else(|| EngineError::Internal(format!("no provider registered for {}", kind)))
}

/// Spawn one tier under its own timeout. The wrapper always yields a
/// result: the provider's own, or `TimedOut` when its budget elapses.
fn spawn_tier(
    inflight: &mut JoinSet<(TierKind, TierResult)>,
    tier: Arc<dyn EvidenceTier>,
    request: Arc<ValidationRequest>,
    budget: Duration,
    images: Vec<String>,
) {
    inflight.spawn(async move {
        let kind = tier.kind();
        let result = match timeout(budget, tier.evaluate(&request, &images)).await {
            Ok(result) => result,
            Err(_) => TierResult::timed_out(kind, budget.as_millis() as u64),
        };
        debug!(
            "Tier {} resolved: status={:?} latency={}ms",
            kind, result.status, result.latency_ms
        );
        (kind, result)
    });
}

/// Image URLs for phase two: the caller's known URLs plus whatever web
/// search discovered, deduplicated in that order.
fn merged_image_urls(request: &ValidationRequest, search_result: &TierResult) -> Vec<String> {
    let mut merged = request.known_image_urls.clone();
    for url in search_result.image_urls() {
        if !merged.contains(url) {
            merged.push(url.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandvet_common::{CategoryContext, EvidencePayload, TierStatus};

    use crate::testing::FakeTier;

    fn request() -> ValidationRequest {
        ValidationRequest::new(
            "Nike",
            "I bought Nike shoes",
            CategoryContext::new("sportswear", vec!["Nike".into(), "Adidas".into()]),
        )
        .unwrap()
    }

    fn tier_map(tiers: Vec<FakeTier>) -> HashMap<TierKind, Arc<dyn EvidenceTier>> {
        tiers
            .into_iter()
            .map(|t| (t.kind(), Arc::new(t) as Arc<dyn EvidenceTier>))
            .collect()
    }

    fn default_fakes() -> Vec<FakeTier> {
        TierKind::ALL
            .into_iter()
            .map(|kind| FakeTier::succeeding(kind, "Nike", 0.9))
            .collect()
    }

    #[tokio::test]
    async fn test_all_tiers_produce_a_result() {
        let tiers = tier_map(default_fakes());
        let results = run_tiers(&tiers, &EngineConfig::default(), &request())
            .await
            .unwrap();
        assert_eq!(results.len(), 6);
        let kinds: Vec<TierKind> = results.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, TierKind::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_results_are_in_canonical_order_regardless_of_latency() {
        let mut fakes = default_fakes();
        // Make the first tier the slowest so it completes last.
        fakes[0] = FakeTier::succeeding(TierKind::VectorSimilarity, "Nike", 0.9)
            .with_delay(Duration::from_millis(80));
        let tiers = tier_map(fakes);
        let results = run_tiers(&tiers, &EngineConfig::default(), &request())
            .await
            .unwrap();
        assert_eq!(results[0].kind, TierKind::VectorSimilarity);
        assert_eq!(results[0].status, TierStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_dependent_tiers_receive_search_images() {
        let mut fakes = default_fakes();
        fakes[1] = FakeTier::succeeding_with_payload(
            TierKind::WebSearch,
            "Nike",
            0.6,
            EvidencePayload::SearchHits {
                hits: vec![],
                image_urls: vec!["https://img.example/logo.png".into()],
            },
        );
        let vision_calls = fakes[3].call_counter();
        let tiers = tier_map(fakes);

        let results = run_tiers(&tiers, &EngineConfig::default(), &request())
            .await
            .unwrap();
        // Vision saw images, so it ran instead of skipping.
        assert_eq!(results[3].kind, TierKind::VisionLogo);
        assert_eq!(results[3].status, TierStatus::Succeeded);
        assert_eq!(*vision_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_dependent_tiers_skip_without_images() {
        let fakes = default_fakes();
        let vision_calls = fakes[3].call_counter();
        let ai_calls = fakes[2].call_counter();
        let tiers = tier_map(fakes);

        let results = run_tiers(&tiers, &EngineConfig::default(), &request())
            .await
            .unwrap();
        assert_eq!(results[2].status, TierStatus::Skipped);
        assert_eq!(results[3].status, TierStatus::Skipped);
        // Skipping means no provider call at all.
        assert_eq!(*ai_calls.lock().unwrap(), 0);
        assert_eq!(*vision_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_slow_tier_times_out_without_blocking_others() {
        let mut config = EngineConfig::default();
        config.timeouts.vector_secs = 1;

        let mut fakes = default_fakes();
        fakes[0] = FakeTier::succeeding(TierKind::VectorSimilarity, "Nike", 0.9)
            .with_delay(Duration::from_secs(5));
        let tiers = tier_map(fakes);

        let results = run_tiers(&tiers, &config, &request()).await.unwrap();
        assert_eq!(results[0].status, TierStatus::TimedOut);
        assert_eq!(results[1].status, TierStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_global_deadline_truncates_and_keeps_completed() {
        let mut config = EngineConfig::default();
        config.timeouts.global_deadline_secs = 1;
        // Keep per-tier budgets below the global deadline but above the
        // fake delays, so the global deadline is what fires.
        for secs in [
            &mut config.timeouts.vector_secs,
            &mut config.timeouts.web_search_secs,
            &mut config.timeouts.ai_summary_secs,
            &mut config.timeouts.vision_secs,
            &mut config.timeouts.knowledge_graph_secs,
            &mut config.timeouts.embedding_secs,
        ] {
            *secs = 1;
        }

        let mut fakes = default_fakes();
        fakes[4] = FakeTier::succeeding(TierKind::KnowledgeGraph, "Nike", 0.9)
            .with_delay(Duration::from_secs(30));
        fakes[5] = FakeTier::succeeding(TierKind::EmbeddingFallback, "Nike", 0.7)
            .with_delay(Duration::from_secs(30));
        let tiers = tier_map(fakes);

        let started = std::time::Instant::now();
        let results = run_tiers(&tiers, &config, &request()).await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(3));

        assert_eq!(results.len(), 6);
        assert_eq!(results[0].status, TierStatus::Succeeded);
        assert_eq!(results[4].status, TierStatus::TimedOut);
        assert_eq!(results[5].status, TierStatus::TimedOut);
    }
}
