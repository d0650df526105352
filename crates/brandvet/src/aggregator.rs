//! Confidence aggregation.
//!
//! Fuses the six tier results into one weighted score plus agreement
//! bookkeeping. Aggregation runs once, over the complete (or
//! deadline-truncated) result set, sorted into canonical tier order first,
//! so the output is invariant to completion order.

use brandvet_common::{
    label, AgreementRole, AggregatedEvidence, EngineConfig, TierKind, TierResult,
};

/// Floor for the aggregate score when at least one tier succeeded.
///
/// Keeps the "confidence is zero only with zero succeeded tiers" invariant
/// even when every succeeded tier reported a zero-score lookup.
const MIN_EVIDENCE_CONFIDENCE: f64 = 0.01;

/// Fuse tier results into aggregated evidence.
pub fn aggregate(
    mut results: Vec<TierResult>,
    candidate_label: &str,
    config: &EngineConfig,
) -> AggregatedEvidence {
    results.sort_by_key(|r| r.kind);

    let mut roles: Vec<(TierKind, AgreementRole)> = results
        .iter()
        .map(|result| (result.kind, initial_role(result, candidate_label)))
        .collect();

    demote_contested_agreements(&mut roles, &results, config);

    let confidence = fuse_confidence(&results, &roles, config);

    let collect = |wanted: AgreementRole| -> Vec<TierKind> {
        roles
            .iter()
            .filter(|(_, role)| *role == wanted)
            .map(|(kind, _)| *kind)
            .collect()
    };

    AggregatedEvidence {
        agreeing: collect(AgreementRole::Agrees),
        disagreeing: collect(AgreementRole::Disagrees),
        contested: collect(AgreementRole::Contested),
        silent: collect(AgreementRole::Silent),
        confidence,
        results,
    }
}

fn initial_role(result: &TierResult, candidate_label: &str) -> AgreementRole {
    if !result.is_succeeded() {
        return AgreementRole::Silent;
    }
    match &result.label {
        Some(proposed) if label::labels_match(proposed, candidate_label) => AgreementRole::Agrees,
        Some(_) => AgreementRole::Disagrees,
        None => AgreementRole::Silent,
    }
}

/// Trust-weight tie-break: an agreeing tier is demoted to `Contested` when
/// a strictly higher-trust tier proposes a different label at near-equal
/// (or higher) confidence. The higher-trust tier wins the agreement
/// bookkeeping; the demoted tier still contributes its base weight to the
/// scalar score.
fn demote_contested_agreements(
    roles: &mut [(TierKind, AgreementRole)],
    results: &[TierResult],
    config: &EngineConfig,
) {
    let epsilon = config.thresholds.label_epsilon;

    let dissenters: Vec<(f64, f64)> = roles
        .iter()
        .zip(results)
        .filter(|((_, role), _)| *role == AgreementRole::Disagrees)
        .map(|((kind, _), result)| {
            (
                config.weights.for_tier(*kind),
                result.confidence.unwrap_or(0.0),
            )
        })
        .collect();

    if dissenters.is_empty() {
        return;
    }

    for ((kind, role), result) in roles.iter_mut().zip(results) {
        if *role != AgreementRole::Agrees {
            continue;
        }
        let weight = config.weights.for_tier(*kind);
        let confidence = result.confidence.unwrap_or(0.0);
        let outweighed = dissenters
            .iter()
            .any(|&(d_weight, d_confidence)| {
                d_weight > weight && d_confidence >= confidence - epsilon
            });
        if outweighed {
            *role = AgreementRole::Contested;
        }
    }
}

/// Weighted average over succeeded tiers. An agreeing tier corroborated by
/// a strictly higher-trust agreeing tier counts at boosted weight; every
/// other succeeded tier counts at base weight.
fn fuse_confidence(
    results: &[TierResult],
    roles: &[(TierKind, AgreementRole)],
    config: &EngineConfig,
) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    let mut succeeded = 0usize;

    for (result, (kind, role)) in results.iter().zip(roles) {
        let Some(confidence) = result.confidence.filter(|_| result.is_succeeded()) else {
            continue;
        };
        succeeded += 1;

        let base_weight = config.weights.for_tier(*kind);
        let corroborated = *role == AgreementRole::Agrees
            && roles.iter().any(|(other, other_role)| {
                *other_role == AgreementRole::Agrees
                    && config.weights.for_tier(*other) > base_weight
            });
        let weight = if corroborated {
            base_weight * config.thresholds.agreement_bonus
        } else {
            base_weight
        };

        weighted_sum += weight * confidence;
        weight_total += weight;
    }

    if succeeded == 0 {
        return 0.0;
    }
    let fused = if weight_total > 0.0 {
        weighted_sum / weight_total
    } else {
        0.0
    };
    fused.clamp(0.0, 1.0).max(MIN_EVIDENCE_CONFIDENCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use brandvet_common::{EvidencePayload, TierError, TierStatus};

    fn succeeded(kind: TierKind, label: Option<&str>, confidence: f64) -> TierResult {
        TierResult::succeeded(
            kind,
            EvidencePayload::Empty,
            label.map(str::to_string),
            confidence,
            5,
        )
    }

    fn failed(kind: TierKind) -> TierResult {
        TierResult::failed(kind, &TierError::Network("unreachable".into()), 5)
    }

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn test_zero_succeeded_means_zero_confidence() {
        let results: Vec<TierResult> = TierKind::ALL.into_iter().map(failed).collect();
        let evidence = aggregate(results, "Nike", &config());
        assert_eq!(evidence.confidence, 0.0);
        assert!(evidence.agreeing.is_empty());
        assert_eq!(evidence.silent.len(), 6);
    }

    #[test]
    fn test_corroborated_agreement_gets_bonus_weight() {
        // Vision (0.95) agrees and is corroborated by the knowledge graph
        // (1.0, no bonus for the top-trust tier itself).
        let results = vec![
            succeeded(TierKind::VisionLogo, Some("Nike"), 1.0),
            succeeded(TierKind::KnowledgeGraph, Some("Nike"), 0.9),
            failed(TierKind::WebSearch),
        ];
        let evidence = aggregate(results, "Nike", &config());

        // (0.95*1.25*1.0 + 1.0*0.9) / (0.95*1.25 + 1.0)
        assert_relative_eq!(evidence.confidence, 0.9542857142857143, epsilon = 1e-9);
        assert_eq!(
            evidence.agreeing,
            vec![TierKind::VisionLogo, TierKind::KnowledgeGraph]
        );
        assert_eq!(evidence.silent, vec![TierKind::WebSearch]);
    }

    #[test]
    fn test_alias_style_agreement_via_normalization() {
        let results = vec![succeeded(TierKind::KnowledgeGraph, Some("Nike, Inc."), 0.9)];
        let evidence = aggregate(results, "Nike", &config());
        assert_eq!(evidence.agreeing, vec![TierKind::KnowledgeGraph]);
    }

    #[test]
    fn test_dissent_is_recorded() {
        let results = vec![
            succeeded(TierKind::KnowledgeGraph, Some("Adidas"), 0.85),
            succeeded(TierKind::VectorSimilarity, Some("Nike"), 0.4),
        ];
        let evidence = aggregate(results, "Nike", &config());
        assert_eq!(evidence.disagreeing, vec![TierKind::KnowledgeGraph]);
        // Vector agreed at 0.4 while a higher-trust tier dissented at
        // 0.85: the tie-break demotes it.
        assert_eq!(evidence.contested, vec![TierKind::VectorSimilarity]);
        assert!(evidence.agreeing.is_empty());
    }

    #[test]
    fn test_clear_gap_survives_tie_break() {
        // Vision agrees at full confidence; the knowledge graph dissents
        // well below it. No demotion: the gap exceeds epsilon.
        let results = vec![
            succeeded(TierKind::VisionLogo, Some("Nike"), 1.0),
            succeeded(TierKind::KnowledgeGraph, Some("Adidas"), 0.5),
        ];
        let evidence = aggregate(results, "Nike", &config());
        assert_eq!(evidence.agreeing, vec![TierKind::VisionLogo]);
        assert_eq!(evidence.disagreeing, vec![TierKind::KnowledgeGraph]);
        assert!(evidence.contested.is_empty());
    }

    #[test]
    fn test_skipped_tiers_are_neutral() {
        let with_skips = vec![
            succeeded(TierKind::KnowledgeGraph, Some("Nike"), 0.9),
            succeeded(TierKind::VectorSimilarity, Some("Nike"), 0.8),
            TierResult::skipped(TierKind::AiSummary, "no image URLs available"),
            TierResult::skipped(TierKind::VisionLogo, "no image URLs available"),
        ];
        let without_skips = vec![
            succeeded(TierKind::KnowledgeGraph, Some("Nike"), 0.9),
            succeeded(TierKind::VectorSimilarity, Some("Nike"), 0.8),
        ];

        let a = aggregate(with_skips, "Nike", &config());
        let b = aggregate(without_skips, "Nike", &config());
        assert_relative_eq!(a.confidence, b.confidence, epsilon = 1e-12);
    }

    #[test]
    fn test_results_sorted_canonically_regardless_of_input_order() {
        let results = vec![
            succeeded(TierKind::EmbeddingFallback, Some("Nike"), 0.7),
            succeeded(TierKind::VectorSimilarity, Some("Nike"), 0.8),
        ];
        let evidence = aggregate(results, "Nike", &config());
        assert_eq!(evidence.results[0].kind, TierKind::VectorSimilarity);
        assert_eq!(evidence.results[1].kind, TierKind::EmbeddingFallback);
    }

    #[test]
    fn test_zero_score_lookup_still_counts_as_evidence() {
        let results = vec![succeeded(TierKind::KnowledgeGraph, None, 0.0)];
        let evidence = aggregate(results, "Nike", &config());
        assert!(evidence.confidence > 0.0);
        assert_eq!(evidence.confidence, MIN_EVIDENCE_CONFIDENCE);
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let results = vec![
            succeeded(TierKind::VisionLogo, Some("Nike"), 1.0),
            succeeded(TierKind::KnowledgeGraph, Some("Adidas"), 0.97),
            failed(TierKind::WebSearch),
        ];
        let a = aggregate(results.clone(), "Nike", &config());
        let b = aggregate(results, "Nike", &config());
        assert_eq!(a, b);
    }

    #[test]
    fn test_timed_out_and_skipped_statuses_stay_silent() {
        let results = vec![
            TierResult::timed_out(TierKind::VisionLogo, 12_000),
            succeeded(TierKind::WebSearch, Some("Nike"), 0.5),
        ];
        let evidence = aggregate(results, "Nike", &config());
        assert_eq!(evidence.silent, vec![TierKind::VisionLogo]);
        assert_eq!(evidence.results[1].status, TierStatus::TimedOut);
    }
}
