//! Verdict formatting.
//!
//! Presentation only: names the tiers that contributed, their individual
//! confidences, and the chosen pattern. No decision logic lives here, so
//! the classifier stays independently testable.

use brandvet_common::{
    AggregatedEvidence, TierKind, TierStatus, ValidationPattern,
};

/// Build the human-readable reasoning string for a verdict.
pub fn build_reasoning(
    evidence: &AggregatedEvidence,
    pattern: ValidationPattern,
    candidate_label: &str,
) -> String {
    if evidence.succeeded_count() == 0 {
        return format!(
            "No evidence source responded for '{}': every tier failed, was skipped, or timed out. Manual review required.",
            candidate_label
        );
    }

    let mut parts = vec![format!(
        "Verdict {} for '{}' at confidence {:.2}.",
        pattern, candidate_label, evidence.confidence
    )];

    if !evidence.agreeing.is_empty() {
        parts.push(format!(
            "Corroborating tiers: {}.",
            list_with_confidence(evidence, &evidence.agreeing)
        ));
    }

    if !evidence.disagreeing.is_empty() {
        let dissent = evidence
            .disagreeing
            .iter()
            .map(|&kind| {
                let proposed = evidence
                    .result_for(kind)
                    .and_then(|r| r.label.as_deref())
                    .unwrap_or("?");
                format!(
                    "{} proposed '{}' ({:.2})",
                    kind.display_name(),
                    proposed,
                    own_confidence(evidence, kind)
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        parts.push(format!("Dissenting tiers: {}.", dissent));
    }

    if !evidence.contested.is_empty() {
        parts.push(format!(
            "Outweighed agreement: {} deferred to higher-trust dissent.",
            list_with_confidence(evidence, &evidence.contested)
        ));
    }

    let unavailable: Vec<String> = evidence
        .results
        .iter()
        .filter(|r| r.status != TierStatus::Succeeded)
        .map(|r| {
            let status = match r.status {
                TierStatus::Failed => "failed",
                TierStatus::Skipped => "skipped",
                TierStatus::TimedOut => "timed out",
                TierStatus::Succeeded => unreachable!("filtered above"),
            };
            format!("{} ({})", r.kind.display_name(), status)
        })
        .collect();
    if !unavailable.is_empty() {
        parts.push(format!("No signal from: {}.", unavailable.join(", ")));
    }

    parts.join(" ")
}

fn own_confidence(evidence: &AggregatedEvidence, kind: TierKind) -> f64 {
    evidence
        .result_for(kind)
        .and_then(|r| r.confidence)
        .unwrap_or(0.0)
}

fn list_with_confidence(evidence: &AggregatedEvidence, kinds: &[TierKind]) -> String {
    kinds
        .iter()
        .map(|&kind| {
            format!(
                "{} ({:.2})",
                kind.display_name(),
                own_confidence(evidence, kind)
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandvet_common::{EngineConfig, EvidencePayload, TierError, TierResult};

    use crate::aggregator::aggregate;

    fn succeeded(kind: TierKind, label: Option<&str>, confidence: f64) -> TierResult {
        TierResult::succeeded(
            kind,
            EvidencePayload::Empty,
            label.map(str::to_string),
            confidence,
            5,
        )
    }

    #[test]
    fn test_total_failure_reasoning_states_no_evidence() {
        let results: Vec<TierResult> = TierKind::ALL
            .into_iter()
            .map(|kind| TierResult::failed(kind, &TierError::Network("down".into()), 5))
            .collect();
        let evidence = aggregate(results, "Nike", &EngineConfig::default());
        let reasoning =
            build_reasoning(&evidence, ValidationPattern::UnclearResult, "Nike");
        assert!(reasoning.contains("No evidence source responded"));
        assert!(reasoning.contains("Nike"));
    }

    #[test]
    fn test_reasoning_names_corroborating_tiers() {
        let results = vec![
            succeeded(TierKind::VisionLogo, Some("Nike"), 1.0),
            succeeded(TierKind::KnowledgeGraph, Some("Nike"), 0.9),
            TierResult::failed(TierKind::WebSearch, &TierError::Network("down".into()), 5),
        ];
        let evidence = aggregate(results, "Nike", &EngineConfig::default());
        let reasoning =
            build_reasoning(&evidence, ValidationPattern::CategoryValidated, "Nike");
        assert!(reasoning.contains("vision logo (1.00)"));
        assert!(reasoning.contains("knowledge graph (0.90)"));
        assert!(reasoning.contains("web search (failed)"));
        assert!(reasoning.contains("category_validated"));
    }

    #[test]
    fn test_reasoning_names_dissenting_label() {
        let results = vec![
            succeeded(TierKind::KnowledgeGraph, Some("Adidas"), 0.92),
            succeeded(TierKind::VisionLogo, Some("Nike"), 1.0),
        ];
        let evidence = aggregate(results, "Nike", &EngineConfig::default());
        let reasoning =
            build_reasoning(&evidence, ValidationPattern::AmbiguousDescriptor, "Nike");
        assert!(reasoning.contains("proposed 'Adidas'"));
    }
}
