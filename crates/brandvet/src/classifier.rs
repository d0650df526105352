//! Pattern classification.
//!
//! Aggregated evidence is first reduced to a named shape - a tagged union
//! over the agreement configuration - and the shape is then dispatched
//! through a fixed decision table. Shapes are derived in precedence order;
//! the first matching shape wins. The whole procedure is a pure function:
//! identical evidence and thresholds always produce an identical verdict.

use brandvet_common::{
    AggregatedEvidence, EngineConfig, TierKind, ValidationPattern,
};

/// The agreement configurations the classifier distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceShape {
    /// Zero succeeded tiers.
    NoEvidence,
    /// High-trust tiers strongly disagree with each other about the label.
    ConflictingHighTrust,
    /// At least one high-trust tier strongly proposes a different label,
    /// with no strong high-trust support for the candidate.
    StrongDissent,
    /// Two or more tiers corroborate the candidate - at high aggregate
    /// confidence, or anchored by strong uncontradicted high-trust
    /// agreement.
    Corroborated,
    /// Exactly one tier confirms the candidate - high-trust, confident,
    /// and uncontradicted.
    LoneHighTrust,
    /// Agreement and dissent in near-equal measure.
    SplitEvidence,
    /// No agreement and an aggregate score below the low threshold.
    WeakSignal,
    /// Everything else: usable evidence in the middle band.
    MiddleBand,
}

/// Shape-to-pattern dispatch table. One row per shape; derivation
/// precedence lives in `derive_shape`, outcome policy lives here.
pub const DECISION_TABLE: [(EvidenceShape, ValidationPattern); 8] = [
    (EvidenceShape::NoEvidence, ValidationPattern::UnclearResult),
    (
        EvidenceShape::ConflictingHighTrust,
        ValidationPattern::AmbiguousDescriptor,
    ),
    (EvidenceShape::StrongDissent, ValidationPattern::CategoryError),
    (
        EvidenceShape::Corroborated,
        ValidationPattern::CategoryValidated,
    ),
    (EvidenceShape::LoneHighTrust, ValidationPattern::ClearMatch),
    (
        EvidenceShape::SplitEvidence,
        ValidationPattern::AmbiguousDescriptor,
    ),
    (EvidenceShape::WeakSignal, ValidationPattern::UnclearResult),
    (
        EvidenceShape::MiddleBand,
        ValidationPattern::AmbiguousDescriptor,
    ),
];

/// Classify aggregated evidence into a pattern and final confidence.
pub fn classify(evidence: &AggregatedEvidence, config: &EngineConfig) -> (ValidationPattern, f64) {
    let shape = derive_shape(evidence, config);
    let pattern = DECISION_TABLE
        .iter()
        .find(|(s, _)| *s == shape)
        .map(|(_, pattern)| *pattern)
        .expect("decision table covers every shape");
    (pattern, evidence.confidence)
}

/// Reduce evidence to its shape. Checks run in precedence order.
pub fn derive_shape(evidence: &AggregatedEvidence, config: &EngineConfig) -> EvidenceShape {
    if evidence.succeeded_count() == 0 {
        return EvidenceShape::NoEvidence;
    }

    let strong_dissent = any_strong_high_trust(evidence, &evidence.disagreeing, config);
    let strong_support = any_strong_high_trust(evidence, &evidence.agreeing, config);

    if strong_dissent && strong_support {
        return EvidenceShape::ConflictingHighTrust;
    }
    if strong_dissent {
        return EvidenceShape::StrongDissent;
    }

    if evidence.agreeing.len() >= 2 && evidence.confidence >= config.thresholds.high_confidence {
        return EvidenceShape::Corroborated;
    }

    // Strong, uncontradicted high-trust agreement anchors the verdict even
    // when weaker co-signals drag the aggregate below the high threshold.
    if strong_support && evidence.disagreeing.is_empty() {
        return if evidence.agreeing.len() >= 2 {
            EvidenceShape::Corroborated
        } else {
            EvidenceShape::LoneHighTrust
        };
    }

    if !evidence.agreeing.is_empty()
        && !evidence.disagreeing.is_empty()
        && evidence.agreeing.len().abs_diff(evidence.disagreeing.len()) <= 1
    {
        return EvidenceShape::SplitEvidence;
    }

    if evidence.agreeing.is_empty() && evidence.confidence < config.thresholds.low_confidence {
        return EvidenceShape::WeakSignal;
    }

    EvidenceShape::MiddleBand
}

fn is_high_trust(kind: TierKind, config: &EngineConfig) -> bool {
    config.weights.for_tier(kind) >= config.thresholds.high_trust_cutoff
}

fn own_confidence(evidence: &AggregatedEvidence, kind: TierKind) -> f64 {
    evidence
        .result_for(kind)
        .and_then(|r| r.confidence)
        .unwrap_or(0.0)
}

fn any_strong_high_trust(
    evidence: &AggregatedEvidence,
    kinds: &[TierKind],
    config: &EngineConfig,
) -> bool {
    kinds.iter().any(|&kind| {
        is_high_trust(kind, config)
            && own_confidence(evidence, kind) >= config.thresholds.strong_signal
    })
}
