//! Per-tier evidence types and the aggregated evidence model.
//!
//! One `TierResult` exists per tier per request, whatever happened to the
//! tier - skipped and timed-out tiers still emit a result so the verdict's
//! audit trail is complete.

use serde::{Deserialize, Serialize};

use crate::error::TierError;

/// The six evidence tiers, in canonical order.
///
/// The declaration order is load-bearing: aggregated results are always
/// sorted by it, which keeps aggregation invariant to completion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierKind {
    /// Top-k lookup against the label vector index.
    VectorSimilarity,
    /// General web search; also the producer of discovered image URLs.
    WebSearch,
    /// LLM summarization over search context. Requires image URLs.
    AiSummary,
    /// Logo/brand classification over image URLs. Requires image URLs.
    VisionLogo,
    /// Structured knowledge-graph entity lookup.
    KnowledgeGraph,
    /// Text-embedding nearest-allowed-label fallback.
    EmbeddingFallback,
}

impl TierKind {
    /// All tiers, in canonical order.
    pub const ALL: [TierKind; 6] = [
        TierKind::VectorSimilarity,
        TierKind::WebSearch,
        TierKind::AiSummary,
        TierKind::VisionLogo,
        TierKind::KnowledgeGraph,
        TierKind::EmbeddingFallback,
    ];

    /// Stable identifier used in logs and serialized verdicts.
    pub fn as_str(&self) -> &'static str {
        match self {
            TierKind::VectorSimilarity => "vector_similarity",
            TierKind::WebSearch => "web_search",
            TierKind::AiSummary => "ai_summary",
            TierKind::VisionLogo => "vision_logo",
            TierKind::KnowledgeGraph => "knowledge_graph",
            TierKind::EmbeddingFallback => "embedding_fallback",
        }
    }

    /// Human-readable name for reasoning strings.
    pub fn display_name(&self) -> &'static str {
        match self {
            TierKind::VectorSimilarity => "vector similarity",
            TierKind::WebSearch => "web search",
            TierKind::AiSummary => "AI summary",
            TierKind::VisionLogo => "vision logo",
            TierKind::KnowledgeGraph => "knowledge graph",
            TierKind::EmbeddingFallback => "embedding fallback",
        }
    }

    /// Tiers that consume the image URLs discovered by web search.
    pub fn requires_images(&self) -> bool {
        matches!(self, TierKind::AiSummary | TierKind::VisionLogo)
    }
}

impl std::fmt::Display for TierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one tier for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierStatus {
    Succeeded,
    Failed,
    Skipped,
    TimedOut,
}

/// One ranked match from the vector index or embedding fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelMatch {
    pub label: String,
    /// Similarity score in [0,1].
    pub score: f64,
}

/// One web search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub url: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// A structured entity from the knowledge graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Lookup score in [0,1] as reported by the service.
    pub score: f64,
}

/// One logo read from the vision classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoRead {
    pub label: String,
    pub confidence: f64,
    pub image_url: String,
}

/// The AI summarizer's judgment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmJudgment {
    pub label: String,
    pub confidence: f64,
    pub rationale: String,
}

/// Tier-specific evidence payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EvidencePayload {
    /// Ranked matches (vector similarity, embedding fallback).
    Matches { matches: Vec<LabelMatch> },
    /// Web search hits plus all image URLs discovered across them.
    SearchHits {
        hits: Vec<SearchHit>,
        image_urls: Vec<String>,
    },
    /// A knowledge-graph entity.
    Entity { entity: EntityRecord },
    /// Per-image logo reads.
    LogoReads { reads: Vec<LogoRead> },
    /// The AI summarizer's judgment.
    Judgment { judgment: LlmJudgment },
    /// No payload (failed, skipped, or timed-out tiers).
    Empty,
}

/// Output of one evidence tier for one request. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierResult {
    pub kind: TierKind,
    pub status: TierStatus,
    pub payload: EvidencePayload,
    /// The label this tier proposes, if it proposes one.
    pub label: Option<String>,
    /// Tier confidence in [0,1]; absent for failed/skipped/timed-out tiers.
    pub confidence: Option<f64>,
    pub latency_ms: u64,
    pub error: Option<String>,
}

impl TierResult {
    /// A successful result. Confidence is clamped into [0,1].
    pub fn succeeded(
        kind: TierKind,
        payload: EvidencePayload,
        label: Option<String>,
        confidence: f64,
        latency_ms: u64,
    ) -> Self {
        Self {
            kind,
            status: TierStatus::Succeeded,
            payload,
            label,
            confidence: Some(confidence.clamp(0.0, 1.0)),
            latency_ms,
            error: None,
        }
    }

    /// A failed result carrying a short error description.
    pub fn failed(kind: TierKind, error: &TierError, latency_ms: u64) -> Self {
        Self {
            kind,
            status: TierStatus::Failed,
            payload: EvidencePayload::Empty,
            label: None,
            confidence: None,
            latency_ms,
            error: Some(error.to_string()),
        }
    }

    /// A skipped result (e.g. image-dependent tier with no images).
    pub fn skipped(kind: TierKind, reason: &str) -> Self {
        Self {
            kind,
            status: TierStatus::Skipped,
            payload: EvidencePayload::Empty,
            label: None,
            confidence: None,
            latency_ms: 0,
            error: Some(reason.to_string()),
        }
    }

    /// A timed-out result.
    pub fn timed_out(kind: TierKind, budget_ms: u64) -> Self {
        Self {
            kind,
            status: TierStatus::TimedOut,
            payload: EvidencePayload::Empty,
            label: None,
            confidence: None,
            latency_ms: budget_ms,
            error: Some(TierError::Timeout(budget_ms).to_string()),
        }
    }

    pub fn is_succeeded(&self) -> bool {
        self.status == TierStatus::Succeeded
    }

    /// Image URLs carried by this result's payload, if any.
    pub fn image_urls(&self) -> &[String] {
        match &self.payload {
            EvidencePayload::SearchHits { image_urls, .. } => image_urls,
            _ => &[],
        }
    }
}

/// How a tier relates to the candidate label in the aggregated view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementRole {
    /// Succeeded and proposed the candidate label.
    Agrees,
    /// Succeeded and proposed a different label.
    Disagrees,
    /// Agreed with the candidate, but a higher-trust tier proposed a
    /// different label at near-equal confidence and won the tie-break.
    Contested,
    /// Succeeded without a label, or did not succeed at all.
    Silent,
}

/// All tier results for one request, fused into a single weighted score
/// plus agreement bookkeeping. Recomputed deterministically from the
/// results; never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedEvidence {
    /// All six tier results, in canonical `TierKind` order.
    pub results: Vec<TierResult>,
    /// Weighted confidence in [0,1]. Exactly 0 when no tier succeeded.
    pub confidence: f64,
    pub agreeing: Vec<TierKind>,
    pub disagreeing: Vec<TierKind>,
    pub contested: Vec<TierKind>,
    pub silent: Vec<TierKind>,
}

impl AggregatedEvidence {
    pub fn result_for(&self, kind: TierKind) -> Option<&TierResult> {
        self.results.iter().find(|r| r.kind == kind)
    }

    pub fn succeeded_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_succeeded()).count()
    }

    pub fn role_of(&self, kind: TierKind) -> AgreementRole {
        if self.agreeing.contains(&kind) {
            AgreementRole::Agrees
        } else if self.disagreeing.contains(&kind) {
            AgreementRole::Disagrees
        } else if self.contested.contains(&kind) {
            AgreementRole::Contested
        } else {
            AgreementRole::Silent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order_matches_declaration() {
        let mut sorted = TierKind::ALL;
        sorted.sort();
        assert_eq!(sorted, TierKind::ALL);
    }

    #[test]
    fn test_requires_images() {
        assert!(TierKind::AiSummary.requires_images());
        assert!(TierKind::VisionLogo.requires_images());
        assert!(!TierKind::WebSearch.requires_images());
        assert!(!TierKind::KnowledgeGraph.requires_images());
    }

    #[test]
    fn test_succeeded_clamps_confidence() {
        let result = TierResult::succeeded(
            TierKind::VisionLogo,
            EvidencePayload::Empty,
            Some("Nike".into()),
            1.7,
            42,
        );
        assert_eq!(result.confidence, Some(1.0));

        let result = TierResult::succeeded(
            TierKind::VisionLogo,
            EvidencePayload::Empty,
            None,
            -0.2,
            42,
        );
        assert_eq!(result.confidence, Some(0.0));
    }

    #[test]
    fn test_non_success_results_carry_no_confidence() {
        let err = TierError::Parse("truncated body".into());
        assert_eq!(TierResult::failed(TierKind::WebSearch, &err, 10).confidence, None);
        assert_eq!(TierResult::skipped(TierKind::VisionLogo, "no images").confidence, None);
        assert_eq!(TierResult::timed_out(TierKind::AiSummary, 8000).confidence, None);
    }

    #[test]
    fn test_image_urls_only_from_search_payload() {
        let search = TierResult::succeeded(
            TierKind::WebSearch,
            EvidencePayload::SearchHits {
                hits: vec![],
                image_urls: vec!["https://img.example/logo.png".into()],
            },
            None,
            0.5,
            100,
        );
        assert_eq!(search.image_urls().len(), 1);

        let vector = TierResult::succeeded(
            TierKind::VectorSimilarity,
            EvidencePayload::Matches { matches: vec![] },
            None,
            0.5,
            100,
        );
        assert!(vector.image_urls().is_empty());
    }

    #[test]
    fn test_tier_result_serialization_roundtrip() {
        let result = TierResult::succeeded(
            TierKind::KnowledgeGraph,
            EvidencePayload::Entity {
                entity: EntityRecord {
                    name: "Nike, Inc.".into(),
                    aliases: vec!["Nike".into()],
                    score: 0.93,
                },
            },
            Some("Nike, Inc.".into()),
            0.93,
            210,
        );
        let json = serde_json::to_string(&result).unwrap();
        let back: TierResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
