//! The final classified verdict returned to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::evidence::AggregatedEvidence;

/// The five outcome patterns the classifier can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPattern {
    /// Two or more independent tiers corroborate the candidate label.
    CategoryValidated,
    /// A high-trust tier confidently proposes a different label.
    CategoryError,
    /// Evidence is split, or confidence sits in the middle band.
    AmbiguousDescriptor,
    /// Exactly one high-trust tier confirms the label, uncontradicted.
    ClearMatch,
    /// No usable evidence, or too weak to call.
    UnclearResult,
}

impl ValidationPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationPattern::CategoryValidated => "category_validated",
            ValidationPattern::CategoryError => "category_error",
            ValidationPattern::AmbiguousDescriptor => "ambiguous_descriptor",
            ValidationPattern::ClearMatch => "clear_match",
            ValidationPattern::UnclearResult => "unclear_result",
        }
    }

    /// Whether the caller should route this verdict to manual review.
    pub fn needs_review(&self) -> bool {
        matches!(
            self,
            ValidationPattern::AmbiguousDescriptor | ValidationPattern::UnclearResult
        )
    }
}

impl std::fmt::Display for ValidationPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The engine's final output for one request. Never mutated after return;
/// persistence and display are the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub request_id: Uuid,
    pub pattern: ValidationPattern,
    /// Weighted confidence in [0,1].
    pub confidence: f64,
    /// Human-readable explanation naming the contributing tiers.
    pub reasoning: String,
    /// Full per-tier breakdown for audit and debugging.
    pub evidence: AggregatedEvidence,
    pub evaluated_at: DateTime<Utc>,
}
