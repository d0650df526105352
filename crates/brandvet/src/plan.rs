//! Two-phase execution plan.
//!
//! The dependency edge (web search produces the image URLs the AI summary
//! and vision tiers consume) is modeled as an explicit plan value rather
//! than callback chaining, so the orchestration shape is testable without
//! any network.

use brandvet_common::TierKind;

/// Which tiers start at t=0 and which wait for the trigger tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    /// Independent tiers, started immediately.
    pub phase_one: Vec<TierKind>,
    /// Image-dependent tiers, started when the trigger resolves.
    pub phase_two: Vec<TierKind>,
    /// The phase-one tier whose completion unblocks phase two.
    pub trigger: TierKind,
}

impl ExecutionPlan {
    /// The standard six-tier plan.
    pub fn standard() -> Self {
        Self {
            phase_one: vec![
                TierKind::VectorSimilarity,
                TierKind::WebSearch,
                TierKind::KnowledgeGraph,
                TierKind::EmbeddingFallback,
            ],
            phase_two: vec![TierKind::AiSummary, TierKind::VisionLogo],
            trigger: TierKind::WebSearch,
        }
    }

    /// All tiers this plan will produce a result for.
    pub fn total_tiers(&self) -> usize {
        self.phase_one.len() + self.phase_two.len()
    }

    pub fn all_tiers(&self) -> impl Iterator<Item = TierKind> + '_ {
        self.phase_one
            .iter()
            .chain(self.phase_two.iter())
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_plan_covers_all_tiers() {
        let plan = ExecutionPlan::standard();
        assert_eq!(plan.total_tiers(), TierKind::ALL.len());
        for kind in TierKind::ALL {
            assert!(plan.all_tiers().any(|k| k == kind));
        }
    }

    #[test]
    fn test_phases_are_disjoint() {
        let plan = ExecutionPlan::standard();
        for kind in &plan.phase_one {
            assert!(!plan.phase_two.contains(kind));
        }
    }

    #[test]
    fn test_phase_two_is_exactly_the_image_dependent_tiers() {
        let plan = ExecutionPlan::standard();
        for kind in &plan.phase_two {
            assert!(kind.requires_images());
        }
        for kind in &plan.phase_one {
            assert!(!kind.requires_images());
        }
    }

    #[test]
    fn test_trigger_runs_in_phase_one() {
        let plan = ExecutionPlan::standard();
        assert!(plan.phase_one.contains(&plan.trigger));
    }
}
