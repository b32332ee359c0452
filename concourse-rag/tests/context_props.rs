//! Property tests for context assembly under the token budget.

use concourse_rag::context::{PASSAGE_SEPARATOR, assemble};
use concourse_rag::passage::Passage;
use concourse_rag::tokens::{HeuristicEstimator, TokenEstimator};
use proptest::prelude::*;

fn arb_passage() -> impl Strategy<Value = Passage> {
    ("[a-z ]{0,120}", 0.78f32..1.0f32).prop_map(|(content, similarity)| Passage {
        content,
        similarity,
    })
}

proptest! {
    /// For any passage sequence and budget, the estimated cost of the
    /// included passages never exceeds the budget.
    #[test]
    fn assembled_context_never_exceeds_the_budget(
        passages in proptest::collection::vec(arb_passage(), 0..12),
        budget in 1usize..64,
    ) {
        let estimator = HeuristicEstimator::default();
        let context = assemble(&passages, budget, &estimator);

        let included = context.matches(PASSAGE_SEPARATOR).count();
        let spent: usize =
            passages.iter().take(included).map(|p| estimator.estimate(&p.content)).sum();
        prop_assert!(spent <= budget);
    }

    /// Included passages appear strictly in search order, as a prefix of the
    /// input sequence.
    #[test]
    fn assembly_preserves_search_order(
        count in 0usize..8,
        budget in 1usize..200,
    ) {
        // Distinct markers so positions are unambiguous.
        let passages: Vec<Passage> = (0..count)
            .map(|i| Passage::new(format!("marker{i:02}"), 0.9 - i as f32 * 0.01))
            .collect();

        let estimator = HeuristicEstimator::default();
        let context = assemble(&passages, budget, &estimator);

        let mut last_at = None;
        let mut seen_gap = false;
        for (i, passage) in passages.iter().enumerate() {
            match context.find(&passage.content) {
                Some(at) => {
                    // No passage may appear after an excluded one.
                    prop_assert!(!seen_gap, "passage {i} included after a dropped passage");
                    if let Some(previous) = last_at {
                        prop_assert!(at > previous);
                    }
                    last_at = Some(at);
                }
                None => seen_gap = true,
            }
        }
    }
}
