//! Context window assembly under a token budget.

use tracing::debug;

use crate::passage::Passage;
use crate::tokens::TokenEstimator;

/// Separator appended after each included passage.
pub const PASSAGE_SEPARATOR: &str = "\n---\n";

/// Greedily accumulate passages into a context string.
///
/// Passages are taken strictly in the given order (no re-ranking). The first
/// passage whose estimated cost would push the running total over `budget`
/// stops accumulation entirely; it and every passage after it are dropped
/// whole. Truncation is expected behavior, not an error.
///
/// Each included passage is trimmed of surrounding whitespace and followed by
/// [`PASSAGE_SEPARATOR`].
pub fn assemble(passages: &[Passage], budget: usize, estimator: &dyn TokenEstimator) -> String {
    let mut token_count = 0usize;
    let mut context = String::new();
    let mut included = 0usize;

    for passage in passages {
        token_count += estimator.estimate(&passage.content);
        if token_count > budget {
            break;
        }
        context.push_str(passage.content.trim());
        context.push_str(PASSAGE_SEPARATOR);
        included += 1;
    }

    debug!(included, available = passages.len(), token_count, "assembled context");

    context
}
