//! Token-count estimation for the context budget.

/// Estimates the number of model tokens a text would consume.
///
/// The estimate is a conservative stopping heuristic, not the provider's
/// exact tokenization. Implementations must be deterministic for identical
/// input and monotonic in text length.
pub trait TokenEstimator: Send + Sync {
    /// Estimate the token cost of `text`.
    fn estimate(&self, text: &str) -> usize;
}

/// A character-ratio estimator.
///
/// English prose averages roughly four characters per model token; rounding
/// up keeps the estimate conservative for the budget check.
#[derive(Debug, Clone)]
pub struct HeuristicEstimator {
    chars_per_token: usize,
}

impl HeuristicEstimator {
    /// Create an estimator with a custom character-to-token ratio.
    pub fn new(chars_per_token: usize) -> Self {
        Self { chars_per_token: chars_per_token.max(1) }
    }
}

impl Default for HeuristicEstimator {
    fn default() -> Self {
        Self { chars_per_token: 4 }
    }
}

impl TokenEstimator for HeuristicEstimator {
    fn estimate(&self, text: &str) -> usize {
        text.chars().count().div_ceil(self.chars_per_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_costs_nothing() {
        assert_eq!(HeuristicEstimator::default().estimate(""), 0);
    }

    #[test]
    fn rounds_up_partial_tokens() {
        let estimator = HeuristicEstimator::default();
        assert_eq!(estimator.estimate("abcd"), 1);
        assert_eq!(estimator.estimate("abcde"), 2);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let estimator = HeuristicEstimator::default();
        // Multi-byte characters count once each, not per byte.
        assert_eq!(estimator.estimate("héllo"), 2);
        assert_eq!(estimator.estimate("日本語だ"), 1);
    }

    #[test]
    fn monotonic_in_text_length() {
        let estimator = HeuristicEstimator::default();
        let mut text = String::new();
        let mut previous = 0;
        for _ in 0..64 {
            text.push('x');
            let estimate = estimator.estimate(&text);
            assert!(estimate >= previous);
            previous = estimate;
        }
    }

    #[test]
    fn deterministic_for_identical_input() {
        let estimator = HeuristicEstimator::default();
        let text = "snowboards count as one piece of hold baggage";
        assert_eq!(estimator.estimate(text), estimator.estimate(text));
    }
}
