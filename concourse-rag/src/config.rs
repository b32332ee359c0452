//! Configuration for the question-answering pipeline.

use crate::error::{ChatError, Result};

/// Configuration parameters for the retrieval side of the pipeline.
///
/// Generation parameters (model ids, temperature, token limits) belong to the
/// individual upstream clients; this struct holds only the knobs the pipeline
/// itself applies.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Minimum similarity score a passage must meet to be retrieved.
    pub similarity_threshold: f32,
    /// Maximum number of passages requested from the vector store.
    pub match_count: usize,
    /// Ceiling on estimated tokens for the assembled context window.
    pub token_budget: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self { similarity_threshold: 0.78, match_count: 5, token_budget: 1500 }
    }
}

impl ChatConfig {
    /// Create a new builder for constructing a [`ChatConfig`].
    pub fn builder() -> ChatConfigBuilder {
        ChatConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`ChatConfig`].
#[derive(Debug, Clone, Default)]
pub struct ChatConfigBuilder {
    config: ChatConfig,
}

impl ChatConfigBuilder {
    /// Set the minimum similarity threshold for retrieved passages.
    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.config.similarity_threshold = threshold;
        self
    }

    /// Set the maximum number of passages requested from the store.
    pub fn match_count(mut self, count: usize) -> Self {
        self.config.match_count = count;
        self
    }

    /// Set the token budget for the assembled context window.
    pub fn token_budget(mut self, budget: usize) -> Self {
        self.config.token_budget = budget;
        self
    }

    /// Build the [`ChatConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Config`] if:
    /// - `similarity_threshold` is outside `0.0..=1.0`
    /// - `match_count == 0`
    /// - `token_budget == 0`
    pub fn build(self) -> Result<ChatConfig> {
        let config = self.config;
        if !(0.0..=1.0).contains(&config.similarity_threshold) {
            return Err(ChatError::Config(format!(
                "similarity_threshold ({}) must be within 0.0..=1.0",
                config.similarity_threshold
            )));
        }
        if config.match_count == 0 {
            return Err(ChatError::Config("match_count must be greater than zero".to_string()));
        }
        if config.token_budget == 0 {
            return Err(ChatError::Config("token_budget must be greater than zero".to_string()));
        }
        Ok(config)
    }
}
