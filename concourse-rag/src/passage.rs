//! Data types for retrieved passages.

use serde::{Deserialize, Serialize};

/// A passage retrieved from the vector store for one question.
///
/// Produced by the search service ordered by descending similarity and
/// consumed once by the context assembler; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Passage {
    /// The text content of the passage.
    pub content: String,
    /// The similarity score against the question embedding (higher is closer).
    pub similarity: f32,
}

impl Passage {
    /// Create a passage from content and similarity score.
    pub fn new(content: impl Into<String>, similarity: f32) -> Self {
        Self { content: content.into(), similarity }
    }
}
