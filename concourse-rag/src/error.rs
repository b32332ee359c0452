//! Error types for the `concourse-rag` crate.

use thiserror::Error;

/// Errors that can occur while answering a question.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The inbound request was rejected before any upstream call was made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An upstream service (embeddings, search, completions) returned a
    /// non-success status or the connection to it failed.
    #[error("Upstream error ({service}): {message}")]
    Upstream {
        /// The upstream service that produced the error.
        service: String,
        /// A description of the failure.
        message: String,
    },

    /// A malformed SSE frame or payload was encountered mid-stream.
    ///
    /// Bytes already emitted before the error remain valid; the stream
    /// simply ends without the provider's end sentinel.
    #[error("Stream parse error: {0}")]
    StreamParse(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ChatError {
    /// Build an [`ChatError::Upstream`] for the named service.
    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream { service: service.into(), message: message.into() }
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, ChatError>;
