//! # concourse-rag
//!
//! Retrieval-augmented question answering over a fixed knowledge base.
//!
//! ## Overview
//!
//! One [`ChatPipeline::ask`] call runs the full request-scoped pipeline:
//!
//! 1. Embed the question ([`EmbeddingProvider`])
//! 2. Similarity-search the indexed corpus ([`PassageStore`])
//! 3. Assemble a token-budgeted context window ([`context::assemble`])
//! 4. Issue a streaming chat completion ([`CompletionClient`])
//! 5. Relay the SSE frames as a byte stream ([`SseRelay`] / [`relay_stream`])
//!
//! The upstream clients are trait objects injected through
//! [`ChatPipeline::builder()`], so every stage can be swapped for a test
//! double. The relay is a synchronous state machine drivable with scripted
//! chunks; no live socket is needed to test it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use concourse_rag::{
//!     ChatConfig, ChatPipeline, OpenAIChatClient, OpenAIEmbeddingProvider, SupabaseStore,
//! };
//!
//! # fn main() -> concourse_rag::Result<()> {
//! let api_key = std::env::var("OPENAI_API_KEY").unwrap();
//! let supabase_url = std::env::var("SUPABASE_URL").unwrap();
//! let supabase_key = std::env::var("SUPABASE_KEY").unwrap();
//!
//! let pipeline = ChatPipeline::builder()
//!     .config(ChatConfig::default())
//!     .embedding_provider(Arc::new(OpenAIEmbeddingProvider::new(&api_key)?))
//!     .passage_store(Arc::new(SupabaseStore::new(&supabase_url, &supabase_key)?))
//!     .completion_client(Arc::new(OpenAIChatClient::new(&api_key)?))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

pub mod completion;
pub mod config;
pub mod context;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod passage;
pub mod pipeline;
pub mod prompt;
pub mod relay;
pub mod search;
pub mod sse;
pub mod tokens;

pub use completion::{ChunkStream, CompletionClient, OpenAIChatClient};
pub use config::{ChatConfig, ChatConfigBuilder};
pub use context::{PASSAGE_SEPARATOR, assemble};
pub use embedding::EmbeddingProvider;
pub use error::{ChatError, Result};
pub use openai::OpenAIEmbeddingProvider;
pub use passage::Passage;
pub use pipeline::{AnswerStream, ChatPipeline, ChatPipelineBuilder};
pub use prompt::{ChatMessage, SYSTEM_PERSONA, build_messages};
pub use relay::{DONE_SENTINEL, RelayState, RelayStep, SseRelay, relay_stream};
pub use search::{PassageStore, SupabaseStore};
pub use sse::SseParser;
pub use tokens::{HeuristicEstimator, TokenEstimator};
