//! Question-answering pipeline orchestrator.
//!
//! The [`ChatPipeline`] coordinates one request-scoped run of
//! embed → search → assemble → prompt → complete → relay. Every upstream
//! client is injected as a trait object, so each stage can be substituted
//! with a test double.
//!
//! # Example
//!
//! ```rust,ignore
//! use concourse_rag::{ChatPipeline, ChatConfig};
//!
//! let pipeline = ChatPipeline::builder()
//!     .config(ChatConfig::default())
//!     .embedding_provider(Arc::new(embedder))
//!     .passage_store(Arc::new(store))
//!     .completion_client(Arc::new(completions))
//!     .build()?;
//!
//! let mut answer = pipeline.ask("Can I bring a snowboard?").await?;
//! while let Some(delta) = answer.next().await {
//!     io::stdout().write_all(&delta?)?;
//! }
//! ```

use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use tracing::{debug, info};

use crate::completion::CompletionClient;
use crate::config::ChatConfig;
use crate::context::assemble;
use crate::embedding::EmbeddingProvider;
use crate::error::{ChatError, Result};
use crate::prompt::build_messages;
use crate::relay::relay_stream;
use crate::search::PassageStore;
use crate::tokens::{HeuristicEstimator, TokenEstimator};

/// The answer byte stream handed to the caller.
///
/// Single-pass and non-restartable; bytes correspond 1:1, in order, to the
/// completion deltas. Dropping it cancels whatever is still in flight.
pub type AnswerStream = BoxStream<'static, Result<Bytes>>;

/// The question-answering pipeline.
///
/// Holds no per-request state; concurrent [`ask`](ChatPipeline::ask) calls
/// are fully independent. Construct one via [`ChatPipeline::builder()`].
pub struct ChatPipeline {
    config: ChatConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn PassageStore>,
    completions: Arc<dyn CompletionClient>,
    estimator: Arc<dyn TokenEstimator>,
}

impl ChatPipeline {
    /// Create a new [`ChatPipelineBuilder`].
    pub fn builder() -> ChatPipelineBuilder {
        ChatPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Answer one question, returning the relayed completion byte stream.
    ///
    /// Retrieval may come back empty; the prompt then carries the persona
    /// and the raw question alone, which is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Validation`] for an empty question and
    /// [`ChatError::Upstream`] when embedding, search, or the completion
    /// request fails. Errors after streaming has begun travel on the
    /// returned stream instead.
    pub async fn ask(&self, question: &str) -> Result<AnswerStream> {
        if question.is_empty() {
            return Err(ChatError::Validation("question must not be empty".into()));
        }

        debug!(question_len = question.len(), "embedding question");
        let embedding = self.embedder.embed(question).await?;

        let passages = self
            .store
            .search(&embedding, self.config.similarity_threshold, self.config.match_count)
            .await?;
        info!(passage_count = passages.len(), "retrieved passages");

        let context = assemble(&passages, self.config.token_budget, self.estimator.as_ref());
        let messages = build_messages(&context, question);

        let chunks = self.completions.stream_chat(&messages).await?;
        Ok(relay_stream(chunks).boxed())
    }
}

/// Builder for constructing a [`ChatPipeline`].
///
/// The embedding provider, passage store, and completion client are
/// required; the config defaults to [`ChatConfig::default()`] and the
/// estimator to [`HeuristicEstimator`].
#[derive(Default)]
pub struct ChatPipelineBuilder {
    config: Option<ChatConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn PassageStore>>,
    completions: Option<Arc<dyn CompletionClient>>,
    estimator: Option<Arc<dyn TokenEstimator>>,
}

impl ChatPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: ChatConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(provider);
        self
    }

    /// Set the passage store.
    pub fn passage_store(mut self, store: Arc<dyn PassageStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the streaming completion client.
    pub fn completion_client(mut self, client: Arc<dyn CompletionClient>) -> Self {
        self.completions = Some(client);
        self
    }

    /// Set a custom token estimator.
    pub fn token_estimator(mut self, estimator: Arc<dyn TokenEstimator>) -> Self {
        self.estimator = Some(estimator);
        self
    }

    /// Build the [`ChatPipeline`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Config`] if any required dependency is missing.
    pub fn build(self) -> Result<ChatPipeline> {
        let embedder = self
            .embedder
            .ok_or_else(|| ChatError::Config("embedding_provider is required".to_string()))?;
        let store =
            self.store.ok_or_else(|| ChatError::Config("passage_store is required".to_string()))?;
        let completions = self
            .completions
            .ok_or_else(|| ChatError::Config("completion_client is required".to_string()))?;

        Ok(ChatPipeline {
            config: self.config.unwrap_or_default(),
            embedder,
            store,
            completions,
            estimator: self.estimator.unwrap_or_else(|| Arc::new(HeuristicEstimator::default())),
        })
    }
}
