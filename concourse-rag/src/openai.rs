//! OpenAI embedding provider using the OpenAI embeddings API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{ChatError, Result};

/// The default OpenAI API base URL.
pub(crate) const OPENAI_BASE_URL: &str = "https://api.openai.com";

/// The default model for OpenAI embeddings.
const DEFAULT_MODEL: &str = "text-embedding-ada-002";

/// The dimensionality of `text-embedding-ada-002` vectors.
const DEFAULT_DIMENSIONS: usize = 1536;

/// Default timeout for one embeddings call.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// An [`EmbeddingProvider`] backed by the OpenAI embeddings API.
///
/// Uses `reqwest` to call the `/v1/embeddings` endpoint directly. Newlines in
/// the input are replaced with spaces before submission; the embedding model
/// is sensitive to input formatting.
///
/// # Configuration
///
/// - `model` – defaults to `text-embedding-ada-002`.
/// - `base_url` – overridable for tests and compatible gateways.
/// - `timeout` – per-call request timeout, defaults to 30 seconds.
pub struct OpenAIEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
    timeout: Duration,
}

impl OpenAIEmbeddingProvider {
    /// Create a new provider with the given API key.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Config`] if the key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ChatError::Config("OpenAI API key must not be empty".into()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: OPENAI_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL (no trailing slash).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-call request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

// ── EmbeddingProvider implementation ───────────────────────────────

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let input = text.replace('\n', " ");

        debug!(model = %self.model, input_len = input.len(), "embedding text");

        let request_body = EmbeddingRequest { model: &self.model, input: &input };

        let response = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url))
            .timeout(self.timeout)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "embeddings request failed");
                ChatError::upstream("openai-embeddings", format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            error!(%status, "embeddings API error");
            return Err(ChatError::upstream(
                "openai-embeddings",
                format!("API returned {status}"),
            ));
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(error = %e, "failed to parse embeddings response");
            ChatError::upstream("openai-embeddings", format!("malformed response: {e}"))
        })?;

        embedding_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ChatError::upstream("openai-embeddings", "API returned no embedding"))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
