//! Streaming chat-completion client.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use futures::stream::BoxStream;
use serde::Serialize;
use tracing::{debug, error};

use crate::error::{ChatError, Result};
use crate::openai::OPENAI_BASE_URL;
use crate::prompt::ChatMessage;

/// The default chat model.
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default sampling temperature.
const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Default ceiling on generated tokens.
const DEFAULT_MAX_TOKENS: u32 = 500;

/// Default timeout for establishing the completion connection.
///
/// Applies to the connect phase only; the response body is an open-ended
/// stream and must not be clamped by a whole-request deadline.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// A stream of raw network chunks from the completion response body.
pub type ChunkStream = BoxStream<'static, Result<Bytes>>;

/// A client that issues a streaming chat-completion request.
///
/// Returns the raw response body; SSE decoding is the relay's job.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Start a streaming completion for the given messages.
    ///
    /// The HTTP status is checked before any stream is exposed; a failed
    /// request never partially opens a stream to the caller.
    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<ChunkStream>;
}

/// A [`CompletionClient`] backed by the OpenAI chat-completions API.
pub struct OpenAIChatClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIChatClient {
    /// Create a new client with the given API key.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Config`] if the key is empty or the underlying
    /// HTTP client cannot be constructed.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ChatError::Config("OpenAI API key must not be empty".into()));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ChatError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: OPENAI_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
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

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the ceiling on generated tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the connect-phase timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Config`] if the HTTP client cannot be rebuilt.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| ChatError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(self)
    }
}

// ── OpenAI API request types ───────────────────────────────────────

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    max_tokens: u32,
    stream: bool,
}

#[async_trait]
impl CompletionClient for OpenAIChatClient {
    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<ChunkStream> {
        debug!(model = %self.model, message_count = messages.len(), "starting completion stream");

        let request_body = CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            max_tokens: self.max_tokens,
            stream: true,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "completion request failed");
                ChatError::upstream("openai-completions", format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            error!(%status, "completions API error");
            return Err(ChatError::upstream(
                "openai-completions",
                format!("API returned {status}"),
            ));
        }

        Ok(Box::pin(response.bytes_stream().map_err(|e| {
            ChatError::upstream("openai-completions", format!("stream transport error: {e}"))
        })))
    }
}
