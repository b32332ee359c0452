//! Similarity search over an external vector store.
//!
//! The store itself is opaque: this module only shapes the nearest-neighbor
//! query and consumes the ordered result. Index maintenance lives in the
//! offline ingestion job.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{ChatError, Result};
use crate::passage::Passage;

/// Default timeout for one search call.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A similarity-search service over pre-indexed document vectors.
///
/// Implementations return passages with similarity at or above `threshold`,
/// ordered by descending similarity and truncated to `limit`. Ordering and
/// filtering are performed upstream; callers consume the result as-is.
#[async_trait]
pub trait PassageStore: Send + Sync {
    /// Query for the nearest passages to `embedding`.
    async fn search(&self, embedding: &[f32], threshold: f32, limit: usize)
        -> Result<Vec<Passage>>;
}

/// A [`PassageStore`] backed by a Supabase `match_documents` RPC.
///
/// Issues a PostgREST remote-procedure call against the project's REST
/// endpoint; the similarity computation runs inside the database.
pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl SupabaseStore {
    /// Create a new store for the given project URL and service key.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Config`] if either value is empty.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        let api_key = api_key.into();
        if base_url.is_empty() {
            return Err(ChatError::Config("Supabase URL must not be empty".into()));
        }
        if api_key.is_empty() {
            return Err(ChatError::Config("Supabase key must not be empty".into()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Set the per-call request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ── RPC request/response types ─────────────────────────────────────

#[derive(Serialize)]
struct MatchDocumentsRequest<'a> {
    query_embedding: &'a [f32],
    similarity_threshold: f32,
    match_count: usize,
}

#[derive(Deserialize)]
struct MatchedDocument {
    document_content: String,
    #[serde(default)]
    similarity: f32,
}

#[async_trait]
impl PassageStore for SupabaseStore {
    async fn search(
        &self,
        embedding: &[f32],
        threshold: f32,
        limit: usize,
    ) -> Result<Vec<Passage>> {
        debug!(dimensions = embedding.len(), threshold, limit, "querying vector store");

        let request_body = MatchDocumentsRequest {
            query_embedding: embedding,
            similarity_threshold: threshold,
            match_count: limit,
        };

        let response = self
            .client
            .post(format!("{}/rest/v1/rpc/match_documents", self.base_url))
            .timeout(self.timeout)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "vector store request failed");
                ChatError::upstream("vector-store", format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            error!(%status, "vector store error");
            return Err(ChatError::upstream("vector-store", format!("RPC returned {status}")));
        }

        let rows: Vec<MatchedDocument> = response.json().await.map_err(|e| {
            error!(error = %e, "failed to parse vector store response");
            ChatError::upstream("vector-store", format!("malformed response: {e}"))
        })?;

        Ok(rows
            .into_iter()
            .map(|row| Passage { content: row.document_content, similarity: row.similarity })
            .collect())
    }
}
