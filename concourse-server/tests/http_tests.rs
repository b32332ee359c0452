//! In-process router tests with a doubled-out pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use bytes::Bytes;
use concourse_rag::{
    ChatError, ChatMessage, ChatPipeline, ChunkStream, CompletionClient, EmbeddingProvider,
    Passage, PassageStore, Result as RagResult,
};
use concourse_server::app;
use futures::StreamExt;
use http_body_util::BodyExt;
use tower::util::ServiceExt;

// ── Pipeline doubles ───────────────────────────────────────────────

struct FixedEmbedder;

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    async fn embed(&self, _text: &str) -> RagResult<Vec<f32>> {
        Ok(vec![0.1; 8])
    }

    fn dimensions(&self) -> usize {
        8
    }
}

struct FixedStore(Vec<Passage>);

#[async_trait]
impl PassageStore for FixedStore {
    async fn search(&self, _e: &[f32], _t: f32, _l: usize) -> RagResult<Vec<Passage>> {
        Ok(self.0.clone())
    }
}

struct FailingStore;

#[async_trait]
impl PassageStore for FailingStore {
    async fn search(&self, _e: &[f32], _t: f32, _l: usize) -> RagResult<Vec<Passage>> {
        Err(ChatError::upstream("vector-store", "service unavailable"))
    }
}

struct ScriptedCompletion(Vec<Vec<u8>>);

impl ScriptedCompletion {
    fn answering(deltas: &[&str]) -> Self {
        let mut chunks: Vec<Vec<u8>> = deltas
            .iter()
            .map(|text| {
                let payload = serde_json::json!({ "choices": [{ "delta": { "content": text } }] });
                format!("data: {payload}\n\n").into_bytes()
            })
            .collect();
        chunks.push(b"data: [DONE]\n\n".to_vec());
        Self(chunks)
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn stream_chat(&self, _messages: &[ChatMessage]) -> RagResult<ChunkStream> {
        let chunks: Vec<RagResult<Bytes>> =
            self.0.iter().cloned().map(|chunk| Ok(Bytes::from(chunk))).collect();
        Ok(futures::stream::iter(chunks).boxed())
    }
}

fn pipeline_with_store(store: Arc<dyn PassageStore>) -> Arc<ChatPipeline> {
    Arc::new(
        ChatPipeline::builder()
            .embedding_provider(Arc::new(FixedEmbedder))
            .passage_store(store)
            .completion_client(Arc::new(ScriptedCompletion::answering(&[
                "Yes", ", you", " can.",
            ])))
            .build()
            .unwrap(),
    )
}

fn test_app() -> axum::Router {
    app(pipeline_with_store(Arc::new(FixedStore(vec![Passage::new(
        "Sporting equipment: snowboards count as one piece of hold baggage.",
        0.91,
    )]))))
}

fn post_chat(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn preflight_returns_ok_with_cors_headers() {
    let request =
        Request::builder().method("OPTIONS").uri("/api/chat").body(Body::empty()).unwrap();
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "authorization, x-client-info, apikey, content-type"
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!({ "data": "ok" }));
}

#[tokio::test]
async fn missing_question_is_a_400() {
    let response = test_app().oneshot(post_chat("{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!({ "error": "No prompt in the request" }));
}

#[tokio::test]
async fn empty_question_is_a_400() {
    let response = test_app().oneshot(post_chat(r#"{"question":""}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unreadable_body_is_a_400() {
    let response = test_app().oneshot(post_chat("not json at all")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn valid_question_streams_the_answer_bytes() {
    let response = test_app()
        .oneshot(post_chat(r#"{"question":"Can I bring a snowboard?"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"Yes, you can.");
}

#[tokio::test]
async fn upstream_failure_is_a_generic_500() {
    let router = app(pipeline_with_store(Arc::new(FailingStore)));
    let response = router
        .oneshot(post_chat(r#"{"question":"Can I bring a snowboard?"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    // Generic message only; upstream detail never leaks to the caller.
    assert_eq!(json, serde_json::json!({ "error": "Something went wrong" }));
}
