//! HTTP surface for the question-answering pipeline.
//!
//! One route, two methods: `POST /api/chat` answers a question with a
//! streamed body of raw UTF-8 deltas; `OPTIONS /api/chat` serves the CORS
//! preflight. Errors after streaming has begun cannot change the committed
//! `200`; they terminate the stream and the client treats the truncation as
//! a partial result.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use concourse_rag::{ChatError, ChatPipeline};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::error;

const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Build the application router around a shared pipeline.
pub fn app(pipeline: Arc<ChatPipeline>) -> Router {
    Router::new()
        .route("/api/chat", post(chat).options(preflight))
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline)
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    question: Option<String>,
}

fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers
        .insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOWED_HEADERS));
    response
}

fn no_prompt() -> Response {
    with_cors(
        (StatusCode::BAD_REQUEST, Json(json!({ "error": "No prompt in the request" })))
            .into_response(),
    )
}

async fn preflight() -> Response {
    with_cors(Json(json!({ "data": "ok" })).into_response())
}

async fn chat(
    State(pipeline): State<Arc<ChatPipeline>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    // A missing or unreadable body is the same failure as a missing question.
    let question = body.ok().and_then(|Json(request)| request.question).unwrap_or_default();
    if question.is_empty() {
        return no_prompt();
    }

    match pipeline.ask(&question).await {
        Ok(stream) => with_cors(Body::from_stream(stream).into_response()),
        Err(ChatError::Validation(_)) => no_prompt(),
        Err(e) => {
            // Upstream detail stays in the logs; the caller sees a generic
            // failure.
            error!(error = %e, "pipeline failed before streaming");
            with_cors(
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "Something went wrong" })))
                    .into_response(),
            )
        }
    }
}
