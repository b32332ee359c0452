//! Server binary: wires environment configuration into the pipeline.

use std::sync::Arc;

use anyhow::Context;
use concourse_rag::{
    ChatConfig, ChatPipeline, OpenAIChatClient, OpenAIEmbeddingProvider, SupabaseStore,
};
use concourse_server::app;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let openai_key = std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?;
    let supabase_url = std::env::var("SUPABASE_URL").context("SUPABASE_URL must be set")?;
    let supabase_key = std::env::var("SUPABASE_KEY").context("SUPABASE_KEY must be set")?;

    let pipeline = ChatPipeline::builder()
        .config(ChatConfig::default())
        .embedding_provider(Arc::new(OpenAIEmbeddingProvider::new(&openai_key)?))
        .passage_store(Arc::new(SupabaseStore::new(&supabase_url, &supabase_key)?))
        .completion_client(Arc::new(OpenAIChatClient::new(&openai_key)?))
        .build()?;

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, app(Arc::new(pipeline))).await?;
    Ok(())
}
