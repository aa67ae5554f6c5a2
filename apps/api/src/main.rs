mod config;
mod embedding;
mod errors;
mod extract;
mod jobs;
mod llm_client;
mod matching;
mod notify;
mod pipeline;
mod provider;
mod render;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extract::PdfTextExtractor;
use crate::llm_client::{LanguageModel, OpenAiChatClient};
use crate::matching::Matcher;
use crate::render::PdfDocumentRenderer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Match API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = Arc::new(OpenAiChatClient::new(&config)?);
    info!("LLM client initialized (model: {})", llm.model_name());

    // Initialize matcher (embedder + boost)
    let embedder = embedding::from_config(&config)?;
    let matcher = Matcher::new(embedder, config.boost_factor, config.embed_concurrency);
    info!(
        "Matcher initialized (embedder: {}, boost: {})",
        matcher.embedder_name(),
        matcher.boost_factor()
    );

    // Initialize job source and notifier
    let jobs = jobs::from_config(&config)?;
    let notifier = notify::from_config(&config)?;
    info!(
        "Job source: {}, notifier: {}",
        jobs.name(),
        notifier.name()
    );

    // Build app state
    let state = AppState {
        llm,
        extractor: Arc::new(PdfTextExtractor),
        jobs,
        notifier,
        renderer: Arc::new(PdfDocumentRenderer::default()),
        matcher,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
