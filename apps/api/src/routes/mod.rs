pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers;
use crate::state::AppState;

/// Largest accepted request body; CV uploads are the only large payloads.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // CV uploads (multipart)
        .route("/api/v1/cv/extract", post(handlers::handle_extract))
        .route("/api/v1/cv/analyze", post(handlers::handle_analyze))
        // Matching
        .route("/api/v1/matches", post(handlers::handle_matches))
        .route("/api/v1/countries", get(handlers::handle_countries))
        // LLM advice
        .route("/api/v1/cv/reasoning", post(handlers::handle_reasoning))
        .route("/api/v1/cv/tailor", post(handlers::handle_tailor))
        .route("/api/v1/cv/tailor/pdf", post(handlers::handle_tailor_pdf))
        .route("/api/v1/cv/quality", post(handlers::handle_quality))
        .route("/api/v1/cv/improve", post(handlers::handle_improve))
        .route("/api/v1/cv/ask", post(handlers::handle_ask))
        // Notifications
        .route("/api/v1/notify", post(handlers::handle_notify))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
