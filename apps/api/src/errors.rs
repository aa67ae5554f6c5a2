use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extract::ExtractError;
use crate::matching::MatchError;
use crate::provider::ProviderError;
use crate::render::RenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unreadable PDF: {0}")]
    UnreadablePdf(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<MatchError> for AppError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::InvalidInput(msg) => AppError::Validation(msg),
            MatchError::Degenerate(e) => AppError::UnprocessableEntity(e.to_string()),
            MatchError::Provider(e) => AppError::Provider(e),
        }
    }
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::UnreadablePdf(msg) => AppError::UnreadablePdf(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnreadablePdf(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNREADABLE_PDF",
                format!("Could not read the uploaded PDF: {msg}"),
            ),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Provider(e) if e.is_rate_limited() => {
                tracing::warn!("Provider rate limited: {e}");
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    "RATE_LIMITED",
                    format!(
                        "The {} service is rate limiting requests. Please retry shortly.",
                        e.provider()
                    ),
                )
            }
            AppError::Provider(e) => {
                tracing::error!("Provider error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "PROVIDER_ERROR",
                    format!(
                        "The {} service failed to respond. Please retry.",
                        e.provider()
                    ),
                )
            }
            AppError::Render(RenderError::EmptyDocument) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                "There is no text to render".to_string(),
            ),
            AppError::Render(e) => {
                tracing::error!("Render error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "The document could not be generated".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
