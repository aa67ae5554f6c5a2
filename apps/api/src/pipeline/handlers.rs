use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::jobs::countries::{COUNTRIES, DEFAULT_COUNTRY};
use crate::notify::{deliver, NotificationOutcome};
use crate::pipeline::advice::{
    ask_career_question, assess_quality, explain_match, improve_cv, tailor_cv, CvQualityReport,
};
use crate::pipeline::analyze::{analyze_cv, find_matches, CvAnalysis, MatchOptions, MatchReport};
use crate::state::AppState;

const TAILORED_CV_STEM: &str = "Tailored_CV";

/// Fields of a CV upload form. Only `file` is required.
#[derive(Default)]
struct CvUpload {
    file: Option<Bytes>,
    options: MatchOptions,
    reasoning: bool,
}

async fn read_upload(mut multipart: Multipart) -> Result<CvUpload, AppError> {
    let mut upload = CvUpload::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?;
            upload.file = Some(bytes);
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::Validation(format!("Malformed field '{name}': {e}")))?;
        match name.as_str() {
            "keyword" => upload.options.keyword = Some(value),
            "country" => upload.options.country = Some(value),
            "location" => upload.options.location = Some(value),
            "reasoning" => upload.reasoning = parse_flag(&value),
            _ => {}
        }
    }
    Ok(upload)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

async fn extract_upload(state: &AppState, file: Option<Bytes>) -> Result<String, AppError> {
    let bytes = file.ok_or_else(|| AppError::Validation("A CV file is required".to_string()))?;
    Ok(state.extractor.extract(bytes).await?)
}

#[derive(Serialize)]
pub struct ExtractResponse {
    pub text: String,
}

/// POST /api/v1/cv/extract
pub async fn handle_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    let upload = read_upload(multipart).await?;
    let text = extract_upload(&state, upload.file).await?;
    Ok(Json(ExtractResponse { text }))
}

/// POST /api/v1/cv/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CvAnalysis>, AppError> {
    let upload = read_upload(multipart).await?;
    let cv_text = extract_upload(&state, upload.file).await?;
    let analysis = analyze_cv(&state, &cv_text, &upload.options, upload.reasoning).await?;
    Ok(Json(analysis))
}

#[derive(Deserialize)]
pub struct MatchRequest {
    pub cv_summary: String,
    pub keyword: Option<String>,
    pub country: Option<String>,
    pub location: Option<String>,
}

/// POST /api/v1/matches
pub async fn handle_matches(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchReport>, AppError> {
    let options = MatchOptions {
        keyword: req.keyword,
        country: req.country,
        location: req.location,
    };
    let report = find_matches(&state, &req.cv_summary, &options).await?;
    Ok(Json(report))
}

#[derive(Deserialize)]
pub struct JobAdviceRequest {
    pub cv_summary: String,
    pub job_description: String,
}

#[derive(Serialize)]
pub struct ReasoningResponse {
    pub reasoning: String,
}

/// POST /api/v1/cv/reasoning
pub async fn handle_reasoning(
    State(state): State<AppState>,
    Json(req): Json<JobAdviceRequest>,
) -> Result<Json<ReasoningResponse>, AppError> {
    let reasoning = explain_match(state.llm.as_ref(), &req.cv_summary, &req.job_description).await?;
    Ok(Json(ReasoningResponse { reasoning }))
}

#[derive(Serialize)]
pub struct TailorResponse {
    pub tailored_cv: String,
}

/// POST /api/v1/cv/tailor
pub async fn handle_tailor(
    State(state): State<AppState>,
    Json(req): Json<JobAdviceRequest>,
) -> Result<Json<TailorResponse>, AppError> {
    let tailored_cv = tailor_cv(state.llm.as_ref(), &req.cv_summary, &req.job_description).await?;
    Ok(Json(TailorResponse { tailored_cv }))
}

/// POST /api/v1/cv/tailor/pdf
/// Same body as `/cv/tailor`; answers with the tailored CV as a file download.
pub async fn handle_tailor_pdf(
    State(state): State<AppState>,
    Json(req): Json<JobAdviceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tailored = tailor_cv(state.llm.as_ref(), &req.cv_summary, &req.job_description).await?;

    let renderer = state.renderer.clone();
    let document = tokio::task::spawn_blocking(move || renderer.render(&tailored))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("render task failed: {e}")))??;

    let headers = [
        (header::CONTENT_TYPE, state.renderer.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{TAILORED_CV_STEM}.{}\"",
                state.renderer.file_extension()
            ),
        ),
    ];
    Ok((headers, document))
}

#[derive(Deserialize)]
pub struct QualityRequest {
    pub cv_summary: String,
}

/// POST /api/v1/cv/quality
pub async fn handle_quality(
    State(state): State<AppState>,
    Json(req): Json<QualityRequest>,
) -> Result<Json<CvQualityReport>, AppError> {
    let report = assess_quality(state.llm.as_ref(), &req.cv_summary).await?;
    Ok(Json(report))
}

#[derive(Deserialize)]
pub struct ImproveRequest {
    pub cv_text: String,
    pub feedback: String,
}

#[derive(Serialize)]
pub struct ImproveResponse {
    pub improved_cv: String,
}

/// POST /api/v1/cv/improve
pub async fn handle_improve(
    State(state): State<AppState>,
    Json(req): Json<ImproveRequest>,
) -> Result<Json<ImproveResponse>, AppError> {
    let improved_cv = improve_cv(state.llm.as_ref(), &req.cv_text, &req.feedback).await?;
    Ok(Json(ImproveResponse { improved_cv }))
}

#[derive(Deserialize)]
pub struct AskRequest {
    pub question: String,
    pub cv_summary: String,
}

#[derive(Serialize)]
pub struct AskResponse {
    pub answer: String,
}

/// POST /api/v1/cv/ask
pub async fn handle_ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    let answer = ask_career_question(state.llm.as_ref(), &req.question, &req.cv_summary).await?;
    Ok(Json(AskResponse { answer }))
}

#[derive(Deserialize)]
pub struct NotifyRequest {
    pub message: String,
}

/// POST /api/v1/notify
/// Delivery problems are reported in the outcome, not as an HTTP error.
pub async fn handle_notify(
    State(state): State<AppState>,
    Json(req): Json<NotifyRequest>,
) -> Result<Json<NotificationOutcome>, AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }
    Ok(Json(deliver(state.notifier.as_ref(), &req.message).await))
}

#[derive(Serialize)]
pub struct Country {
    pub name: &'static str,
    pub code: &'static str,
}

#[derive(Serialize)]
pub struct CountriesResponse {
    pub countries: Vec<Country>,
    pub default: &'static str,
}

/// GET /api/v1/countries
pub async fn handle_countries() -> Json<CountriesResponse> {
    Json(CountriesResponse {
        countries: COUNTRIES
            .iter()
            .map(|&(name, code)| Country { name, code })
            .collect(),
        default: DEFAULT_COUNTRY,
    })
}
