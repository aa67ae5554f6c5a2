//! LLM-backed advisory operations: summary, match reasoning, tailoring, quality
//! scoring, improvement and career Q&A. All go through `LanguageModel`.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::prompts::{
    fill_template, ASSISTANT_SYSTEM, CAREER_QA_PROMPT, CV_QUALITY_PROMPT, IMPROVE_CV_PROMPT,
    JSON_ONLY_SYSTEM, MATCH_REASONING_PROMPT, SUMMARIZE_CV_PROMPT, TAILOR_CV_PROMPT,
};
use crate::llm_client::{complete_json, LanguageModel};

/// AI assessment of a CV, score clamped to 0–100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CvQualityReport {
    pub score: u8,
    pub feedback: String,
}

#[derive(Debug, Deserialize)]
struct RawQualityReport {
    score: f64,
    feedback: String,
}

impl From<RawQualityReport> for CvQualityReport {
    fn from(raw: RawQualityReport) -> Self {
        let score = if raw.score.is_finite() {
            raw.score.round().clamp(0.0, 100.0) as u8
        } else {
            0
        };
        Self {
            score,
            feedback: raw.feedback.trim().to_string(),
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

pub async fn summarize_cv(llm: &dyn LanguageModel, cv_text: &str) -> Result<String, AppError> {
    require_text("cv_text", cv_text)?;
    let prompt = fill_template(SUMMARIZE_CV_PROMPT, &[("cv_text", cv_text.trim())]);
    Ok(llm.complete(&prompt, ASSISTANT_SYSTEM).await?)
}

pub async fn explain_match(
    llm: &dyn LanguageModel,
    cv_summary: &str,
    job_description: &str,
) -> Result<String, AppError> {
    require_text("cv_summary", cv_summary)?;
    require_text("job_description", job_description)?;
    let prompt = fill_template(
        MATCH_REASONING_PROMPT,
        &[
            ("cv_summary", cv_summary.trim()),
            ("job_description", job_description.trim()),
        ],
    );
    Ok(llm.complete(&prompt, ASSISTANT_SYSTEM).await?)
}

pub async fn tailor_cv(
    llm: &dyn LanguageModel,
    cv_summary: &str,
    job_description: &str,
) -> Result<String, AppError> {
    require_text("cv_summary", cv_summary)?;
    require_text("job_description", job_description)?;
    let prompt = fill_template(
        TAILOR_CV_PROMPT,
        &[
            ("cv_summary", cv_summary.trim()),
            ("job_description", job_description.trim()),
        ],
    );
    Ok(llm.complete(&prompt, ASSISTANT_SYSTEM).await?)
}

pub async fn assess_quality(
    llm: &dyn LanguageModel,
    cv_summary: &str,
) -> Result<CvQualityReport, AppError> {
    require_text("cv_summary", cv_summary)?;
    let prompt = fill_template(CV_QUALITY_PROMPT, &[("cv_summary", cv_summary.trim())]);
    let raw: RawQualityReport = complete_json(llm, &prompt, JSON_ONLY_SYSTEM).await?;
    Ok(raw.into())
}

pub async fn improve_cv(
    llm: &dyn LanguageModel,
    cv_text: &str,
    feedback: &str,
) -> Result<String, AppError> {
    require_text("cv_text", cv_text)?;
    require_text("feedback", feedback)?;
    let prompt = fill_template(
        IMPROVE_CV_PROMPT,
        &[("feedback", feedback.trim()), ("cv_text", cv_text.trim())],
    );
    Ok(llm.complete(&prompt, ASSISTANT_SYSTEM).await?)
}

pub async fn ask_career_question(
    llm: &dyn LanguageModel,
    question: &str,
    cv_summary: &str,
) -> Result<String, AppError> {
    require_text("question", question)?;
    require_text("cv_summary", cv_summary)?;
    let prompt = fill_template(
        CAREER_QA_PROMPT,
        &[("question", question.trim()), ("cv_summary", cv_summary.trim())],
    );
    Ok(llm.complete(&prompt, ASSISTANT_SYSTEM).await?)
}
