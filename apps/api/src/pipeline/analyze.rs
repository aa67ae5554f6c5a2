//! CV analysis pipeline.
//!
//! Flow: summarize → resolve job query → fetch jobs (static fallback when empty) →
//!       rank → per-match reasoning (optional) → alerts above threshold → quality report.
//!
//! Only summarization, job fetch and ranking can fail the request. Reasoning, the
//! quality report and alerts degrade per item and are reported inline.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::countries::{resolve_country, DEFAULT_COUNTRY};
use crate::jobs::{fetch_with_fallback, JobQuery};
use crate::matching::MatchResult;
use crate::notify::{deliver, match_alert_message, NotificationOutcome};
use crate::pipeline::advice::{assess_quality, explain_match, summarize_cv, CvQualityReport};
use crate::state::AppState;

/// Roles suggested for every CV, shown alongside the matches.
pub const SUGGESTED_ROLES: &[&str] = &[
    "Artificial Intelligence",
    "Data Science",
    "Data Analytics",
    "Business Analytics",
    "Agentic AI",
    "Autonomous Agent",
    "Prompt Engineering",
    "Policy Modeling",
    "AI Governance",
    "Social Impact AI",
    "AI for Government",
];

/// Result of an optional LLM step: either the value or a user-facing reason it is missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Advisory<T> {
    Ready { value: T },
    Unavailable { message: String },
}

impl<T> Advisory<T> {
    fn from_result(step: &str, result: Result<T, AppError>) -> Self {
        match result {
            Ok(value) => Advisory::Ready { value },
            Err(e) => {
                warn!("{step} unavailable: {e}");
                Advisory::Unavailable {
                    message: format!("{step} is unavailable right now: {e}"),
                }
            }
        }
    }
}

/// User-supplied search parameters; every field optional.
#[derive(Debug, Clone, Default)]
pub struct MatchOptions {
    pub keyword: Option<String>,
    pub country: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub keyword: String,
    pub country: &'static str,
    pub job_source: &'static str,
    pub used_fallback_jobs: bool,
    pub boost_factor: f64,
    pub embedder: &'static str,
    pub matches: Vec<MatchResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedMatch {
    #[serde(flatten)]
    pub result: MatchResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<Advisory<String>>,
    /// Present only when the score reached the notification threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<NotificationOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CvAnalysis {
    pub analysis_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub cv_summary: String,
    pub suggested_roles: Vec<String>,
    pub keyword: String,
    pub country: &'static str,
    pub job_source: &'static str,
    pub used_fallback_jobs: bool,
    pub boost_factor: f64,
    pub matches: Vec<RankedMatch>,
    pub quality: Advisory<CvQualityReport>,
}

pub fn build_query(options: &MatchOptions, default_keyword: &str) -> Result<JobQuery, AppError> {
    let keyword = options
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .unwrap_or(default_keyword)
        .to_string();

    let country = match options.country.as_deref().map(str::trim) {
        None | Some("") => DEFAULT_COUNTRY,
        Some(input) => resolve_country(input)
            .ok_or_else(|| AppError::Validation(format!("Unsupported country '{input}'")))?,
    };

    let location = options
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string);

    Ok(JobQuery {
        keyword,
        country,
        location,
    })
}

/// Fetches jobs for the query and ranks them against the summary.
pub async fn find_matches(
    state: &AppState,
    cv_summary: &str,
    options: &MatchOptions,
) -> Result<MatchReport, AppError> {
    if cv_summary.trim().is_empty() {
        return Err(AppError::Validation("cv_summary cannot be empty".to_string()));
    }
    let query = build_query(options, &state.config.default_job_keyword)?;
    let fetch = fetch_with_fallback(state.jobs.as_ref(), &query).await?;
    let matches = state.matcher.rank(cv_summary, &fetch.jobs).await?;

    Ok(MatchReport {
        keyword: query.keyword,
        country: query.country,
        job_source: fetch.source,
        used_fallback_jobs: fetch.used_fallback,
        boost_factor: state.matcher.boost_factor(),
        embedder: state.matcher.embedder_name(),
        matches,
    })
}

pub async fn analyze_cv(
    state: &AppState,
    cv_text: &str,
    options: &MatchOptions,
    include_reasoning: bool,
) -> Result<CvAnalysis, AppError> {
    let analysis_id = Uuid::new_v4();
    let cv_summary = summarize_cv(state.llm.as_ref(), cv_text).await?;
    let report = find_matches(state, &cv_summary, options).await?;

    let reasoning: Vec<Option<Advisory<String>>> = if include_reasoning {
        let summary = cv_summary.as_str();
        join_all(report.matches.iter().map(|m| async move {
            let result = explain_match(state.llm.as_ref(), summary, &m.job.description).await;
            Some(Advisory::from_result("Match reasoning", result))
        }))
        .await
    } else {
        vec![None; report.matches.len()]
    };

    let mut matches = Vec::with_capacity(report.matches.len());
    for (result, reasoning) in report.matches.into_iter().zip(reasoning) {
        let alert = if result.adjusted_score >= state.config.notify_threshold {
            let message =
                match_alert_message(&result.job.title, result.adjusted_score, &result.job.url);
            Some(deliver(state.notifier.as_ref(), &message).await)
        } else {
            None
        };
        matches.push(RankedMatch {
            result,
            reasoning,
            alert,
        });
    }

    let quality = Advisory::from_result(
        "CV quality score",
        assess_quality(state.llm.as_ref(), &cv_summary).await,
    );

    info!(
        %analysis_id,
        matches = matches.len(),
        top_score = matches.first().map(|m| m.result.adjusted_score),
        fallback = report.used_fallback_jobs,
        "CV analysis complete"
    );

    Ok(CvAnalysis {
        analysis_id,
        generated_at: Utc::now(),
        cv_summary,
        suggested_roles: SUGGESTED_ROLES.iter().map(|r| r.to_string()).collect(),
        keyword: report.keyword,
        country: report.country,
        job_source: report.job_source,
        used_fallback_jobs: report.used_fallback_jobs,
        boost_factor: report.boost_factor,
        matches,
        quality,
    })
}
