//! Matcher — ranks job postings against a CV summary.
//!
//! Algorithm:
//! 1. Reject a blank summary (`InvalidInput`) before any embedding call.
//! 2. Embed the summary, then every job description with the same embedder.
//!    Job embeddings run concurrently (bounded) and come back in input order.
//! 3. Cosine similarity per job, clamped at 0, boosted and capped (see `scoring`).
//! 4. Stable sort, highest adjusted score first; ties keep the job source's order.

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::embedding::Embedder;
use crate::jobs::JobPosting;
use crate::matching::scoring::adjusted_score;
use crate::matching::similarity::{cosine_similarity, SimilarityError};
use crate::provider::ProviderError;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("degenerate embedding: {0}")]
    Degenerate(#[from] SimilarityError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// One scored job. `raw_score` is the cosine similarity clamped to `[0, 1]`;
/// `adjusted_score` is the boosted percentage in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub job: JobPosting,
    pub raw_score: f64,
    pub adjusted_score: f64,
}

#[derive(Clone)]
pub struct Matcher {
    embedder: Arc<dyn Embedder>,
    boost_factor: f64,
    concurrency: usize,
}

impl Matcher {
    pub fn new(embedder: Arc<dyn Embedder>, boost_factor: f64, concurrency: usize) -> Self {
        Self {
            embedder,
            boost_factor,
            concurrency: concurrency.max(1),
        }
    }

    pub fn boost_factor(&self) -> f64 {
        self.boost_factor
    }

    pub fn embedder_name(&self) -> &'static str {
        self.embedder.name()
    }

    pub async fn rank(
        &self,
        cv_summary: &str,
        jobs: &[JobPosting],
    ) -> Result<Vec<MatchResult>, MatchError> {
        if cv_summary.trim().is_empty() {
            return Err(MatchError::InvalidInput(
                "CV summary is empty".to_string(),
            ));
        }
        if jobs.is_empty() {
            return Ok(Vec::new());
        }

        let cv_vector = self.embedder.embed(cv_summary).await?;

        // Futures are built up front; a lazy map over borrowed jobs makes the
        // returned future non-Send for axum handlers.
        let pending: Vec<_> = jobs
            .iter()
            .map(|job| self.embedder.embed(&job.description))
            .collect();
        let job_vectors: Vec<Vec<f32>> = stream::iter(pending)
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let mut results = jobs
            .iter()
            .zip(job_vectors)
            .map(|(job, job_vector)| {
                let similarity = cosine_similarity(&cv_vector, &job_vector)?;
                let raw_score = similarity.clamp(0.0, 1.0);
                Ok(MatchResult {
                    job: job.clone(),
                    raw_score,
                    adjusted_score: adjusted_score(raw_score, self.boost_factor),
                })
            })
            .collect::<Result<Vec<_>, MatchError>>()?;

        // sort_by is stable
        results.sort_by(|a, b| b.adjusted_score.total_cmp(&a.adjusted_score));

        debug!(
            embedder = self.embedder.name(),
            jobs = results.len(),
            top_score = results.first().map(|r| r.adjusted_score),
            "ranked jobs against CV summary"
        );

        Ok(results)
    }
}
