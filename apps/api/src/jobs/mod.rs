//! Job sources: where candidate postings come from.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{Config, JobSourceKind};
use crate::provider::ProviderError;

pub mod adzuna;
pub mod countries;
pub mod static_source;

pub use adzuna::AdzunaJobSource;
pub use static_source::StaticJobSource;

/// A single job posting. Immutable once produced by a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub location: String,
    pub description: String,
    pub url: String,
}

/// Search parameters. `country` is an ISO-3166 alpha-2 code in lowercase.
#[derive(Debug, Clone)]
pub struct JobQuery {
    pub keyword: String,
    pub country: &'static str,
    pub location: Option<String>,
}

#[async_trait]
pub trait JobSource: Send + Sync {
    /// An empty result is valid and means "no jobs found".
    async fn search(&self, query: &JobQuery) -> Result<Vec<JobPosting>, ProviderError>;

    fn name(&self) -> &'static str;
}

/// Postings plus where they came from.
#[derive(Debug, Clone, Serialize)]
pub struct JobFetch {
    pub jobs: Vec<JobPosting>,
    pub source: &'static str,
    pub used_fallback: bool,
}

/// Runs the configured source; when it finds nothing, falls back to the static
/// default list for the same keyword. Provider errors are returned, not masked.
pub async fn fetch_with_fallback(
    source: &dyn JobSource,
    query: &JobQuery,
) -> Result<JobFetch, ProviderError> {
    let jobs = source.search(query).await?;
    if !jobs.is_empty() {
        return Ok(JobFetch {
            jobs,
            source: source.name(),
            used_fallback: false,
        });
    }

    info!(
        source = source.name(),
        keyword = %query.keyword,
        "no jobs found, using default postings"
    );
    Ok(JobFetch {
        jobs: StaticJobSource::default_jobs(&query.keyword),
        source: StaticJobSource::NAME,
        used_fallback: true,
    })
}

/// Builds the job source selected by `JOB_SOURCE`.
pub fn from_config(config: &Config) -> anyhow::Result<Arc<dyn JobSource>> {
    Ok(match (config.job_source, &config.adzuna) {
        (JobSourceKind::Adzuna, Some(adzuna)) => Arc::new(AdzunaJobSource::new(
            adzuna,
            config.request_timeout,
            config.max_retries,
        )?),
        (JobSourceKind::Adzuna, None) => {
            anyhow::bail!("JOB_SOURCE=adzuna requires ADZUNA_APP_ID and ADZUNA_APP_KEY")
        }
        (JobSourceKind::Static, _) => Arc::new(StaticJobSource),
    })
}
