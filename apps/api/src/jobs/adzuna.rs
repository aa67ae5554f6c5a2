//! Adzuna job-search API (`/v1/api/jobs/{country}/search/1`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::config::AdzunaConfig;
use crate::jobs::{JobPosting, JobQuery, JobSource};
use crate::provider::{build_http_client, send_with_retry, ProviderError};

const PROVIDER: &str = "adzuna";
const BASE_URL: &str = "https://api.adzuna.com/v1/api/jobs";
const RESULTS_PER_PAGE: u32 = 10;

pub struct AdzunaJobSource {
    client: Client,
    base_url: String,
    app_id: String,
    app_key: String,
    max_retries: u32,
}

impl AdzunaJobSource {
    pub fn new(config: &AdzunaConfig, timeout: Duration, max_retries: u32) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_http_client(PROVIDER, timeout)?,
            base_url: BASE_URL.to_string(),
            app_id: config.app_id.clone(),
            app_key: config.app_key.clone(),
            max_retries,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<AdzunaJob>,
}

#[derive(Debug, Deserialize)]
struct AdzunaJob {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    redirect_url: String,
    location: Option<AdzunaLocation>,
}

#[derive(Debug, Deserialize)]
struct AdzunaLocation {
    display_name: Option<String>,
}

impl SearchResponse {
    /// Converts API results into postings, dropping entries without a title or
    /// description (nothing to embed or display).
    fn into_postings(self) -> Vec<JobPosting> {
        self.results
            .into_iter()
            .map(|j| JobPosting {
                title: strip_highlight_tags(&j.title),
                location: j
                    .location
                    .and_then(|l| l.display_name)
                    .unwrap_or_else(|| "Unspecified".to_string()),
                description: strip_highlight_tags(&j.description),
                url: j.redirect_url,
            })
            .filter(|p| !p.title.is_empty() && !p.description.is_empty())
            .collect()
    }
}

/// Adzuna wraps matched terms in `<strong>` tags.
fn strip_highlight_tags(s: &str) -> String {
    s.replace("<strong>", "")
        .replace("</strong>", "")
        .trim()
        .to_string()
}

#[async_trait]
impl JobSource for AdzunaJobSource {
    async fn search(&self, query: &JobQuery) -> Result<Vec<JobPosting>, ProviderError> {
        let url = format!("{}/{}/search/1", self.base_url, query.country);
        let results_per_page = RESULTS_PER_PAGE.to_string();

        let response = send_with_retry(PROVIDER, self.max_retries, || {
            let mut params: Vec<(&str, &str)> = vec![
                ("app_id", self.app_id.as_str()),
                ("app_key", self.app_key.as_str()),
                ("what", query.keyword.as_str()),
                ("results_per_page", results_per_page.as_str()),
                ("content-type", "application/json"),
            ];
            if let Some(location) = query.location.as_deref().filter(|l| !l.trim().is_empty()) {
                params.push(("where", location));
            }
            self.client.get(&url).query(&params)
        })
        .await?;

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()))?;
        let postings = parsed.into_postings();

        info!(
            country = query.country,
            keyword = %query.keyword,
            found = postings.len(),
            "adzuna search complete"
        );
        Ok(postings)
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "count": 3,
        "results": [
            {
                "title": "Senior <strong>Data Scientist</strong>",
                "description": "Build <strong>models</strong> in Python.",
                "redirect_url": "https://www.adzuna.co.uk/jobs/land/ad/1",
                "location": {"display_name": "London, UK", "area": ["UK", "London"]},
                "company": {"display_name": "Acme"}
            },
            {
                "title": "Analyst",
                "description": "",
                "redirect_url": "https://www.adzuna.co.uk/jobs/land/ad/2"
            },
            {
                "title": "ML Engineer",
                "description": "Ship ML systems.",
                "redirect_url": "https://www.adzuna.co.uk/jobs/land/ad/3"
            }
        ]
    }"#;

    #[test]
    fn test_parses_and_cleans_results() {
        let parsed: SearchResponse = serde_json::from_str(SAMPLE).unwrap();
        let postings = parsed.into_postings();
        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0].title, "Senior Data Scientist");
        assert_eq!(postings[0].description, "Build models in Python.");
        assert_eq!(postings[0].location, "London, UK");
        assert_eq!(postings[1].location, "Unspecified");
        assert_eq!(postings[1].url, "https://www.adzuna.co.uk/jobs/land/ad/3");
    }

    #[test]
    fn test_markup_only_fields_are_dropped() {
        let body = r#"{"results": [
            {"title": "A", "description": "<strong></strong>", "redirect_url": "u1"},
            {"title": "<strong> </strong>", "description": "Real text", "redirect_url": "u2"},
            {"title": "B", "description": "Kept", "redirect_url": "u3"}
        ]}"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        let postings = parsed.into_postings();
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].url, "u3");
    }

    #[test]
    fn test_missing_results_is_empty() {
        let parsed: SearchResponse = serde_json::from_str(r#"{"count": 0}"#).unwrap();
        assert!(parsed.into_postings().is_empty());
    }
}
