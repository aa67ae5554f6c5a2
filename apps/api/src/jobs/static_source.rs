use async_trait::async_trait;

use crate::jobs::{JobPosting, JobQuery, JobSource};
use crate::provider::ProviderError;

/// Three canned postings built around the search keyword.
/// Used directly when `JOB_SOURCE=static`, and as the fallback when a live
/// source comes back empty.
pub struct StaticJobSource;

impl StaticJobSource {
    pub const NAME: &'static str = "static";

    pub fn default_jobs(keyword: &str) -> Vec<JobPosting> {
        let keyword = keyword.trim();
        let title = title_case(keyword);
        vec![
            JobPosting {
                title: format!("{title} at TechCorp"),
                location: "Remote".to_string(),
                description: format!("Join us as a {keyword}."),
                url: "https://example.com/job1".to_string(),
            },
            JobPosting {
                title: format!("{title} Specialist"),
                location: "New York".to_string(),
                description: format!("We're looking for a {keyword} expert."),
                url: "https://example.com/job2".to_string(),
            },
            JobPosting {
                title: format!("Lead {title}"),
                location: "London".to_string(),
                description: format!("Lead our {keyword} division."),
                url: "https://example.com/job3".to_string(),
            },
        ]
    }
}

#[async_trait]
impl JobSource for StaticJobSource {
    async fn search(&self, query: &JobQuery) -> Result<Vec<JobPosting>, ProviderError> {
        Ok(Self::default_jobs(&query.keyword))
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

/// Uppercases the first letter of every word and lowercases the rest.
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("data scientist"), "Data Scientist");
        assert_eq!(title_case("  mACHINE   learning "), "Machine Learning");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_default_jobs_shape() {
        let jobs = StaticJobSource::default_jobs("data scientist");
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0].title, "Data Scientist at TechCorp");
        assert_eq!(jobs[0].location, "Remote");
        assert_eq!(jobs[0].description, "Join us as a data scientist.");
        assert_eq!(jobs[1].title, "Data Scientist Specialist");
        assert_eq!(jobs[1].description, "We're looking for a data scientist expert.");
        assert_eq!(jobs[2].title, "Lead Data Scientist");
        assert_eq!(jobs[2].location, "London");
        assert_eq!(jobs[2].url, "https://example.com/job3");
    }

    #[tokio::test]
    async fn test_search_uses_keyword() {
        let query = JobQuery {
            keyword: "rust engineer".to_string(),
            country: "gb",
            location: Some("Leeds".to_string()),
        };
        let jobs = StaticJobSource.search(&query).await.unwrap();
        assert!(jobs.iter().all(|j| j.title.contains("Rust Engineer")));
    }
}
