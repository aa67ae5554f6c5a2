//! Shared plumbing for every hosted-service call: one error type and one retry loop.
//!
//! The LLM, embedding, job-search and messaging clients all go through
//! `send_with_retry`, so transient failures (429, 5xx, connect/timeout) are
//! retried the same way everywhere and the caller only ever sees `ProviderError`.

use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} HTTP error: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API error (status {status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("{provider} rate limited after {attempts} attempts")]
    RateLimited {
        provider: &'static str,
        attempts: u32,
    },

    #[error("{provider} returned an unexpected response: {message}")]
    Malformed {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} returned empty content")]
    EmptyContent { provider: &'static str },
}

impl ProviderError {
    pub fn provider(&self) -> &'static str {
        match self {
            ProviderError::Http { provider, .. }
            | ProviderError::Api { provider, .. }
            | ProviderError::RateLimited { provider, .. }
            | ProviderError::Malformed { provider, .. }
            | ProviderError::EmptyContent { provider } => provider,
        }
    }

    /// True for quota / rate-limit failures, whichever way the provider reported them.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            ProviderError::RateLimited { .. } => true,
            ProviderError::Api { status, .. } => *status == StatusCode::TOO_MANY_REQUESTS.as_u16(),
            _ => false,
        }
    }

    pub(crate) fn malformed(provider: &'static str, message: impl Into<String>) -> Self {
        ProviderError::Malformed {
            provider,
            message: message.into(),
        }
    }
}

/// Builds the HTTP client a provider keeps for its whole lifetime.
pub fn build_http_client(provider: &str, timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .with_context(|| format!("failed to build {provider} HTTP client"))
}

/// Sends the request produced by `build`, retrying transient failures with
/// exponential backoff (500ms, 1s, 2s, ...). `max_attempts` counts the first try.
///
/// Non-transient 4xx responses fail immediately with the provider's body as the message.
pub async fn send_with_retry<F>(
    provider: &'static str,
    max_attempts: u32,
    build: F,
) -> Result<Response, ProviderError>
where
    F: Fn() -> RequestBuilder,
{
    let max_attempts = max_attempts.max(1);
    let mut last_error: Option<ProviderError> = None;

    for attempt in 0..max_attempts {
        if attempt > 0 {
            let delay = retry_backoff(attempt);
            warn!(
                provider,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "provider call failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }

        let response = match build().send().await {
            Ok(r) => r,
            Err(source) if is_transient(&source) => {
                last_error = Some(ProviderError::Http { provider, source });
                continue;
            }
            Err(source) => return Err(ProviderError::Http { provider, source }),
        };

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(provider, "provider returned 429");
            last_error = Some(ProviderError::RateLimited {
                provider,
                attempts: attempt + 1,
            });
            continue;
        }

        if status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!(provider, %status, "provider returned server error: {body}");
            last_error = Some(ProviderError::Api {
                provider,
                status: status.as_u16(),
                message: body,
            });
            continue;
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                provider,
                status: status.as_u16(),
                message: body,
            });
        }

        return Ok(response);
    }

    Err(last_error.unwrap_or(ProviderError::RateLimited {
        provider,
        attempts: max_attempts,
    }))
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

fn retry_backoff(attempt: u32) -> Duration {
    let capped = attempt.min(5);
    Duration::from_millis(500 * (1 << (capped - 1)))
}
