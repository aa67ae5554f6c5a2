//! OpenAI-compatible `/embeddings` client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::embedding::Embedder;
use crate::provider::{build_http_client, send_with_retry, ProviderError};

const PROVIDER: &str = "openai-embeddings";

#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_retries: u32,
}

impl OpenAiEmbedder {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        anyhow::ensure!(
            !config.embedding_model.trim().is_empty(),
            "missing embedding model name"
        );
        Ok(Self {
            client: build_http_client(PROVIDER, config.request_timeout)?,
            endpoint: format!(
                "{}/embeddings",
                config.openai_base_url.trim_end_matches('/')
            ),
            api_key: config.openai_api_key.clone(),
            model: config.embedding_model.clone(),
            max_retries: config.max_retries,
        })
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl EmbeddingResponse {
    fn into_vector(self) -> Result<Vec<f32>, ProviderError> {
        let vector = self
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(ProviderError::EmptyContent { provider: PROVIDER })?;
        if vector.is_empty() {
            return Err(ProviderError::EmptyContent { provider: PROVIDER });
        }
        Ok(vector)
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: text,
        };
        let response = send_with_retry(PROVIDER, self.max_retries, || {
            self.client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&request)
        })
        .await?;

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()))?;
        parsed.into_vector()
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_yields_first_vector() {
        let body = r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.1,0.2,0.3]}],"model":"text-embedding-3-small"}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.into_vector().unwrap(), vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_empty_data_is_empty_content() {
        let parsed: EmbeddingResponse = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert!(matches!(
            parsed.into_vector(),
            Err(ProviderError::EmptyContent { .. })
        ));
    }
}
