/// LLM Client — every chat-completion call in the service goes through `LanguageModel`.
///
/// The production backend is `OpenAiChatClient` (any OpenAI-compatible endpoint).
/// Handlers and the analysis pipeline only see `Arc<dyn LanguageModel>`, so tests
/// swap in a canned model without touching HTTP.
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::provider::{build_http_client, send_with_retry, ProviderError};

pub mod prompts;

const PROVIDER: &str = "openai-chat";

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Sends one user prompt under the given system prompt and returns the trimmed reply.
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, ProviderError>;

    fn model_name(&self) -> &str;
}

/// Calls the model and deserializes its reply as JSON.
/// The prompt must instruct the model to return valid JSON.
pub async fn complete_json<T: DeserializeOwned>(
    llm: &dyn LanguageModel,
    prompt: &str,
    system: &str,
) -> Result<T, ProviderError> {
    let text = llm.complete(prompt, system).await?;
    let text = strip_json_fences(&text);
    serde_json::from_str(text).map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()))
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl ChatResponse {
    fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Chat Completions client with retry on 429 / 5xx.
#[derive(Clone)]
pub struct OpenAiChatClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_retries: u32,
}

impl OpenAiChatClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        anyhow::ensure!(
            !config.llm_model.trim().is_empty(),
            "missing chat model name"
        );
        Ok(Self {
            client: build_http_client(PROVIDER, config.request_timeout)?,
            endpoint: format!(
                "{}/chat/completions",
                config.openai_base_url.trim_end_matches('/')
            ),
            api_key: config.openai_api_key.clone(),
            model: config.llm_model.clone(),
            temperature: config.llm_temperature,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatClient {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, ProviderError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
        };

        let response = send_with_retry(PROVIDER, self.max_retries, || {
            self.client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&request_body)
        })
        .await?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        parsed
            .into_text()
            .ok_or(ProviderError::EmptyContent { provider: PROVIDER })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CannedModel;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_chat_response_takes_first_choice_trimmed() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "  A data scientist.  "}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 4, "total_tokens": 14}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("A data scientist."));
    }

    #[test]
    fn test_chat_response_without_content_is_empty() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.into_text().is_none());

        let body = r#"{"choices": []}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.into_text().is_none());
    }

    #[test]
    fn test_request_serializes_system_then_user() {
        let request = ChatRequest {
            model: "gpt-4",
            messages: [
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "hi",
                },
            ],
            temperature: 0.5,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hi");
        assert_eq!(value["model"], "gpt-4");
    }

    #[derive(Debug, Deserialize)]
    struct Scored {
        score: u32,
    }

    #[tokio::test]
    async fn test_complete_json_accepts_fenced_reply() {
        let llm = CannedModel::replying("```json\n{\"score\": 72}\n```");
        let scored: Scored = complete_json(&llm, "p", "s").await.unwrap();
        assert_eq!(scored.score, 72);
    }

    #[tokio::test]
    async fn test_complete_json_rejects_prose() {
        let llm = CannedModel::replying("I think it's about 72.");
        let result = complete_json::<Scored>(&llm, "p", "s").await;
        assert!(matches!(result, Err(ProviderError::Malformed { .. })));
    }
}
