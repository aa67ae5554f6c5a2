//! In-process stand-ins for every provider, shared by unit and router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::Config;
use crate::embedding::{Embedder, HashingEmbedder};
use crate::extract::{DocumentExtractor, ExtractError};
use crate::jobs::{JobPosting, JobQuery, JobSource};
use crate::llm_client::LanguageModel;
use crate::matching::Matcher;
use crate::notify::{DeliveryReceipt, Notifier};
use crate::provider::ProviderError;
use crate::render::PdfDocumentRenderer;
use crate::state::AppState;

pub fn job(title: &str, description: &str) -> JobPosting {
    JobPosting {
        title: title.to_string(),
        location: "Remote".to_string(),
        description: description.to_string(),
        url: format!("https://example.com/{}", title.to_lowercase().replace(' ', "-")),
    }
}

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = [
        ("OPENAI_API_KEY", "sk-test"),
        ("EMBEDDING_PROVIDER", "hashing"),
        ("MATCH_BOOST_FACTOR", "1.2"),
        ("NOTIFY_THRESHOLD", "50"),
    ]
    .into_iter()
    .collect();
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
        .expect("test config is valid")
}

// ── Language model ─────────────────────────────────────────────────────────

/// Replies with the first rule whose needle occurs in the prompt, else the default.
pub struct CannedModel {
    rules: Vec<(String, String)>,
    default_reply: String,
    prompts: Mutex<Vec<String>>,
}

impl CannedModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            rules: Vec::new(),
            default_reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn when(mut self, needle: &str, reply: &str) -> Self {
        self.rules.push((needle.to_string(), reply.to_string()));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for CannedModel {
    async fn complete(&self, prompt: &str, _system: &str) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = self
            .rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.default_reply.clone());
        Ok(reply)
    }

    fn model_name(&self) -> &str {
        "canned"
    }
}

pub struct FailingModel;

#[async_trait]
impl LanguageModel for FailingModel {
    async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, ProviderError> {
        Err(ProviderError::RateLimited {
            provider: "openai-chat",
            attempts: 3,
        })
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

// ── Embedders ──────────────────────────────────────────────────────────────

/// Hashing embedder that counts calls.
#[derive(Default)]
pub struct CountingEmbedder {
    inner: HashingEmbedder,
    calls: AtomicUsize,
}

impl CountingEmbedder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for CountingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed(text).await
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

/// Returns a preset vector per exact text.
pub struct FixedEmbedder {
    vectors: HashMap<String, Vec<f32>>,
}

impl FixedEmbedder {
    pub fn new(pairs: Vec<(&str, Vec<f32>)>) -> Self {
        Self {
            vectors: pairs
                .into_iter()
                .map(|(text, v)| (text.to_string(), v))
                .collect(),
        }
    }
}

#[async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        self.vectors
            .get(text)
            .cloned()
            .ok_or(ProviderError::EmptyContent { provider: "fixed" })
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, ProviderError> {
        Err(ProviderError::Api {
            provider: "openai-embeddings",
            status: 500,
            message: "upstream down".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

// ── Job sources ────────────────────────────────────────────────────────────

pub struct FixedJobSource(pub Vec<JobPosting>);

#[async_trait]
impl JobSource for FixedJobSource {
    async fn search(&self, _query: &JobQuery) -> Result<Vec<JobPosting>, ProviderError> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

pub struct EmptyJobSource;

#[async_trait]
impl JobSource for EmptyJobSource {
    async fn search(&self, _query: &JobQuery) -> Result<Vec<JobPosting>, ProviderError> {
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "empty"
    }
}

pub struct FailingJobSource;

#[async_trait]
impl JobSource for FailingJobSource {
    async fn search(&self, _query: &JobQuery) -> Result<Vec<JobPosting>, ProviderError> {
        Err(ProviderError::Api {
            provider: "adzuna",
            status: 503,
            message: "maintenance".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

// ── Notifier ───────────────────────────────────────────────────────────────

enum NotifierMode {
    Succeed,
    RateLimited,
    Fail,
}

pub struct RecordingNotifier {
    mode: NotifierMode,
    sent: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn with_mode(mode: NotifierMode) -> Self {
        Self {
            mode,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::with_mode(NotifierMode::Succeed)
    }

    pub fn rate_limited() -> Self {
        Self::with_mode(NotifierMode::RateLimited)
    }

    pub fn failing() -> Self {
        Self::with_mode(NotifierMode::Fail)
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &str) -> Result<DeliveryReceipt, ProviderError> {
        match self.mode {
            NotifierMode::Succeed => {
                let mut sent = self.sent.lock().unwrap();
                sent.push(message.to_string());
                Ok(DeliveryReceipt {
                    message_id: format!("SM{:04}", sent.len()),
                })
            }
            NotifierMode::RateLimited => Err(ProviderError::RateLimited {
                provider: "twilio",
                attempts: 1,
            }),
            NotifierMode::Fail => Err(ProviderError::Api {
                provider: "twilio",
                status: 401,
                message: "Authenticate".to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

// ── Extractor ──────────────────────────────────────────────────────────────

/// Treats the upload as UTF-8 text; `UNREADABLE` bytes simulate a broken PDF.
pub struct StubExtractor;

#[async_trait]
impl DocumentExtractor for StubExtractor {
    async fn extract(&self, bytes: Bytes) -> Result<String, ExtractError> {
        if bytes.as_ref() == b"UNREADABLE" {
            return Err(ExtractError::UnreadablePdf("corrupt xref table".to_string()));
        }
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ExtractError::UnreadablePdf(e.to_string()))
    }
}

// ── State ──────────────────────────────────────────────────────────────────

pub struct TestProviders {
    pub llm: Arc<CannedModel>,
    pub jobs: Arc<dyn JobSource>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Default for TestProviders {
    fn default() -> Self {
        Self {
            llm: Arc::new(
                CannedModel::replying("A helpful answer.")
                    .when("Summarize this CV", "Experienced Python data scientist")
                    .when(
                        "Score this CV",
                        r#"{"score": 81, "feedback": "Quantify your impact."}"#,
                    ),
            ),
            jobs: Arc::new(FixedJobSource(vec![
                job("Chef", "Head chef for a seafood restaurant kitchen"),
                job("Data Scientist", "Experienced Python data scientist"),
            ])),
            notifier: Arc::new(RecordingNotifier::succeeding()),
        }
    }
}

pub fn test_state(providers: &TestProviders) -> AppState {
    let config = test_config();
    AppState {
        matcher: Matcher::new(
            Arc::new(HashingEmbedder::default()),
            config.boost_factor,
            config.embed_concurrency,
        ),
        config,
        llm: providers.llm.clone(),
        extractor: Arc::new(StubExtractor),
        jobs: providers.jobs.clone(),
        notifier: providers.notifier.clone(),
        renderer: Arc::new(PdfDocumentRenderer::default()),
    }
}
