use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TWILIO_FROM: &str = "whatsapp:+14155238886";

/// Which backend turns text into vectors for the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    OpenAi,
    /// Deterministic feature hashing. No network, useful offline and in demos.
    Hashing,
}

/// Where job postings come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSourceKind {
    Static,
    Adzuna,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierKind {
    Disabled,
    Twilio,
}

#[derive(Debug, Clone)]
pub struct AdzunaConfig {
    pub app_id: String,
    pub app_key: String,
}

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub whatsapp_from: String,
    pub whatsapp_to: String,
}

/// Application configuration loaded once from environment variables at startup.
/// Immutable afterwards; cloned into `AppState` and handed to each provider.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub embedding_provider: EmbeddingProvider,
    pub embedding_model: String,
    pub embed_concurrency: usize,
    pub job_source: JobSourceKind,
    pub adzuna: Option<AdzunaConfig>,
    pub notifier: NotifierKind,
    pub twilio: Option<TwilioConfig>,
    /// Multiplier applied to raw cosine similarity before display.
    pub boost_factor: f64,
    /// Adjusted score (0–100) at or above which a match alert is sent.
    pub notify_threshold: f64,
    pub default_job_keyword: String,
    pub request_timeout: Duration,
    pub max_retries: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` passes the process
    /// environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let embedding_provider = match env.or("EMBEDDING_PROVIDER", "openai").as_str() {
            "openai" => EmbeddingProvider::OpenAi,
            "hashing" => EmbeddingProvider::Hashing,
            other => bail!("EMBEDDING_PROVIDER must be 'openai' or 'hashing', got '{other}'"),
        };

        let job_source = match env.or("JOB_SOURCE", "static").as_str() {
            "static" => JobSourceKind::Static,
            "adzuna" => JobSourceKind::Adzuna,
            other => bail!("JOB_SOURCE must be 'static' or 'adzuna', got '{other}'"),
        };
        let adzuna = match job_source {
            JobSourceKind::Adzuna => Some(AdzunaConfig {
                app_id: env.require("ADZUNA_APP_ID")?,
                app_key: env.require("ADZUNA_APP_KEY")?,
            }),
            JobSourceKind::Static => None,
        };

        let notifier = match env.or("NOTIFIER", "disabled").as_str() {
            "disabled" => NotifierKind::Disabled,
            "twilio" => NotifierKind::Twilio,
            other => bail!("NOTIFIER must be 'disabled' or 'twilio', got '{other}'"),
        };
        let twilio = match notifier {
            NotifierKind::Twilio => Some(TwilioConfig {
                account_sid: env.require("TWILIO_ACCOUNT_SID")?,
                auth_token: env.require("TWILIO_AUTH_TOKEN")?,
                whatsapp_from: env.or("TWILIO_WHATSAPP_FROM", DEFAULT_TWILIO_FROM),
                whatsapp_to: env.require("TWILIO_WHATSAPP_TO")?,
            }),
            NotifierKind::Disabled => None,
        };

        let boost_factor: f64 = env.parse_or("MATCH_BOOST_FACTOR", 1.2)?;
        if !(boost_factor.is_finite() && boost_factor > 0.0) {
            bail!("MATCH_BOOST_FACTOR must be a positive number, got {boost_factor}");
        }
        let notify_threshold: f64 = env.parse_or("NOTIFY_THRESHOLD", 50.0)?;
        if !(0.0..=100.0).contains(&notify_threshold) {
            bail!("NOTIFY_THRESHOLD must be between 0 and 100, got {notify_threshold}");
        }

        Ok(Config {
            port: env.parse_or("PORT", 8080)?,
            rust_log: env.or("RUST_LOG", "info"),
            openai_api_key: env.require("OPENAI_API_KEY")?,
            openai_base_url: env.or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            llm_model: env.or("LLM_MODEL", "gpt-4"),
            llm_temperature: env.parse_or("LLM_TEMPERATURE", 0.7)?,
            embedding_provider,
            embedding_model: env.or("EMBEDDING_MODEL", "text-embedding-3-small"),
            embed_concurrency: env.parse_or::<usize>("EMBED_CONCURRENCY", 4)?.max(1),
            job_source,
            adzuna,
            notifier,
            twilio,
            boost_factor,
            notify_threshold,
            default_job_keyword: env.or("DEFAULT_JOB_KEYWORD", "data scientist"),
            request_timeout: Duration::from_secs(env.parse_or("REQUEST_TIMEOUT_SECS", 60)?),
            max_retries: env.parse_or::<u32>("MAX_RETRIES", 3)?.max(1),
        })
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn require(&self, key: &str) -> Result<String> {
        self.get(key)
            .with_context(|| format!("Required environment variable '{key}' is not set"))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .with_context(|| format!("{key} has an invalid value '{raw}'")),
            None => Ok(default),
        }
    }
}
