use std::sync::Arc;

use crate::config::Config;
use crate::extract::DocumentExtractor;
use crate::jobs::JobSource;
use crate::llm_client::LanguageModel;
use crate::matching::Matcher;
use crate::notify::Notifier;
use crate::render::DocumentRenderer;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once at startup; every provider is chosen from `Config` and never swapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub llm: Arc<dyn LanguageModel>,
    pub extractor: Arc<dyn DocumentExtractor>,
    pub jobs: Arc<dyn JobSource>,
    pub notifier: Arc<dyn Notifier>,
    pub renderer: Arc<dyn DocumentRenderer>,
    /// Owns the embedder and the boost factor.
    pub matcher: Matcher,
}
