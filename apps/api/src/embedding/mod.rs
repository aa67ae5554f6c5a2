//! Text → vector backends used by the matcher.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, EmbeddingProvider};
use crate::provider::ProviderError;

pub mod hashing;
pub mod openai;

pub use hashing::HashingEmbedder;
pub use openai::OpenAiEmbedder;

/// Embedding backend. Implementations must return vectors of one fixed dimension.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;

    fn name(&self) -> &'static str;
}

/// Builds the embedder selected by `EMBEDDING_PROVIDER`.
pub fn from_config(config: &Config) -> anyhow::Result<Arc<dyn Embedder>> {
    Ok(match config.embedding_provider {
        EmbeddingProvider::OpenAi => Arc::new(OpenAiEmbedder::new(config)?),
        EmbeddingProvider::Hashing => Arc::new(HashingEmbedder::default()),
    })
}
