//! Feature-hashing embedder. Deterministic, no model download, no network.
//!
//! Each lowercase alphanumeric token is hashed into one of `dimension` buckets with
//! a hash-derived sign, then the vector is L2-normalised. Identical texts always map
//! to identical vectors; texts sharing vocabulary land close together.

use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use siphasher::sip::SipHasher13;

use crate::embedding::Embedder;
use crate::provider::ProviderError;

/// Fixed seeds. Changing them changes every vector.
const HASH_SEED_K0: u64 = 0x0123_4567_89ab_cdef;
const HASH_SEED_K1: u64 = 0xfedc_ba98_7654_3210;

pub const DEFAULT_DIMENSION: usize = 256;

pub struct HashingEmbedder {
    dimension: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash(token: &str) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        token.hash(&mut hasher);
        hasher.finish()
    }

    /// Embeds synchronously. Blank text yields the all-zero vector.
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in tokenize(text) {
            let h = Self::hash(&token);
            let idx = (h % self.dimension as u64) as usize;
            // Top bit picks the sign so collisions partly cancel instead of piling up.
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            vector[idx] += sign;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        Ok(self.embed_sync(text))
    }

    fn name(&self) -> &'static str {
        "hashing"
    }
}
