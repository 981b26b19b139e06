//! Feature-hashing embedder
//!
//! Each token is hashed with xxh3 into one of `dimension` buckets; the
//! top hash bit picks the sign. The result is L2-normalized so cosine
//! similarity reflects shared vocabulary. Tokens come from the same
//! tokenizer the lexical index uses.

use async_trait::async_trait;
use rankfuse_core::{EmbedError, EmbeddingProvider};
use rankfuse_index::distance::normalize;
use rankfuse_index::tokenize;
use xxhash_rust::xxh3::xxh3_64;

/// Default vector width
pub const DEFAULT_HASH_DIMENSION: usize = 384;

/// Bucket and sign of one token
fn feature(token: &str, dimension: usize) -> (usize, f32) {
    let hash = xxh3_64(token.as_bytes());
    let bucket = (hash % dimension as u64) as usize;
    let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
    (bucket, sign)
}

/// Deterministic bag-of-words embedder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashEmbedder {
    dimension: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIMENSION)
    }
}

impl HashEmbedder {
    /// Create an embedder producing `dimension`-wide vectors (at least 1)
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Output vector width
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embed synchronously. Text without tokens yields the zero vector.
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in tokenize(text) {
            let (bucket, sign) = feature(&token, self.dimension);
            vector[bucket] += sign;
        }
        normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if tokenize(text).is_empty() {
            return Err(EmbedError::EmptyInput);
        }
        Ok(self.embed_sync(text))
    }

    fn name(&self) -> &str {
        "hash"
    }
}
