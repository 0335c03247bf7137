//! Feature-hashing embedding provider.
//!
//! Deterministic dense vectors from hashed, frequency-weighted terms. Needs
//! no network, so it backs offline runs, benches, and the no-API-key path.

use std::collections::HashMap;

use sillage_core::errors::SillageResult;
use sillage_core::traits::{EmbeddingProvider, ProviderEmbedding};
use sillage_core::vector;

/// Offline embedding provider.
#[derive(Debug, Clone, Default)]
pub struct HashingEmbeddingProvider;

impl HashingEmbeddingProvider {
    pub fn new() -> Self {
        Self
    }

    /// Bucket for a term, from the leading bytes of its blake3 digest.
    fn bucket(term: &str, dims: usize) -> usize {
        let hash = blake3::hash(term.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&hash.as_bytes()[..8]);
        (u64::from_le_bytes(head) % dims as u64) as usize
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|s| s.len() >= 2)
            .map(str::to_lowercase)
            .collect()
    }

    /// Unit-norm vector of length `dims`; all-zero when no term survives.
    pub fn vectorize(text: &str, dims: usize) -> (Vec<f32>, u32) {
        let tokens = Self::tokenize(text);
        let mut out = vec![0.0f32; dims];
        if tokens.is_empty() || dims == 0 {
            return (out, 0);
        }

        let mut tf: HashMap<&str, f32> = HashMap::new();
        for tok in &tokens {
            *tf.entry(tok.as_str()).or_default() += 1.0;
        }
        let total = tokens.len() as f32;
        for (term, count) in tf {
            // Longer terms carry more signal than short, stopword-like ones.
            let weight = 1.0 + (term.len() as f32).ln();
            out[Self::bucket(term, dims)] += count / total * weight;
        }
        vector::normalize_in_place(&mut out);
        (out, tokens.len() as u32)
    }
}

impl EmbeddingProvider for HashingEmbeddingProvider {
    async fn embed(&self, text: &str, _model: &str, dimensions: usize) -> SillageResult<ProviderEmbedding> {
        let (vector, tokens_used) = Self::vectorize(text, dimensions);
        Ok(ProviderEmbedding { vector, tokens_used })
    }

    fn name(&self) -> &str {
        "hashing"
    }
}
