use serde::{Deserialize, Serialize};

use super::defaults;
use super::DimensionLadder;
use crate::models::TruncationStrategy;

/// Embedding generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding provider: "http" or "hashing".
    pub provider: String,
    /// Model name passed to the provider.
    pub model: String,
    /// Target dimensions; the provider is asked for the highest one.
    pub dimension_ladder: DimensionLadder,
    pub truncation_strategy: TruncationStrategy,
    pub normalize_embeddings: bool,
    pub enable_caching: bool,
    /// Generator cache max entries.
    pub cache_size: u64,
    pub provider_timeout_ms: u64,
    /// Dimensions a caller may degrade to when generation fails.
    pub fallback_dimensions: Option<Vec<usize>>,
    /// Run the quality validator on every generated dimension.
    pub validate_quality: bool,
    pub min_similarity: f32,
    pub norm_tolerance: f32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: defaults::DEFAULT_EMBEDDING_PROVIDER.to_string(),
            model: defaults::DEFAULT_EMBEDDING_MODEL.to_string(),
            dimension_ladder: DimensionLadder::default(),
            truncation_strategy: TruncationStrategy::EndTruncation,
            normalize_embeddings: defaults::DEFAULT_NORMALIZE_EMBEDDINGS,
            enable_caching: defaults::DEFAULT_ENABLE_CACHING,
            cache_size: defaults::DEFAULT_GENERATOR_CACHE_SIZE,
            provider_timeout_ms: defaults::DEFAULT_PROVIDER_TIMEOUT_MS,
            fallback_dimensions: None,
            validate_quality: defaults::DEFAULT_VALIDATE_QUALITY,
            min_similarity: defaults::DEFAULT_MIN_SIMILARITY,
            norm_tolerance: defaults::DEFAULT_NORM_TOLERANCE,
        }
    }
}
