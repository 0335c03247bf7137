//! # sillage-embeddings
//!
//! Multi-resolution (Matryoshka) embedding generation: providers, dimension
//! reduction, quality validation, and the hot/warm/cold embedding cache.

pub mod cache;
pub mod generator;
pub mod providers;
pub mod quality;
pub mod truncation;

pub use cache::{CacheLookup, CacheStats, EvictionReport, MultiTierEmbeddingCache, StoreReport, WarmingReport};
pub use generator::{GenerationMetadata, GenerationResult, GeneratorConfig, MatryoshkaEmbeddingGenerator};
pub use providers::{create_provider, ConfiguredProvider, HashingEmbeddingProvider, HttpEmbeddingProvider};
pub use quality::{EmbeddingQualityValidator, QualityReport, QualityThresholds};
pub use truncation::{EmbeddingTruncator, TruncationMetrics, TruncationOutcome};
