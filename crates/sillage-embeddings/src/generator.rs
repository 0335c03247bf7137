//! MatryoshkaEmbeddingGenerator: one provider call per text, reduced to
//! every dimension on the ladder.
//!
//! Caching is keyed on the exact input text. Concurrent requests for the
//! same uncached text share a single in-flight provider call.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use sillage_core::config::{DimensionLadder, EmbeddingConfig};
use sillage_core::errors::{ConfigError, EmbeddingError, SillageResult};
use sillage_core::models::{EmbeddingSet, TruncationStrategy};
use sillage_core::traits::EmbeddingProvider;
use sillage_core::vector;
use sillage_observability::events;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::cache::MultiTierEmbeddingCache;
use crate::quality::{EmbeddingQualityValidator, QualityThresholds};
use crate::truncation::EmbeddingTruncator;

/// Generator settings, usually derived from [`EmbeddingConfig`].
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub model: String,
    /// Target dimensions, strictly ascending.
    pub ladder: Vec<usize>,
    pub strategy: TruncationStrategy,
    pub normalize_embeddings: bool,
    pub enable_caching: bool,
    pub cache_size: u64,
    pub provider_timeout: Duration,
    pub fallback_dimensions: Option<Vec<usize>>,
    pub validate_quality: bool,
    pub quality: QualityThresholds,
}

impl From<&EmbeddingConfig> for GeneratorConfig {
    fn from(config: &EmbeddingConfig) -> Self {
        Self {
            model: config.model.clone(),
            ladder: config.dimension_ladder.dims().to_vec(),
            strategy: config.truncation_strategy,
            normalize_embeddings: config.normalize_embeddings,
            enable_caching: config.enable_caching,
            cache_size: config.cache_size,
            provider_timeout: Duration::from_millis(config.provider_timeout_ms),
            fallback_dimensions: config.fallback_dimensions.clone(),
            validate_quality: config.validate_quality,
            quality: QualityThresholds {
                min_similarity: config.min_similarity,
                norm_tolerance: config.norm_tolerance,
                ..QualityThresholds::default()
            },
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::from(&EmbeddingConfig::default())
    }
}

/// Provenance of a generated embedding set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub tokens_used: u32,
    /// Length of the vector the provider returned.
    pub source_dimensions: usize,
    pub model: String,
    pub truncation_strategy: TruncationStrategy,
    pub generated_at: DateTime<Utc>,
}

/// Result of [`MatryoshkaEmbeddingGenerator::generate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    pub embeddings: EmbeddingSet,
    pub metadata: Option<GenerationMetadata>,
    pub cache_hit: bool,
    pub error: Option<String>,
    /// A fallback dimension set is configured for the caller to degrade to.
    pub fallback_applied: bool,
    pub retry_recommended: bool,
    pub quality_warnings: Vec<String>,
}

/// What the generator cache holds per text.
#[derive(Debug)]
struct Generated {
    embeddings: EmbeddingSet,
    metadata: GenerationMetadata,
    quality_warnings: Vec<String>,
}

/// Multi-resolution embedding generator over an [`EmbeddingProvider`].
pub struct MatryoshkaEmbeddingGenerator<P> {
    provider: P,
    config: GeneratorConfig,
    ladder: DimensionLadder,
    truncator: EmbeddingTruncator,
    validator: Option<EmbeddingQualityValidator>,
    cache: Cache<String, Arc<Generated>>,
    tier_cache: Option<Arc<MultiTierEmbeddingCache>>,
}

impl<P: EmbeddingProvider> MatryoshkaEmbeddingGenerator<P> {
    /// Build a generator using the configured strategy.
    ///
    /// Projection strategies need a fitted basis; use
    /// [`with_truncator`](Self::with_truncator) for those.
    pub fn new(provider: P, config: GeneratorConfig) -> SillageResult<Self> {
        let truncator = EmbeddingTruncator::new(config.strategy);
        Self::with_truncator(provider, config, truncator)
    }

    /// Build a generator around a prepared truncator. The truncator's
    /// strategy overrides `config.strategy`.
    pub fn with_truncator(
        provider: P,
        mut config: GeneratorConfig,
        truncator: EmbeddingTruncator,
    ) -> SillageResult<Self> {
        let ladder = DimensionLadder::new(config.ladder.clone())?;
        if !truncator.is_ready() {
            return Err(ConfigError::MissingProjectionBasis {
                strategy: truncator.strategy().as_str().to_string(),
            }
            .into());
        }
        if let Some(ref fallback) = config.fallback_dimensions {
            DimensionLadder::new(fallback.clone())?;
        }
        config.strategy = truncator.strategy();

        let validator = config
            .validate_quality
            .then(|| EmbeddingQualityValidator::new(config.quality));
        let cache = Cache::builder().max_capacity(config.cache_size).build();

        debug!(
            provider = provider.name(),
            model = %config.model,
            ladder = ?ladder.dims(),
            strategy = config.strategy.as_str(),
            "matryoshka generator initialized"
        );

        Ok(Self {
            provider,
            config,
            ladder,
            truncator,
            validator,
            cache,
            tier_cache: None,
        })
    }

    /// Share a tiered cache: full-ladder tier hits short-circuit generation
    /// and fresh generations are written through.
    pub fn with_tier_cache(mut self, tier_cache: Arc<MultiTierEmbeddingCache>) -> Self {
        self.tier_cache = Some(tier_cache);
        self
    }

    pub fn ladder(&self) -> &DimensionLadder {
        &self.ladder
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Generate (or fetch) the embedding set for `text`.
    pub async fn generate(&self, text: &str) -> GenerationResult {
        if !self.config.enable_caching {
            return match self.produce(text).await {
                Ok(generated) => self.success(&generated, false),
                Err(e) => self.failure(e.to_string()),
            };
        }

        if let Some(cached) = self.cache.get(text).await {
            debug!(text_len = text.len(), "generator cache hit");
            return self.success(&cached, true);
        }
        if let Some(from_tier) = self.lookup_tier(text) {
            let from_tier = Arc::new(from_tier);
            self.cache.insert(text.to_string(), Arc::clone(&from_tier)).await;
            return self.success(&from_tier, true);
        }

        let entry = self
            .cache
            .entry_by_ref(text)
            .or_try_insert_with(self.produce(text))
            .await;

        match entry {
            Ok(entry) => {
                let fresh = entry.is_fresh();
                let generated = entry.into_value();
                if fresh {
                    self.write_through(text, &generated);
                }
                self.success(&generated, !fresh)
            }
            Err(e) => self.failure(e.to_string()),
        }
    }

    /// Drop `text` from the generator cache.
    pub async fn invalidate(&self, text: &str) {
        self.cache.invalidate(text).await;
    }

    /// Number of texts currently cached.
    pub async fn cached_entries(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    /// One provider call, then truncation to every ladder dimension.
    async fn produce(&self, text: &str) -> SillageResult<Arc<Generated>> {
        let max_dims = self.ladder.max();
        let timeout_ms = self.config.provider_timeout.as_millis() as u64;

        let call = self.provider.embed(text, &self.config.model, max_dims);
        let response = match tokio::time::timeout(self.config.provider_timeout, call).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                events::provider_failed(
                    self.provider.name(),
                    &e.to_string(),
                    self.config.fallback_dimensions.is_some(),
                );
                return Err(e);
            }
            Err(_) => {
                let e = EmbeddingError::Timeout { timeout_ms };
                events::provider_failed(
                    self.provider.name(),
                    &e.to_string(),
                    self.config.fallback_dimensions.is_some(),
                );
                return Err(e.into());
            }
        };

        let raw = response.vector;
        if raw.is_empty() || raw.iter().any(|x| !x.is_finite()) {
            return Err(EmbeddingError::InvalidEmbedding {
                reason: format!("{} returned an empty or non-finite vector", self.provider.name()),
            }
            .into());
        }

        let outcome = self
            .truncator
            .truncate(&raw, self.ladder.dims(), self.config.normalize_embeddings);
        if !outcome.success || outcome.embeddings.is_empty() {
            return Err(EmbeddingError::InvalidEmbedding {
                reason: outcome
                    .error
                    .unwrap_or_else(|| "truncation produced no dimensions".to_string()),
            }
            .into());
        }

        let mut quality_warnings = Vec::new();
        if !outcome.metrics.skipped_dimensions.is_empty() {
            quality_warnings.push(format!(
                "provider returned {} dims; skipped {:?}",
                raw.len(),
                outcome.metrics.skipped_dimensions
            ));
        }
        if let Some(ref validator) = self.validator {
            let reference = if self.config.normalize_embeddings {
                vector::normalize(&raw)
            } else {
                raw.clone()
            };
            for (dims, candidate) in outcome.embeddings.iter() {
                if let Err(e) = validator.ensure_acceptable(&reference, candidate, dims) {
                    warn!(dims, error = %e, "embedding quality below threshold");
                    quality_warnings.push(e.to_string());
                }
            }
        }

        events::embedding_generated(
            &self.config.model,
            raw.len(),
            outcome.embeddings.len(),
            response.tokens_used,
        );

        Ok(Arc::new(Generated {
            embeddings: outcome.embeddings,
            metadata: GenerationMetadata {
                tokens_used: response.tokens_used,
                source_dimensions: raw.len(),
                model: self.config.model.clone(),
                truncation_strategy: self.config.strategy,
                generated_at: Utc::now(),
            },
            quality_warnings,
        }))
    }

    fn lookup_tier(&self, text: &str) -> Option<Generated> {
        let tier = self.tier_cache.as_ref()?;
        let lookup = tier.retrieve(text, self.ladder.dims());
        if !lookup.cache_hit || !lookup.missing_dimensions.is_empty() {
            return None;
        }
        debug!(tier = ?lookup.tier, "tier cache satisfied full ladder");
        Some(Generated {
            embeddings: lookup.embeddings,
            metadata: GenerationMetadata {
                tokens_used: 0,
                source_dimensions: self.ladder.max(),
                model: self.config.model.clone(),
                truncation_strategy: self.config.strategy,
                generated_at: Utc::now(),
            },
            quality_warnings: Vec::new(),
        })
    }

    fn write_through(&self, text: &str, generated: &Generated) {
        if let Some(ref tier) = self.tier_cache {
            if let Err(e) = tier.store(text, generated.embeddings.clone()) {
                warn!(error = %e, "tier cache write-through failed");
            }
        }
    }

    fn success(&self, generated: &Generated, cache_hit: bool) -> GenerationResult {
        GenerationResult {
            success: true,
            embeddings: generated.embeddings.clone(),
            metadata: Some(generated.metadata.clone()),
            cache_hit,
            error: None,
            fallback_applied: false,
            retry_recommended: false,
            quality_warnings: generated.quality_warnings.clone(),
        }
    }

    fn failure(&self, reason: String) -> GenerationResult {
        let fallback_applied = self.config.fallback_dimensions.is_some();
        if let Some(ref dims) = self.config.fallback_dimensions {
            events::degradation_triggered("embeddings", &reason, &format!("dimensions {dims:?}"));
        }
        GenerationResult {
            success: false,
            embeddings: EmbeddingSet::new(),
            metadata: None,
            cache_hit: false,
            error: Some(reason),
            fallback_applied,
            retry_recommended: true,
            quality_warnings: Vec::new(),
        }
    }
}

impl<P: EmbeddingProvider + 'static> MatryoshkaEmbeddingGenerator<P> {
    /// Generate many texts concurrently. Results keep input order.
    pub async fn generate_batch(self: &Arc<Self>, texts: &[String]) -> Vec<GenerationResult> {
        let mut set = JoinSet::new();
        for (index, text) in texts.iter().enumerate() {
            let generator = Arc::clone(self);
            let text = text.clone();
            set.spawn(async move { (index, generator.generate(&text).await) });
        }

        let mut results: Vec<Option<GenerationResult>> = vec![None; texts.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => warn!(error = %e, "batch generation task failed"),
            }
        }
        results
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| self.failure("generation task aborted".to_string())))
            .collect()
    }
}
