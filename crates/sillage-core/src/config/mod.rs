//! Layered configuration loaded from TOML. Every section falls back to
//! `defaults` for fields the file omits.

mod bandit_config;
mod cache_config;
pub mod defaults;
mod embedding_config;
mod ladder;
mod observability_config;
mod search_config;

pub use bandit_config::BanditConfig;
pub use cache_config::CacheConfig;
pub use embedding_config::EmbeddingConfig;
pub use ladder::DimensionLadder;
pub use observability_config::ObservabilityConfig;
pub use search_config::SearchConfig;

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, SillageResult};
use crate::models::SearchStage;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SillageConfig {
    pub embedding: EmbeddingConfig,
    pub cache: CacheConfig,
    pub search: SearchConfig,
    pub bandit: BanditConfig,
    pub observability: ObservabilityConfig,
}

impl SillageConfig {
    /// Parse a TOML document and validate the result.
    pub fn from_toml(source: &str) -> SillageResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants that serde alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_stages(&self.search.stages)?;
        check_unit_range(
            "search.early_termination_confidence",
            self.search.early_termination_confidence as f64,
        )?;
        check_unit_range(
            "search.complexity_simple",
            self.search.complexity_simple as f64,
        )?;
        check_unit_range(
            "search.complexity_complex",
            self.search.complexity_complex as f64,
        )?;
        check_unit_range("cache.eviction_fraction", self.cache.eviction_fraction)?;
        check_unit_range("bandit.exploration_decay", self.bandit.exploration_decay)?;
        check_unit_range(
            "bandit.min_exploration_rate",
            self.bandit.min_exploration_rate,
        )?;
        check_unit_range(
            "embedding.min_similarity",
            self.embedding.min_similarity as f64,
        )?;
        if let Some(ref fallback) = self.embedding.fallback_dimensions {
            DimensionLadder::new(fallback.clone())?;
        }
        Ok(())
    }
}

/// Validate a stage list: non-empty, strictly ascending in dimension,
/// non-zero candidate counts, thresholds within cosine range.
pub fn validate_stages(stages: &[SearchStage]) -> Result<(), ConfigError> {
    if stages.is_empty() {
        return Err(ConfigError::InvalidStages {
            reason: "at least one stage is required".to_string(),
        });
    }
    for stage in stages {
        if stage.dimension == 0 || stage.candidate_count == 0 {
            return Err(ConfigError::InvalidStages {
                reason: format!(
                    "stage at {} dims with {} candidates is empty",
                    stage.dimension, stage.candidate_count
                ),
            });
        }
        if !(-1.0..=1.0).contains(&stage.similarity_threshold) {
            return Err(ConfigError::OutOfRange {
                field: "similarity_threshold".to_string(),
                value: stage.similarity_threshold as f64,
                min: -1.0,
                max: 1.0,
            });
        }
    }
    for pair in stages.windows(2) {
        if pair[1].dimension <= pair[0].dimension {
            return Err(ConfigError::InvalidStages {
                reason: format!(
                    "stage dimensions must ascend: {} then {}",
                    pair[0].dimension, pair[1].dimension
                ),
            });
        }
    }
    Ok(())
}

fn check_unit_range(field: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfRange {
            field: field.to_string(),
            value,
            min: 0.0,
            max: 1.0,
        });
    }
    Ok(())
}
