use serde::{Deserialize, Serialize};

use super::defaults;

/// Multi-tier embedding cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Max entries per tier.
    pub hot_capacity: usize,
    pub warm_capacity: usize,
    pub cold_capacity: usize,
    /// Aggregate byte budget across all tiers; exceeding it triggers eviction.
    pub max_total_bytes: usize,
    /// Share of entries evicted per eviction pass.
    pub eviction_fraction: f64,
    /// Run eviction automatically from `store` when over budget.
    pub auto_evict: bool,
    /// Number of recent missed keys kept for warming estimates.
    pub miss_log_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            hot_capacity: defaults::DEFAULT_HOT_CAPACITY,
            warm_capacity: defaults::DEFAULT_WARM_CAPACITY,
            cold_capacity: defaults::DEFAULT_COLD_CAPACITY,
            max_total_bytes: defaults::DEFAULT_MAX_TOTAL_BYTES,
            eviction_fraction: defaults::DEFAULT_EVICTION_FRACTION,
            auto_evict: defaults::DEFAULT_AUTO_EVICT,
            miss_log_size: defaults::DEFAULT_MISS_LOG_SIZE,
        }
    }
}
