//! Tier hit rates and eviction counts for the multi-tier embedding cache.

use serde::{Deserialize, Serialize};

/// Embedding cache metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheMetrics {
    pub hot_hits: u64,
    pub warm_hits: u64,
    pub cold_hits: u64,
    pub misses: u64,
    pub stores: u64,
    pub evictions: u64,
    pub bytes_evicted: u64,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a lookup. `tier` is 0 (hot), 1 (warm), 2 (cold), or `None` for a miss.
    pub fn record_lookup(&mut self, tier: Option<u8>) {
        match tier {
            Some(0) => self.hot_hits += 1,
            Some(1) => self.warm_hits += 1,
            Some(2) => self.cold_hits += 1,
            _ => self.misses += 1,
        }
    }

    pub fn record_store(&mut self) {
        self.stores += 1;
    }

    pub fn record_eviction(&mut self, entries: usize, bytes: usize) {
        self.evictions += entries as u64;
        self.bytes_evicted += bytes as u64;
    }

    pub fn total_lookups(&self) -> u64 {
        self.hot_hits + self.warm_hits + self.cold_hits + self.misses
    }

    /// Combined hit rate across all tiers.
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_lookups();
        if total == 0 {
            0.0
        } else {
            (self.hot_hits + self.warm_hits + self.cold_hits) as f64 / total as f64
        }
    }

    pub fn hot_hit_rate(&self) -> f64 {
        let total = self.total_lookups();
        if total == 0 {
            0.0
        } else {
            self.hot_hits as f64 / total as f64
        }
    }
}
