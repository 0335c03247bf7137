//! Multi-tier embedding cache.
//!
//! Hot → warm → cold, each bounded by entry count, plus an aggregate byte
//! budget. New entries land in hot; tier overflow demotes the lowest-scored
//! entry one tier colder and cold overflow evicts. A hit promotes back to hot.
//! Entries are scored by (access frequency, last access tick).
//!
//! Eviction always takes the lowest score across every entry, including the
//! one just stored, so a never-read entry can be its own victim.

pub mod eviction;
pub mod tier;
mod warming;

pub use eviction::{eviction_target, EvictionReport};
pub use tier::{CacheEntry, CacheTier};
pub use warming::WarmingReport;

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use sillage_core::config::CacheConfig;
use sillage_core::errors::CacheError;
use sillage_core::models::EmbeddingSet;
use sillage_observability::{events, CacheMetrics};
use tracing::debug;

/// Result of [`MultiTierEmbeddingCache::store`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreReport {
    pub bytes_stored: usize,
    /// Tier the entry landed in.
    pub tier: CacheTier,
    /// Entries evicted as a side effect of this store.
    pub evicted: usize,
    /// False when the stored entry scored lowest and was itself evicted.
    pub retained: bool,
}

/// Result of [`MultiTierEmbeddingCache::retrieve`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheLookup {
    pub cache_hit: bool,
    /// Only the requested dimensions the entry holds.
    pub embeddings: EmbeddingSet,
    /// Tier the entry was found in, before promotion.
    pub tier: Option<CacheTier>,
    pub missing_dimensions: Vec<usize>,
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hot_entries: usize,
    pub warm_entries: usize,
    pub cold_entries: usize,
    pub total_bytes: usize,
    pub metrics: CacheMetrics,
}

#[derive(Debug, Default)]
struct TierState {
    entries: HashMap<String, CacheEntry>,
    tier_counts: [usize; 3],
    total_bytes: usize,
    clock: u64,
    miss_log: VecDeque<String>,
    metrics: CacheMetrics,
}

impl TierState {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn move_to(&mut self, key: &str, tier: CacheTier) {
        if let Some(entry) = self.entries.get_mut(key) {
            self.tier_counts[entry.tier.index()] -= 1;
            self.tier_counts[tier.index()] += 1;
            entry.tier = tier;
        }
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.tier_counts[entry.tier.index()] -= 1;
        self.total_bytes -= entry.byte_size();
        Some(entry)
    }
}

/// Shared, internally synchronised tiered cache.
pub struct MultiTierEmbeddingCache {
    config: CacheConfig,
    state: Mutex<TierState>,
}

impl MultiTierEmbeddingCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            state: Mutex::new(TierState::default()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, TierState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store (or replace) the embeddings for `key` in the hot tier.
    ///
    /// # Errors
    /// `EntryTooLarge` when the set alone exceeds the byte budget.
    pub fn store(&self, key: &str, embeddings: EmbeddingSet) -> Result<StoreReport, CacheError> {
        let bytes = embeddings.byte_size();
        if bytes > self.config.max_total_bytes {
            return Err(CacheError::EntryTooLarge {
                key: key.to_string(),
                bytes,
                budget: self.config.max_total_bytes,
            });
        }

        let mut guard = self.lock();
        let state = &mut *guard;
        let tick = state.tick();
        match state.entries.get_mut(key) {
            Some(existing) => {
                let old_bytes = existing.byte_size();
                existing.embeddings = embeddings;
                existing.last_access_tick = tick;
                state.total_bytes = state.total_bytes - old_bytes + bytes;
                state.move_to(key, CacheTier::Hot);
            }
            None => {
                state
                    .entries
                    .insert(key.to_string(), CacheEntry::new(key.to_string(), embeddings, tick));
                state.tier_counts[CacheTier::Hot.index()] += 1;
                state.total_bytes += bytes;
            }
        }
        state.metrics.record_store();

        let mut evicted = self.rebalance(state);
        if self.config.auto_evict {
            while state.total_bytes > self.config.max_total_bytes && !state.entries.is_empty() {
                evicted += self.evict_locked(state).evicted_keys.len();
            }
        }

        Ok(StoreReport {
            bytes_stored: bytes,
            tier: CacheTier::Hot,
            evicted,
            retained: state.entries.contains_key(key),
        })
    }

    /// Look up `key`, returning only the requested dimensions.
    ///
    /// A hit bumps the entry's frequency and recency and promotes it to hot.
    pub fn retrieve(&self, key: &str, requested_dims: &[usize]) -> CacheLookup {
        let mut guard = self.lock();
        let state = &mut *guard;
        let tick = state.tick();

        let Some(entry) = state.entries.get_mut(key) else {
            state.metrics.record_lookup(None);
            state.miss_log.push_back(key.to_string());
            while state.miss_log.len() > self.config.miss_log_size {
                state.miss_log.pop_front();
            }
            return CacheLookup {
                cache_hit: false,
                embeddings: EmbeddingSet::new(),
                tier: None,
                missing_dimensions: requested_dims.to_vec(),
            };
        };

        entry.touch(tick);
        let found_in = entry.tier;
        let embeddings = entry.embeddings.subset(requested_dims);
        let missing_dimensions = requested_dims
            .iter()
            .copied()
            .filter(|d| !embeddings.contains(*d))
            .collect();

        state.metrics.record_lookup(Some(found_in.index() as u8));
        if found_in != CacheTier::Hot {
            state.move_to(key, CacheTier::Hot);
            self.rebalance(state);
            debug!(key, from = ?found_in, "promoted to hot tier");
        }

        CacheLookup {
            cache_hit: true,
            embeddings,
            tier: Some(found_in),
            missing_dimensions,
        }
    }

    /// Evict when the aggregate size exceeds the byte budget, or
    /// unconditionally with `force`.
    ///
    /// Removes `ceil(eviction_fraction × entries)` entries with the lowest
    /// (frequency, recency) score.
    pub fn perform_eviction(&self, force: bool) -> EvictionReport {
        let mut guard = self.lock();
        let state = &mut *guard;
        if !force && state.total_bytes <= self.config.max_total_bytes {
            return EvictionReport {
                mean_retained_frequency: eviction::mean_frequency(state.entries.values()),
                remaining_entries: state.entries.len(),
                ..EvictionReport::default()
            };
        }
        self.evict_locked(state)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().entries.contains_key(key)
    }

    /// Snapshot of one entry without counting it as an access.
    pub fn entry(&self, key: &str) -> Option<CacheEntry> {
        self.lock().entries.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_bytes(&self) -> usize {
        self.lock().total_bytes
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats {
            hot_entries: state.tier_counts[CacheTier::Hot.index()],
            warm_entries: state.tier_counts[CacheTier::Warm.index()],
            cold_entries: state.tier_counts[CacheTier::Cold.index()],
            total_bytes: state.total_bytes,
            metrics: state.metrics.clone(),
        }
    }

    /// Evict the lowest-scored entries until the tiers can hold the rest,
    /// then cascade overflow downwards. Returns the number evicted.
    fn rebalance(&self, state: &mut TierState) -> usize {
        let capacities = [
            self.config.hot_capacity,
            self.config.warm_capacity,
            self.config.cold_capacity,
        ];
        let total_capacity = capacities.iter().fold(0usize, |a, c| a.saturating_add(*c));

        let mut evicted = 0;
        while state.entries.len() > total_capacity {
            let Some(victim) = eviction::lowest_scored(&state.entries, 1).pop() else {
                break;
            };
            if let Some(removed) = state.remove(&victim) {
                state.metrics.record_eviction(1, removed.byte_size());
                evicted += 1;
            }
        }

        // With the total within capacity, settling hot then warm leaves cold in bounds.
        for tier in CacheTier::ALL {
            let Some(colder) = tier.colder() else {
                break;
            };
            while state.tier_counts[tier.index()] > capacities[tier.index()] {
                let Some(victim) = eviction::lowest_in_tier(&state.entries, tier) else {
                    break;
                };
                state.move_to(&victim, colder);
            }
        }
        evicted
    }

    fn evict_locked(&self, state: &mut TierState) -> EvictionReport {
        let target = eviction_target(state.entries.len(), self.config.eviction_fraction);
        let victims = eviction::lowest_scored(&state.entries, target);

        let mut removed = Vec::with_capacity(victims.len());
        for key in &victims {
            if let Some(entry) = state.remove(key) {
                removed.push(entry);
            }
        }
        let bytes_freed: usize = removed.iter().map(CacheEntry::byte_size).sum();
        state.metrics.record_eviction(removed.len(), bytes_freed);

        let report = EvictionReport {
            mean_evicted_frequency: eviction::mean_frequency(removed.iter()),
            mean_retained_frequency: eviction::mean_frequency(state.entries.values()),
            evicted_keys: victims,
            bytes_freed,
            remaining_entries: state.entries.len(),
        };
        events::cache_evicted(report.evicted_keys.len(), bytes_freed, report.remaining_entries);
        report
    }

    pub(crate) fn recent_misses(&self) -> Vec<String> {
        self.lock().miss_log.iter().cloned().collect()
    }
}
