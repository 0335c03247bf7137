//! Victim selection for demotion and eviction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::tier::{CacheEntry, CacheTier};

/// Outcome of an eviction pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvictionReport {
    pub evicted_keys: Vec<String>,
    pub bytes_freed: usize,
    pub mean_evicted_frequency: f64,
    pub mean_retained_frequency: f64,
    pub remaining_entries: usize,
}

/// Number of entries an eviction pass removes: `ceil(fraction × entries)`,
/// at least one when there is anything to evict.
pub fn eviction_target(entries: usize, fraction: f64) -> usize {
    if entries == 0 {
        return 0;
    }
    ((entries as f64 * fraction).ceil() as usize).clamp(1, entries)
}

/// The `count` lowest-scored keys, lowest first.
pub(crate) fn lowest_scored(entries: &HashMap<String, CacheEntry>, count: usize) -> Vec<String> {
    let mut candidates: Vec<&CacheEntry> = entries.values().collect();
    candidates.sort_by(|a, b| a.score().cmp(&b.score()).then_with(|| a.key.cmp(&b.key)));
    candidates.into_iter().take(count).map(|e| e.key.clone()).collect()
}

/// Lowest-scored key in `tier`.
pub(crate) fn lowest_in_tier(entries: &HashMap<String, CacheEntry>, tier: CacheTier) -> Option<String> {
    entries
        .values()
        .filter(|e| e.tier == tier)
        .min_by(|a, b| a.score().cmp(&b.score()).then_with(|| a.key.cmp(&b.key)))
        .map(|e| e.key.clone())
}

pub(crate) fn mean_frequency<'a>(entries: impl Iterator<Item = &'a CacheEntry>) -> f64 {
    let (sum, n) = entries.fold((0u64, 0usize), |(s, n), e| (s + e.access_frequency, n + 1));
    if n == 0 {
        0.0
    } else {
        sum as f64 / n as f64
    }
}
