//! Tier labels and cached entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sillage_core::models::EmbeddingSet;

/// Storage tier an entry currently lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheTier {
    Hot,
    Warm,
    Cold,
}

impl CacheTier {
    pub const ALL: [CacheTier; 3] = [CacheTier::Hot, CacheTier::Warm, CacheTier::Cold];

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Hot => 0,
            Self::Warm => 1,
            Self::Cold => 2,
        }
    }

    /// Next colder tier, `None` for cold.
    pub(crate) fn colder(self) -> Option<Self> {
        match self {
            Self::Hot => Some(Self::Warm),
            Self::Warm => Some(Self::Cold),
            Self::Cold => None,
        }
    }
}

/// One cached text with its embeddings and access history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub embeddings: EmbeddingSet,
    pub tier: CacheTier,
    pub access_frequency: u64,
    pub last_accessed: DateTime<Utc>,
    /// Monotonic logical clock value of the last access; breaks frequency ties.
    pub last_access_tick: u64,
}

impl CacheEntry {
    pub(crate) fn new(key: String, embeddings: EmbeddingSet, tick: u64) -> Self {
        Self {
            key,
            embeddings,
            tier: CacheTier::Hot,
            access_frequency: 0,
            last_accessed: Utc::now(),
            last_access_tick: tick,
        }
    }

    pub fn byte_size(&self) -> usize {
        self.embeddings.byte_size()
    }

    /// Ordering key for demotion and eviction: lower goes first.
    pub(crate) fn score(&self) -> (u64, u64) {
        (self.access_frequency, self.last_access_tick)
    }

    pub(crate) fn touch(&mut self, tick: u64) {
        self.access_frequency += 1;
        self.last_access_tick = tick;
        self.last_accessed = Utc::now();
    }
}
