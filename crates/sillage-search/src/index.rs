//! HNSW parameter planning per embedding dimension.
//!
//! Tier choice is a closed set of rules evaluated in order; parameters per
//! tier come from a fixed table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Bytes of per-node bookkeeping beyond the vector and its links.
const NODE_OVERHEAD_BYTES: usize = 100;

/// Optimisation target of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexTier {
    Speed,
    Balanced,
    Accuracy,
}

/// HNSW build and query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HnswParams {
    /// Graph degree.
    pub m: usize,
    pub ef_construction: usize,
    pub ef_search: usize,
}

impl IndexTier {
    pub fn params(&self) -> HnswParams {
        match self {
            Self::Speed => HnswParams {
                m: 16,
                ef_construction: 64,
                ef_search: 40,
            },
            Self::Balanced => HnswParams {
                m: 24,
                ef_construction: 128,
                ef_search: 80,
            },
            Self::Accuracy => HnswParams {
                m: 32,
                ef_construction: 256,
                ef_search: 200,
            },
        }
    }

    /// Thresholded tier used by the index manager: dimension alone decides.
    pub fn for_dimension(dimension: usize) -> Self {
        match dimension {
            0..=256 => Self::Speed,
            257..=512 => Self::Balanced,
            _ => Self::Accuracy,
        }
    }
}

impl HnswParams {
    /// Rough resident size of `vectors` nodes at `dimension`: the f32
    /// vector, about `2m` eight-byte links, and fixed overhead.
    pub fn estimated_memory_bytes(&self, dimension: usize, vectors: usize) -> usize {
        let per_vector = dimension * 4 + self.m * 2 * 8 + NODE_OVERHEAD_BYTES;
        per_vector * vectors
    }
}

/// Observed workload at one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionProfile {
    pub dimension: usize,
    /// Share of searches hitting this dimension, 0.0 to 1.0.
    pub search_frequency: f64,
    /// Required recall, 0.0 to 1.0.
    pub accuracy_requirement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecommendation {
    pub dimension: usize,
    pub tier: IndexTier,
    pub params: HnswParams,
    pub reason: String,
}

type TierRule = fn(&DimensionProfile) -> Option<(IndexTier, &'static str)>;

fn frequency_rule(profile: &DimensionProfile) -> Option<(IndexTier, &'static str)> {
    (profile.search_frequency > 0.5).then_some((IndexTier::Speed, "high_search_frequency"))
}

fn accuracy_rule(profile: &DimensionProfile) -> Option<(IndexTier, &'static str)> {
    (profile.accuracy_requirement > 0.95).then_some((IndexTier::Accuracy, "high_accuracy_requirement"))
}

/// Evaluated in order; the first match wins.
const TIER_RULES: [TierRule; 2] = [frequency_rule, accuracy_rule];

/// Per-dimension tier selection from workload profiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexOptimizer;

impl IndexOptimizer {
    pub fn new() -> Self {
        Self
    }

    /// One recommendation per profile, in input order.
    pub fn optimize(&self, profiles: &[DimensionProfile]) -> Vec<IndexRecommendation> {
        profiles
            .iter()
            .map(|profile| {
                let (tier, reason) = TIER_RULES
                    .iter()
                    .find_map(|rule| rule(profile))
                    .unwrap_or((IndexTier::Balanced, "balanced_default"));
                debug!(
                    dimension = profile.dimension,
                    tier = ?tier,
                    reason,
                    "index tier selected"
                );
                IndexRecommendation {
                    dimension: profile.dimension,
                    tier,
                    params: tier.params(),
                    reason: reason.to_string(),
                }
            })
            .collect()
    }
}

/// A named query shape and how often it runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPattern {
    pub name: String,
    /// Embedding dimension the pattern searches at.
    pub precision: usize,
    pub frequency: f64,
}

impl QueryPattern {
    pub fn new(name: impl Into<String>, precision: usize, frequency: f64) -> Self {
        Self {
            name: name.into(),
            precision,
            frequency,
        }
    }
}

/// Index to build for one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub name: String,
    pub dimension: usize,
    pub tier: IndexTier,
    pub params: HnswParams,
    /// Patterns served by this index, in input order.
    pub patterns: Vec<String>,
    pub total_frequency: f64,
}

/// Expands query patterns into one index per distinct dimension.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexManager;

impl IndexManager {
    pub fn new() -> Self {
        Self
    }

    /// Specs ascending by dimension. Patterns at dimension 0 are ignored.
    pub fn plan(&self, patterns: &[QueryPattern]) -> Vec<IndexSpec> {
        let mut by_dimension: BTreeMap<usize, IndexSpec> = BTreeMap::new();
        for pattern in patterns.iter().filter(|p| p.precision > 0) {
            let spec = by_dimension.entry(pattern.precision).or_insert_with(|| {
                let tier = IndexTier::for_dimension(pattern.precision);
                IndexSpec {
                    name: format!("embedding_{}_hnsw", pattern.precision),
                    dimension: pattern.precision,
                    tier,
                    params: tier.params(),
                    patterns: Vec::new(),
                    total_frequency: 0.0,
                }
            });
            spec.patterns.push(pattern.name.clone());
            spec.total_frequency += pattern.frequency;
        }
        by_dimension.into_values().collect()
    }
}
