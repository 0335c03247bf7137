use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::BYTES_PER_SCALAR;

/// A dense embedding vector.
pub type Embedding = Vec<f32>;

/// How a full-precision embedding is reduced to a lower dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationStrategy {
    /// Keep the leading coordinates (Matryoshka prefix).
    #[default]
    EndTruncation,
    /// Project onto principal components fitted from sample embeddings.
    PcaTruncation,
    /// Project onto an externally learned basis.
    LearnedTruncation,
}

impl TruncationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EndTruncation => "end_truncation",
            Self::PcaTruncation => "pca_truncation",
            Self::LearnedTruncation => "learned_truncation",
        }
    }
}

/// Embeddings of one text at several dimensions, all derived from a single
/// generation event. Keyed by dimension, iterated in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSet(BTreeMap<usize, Embedding>);

impl EmbeddingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, vector: Embedding) {
        self.0.insert(vector.len(), vector);
    }

    pub fn get(&self, dimension: usize) -> Option<&[f32]> {
        self.0.get(&dimension).map(Vec::as_slice)
    }

    pub fn contains(&self, dimension: usize) -> bool {
        self.0.contains_key(&dimension)
    }

    /// Dimensions present, ascending.
    pub fn dimensions(&self) -> Vec<usize> {
        self.0.keys().copied().collect()
    }

    /// Only the requested dimensions that are present.
    pub fn subset(&self, dimensions: &[usize]) -> Self {
        Self(
            dimensions
                .iter()
                .filter_map(|d| self.0.get(d).map(|v| (*d, v.clone())))
                .collect(),
        )
    }

    /// Smallest stored embedding whose dimension is at least `dimension`.
    pub fn smallest_at_least(&self, dimension: usize) -> Option<&[f32]> {
        self.0.range(dimension..).next().map(|(_, v)| v.as_slice())
    }

    /// Total scalar count across all dimensions.
    pub fn scalar_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Stored size under single-precision accounting.
    pub fn byte_size(&self) -> usize {
        self.scalar_count() * BYTES_PER_SCALAR
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[f32])> {
        self.0.iter().map(|(d, v)| (*d, v.as_slice()))
    }
}

impl FromIterator<Embedding> for EmbeddingSet {
    fn from_iter<T: IntoIterator<Item = Embedding>>(iter: T) -> Self {
        let mut set = Self::new();
        for v in iter {
            set.insert(v);
        }
        set
    }
}
