use serde::{Deserialize, Serialize};

/// One step of a progressive search plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchStage {
    pub dimension: usize,
    pub candidate_count: usize,
    pub similarity_threshold: f32,
}

impl SearchStage {
    pub fn new(dimension: usize, candidate_count: usize, similarity_threshold: f32) -> Self {
        Self {
            dimension,
            candidate_count,
            similarity_threshold,
        }
    }
}

/// A scored document returned by a vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    /// Cosine similarity in [-1, 1].
    pub similarity: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl SearchResult {
    pub fn new(id: impl Into<String>, similarity: f32) -> Self {
        Self {
            id: id.into(),
            similarity,
            metadata: None,
        }
    }
}
