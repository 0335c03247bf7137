//! Brute-force in-memory vector store.
//!
//! Every document keeps its full embedding plus a unit-normalised prefix
//! for each ladder dimension, so scoring at a ladder dimension is a plain
//! dot product. Other dimensions fall back to cosine over the prefix.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use rayon::prelude::*;
use sillage_core::config::DimensionLadder;
use sillage_core::errors::{SearchError, SillageResult};
use sillage_core::models::{Embedding, EmbeddingSet, SearchResult};
use sillage_core::traits::VectorStore;
use sillage_core::vector;
use tracing::debug;

#[derive(Debug)]
struct StoredDocument {
    full: Embedding,
    prefixes: EmbeddingSet,
    metadata: Option<serde_json::Value>,
}

impl StoredDocument {
    /// Cosine against a unit-normalised query of length `dimension`.
    fn score(&self, query: &[f32], dimension: usize) -> Option<f32> {
        if self.full.len() < dimension {
            return None;
        }
        match self.prefixes.get(dimension) {
            Some(prefix) => Some(vector::dot(query, prefix).clamp(-1.0, 1.0)),
            None => Some(vector::cosine_similarity(query, &self.full[..dimension])),
        }
    }
}

/// Thread-safe document store scored with rayon.
#[derive(Debug)]
pub struct InMemoryVectorStore {
    ladder: DimensionLadder,
    documents: RwLock<HashMap<String, StoredDocument>>,
}

impl InMemoryVectorStore {
    pub fn new(ladder: DimensionLadder) -> Self {
        Self {
            ladder,
            documents: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace a document.
    ///
    /// # Errors
    /// `MalformedEmbedding` if the embedding is empty, zero, or non-finite.
    pub fn insert(
        &self,
        id: impl Into<String>,
        embedding: Embedding,
        metadata: Option<serde_json::Value>,
    ) -> Result<(), SearchError> {
        let id = id.into();
        if embedding.iter().any(|x| !x.is_finite()) || vector::is_degenerate(&embedding) {
            return Err(SearchError::MalformedEmbedding {
                reason: format!("document {id} has a zero or non-finite embedding"),
            });
        }
        let prefixes = self
            .ladder
            .dims()
            .iter()
            .filter(|d| **d <= embedding.len())
            .map(|d| vector::normalize(&embedding[..*d]))
            .collect();
        self.write().insert(
            id,
            StoredDocument {
                full: embedding,
                prefixes,
                metadata,
            },
        );
        Ok(())
    }

    pub fn remove(&self, id: &str) -> bool {
        self.write().remove(id).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn scored(
        &self,
        embedding: &[f32],
        dimension: usize,
        threshold: f32,
        keep: impl Fn(&str) -> bool + Sync,
    ) -> Result<Vec<SearchResult>, SearchError> {
        if embedding.len() < dimension || dimension == 0 {
            return Err(SearchError::MalformedEmbedding {
                reason: format!(
                    "query has {} dims, {dimension} requested",
                    embedding.len()
                ),
            });
        }
        let query = vector::normalize(&embedding[..dimension]);
        let documents = self.read();
        let mut results: Vec<SearchResult> = documents
            .par_iter()
            .filter(|(id, _)| keep(id.as_str()))
            .filter_map(|(id, doc)| {
                let similarity = doc.score(&query, dimension)?;
                (similarity >= threshold).then(|| SearchResult {
                    id: id.clone(),
                    similarity,
                    metadata: doc.metadata.clone(),
                })
            })
            .collect();
        results.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(results)
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, StoredDocument>> {
        self.documents.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, StoredDocument>> {
        self.documents.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl VectorStore for InMemoryVectorStore {
    async fn similarity_search(
        &self,
        embedding: &[f32],
        dimension: usize,
        candidate_limit: usize,
        threshold: f32,
    ) -> SillageResult<Vec<SearchResult>> {
        let mut results = self.scored(embedding, dimension, threshold, |_| true)?;
        results.truncate(candidate_limit);
        debug!(dimension, results = results.len(), "in-memory similarity search");
        Ok(results)
    }

    async fn rerank(
        &self,
        embedding: &[f32],
        dimension: usize,
        candidate_ids: &[String],
        threshold: f32,
    ) -> SillageResult<Vec<SearchResult>> {
        let wanted: HashSet<&str> = candidate_ids.iter().map(String::as_str).collect();
        let results = self.scored(embedding, dimension, threshold, |id| wanted.contains(id))?;
        debug!(dimension, results = results.len(), "in-memory rerank");
        Ok(results)
    }
}
