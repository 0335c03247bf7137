use std::future::Future;

use crate::errors::SillageResult;
use crate::models::SearchResult;

/// Similarity search over stored document embeddings at a given precision.
///
/// Both methods return results ordered by descending similarity, ties in
/// stable id order. Failures are reported as `SearchError`.
pub trait VectorStore: Send + Sync {
    /// Top `candidate_limit` documents scoring at least `threshold`.
    fn similarity_search(
        &self,
        embedding: &[f32],
        dimension: usize,
        candidate_limit: usize,
        threshold: f32,
    ) -> impl Future<Output = SillageResult<Vec<SearchResult>>> + Send;

    /// Re-score only `candidate_ids` at `dimension`, dropping those below `threshold`.
    fn rerank(
        &self,
        embedding: &[f32],
        dimension: usize,
        candidate_ids: &[String],
        threshold: f32,
    ) -> impl Future<Output = SillageResult<Vec<SearchResult>>> + Send;
}
