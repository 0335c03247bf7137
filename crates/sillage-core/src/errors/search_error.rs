/// Vector store / search errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("vector store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    #[error("vector store query failed at {dimension} dims: {reason}")]
    StoreFailed { dimension: usize, reason: String },

    #[error("store query timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("malformed query embedding: {reason}")]
    MalformedEmbedding { reason: String },

    #[error("search cancelled after {stages_executed} stages")]
    Cancelled { stages_executed: usize },
}
