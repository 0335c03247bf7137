/// Embedding generation errors (provider side). Always retryable at this layer.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("provider {provider} failed: {reason}")]
    ProviderFailed { provider: String, reason: String },

    #[error("provider unavailable: {provider}")]
    ProviderUnavailable { provider: String },

    #[error("provider call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid embedding: {reason}")]
    InvalidEmbedding { reason: String },
}
