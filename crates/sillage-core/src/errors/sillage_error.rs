use super::{BanditError, CacheError, ConfigError, EmbeddingError, SearchError, ValidationError};

/// Top-level error for the sillage engine.
#[derive(Debug, thiserror::Error)]
pub enum SillageError {
    #[error("embedding error: {0}")]
    EmbeddingError(#[from] EmbeddingError),

    #[error("search error: {0}")]
    SearchError(#[from] SearchError),

    #[error("cache error: {0}")]
    CacheError(#[from] CacheError),

    #[error("validation error: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("bandit error: {0}")]
    BanditError(#[from] BanditError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl SillageError {
    /// Whether a caller may reasonably retry the failed operation.
    ///
    /// Provider and store failures (including timeouts) are retryable;
    /// config, validation and reward errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::EmbeddingError(e) => !matches!(
                e,
                EmbeddingError::DimensionMismatch { .. } | EmbeddingError::InvalidEmbedding { .. }
            ),
            Self::SearchError(e) => !matches!(
                e,
                SearchError::MalformedEmbedding { .. } | SearchError::Cancelled { .. }
            ),
            Self::BanditError(e) => matches!(
                e,
                BanditError::ArmStoreFailed { .. } | BanditError::Timeout { .. }
            ),
            Self::CacheError(_) => true,
            _ => false,
        }
    }
}
