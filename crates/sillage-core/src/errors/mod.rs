mod bandit_error;
mod cache_error;
mod config_error;
mod embedding_error;
mod search_error;
mod sillage_error;
mod validation_error;

pub use bandit_error::BanditError;
pub use cache_error::CacheError;
pub use config_error::ConfigError;
pub use embedding_error::EmbeddingError;
pub use search_error::SearchError;
pub use sillage_error::SillageError;
pub use validation_error::ValidationError;

/// Convenience alias used across every sillage crate.
pub type SillageResult<T> = Result<T, SillageError>;
