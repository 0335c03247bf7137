//! # sillage-core
//!
//! Foundation crate for the sillage recommendation engine.
//! Defines the shared data model, boundary traits, errors, config, constants,
//! and the vector primitives every other crate builds on.

pub mod cancellation;
pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;
pub mod vector;

// Re-export the most commonly used types at the crate root.
pub use cancellation::CancellationToken;
pub use config::{DimensionLadder, SillageConfig};
pub use errors::{SillageError, SillageResult};
pub use models::{
    ActivityEvent, BanditArm, ContextKey, Embedding, EmbeddingSet, RealtimeMessage, SearchResult,
    SearchStage,
};
