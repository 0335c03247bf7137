//! # sillage-search
//!
//! Multi-stage Matryoshka search: cheap low-dimension recall first, then
//! re-ranking of the survivors at increasing precision.
//!
//! - [`ProgressiveMatryoshkaSearch`] runs a [`SearchPlan`] against a
//!   [`VectorStore`](sillage_core::traits::VectorStore).
//! - [`AdaptiveMatryoshkaSearch`] picks the precision a query deserves.
//! - [`IndexOptimizer`] and [`IndexManager`] map dimensions to HNSW tiers.
//! - [`InMemoryVectorStore`] is a brute-force store for tests and small corpora.

pub mod adaptive;
pub mod index;
pub mod plan;
pub mod progressive;
pub mod store;

pub use adaptive::{
    AdaptiveMatryoshkaSearch, AdaptiveSearchOutcome, ComplexityThresholds, PrecisionDecision,
    PrecisionReason, QueryProfile, UserType,
};
pub use index::{
    DimensionProfile, HnswParams, IndexManager, IndexOptimizer, IndexRecommendation, IndexSpec,
    IndexTier, QueryPattern,
};
pub use plan::SearchPlan;
pub use progressive::{
    ProgressiveMatryoshkaSearch, ProgressiveSearchConfig, ProgressiveSearchOutcome, SearchState,
    StageReport,
};
pub use store::InMemoryVectorStore;
