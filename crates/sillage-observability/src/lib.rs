//! # sillage-observability
//!
//! Structured tracing with named events, plus lightweight metrics for the
//! tiered embedding cache and progressive search.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::{CacheMetrics, SearchMetrics};
pub use tracing_setup::events;
