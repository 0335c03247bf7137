//! Boundary contracts. Implementations of providers, stores, and transports
//! live outside the core; the engines are generic over these traits.

mod arm_store;
mod embedding_provider;
mod realtime_publisher;
mod vector_store;

pub use arm_store::ArmStore;
pub use embedding_provider::{EmbeddingProvider, ProviderEmbedding};
pub use realtime_publisher::RealtimePublisher;
pub use vector_store::VectorStore;
