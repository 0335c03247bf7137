use std::future::Future;

use crate::errors::SillageResult;
use crate::models::Embedding;

/// A full-precision embedding returned by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderEmbedding {
    pub vector: Embedding,
    pub tokens_used: u32,
}

/// External embedding generation service.
///
/// Fails with `EmbeddingError` on quota exhaustion, transport errors, or
/// malformed responses.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `text` with `model`, requesting `dimensions` output coordinates.
    fn embed(
        &self,
        text: &str,
        model: &str,
        dimensions: usize,
    ) -> impl Future<Output = SillageResult<ProviderEmbedding>> + Send;

    /// Human-readable provider name.
    fn name(&self) -> &str;
}
