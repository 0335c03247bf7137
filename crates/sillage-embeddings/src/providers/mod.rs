//! Embedding providers and provider selection.

pub mod hashing_provider;
pub mod http_provider;

pub use hashing_provider::HashingEmbeddingProvider;
pub use http_provider::{ApiFlavor, HttpEmbeddingProvider};

use sillage_core::config::EmbeddingConfig;
use sillage_core::errors::SillageResult;
use sillage_core::traits::{EmbeddingProvider, ProviderEmbedding};
use tracing::{info, warn};

/// Provider chosen from configuration.
pub enum ConfiguredProvider {
    Http(HttpEmbeddingProvider),
    Hashing(HashingEmbeddingProvider),
}

impl EmbeddingProvider for ConfiguredProvider {
    async fn embed(&self, text: &str, model: &str, dimensions: usize) -> SillageResult<ProviderEmbedding> {
        match self {
            Self::Http(p) => p.embed(text, model, dimensions).await,
            Self::Hashing(p) => p.embed(text, model, dimensions).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Http(p) => p.name(),
            Self::Hashing(p) => p.name(),
        }
    }
}

/// Build the configured provider.
///
/// `"http"` without an API key falls back to the hashing provider.
pub fn create_provider(config: &EmbeddingConfig, api_key: Option<String>) -> ConfiguredProvider {
    match (config.provider.as_str(), api_key) {
        ("http", Some(key)) => {
            let flavor = ApiFlavor::for_model(&config.model);
            info!(model = %config.model, ?flavor, "using HTTP embedding provider");
            ConfiguredProvider::Http(HttpEmbeddingProvider::new(flavor, key, None))
        }
        ("http", None) => {
            warn!("no API key for HTTP embedding provider, falling back to hashing");
            ConfiguredProvider::Hashing(HashingEmbeddingProvider::new())
        }
        ("hashing", _) => ConfiguredProvider::Hashing(HashingEmbeddingProvider::new()),
        (other, _) => {
            warn!(provider = other, "unknown embedding provider, falling back to hashing");
            ConfiguredProvider::Hashing(HashingEmbeddingProvider::new())
        }
    }
}
