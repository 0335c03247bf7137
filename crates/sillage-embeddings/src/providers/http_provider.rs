//! Cloud API embedding provider.
//!
//! Async client for OpenAI-compatible `/v1/embeddings` endpoints (Voyage,
//! OpenAI). Requests the ladder's top dimension natively and retries with
//! exponential backoff. Once retries are exhausted the provider fails fast
//! for a cooldown, then lets the next call through to probe the endpoint.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use sillage_core::errors::{EmbeddingError, SillageResult};
use sillage_core::traits::{EmbeddingProvider, ProviderEmbedding};
use tracing::{debug, warn};

/// Wire dialect of the embeddings endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFlavor {
    /// Voyage AI; takes `output_dimension`.
    Voyage,
    /// OpenAI; takes `dimensions`.
    OpenAi,
}

impl ApiFlavor {
    /// Guess the dialect from a model name.
    pub fn for_model(model: &str) -> Self {
        if model.starts_with("voyage") {
            Self::Voyage
        } else {
            Self::OpenAi
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Voyage => "https://api.voyageai.com/v1/embeddings",
            Self::OpenAi => "https://api.openai.com/v1/embeddings",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Voyage => "voyage",
            Self::OpenAi => "openai",
        }
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dimension: Option<usize>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
    #[serde(default)]
    usage: Option<EmbedUsage>,
}

#[derive(Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbedUsage {
    total_tokens: u32,
}

const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30);

/// HTTP embedding provider with retry.
pub struct HttpEmbeddingProvider {
    flavor: ApiFlavor,
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    /// When the last call exhausted its retries; cleared on success.
    failed_at: Mutex<Option<Instant>>,
    cooldown: Duration,
    max_retries: u32,
}

impl HttpEmbeddingProvider {
    pub fn new(flavor: ApiFlavor, api_key: String, endpoint: Option<String>) -> Self {
        Self {
            endpoint: endpoint.unwrap_or_else(|| flavor.default_endpoint().to_string()),
            flavor,
            client: reqwest::Client::new(),
            api_key,
            failed_at: Mutex::new(None),
            cooldown: DEFAULT_COOLDOWN,
            max_retries: 3,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// How long to fail fast after a call exhausts its retries.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// False only while inside the cooldown after a failed call.
    pub fn is_available(&self) -> bool {
        match *self.failed_at.lock().unwrap_or_else(|e| e.into_inner()) {
            Some(at) => at.elapsed() >= self.cooldown,
            None => true,
        }
    }

    /// Reset availability after a health check or key rotation.
    pub fn reset_availability(&self) {
        *self.failed_at.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    fn mark_failed(&self) {
        *self.failed_at.lock().unwrap_or_else(|e| e.into_inner()) = Some(Instant::now());
    }

    fn request_body<'a>(&self, text: &'a str, model: &'a str, dimensions: usize) -> EmbedRequest<'a> {
        let (dimensions, output_dimension) = match self.flavor {
            ApiFlavor::OpenAi => (Some(dimensions), None),
            ApiFlavor::Voyage => (None, Some(dimensions)),
        };
        EmbedRequest {
            model,
            input: vec![text],
            dimensions,
            output_dimension,
        }
    }

    async fn send_request(&self, body: &EmbedRequest<'_>) -> SillageResult<ProviderEmbedding> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| self.failed(format!("HTTP error: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.failed(format!("API returned {status}: {text}")).into());
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| self.failed(format!("JSON parse error: {e}")))?;
        let tokens_used = parsed.usage.map(|u| u.total_tokens).unwrap_or(0);
        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| self.failed("empty response".to_string()))?;

        Ok(ProviderEmbedding { vector, tokens_used })
    }

    fn failed(&self, reason: String) -> EmbeddingError {
        EmbeddingError::ProviderFailed {
            provider: self.flavor.name().to_string(),
            reason,
        }
    }
}

impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str, model: &str, dimensions: usize) -> SillageResult<ProviderEmbedding> {
        if !self.is_available() {
            return Err(EmbeddingError::ProviderUnavailable {
                provider: self.name().to_string(),
            }
            .into());
        }

        let body = self.request_body(text, model, dimensions);
        let mut last_err = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(100 * 2u64.pow(attempt - 1));
                tokio::time::sleep(delay).await;
                debug!(attempt, "retrying embedding request");
            }
            match self.send_request(&body).await {
                Ok(embedding) => {
                    self.reset_availability();
                    return Ok(embedding);
                }
                Err(e) => {
                    warn!(attempt, error = %e, "embedding request failed");
                    last_err = Some(e);
                }
            }
        }

        self.mark_failed();
        Err(last_err.unwrap_or_else(|| self.failed("all retries exhausted".to_string()).into()))
    }

    fn name(&self) -> &str {
        self.flavor.name()
    }
}
