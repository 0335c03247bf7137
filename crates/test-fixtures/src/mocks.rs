//! Scripted implementations of the boundary traits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sillage_core::errors::{BanditError, EmbeddingError, SearchError, SillageResult};
use sillage_core::models::{BanditArm, ContextKey, RealtimeMessage, SearchResult};
use sillage_core::traits::{
    ArmStore, EmbeddingProvider, ProviderEmbedding, RealtimePublisher, VectorStore,
};

// ─── Providers ──────────────────────────────────────────────────────────────

/// Returns `sin(i / 100)` vectors and counts calls.
#[derive(Debug, Clone, Default)]
pub struct CountingProvider {
    calls: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl CountingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps for `delay` before answering.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            calls: Arc::default(),
            delay: Some(delay),
        }
    }

    /// Shared call counter; clones observe the same count.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for CountingProvider {
    async fn embed(&self, text: &str, _model: &str, dimensions: usize) -> SillageResult<ProviderEmbedding> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(ProviderEmbedding {
            vector: crate::sin_embedding(dimensions),
            tokens_used: text.split_whitespace().count() as u32,
        })
    }

    fn name(&self) -> &str {
        "counting"
    }
}

/// Always fails.
#[derive(Debug, Clone, Default)]
pub struct FailingProvider {
    calls: Arc<AtomicUsize>,
}

impl FailingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for FailingProvider {
    async fn embed(&self, _text: &str, _model: &str, _dimensions: usize) -> SillageResult<ProviderEmbedding> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(EmbeddingError::ProviderFailed {
            provider: "failing".to_string(),
            reason: "quota exhausted".to_string(),
        }
        .into())
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Returns a fixed vector regardless of the requested dimensions.
#[derive(Debug, Clone)]
pub struct FixedProvider {
    vector: Vec<f32>,
}

impl FixedProvider {
    pub fn new(vector: Vec<f32>) -> Self {
        Self { vector }
    }
}

impl EmbeddingProvider for FixedProvider {
    async fn embed(&self, _text: &str, _model: &str, _dimensions: usize) -> SillageResult<ProviderEmbedding> {
        Ok(ProviderEmbedding {
            vector: self.vector.clone(),
            tokens_used: 1,
        })
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

// ─── Vector stores ──────────────────────────────────────────────────────────

/// One store invocation, recorded for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Search { dimension: usize, limit: usize },
    Rerank { dimension: usize, candidates: Vec<String> },
}

/// Answers from a per-dimension score table instead of real vectors.
///
/// Documents missing from a dimension's table are never returned at that
/// dimension.
#[derive(Debug, Default)]
pub struct ScriptedStore {
    scores: HashMap<usize, Vec<(String, f32)>>,
    fail_at: Option<usize>,
    delay: Option<Duration>,
    calls: Mutex<Vec<StoreCall>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score table for `dimension`.
    pub fn with_scores(mut self, dimension: usize, scores: Vec<(String, f32)>) -> Self {
        self.scores.insert(dimension, scores);
        self
    }

    /// Same score for every id at `dimension`.
    pub fn with_uniform(self, dimension: usize, ids: impl IntoIterator<Item = String>, score: f32) -> Self {
        let scores = ids.into_iter().map(|id| (id, score)).collect();
        self.with_scores(dimension, scores)
    }

    /// Fail every call at `dimension`.
    pub fn failing_at(mut self, dimension: usize) -> Self {
        self.fail_at = Some(dimension);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(call);
    }

    async fn answer(
        &self,
        dimension: usize,
        threshold: f32,
        keep: impl Fn(&str) -> bool,
        limit: usize,
    ) -> SillageResult<Vec<SearchResult>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_at == Some(dimension) {
            return Err(SearchError::StoreFailed {
                dimension,
                reason: "scripted failure".to_string(),
            }
            .into());
        }
        let mut out: Vec<SearchResult> = self
            .scores
            .get(&dimension)
            .map(|rows| {
                rows.iter()
                    .filter(|(id, s)| keep(id.as_str()) && *s >= threshold)
                    .map(|(id, s)| SearchResult::new(id.clone(), *s))
                    .collect()
            })
            .unwrap_or_default();
        out.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        out.truncate(limit);
        Ok(out)
    }
}

impl VectorStore for ScriptedStore {
    async fn similarity_search(
        &self,
        _embedding: &[f32],
        dimension: usize,
        candidate_limit: usize,
        threshold: f32,
    ) -> SillageResult<Vec<SearchResult>> {
        self.record(StoreCall::Search {
            dimension,
            limit: candidate_limit,
        });
        self.answer(dimension, threshold, |_| true, candidate_limit).await
    }

    async fn rerank(
        &self,
        _embedding: &[f32],
        dimension: usize,
        candidate_ids: &[String],
        threshold: f32,
    ) -> SillageResult<Vec<SearchResult>> {
        self.record(StoreCall::Rerank {
            dimension,
            candidates: candidate_ids.to_vec(),
        });
        self.answer(
            dimension,
            threshold,
            |id| candidate_ids.iter().any(|c| c == id),
            usize::MAX,
        )
        .await
    }
}

// ─── Arm stores ─────────────────────────────────────────────────────────────

/// Arm store whose every call fails, or hangs past any sane timeout.
#[derive(Debug, Clone, Default)]
pub struct BrokenArmStore {
    hang: Option<Duration>,
}

impl BrokenArmStore {
    pub fn failing() -> Self {
        Self { hang: None }
    }

    pub fn hanging(duration: Duration) -> Self {
        Self {
            hang: Some(duration),
        }
    }

    async fn fail<T>(&self) -> SillageResult<T> {
        if let Some(hang) = self.hang {
            tokio::time::sleep(hang).await;
        }
        Err(BanditError::ArmStoreFailed {
            reason: "arm store offline".to_string(),
        }
        .into())
    }
}

impl ArmStore for BrokenArmStore {
    async fn load_arms(&self, _context_key: Option<&ContextKey>) -> SillageResult<Vec<BanditArm>> {
        self.fail().await
    }

    async fn save_arm(&self, _arm: &BanditArm) -> SillageResult<()> {
        self.fail().await
    }
}

// ─── Publisher ──────────────────────────────────────────────────────────────

/// Records every published message.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    messages: Mutex<Vec<(String, RealtimeMessage)>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(String, RealtimeMessage)> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl RealtimePublisher for RecordingPublisher {
    fn publish(&self, user_id: &str, message: RealtimeMessage) -> SillageResult<()> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((user_id.to_string(), message));
        Ok(())
    }
}
