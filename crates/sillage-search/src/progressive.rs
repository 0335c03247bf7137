//! ProgressiveMatryoshkaSearch: a stage-by-stage state machine.
//!
//! Stage 0 recalls candidates at the lowest precision; every later stage
//! re-ranks only the survivors of the stage before it at a higher precision.
//! Store failures never escape as `Err`: they end the run in
//! [`SearchState::Failed`] with a reason the caller can act on.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use sillage_core::cancellation::CancellationToken;
use sillage_core::config::SearchConfig;
use sillage_core::constants::{
    REASON_ALL_STAGES, REASON_CANCELLED, REASON_HIGH_CONFIDENCE, REASON_MALFORMED,
    REASON_STORE_ERROR, REASON_TIMEOUT,
};
use sillage_core::errors::{ConfigError, SearchError, SillageError};
use sillage_core::models::{
    DegradationEvent, EmbeddingSet, RealtimeMessage, SearchResult, SearchStage,
};
use sillage_core::traits::{RealtimePublisher, VectorStore};
use sillage_core::vector;
use sillage_observability::{events, SearchMetrics};
use tracing::{debug, warn};

use crate::plan::SearchPlan;

/// Metric name carried by latency alerts.
const LATENCY_METRIC: &str = "search_latency_ms";

/// Progressive search settings.
#[derive(Debug, Clone)]
pub struct ProgressiveSearchConfig {
    pub plan: SearchPlan,
    pub enable_early_termination: bool,
    /// Stop before the last stage once the aggregate confidence reaches
    /// this, inclusive.
    pub early_termination_confidence: f32,
    /// How many top results feed the aggregate confidence.
    pub confidence_top_k: usize,
    /// Upper bound on each store call.
    pub stage_timeout: Duration,
    pub latency_alert_ms: Option<u64>,
}

impl TryFrom<&SearchConfig> for ProgressiveSearchConfig {
    type Error = ConfigError;

    fn try_from(config: &SearchConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            plan: SearchPlan::new(config.stages.clone())?,
            enable_early_termination: config.enable_early_termination,
            early_termination_confidence: config.early_termination_confidence,
            confidence_top_k: config.confidence_top_k,
            stage_timeout: Duration::from_millis(config.stage_timeout_ms),
            latency_alert_ms: config.latency_alert_ms,
        })
    }
}

impl Default for ProgressiveSearchConfig {
    fn default() -> Self {
        let config = SearchConfig::default();
        Self {
            plan: SearchPlan::default(),
            enable_early_termination: config.enable_early_termination,
            early_termination_confidence: config.early_termination_confidence,
            confidence_top_k: config.confidence_top_k,
            stage_timeout: Duration::from_millis(config.stage_timeout_ms),
            latency_alert_ms: config.latency_alert_ms,
        }
    }
}

/// Where a search run is, or where it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "stage")]
pub enum SearchState {
    Pending,
    StageRunning(usize),
    EarlyTerminated,
    Completed,
    Failed,
}

impl SearchState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::EarlyTerminated | Self::Completed | Self::Failed)
    }
}

/// Per-stage diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: usize,
    pub dimension: usize,
    /// Survivors handed in from the previous stage (the candidate limit for stage 0).
    pub candidates_in: usize,
    pub results_out: usize,
    pub confidence: f32,
    pub latency_ms: f64,
}

/// Result of a progressive search run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressiveSearchOutcome {
    pub success: bool,
    pub state: SearchState,
    pub results: Vec<SearchResult>,
    pub stages_executed: usize,
    /// Dimension of the stage that produced `results`; 0 on failure.
    pub final_precision: usize,
    pub termination_reason: String,
    pub confidence: f32,
    pub total_latency_ms: f64,
    pub stage_latencies_ms: Vec<f64>,
    pub stage_reports: Vec<StageReport>,
    pub error: Option<String>,
    /// The results come from the single-resolution fallback.
    pub fallback_applied: bool,
}

/// Accumulates one run's progress.
struct Run {
    started: Instant,
    state: SearchState,
    reports: Vec<StageReport>,
}

impl Run {
    fn start() -> Self {
        Self {
            started: Instant::now(),
            state: SearchState::Pending,
            reports: Vec::new(),
        }
    }

    fn finish(
        self,
        state: SearchState,
        results: Vec<SearchResult>,
        final_precision: usize,
        reason: &str,
        error: Option<String>,
    ) -> ProgressiveSearchOutcome {
        let confidence = self.reports.last().map_or(0.0, |r| r.confidence);
        ProgressiveSearchOutcome {
            success: error.is_none(),
            state,
            results,
            stages_executed: self.reports.len(),
            final_precision,
            termination_reason: reason.to_string(),
            confidence,
            total_latency_ms: elapsed_ms(self.started),
            stage_latencies_ms: self.reports.iter().map(|r| r.latency_ms).collect(),
            stage_reports: self.reports,
            error,
            fallback_applied: false,
        }
    }

    fn fail(self, error: SillageError) -> ProgressiveSearchOutcome {
        let reason = failure_reason(&error);
        self.finish(SearchState::Failed, Vec::new(), 0, reason, Some(error.to_string()))
    }
}

/// Progressive multi-resolution search over a [`VectorStore`].
pub struct ProgressiveMatryoshkaSearch<S> {
    store: S,
    config: ProgressiveSearchConfig,
    publisher: Option<(Arc<dyn RealtimePublisher>, String)>,
    metrics: Mutex<SearchMetrics>,
    degradations: Mutex<Vec<DegradationEvent>>,
}

impl<S: VectorStore> ProgressiveMatryoshkaSearch<S> {
    pub fn new(store: S, config: ProgressiveSearchConfig) -> Self {
        Self {
            store,
            config,
            publisher: None,
            metrics: Mutex::new(SearchMetrics::new()),
            degradations: Mutex::new(Vec::new()),
        }
    }

    /// Publish latency alerts to `recipient` through `publisher`.
    pub fn with_publisher(
        mut self,
        publisher: Arc<dyn RealtimePublisher>,
        recipient: impl Into<String>,
    ) -> Self {
        self.publisher = Some((publisher, recipient.into()));
        self
    }

    pub fn config(&self) -> &ProgressiveSearchConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Snapshot of the accumulated metrics.
    pub fn metrics(&self) -> SearchMetrics {
        self.lock_metrics().clone()
    }

    /// Drain the fallbacks taken since the last call.
    pub fn drain_degradations(&self) -> Vec<DegradationEvent> {
        std::mem::take(&mut *self.degradations.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Run the configured plan.
    pub async fn search(
        &self,
        query: &EmbeddingSet,
        cancel: &CancellationToken,
    ) -> ProgressiveSearchOutcome {
        self.search_with_plan(&self.config.plan, query, cancel).await
    }

    /// Run the configured plan; if it fails for any reason other than
    /// cancellation, retry once as a single-resolution search at the plan's
    /// highest dimension.
    pub async fn search_with_fallback(
        &self,
        query: &EmbeddingSet,
        cancel: &CancellationToken,
    ) -> ProgressiveSearchOutcome {
        let outcome = self.search(query, cancel).await;
        if outcome.success || outcome.termination_reason == REASON_CANCELLED {
            return outcome;
        }

        let final_stage = *self.config.plan.final_stage();
        let failure = outcome.error.unwrap_or_default();
        events::degradation_triggered("progressive_search", &failure, "single_resolution_search");
        self.lock_metrics().record_fallback();
        self.degradations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(DegradationEvent::now("progressive_search", failure, "single_resolution_search"));

        let plan = match SearchPlan::single(final_stage) {
            Ok(plan) => plan,
            Err(e) => return Run::start().fail(e.into()),
        };
        let mut fallback = self.search_with_plan(&plan, query, cancel).await;
        fallback.fallback_applied = true;
        fallback
    }

    /// Run an arbitrary plan against this store.
    pub async fn search_with_plan(
        &self,
        plan: &SearchPlan,
        query: &EmbeddingSet,
        cancel: &CancellationToken,
    ) -> ProgressiveSearchOutcome {
        let outcome = self.execute(plan, query, cancel).await;

        {
            let mut metrics = self.lock_metrics();
            if outcome.success {
                metrics.record_search(
                    outcome.stages_executed,
                    outcome.total_latency_ms,
                    outcome.state == SearchState::EarlyTerminated,
                );
            } else {
                metrics.record_failure();
            }
        }

        if outcome.success {
            events::search_completed(
                outcome.stages_executed,
                outcome.final_precision,
                outcome.results.len(),
                outcome.total_latency_ms,
                &outcome.termination_reason,
            );
        } else {
            events::search_failed(
                outcome.stages_executed,
                &outcome.termination_reason,
                outcome.error.as_deref().unwrap_or_default(),
            );
        }
        self.check_latency(outcome.total_latency_ms);
        outcome
    }

    async fn execute(
        &self,
        plan: &SearchPlan,
        query: &EmbeddingSet,
        cancel: &CancellationToken,
    ) -> ProgressiveSearchOutcome {
        let mut run = Run::start();
        let mut survivors: Vec<SearchResult> = Vec::new();
        let last = plan.len() - 1;

        for (i, stage) in plan.stages().iter().enumerate() {
            if cancel.is_cancelled() {
                return run.fail(SearchError::Cancelled { stages_executed: i }.into());
            }
            run.state = SearchState::StageRunning(i);

            let embedding = match stage_query(query, stage.dimension) {
                Ok(embedding) => embedding,
                Err(e) => return run.fail(e.into()),
            };

            let stage_started = Instant::now();
            let candidates_in = if i == 0 {
                stage.candidate_count
            } else {
                survivors.len()
            };
            let results = match self.run_stage(i, stage, &embedding, &survivors).await {
                Ok(results) => results,
                Err(e) => return run.fail(e),
            };

            let confidence = aggregate_confidence(&results, self.config.confidence_top_k);
            run.reports.push(StageReport {
                stage: i,
                dimension: stage.dimension,
                candidates_in,
                results_out: results.len(),
                confidence,
                latency_ms: elapsed_ms(stage_started),
            });
            debug!(
                state = ?run.state,
                dimension = stage.dimension,
                results = results.len(),
                confidence,
                "search stage finished"
            );

            if i < last
                && self.config.enable_early_termination
                && confidence >= self.config.early_termination_confidence
            {
                return run.finish(
                    SearchState::EarlyTerminated,
                    results,
                    stage.dimension,
                    REASON_HIGH_CONFIDENCE,
                    None,
                );
            }
            survivors = results;
        }

        run.finish(
            SearchState::Completed,
            survivors,
            plan.max_dimension(),
            REASON_ALL_STAGES,
            None,
        )
    }

    /// One store call, bounded by the stage timeout, sorted and capped.
    async fn run_stage(
        &self,
        index: usize,
        stage: &SearchStage,
        embedding: &[f32],
        survivors: &[SearchResult],
    ) -> Result<Vec<SearchResult>, SillageError> {
        if index > 0 && survivors.is_empty() {
            return Ok(Vec::new());
        }
        let timeout = self.config.stage_timeout;
        let call = if index == 0 {
            tokio::time::timeout(
                timeout,
                self.store.similarity_search(
                    embedding,
                    stage.dimension,
                    stage.candidate_count,
                    stage.similarity_threshold,
                ),
            )
            .await
        } else {
            let ids: Vec<String> = survivors.iter().map(|r| r.id.clone()).collect();
            tokio::time::timeout(
                timeout,
                self.store
                    .rerank(embedding, stage.dimension, &ids, stage.similarity_threshold),
            )
            .await
        };

        let mut results = call.map_err(|_| SearchError::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        })??;
        sort_descending(&mut results);
        results.truncate(stage.candidate_count);
        Ok(results)
    }

    fn check_latency(&self, latency_ms: f64) {
        let (Some(threshold), Some((publisher, recipient))) =
            (self.config.latency_alert_ms, self.publisher.as_ref())
        else {
            return;
        };
        if latency_ms <= threshold as f64 {
            return;
        }
        let alert = RealtimeMessage::PerformanceAlert {
            metric: LATENCY_METRIC.to_string(),
            value: latency_ms,
            threshold: threshold as f64,
            message: format!("progressive search took {latency_ms:.1}ms (limit {threshold}ms)"),
        };
        if let Err(e) = publisher.publish(recipient, alert) {
            warn!(error = %e, "failed to publish latency alert");
        }
    }

    fn lock_metrics(&self) -> MutexGuard<'_, SearchMetrics> {
        self.metrics.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Query vector for `dimension`: the stored one, or a normalised prefix of
/// the smallest larger embedding in the set.
fn stage_query(query: &EmbeddingSet, dimension: usize) -> Result<Vec<f32>, SearchError> {
    let embedding = match query.get(dimension) {
        Some(exact) => exact.to_vec(),
        None => {
            let source = query.smallest_at_least(dimension).ok_or_else(|| {
                SearchError::MalformedEmbedding {
                    reason: format!(
                        "no query embedding of at least {dimension} dims (have {:?})",
                        query.dimensions()
                    ),
                }
            })?;
            vector::truncate_normalized(source, dimension).map_err(|e| {
                SearchError::MalformedEmbedding {
                    reason: e.to_string(),
                }
            })?
        }
    };
    if embedding.iter().any(|x| !x.is_finite()) || vector::is_degenerate(&embedding) {
        return Err(SearchError::MalformedEmbedding {
            reason: format!("query embedding at {dimension} dims is zero or non-finite"),
        });
    }
    Ok(embedding)
}

/// Stable sort by descending similarity; ties keep their input order.
fn sort_descending(results: &mut [SearchResult]) {
    results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
}

/// Mean similarity of the top `k` results, clamped to [0, 1].
fn aggregate_confidence(results: &[SearchResult], k: usize) -> f32 {
    let top = &results[..results.len().min(k.max(1))];
    if top.is_empty() {
        return 0.0;
    }
    let mean = top.iter().map(|r| r.similarity).sum::<f32>() / top.len() as f32;
    mean.clamp(0.0, 1.0)
}

fn failure_reason(error: &SillageError) -> &'static str {
    match error {
        SillageError::SearchError(SearchError::MalformedEmbedding { .. }) => REASON_MALFORMED,
        SillageError::SearchError(SearchError::Cancelled { .. }) => REASON_CANCELLED,
        SillageError::SearchError(SearchError::Timeout { .. }) => REASON_TIMEOUT,
        _ => REASON_STORE_ERROR,
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
