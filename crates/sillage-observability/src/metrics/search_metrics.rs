//! Progressive search latency and termination counters.

use serde::{Deserialize, Serialize};

use super::percentile;

/// Keeps at most this many latency samples.
const MAX_SAMPLES: usize = 10_000;

/// Progressive search metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchMetrics {
    pub searches: u64,
    pub early_terminations: u64,
    pub failures: u64,
    pub fallbacks: u64,
    pub stages_executed: u64,
    latency_samples_ms: Vec<f64>,
}

impl SearchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_search(&mut self, stages: usize, latency_ms: f64, early_terminated: bool) {
        self.searches += 1;
        self.stages_executed += stages as u64;
        if early_terminated {
            self.early_terminations += 1;
        }
        self.latency_samples_ms.push(latency_ms);
        if self.latency_samples_ms.len() > MAX_SAMPLES {
            let excess = self.latency_samples_ms.len() - MAX_SAMPLES;
            self.latency_samples_ms.drain(..excess);
        }
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    pub fn record_fallback(&mut self) {
        self.fallbacks += 1;
    }

    /// Share of searches that stopped before the final stage.
    pub fn early_termination_rate(&self) -> f64 {
        if self.searches == 0 {
            0.0
        } else {
            self.early_terminations as f64 / self.searches as f64
        }
    }

    pub fn mean_stages(&self) -> f64 {
        if self.searches == 0 {
            0.0
        } else {
            self.stages_executed as f64 / self.searches as f64
        }
    }

    /// Latency at the given percentile (0.0–1.0).
    pub fn latency_percentile_ms(&self, p: f64) -> f64 {
        percentile(&self.latency_samples_ms, p)
    }
}
