use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::SearchStage;

/// Progressive and adaptive search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub enable_early_termination: bool,
    pub early_termination_confidence: f32,
    /// How many top results feed the aggregate stage confidence.
    pub confidence_top_k: usize,
    pub stage_timeout_ms: u64,
    /// Publish a performance alert when a search exceeds this latency.
    pub latency_alert_ms: Option<u64>,
    pub complexity_simple: f32,
    pub complexity_complex: f32,
    /// Stage plan, ascending in dimension.
    pub stages: Vec<SearchStage>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enable_early_termination: defaults::DEFAULT_ENABLE_EARLY_TERMINATION,
            early_termination_confidence: defaults::DEFAULT_EARLY_TERMINATION_CONFIDENCE,
            confidence_top_k: defaults::DEFAULT_CONFIDENCE_TOP_K,
            stage_timeout_ms: defaults::DEFAULT_STAGE_TIMEOUT_MS,
            latency_alert_ms: None,
            complexity_simple: defaults::DEFAULT_COMPLEXITY_SIMPLE,
            complexity_complex: defaults::DEFAULT_COMPLEXITY_COMPLEX,
            stages: vec![
                SearchStage::new(256, 1000, 0.6),
                SearchStage::new(512, 100, 0.7),
                SearchStage::new(2048, 10, 0.8),
            ],
        }
    }
}
