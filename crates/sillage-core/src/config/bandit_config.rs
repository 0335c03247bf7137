use serde::{Deserialize, Serialize};

use super::defaults;

/// Recommendation-algorithm bandit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BanditConfig {
    /// Candidate algorithms used when a user or context has no history.
    pub algorithms: Vec<String>,
    /// Arm returned when the arm store cannot be reached.
    pub fallback_algorithm: String,
    pub exploration_decay: f64,
    pub min_exploration_rate: f64,
    pub arm_store_timeout_ms: u64,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for BanditConfig {
    fn default() -> Self {
        Self {
            algorithms: defaults::DEFAULT_ALGORITHMS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fallback_algorithm: defaults::DEFAULT_FALLBACK_ALGORITHM.to_string(),
            exploration_decay: defaults::DEFAULT_EXPLORATION_DECAY,
            min_exploration_rate: defaults::DEFAULT_MIN_EXPLORATION_RATE,
            arm_store_timeout_ms: defaults::DEFAULT_ARM_STORE_TIMEOUT_MS,
            seed: None,
        }
    }
}
