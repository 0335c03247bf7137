//! Decaying ε-greedy over a fixed arm set.
//!
//! Kept alongside Thompson Sampling as a baseline: with probability
//! `max(min_rate, decay^t)` a uniformly random arm is chosen, otherwise the
//! arm with the highest posterior mean.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use sillage_core::config::BanditConfig;
use sillage_core::errors::BanditError;
use sillage_core::models::BanditArm;
use tracing::debug;

use crate::beta::BetaDistributionSampler;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyDecision {
    pub algorithm: String,
    pub explored: bool,
    pub exploration_rate: f64,
    /// Zero-based index of this decision.
    pub iteration: u64,
}

pub struct MultiArmedBanditStrategy {
    decay: f64,
    min_rate: f64,
    iteration: AtomicU64,
    rng: Mutex<BetaDistributionSampler>,
}

impl MultiArmedBanditStrategy {
    pub fn new(decay: f64, min_rate: f64, seed: Option<u64>) -> Self {
        Self {
            decay: decay.clamp(0.0, 1.0),
            min_rate: min_rate.clamp(0.0, 1.0),
            iteration: AtomicU64::new(0),
            rng: Mutex::new(BetaDistributionSampler::from_seed_option(seed)),
        }
    }

    /// `max(min_rate, decay^iteration)`.
    pub fn exploration_rate(&self, iteration: u64) -> f64 {
        let exponent = i32::try_from(iteration).unwrap_or(i32::MAX);
        self.decay.powi(exponent).max(self.min_rate)
    }

    pub fn iterations(&self) -> u64 {
        self.iteration.load(Ordering::Relaxed)
    }

    /// Choose among `arms`, advancing the decay clock by one step.
    ///
    /// # Errors
    /// `NoArms` when `arms` is empty.
    pub fn select(&self, arms: &[BanditArm]) -> Result<StrategyDecision, BanditError> {
        if arms.is_empty() {
            return Err(BanditError::NoArms);
        }
        let iteration = self.iteration.fetch_add(1, Ordering::Relaxed);
        let exploration_rate = self.exploration_rate(iteration);

        let (index, explored) = {
            let mut rng = self.lock_rng();
            if rng.unit() < exploration_rate {
                (rng.index(arms.len()), true)
            } else {
                (greedy_index(arms), false)
            }
        };
        debug!(
            iteration,
            exploration_rate,
            explored,
            algorithm = %arms[index].algorithm_name,
            "epsilon-greedy decision"
        );
        Ok(StrategyDecision {
            algorithm: arms[index].algorithm_name.clone(),
            explored,
            exploration_rate,
            iteration,
        })
    }

    fn lock_rng(&self) -> MutexGuard<'_, BetaDistributionSampler> {
        self.rng.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl From<&BanditConfig> for MultiArmedBanditStrategy {
    fn from(config: &BanditConfig) -> Self {
        Self::new(
            config.exploration_decay,
            config.min_exploration_rate,
            config.seed,
        )
    }
}

/// Highest posterior mean; the first arm wins ties.
fn greedy_index(arms: &[BanditArm]) -> usize {
    arms.iter()
        .enumerate()
        .fold(0, |top, (i, arm)| if arm.mean() > arms[top].mean() { i } else { top })
}
