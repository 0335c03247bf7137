//! ThompsonSamplingSelector: one posterior draw per arm, highest draw wins.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sillage_core::config::BanditConfig;
use sillage_core::errors::{BanditError, SillageError};
use sillage_core::models::{BanditArm, ContextKey, DegradationEvent};
use sillage_core::traits::ArmStore;
use sillage_observability::events;
use tracing::warn;

use crate::beta::BetaDistributionSampler;

/// Reported confidence when no arm has any history.
const COLD_START_CONFIDENCE: f64 = 0.5;

/// Why an algorithm was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    /// Highest posterior sample among arms with history.
    ThompsonSample,
    /// No stored arms; every candidate drawn from the uniform prior.
    ColdStart,
    /// Arm store unreachable or no candidates; configured fallback.
    Fallback,
}

/// Outcome of one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmSelection {
    pub algorithm: String,
    /// Posterior mean of the chosen arm (0.5 on cold start).
    pub confidence: f64,
    /// The winning posterior draw.
    pub sampled_value: f64,
    /// Posterior mean of the chosen arm.
    pub expected_value: f64,
    /// The chosen arm is not the one with the highest posterior mean.
    pub is_exploration: bool,
    pub is_fallback: bool,
    pub reason: SelectionReason,
}

/// Thompson Sampling over arms held in an [`ArmStore`].
pub struct ThompsonSamplingSelector<S> {
    store: S,
    algorithms: Vec<String>,
    fallback_algorithm: String,
    store_timeout: Duration,
    sampler: Mutex<BetaDistributionSampler>,
    degradations: Mutex<Vec<DegradationEvent>>,
}

impl<S: ArmStore> ThompsonSamplingSelector<S> {
    pub fn new(store: S, config: &BanditConfig) -> Self {
        Self {
            store,
            algorithms: config.algorithms.clone(),
            fallback_algorithm: config.fallback_algorithm.clone(),
            store_timeout: Duration::from_millis(config.arm_store_timeout_ms),
            sampler: Mutex::new(BetaDistributionSampler::from_seed_option(config.seed)),
            degradations: Mutex::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Algorithms considered when the caller passes no candidates.
    pub fn algorithms(&self) -> &[String] {
        &self.algorithms
    }

    /// Drain the fallbacks taken since the last call.
    pub fn drain_degradations(&self) -> Vec<DegradationEvent> {
        std::mem::take(&mut *self.degradations.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Pick one of `candidates` (or the configured algorithms if empty)
    /// for the partition `context`.
    ///
    /// Never fails: store errors and timeouts yield the fallback algorithm.
    pub async fn select(
        &self,
        candidates: &[String],
        context: Option<&ContextKey>,
    ) -> AlgorithmSelection {
        let candidates = if candidates.is_empty() {
            self.algorithms.as_slice()
        } else {
            candidates
        };
        if candidates.is_empty() {
            return self.fallback(&BanditError::NoArms.into());
        }

        let stored = match self.load(context).await {
            Ok(arms) => arms,
            Err(e) => return self.fallback(&e),
        };

        let has_history = stored
            .iter()
            .any(|arm| candidates.contains(&arm.algorithm_name));
        let arms: Vec<BanditArm> = candidates
            .iter()
            .map(|name| {
                stored
                    .iter()
                    .find(|arm| &arm.algorithm_name == name)
                    .cloned()
                    .unwrap_or_else(|| BanditArm::prior(name.clone(), context.cloned()))
            })
            .collect();

        let selection = match self.draw(&arms) {
            Ok(selection) if has_history => selection,
            Ok(selection) => AlgorithmSelection {
                confidence: COLD_START_CONFIDENCE,
                is_exploration: true,
                reason: SelectionReason::ColdStart,
                ..selection
            },
            Err(e) => return self.fallback(&e.into()),
        };
        events::bandit_arm_selected(
            &selection.algorithm,
            selection.sampled_value,
            selection.is_exploration,
            false,
        );
        selection
    }

    /// One draw per arm; the highest draw wins, earlier arms win ties.
    fn draw(&self, arms: &[BanditArm]) -> Result<AlgorithmSelection, BanditError> {
        let mut sampler = self.lock_sampler();
        let mut best: Option<(usize, f64)> = None;
        for (i, arm) in arms.iter().enumerate() {
            let sample = sampler.sample(arm.alpha, arm.beta)?;
            if best.map_or(true, |(_, top)| sample > top) {
                best = Some((i, sample));
            }
        }
        let (chosen, sampled_value) = best.ok_or(BanditError::NoArms)?;

        let greedy = arms
            .iter()
            .enumerate()
            .fold(0, |top, (i, arm)| if arm.mean() > arms[top].mean() { i } else { top });
        let expected_value = arms[chosen].mean();
        Ok(AlgorithmSelection {
            algorithm: arms[chosen].algorithm_name.clone(),
            confidence: expected_value,
            sampled_value,
            expected_value,
            is_exploration: arms[chosen].mean() < arms[greedy].mean(),
            is_fallback: false,
            reason: SelectionReason::ThompsonSample,
        })
    }

    async fn load(&self, context: Option<&ContextKey>) -> Result<Vec<BanditArm>, SillageError> {
        match tokio::time::timeout(self.store_timeout, self.store.load_arms(context)).await {
            Ok(result) => result,
            Err(_) => Err(BanditError::Timeout {
                timeout_ms: self.store_timeout.as_millis() as u64,
            }
            .into()),
        }
    }

    fn fallback(&self, error: &SillageError) -> AlgorithmSelection {
        warn!(error = %error, fallback = %self.fallback_algorithm, "bandit selection degraded");
        events::degradation_triggered("bandit_selector", &error.to_string(), &self.fallback_algorithm);
        events::bandit_arm_selected(&self.fallback_algorithm, 0.5, false, true);
        self.degradations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(DegradationEvent::now("bandit_selector", error.to_string(), &self.fallback_algorithm));
        AlgorithmSelection {
            algorithm: self.fallback_algorithm.clone(),
            confidence: COLD_START_CONFIDENCE,
            sampled_value: 0.5,
            expected_value: 0.5,
            is_exploration: false,
            is_fallback: true,
            reason: SelectionReason::Fallback,
        }
    }

    fn lock_sampler(&self) -> MutexGuard<'_, BetaDistributionSampler> {
        self.sampler.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryArmStore;

    fn config() -> BanditConfig {
        BanditConfig {
            seed: Some(17),
            ..BanditConfig::default()
        }
    }

    #[tokio::test]
    async fn cold_start_uses_uniform_prior() {
        let selector = ThompsonSamplingSelector::new(InMemoryArmStore::new(), &config());
        let selection = selector.select(&[], None).await;
        assert_eq!(selection.reason, SelectionReason::ColdStart);
        assert_eq!(selection.confidence, 0.5);
        assert!(selection.is_exploration);
        assert!(!selection.is_fallback);
        assert!(selector.algorithms().contains(&selection.algorithm));
    }

    #[test]
    fn exploration_flag_compares_against_greedy_arm() {
        let selector = ThompsonSamplingSelector::new(InMemoryArmStore::new(), &config());
        let arms = vec![
            BanditArm::with_params("strong", 50.0, 1.0, None),
            BanditArm::with_params("weak", 1.0, 50.0, None),
        ];
        let selection = selector.draw(&arms).unwrap();
        assert_eq!(selection.algorithm, "strong");
        assert!(!selection.is_exploration);
        assert!((selection.expected_value - 50.0 / 51.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_arm_parameters_surface_as_error() {
        let selector = ThompsonSamplingSelector::new(InMemoryArmStore::new(), &config());
        let arms = vec![BanditArm::with_params("broken", 0.0, 1.0, None)];
        assert!(selector.draw(&arms).is_err());
    }
}
