//! Regret against the `O(√(K·T·ln T))` Thompson Sampling bound.

use serde::{Deserialize, Serialize};

/// Expected reward of the arm played versus the best arm in one round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub chosen_mean: f64,
    pub optimal_mean: f64,
}

impl RoundOutcome {
    pub fn regret(&self) -> f64 {
        (self.optimal_mean - self.chosen_mean).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegretReport {
    pub rounds: u64,
    pub theoretical_bound: f64,
    pub empirical_regret: f64,
    pub within_bound: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RegretBoundsCalculator;

impl RegretBoundsCalculator {
    /// `√(k·t·ln t)`, or `√k` while `t ≤ 1`.
    pub fn theoretical_bound(arms: usize, rounds: u64) -> f64 {
        let k = arms as f64;
        if rounds <= 1 {
            return k.sqrt();
        }
        let t = rounds as f64;
        (k * t * t.ln()).sqrt()
    }

    /// Cumulative pseudo-regret of `rounds` compared with the bound.
    pub fn evaluate(arms: usize, rounds: &[RoundOutcome]) -> RegretReport {
        let empirical_regret: f64 = rounds.iter().map(RoundOutcome::regret).sum();
        let theoretical_bound = Self::theoretical_bound(arms, rounds.len() as u64);
        RegretReport {
            rounds: rounds.len() as u64,
            theoretical_bound,
            empirical_regret,
            within_bound: empirical_regret <= theoretical_bound,
        }
    }
}
