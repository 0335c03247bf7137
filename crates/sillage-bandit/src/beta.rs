//! Beta variates from uniform draws.
//!
//! `Beta(α, β) = X / (X + Y)` with `X ~ Gamma(α, 1)` and `Y ~ Gamma(β, 1)`.
//! Gamma uses Marsaglia–Tsang for shape ≥ 1 and the boost
//! `Gamma(shape + 1) · U^(1/shape)` below 1. Normals come from Box–Muller.

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sillage_core::errors::BanditError;

/// Beta sampler over any uniform source.
#[derive(Debug, Clone)]
pub struct BetaDistributionSampler<R = StdRng> {
    rng: R,
    /// Second Box–Muller normal, saved for the next call.
    spare_normal: Option<f64>,
}

impl BetaDistributionSampler<StdRng> {
    /// Deterministic sampler.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Seeded when `seed` is set, otherwise from OS entropy.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl<R: Rng> BetaDistributionSampler<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            spare_normal: None,
        }
    }

    /// One draw from `Beta(alpha, beta)`, strictly inside (0, 1).
    ///
    /// # Errors
    /// `InvalidParameters` unless both parameters are finite and positive.
    pub fn sample(&mut self, alpha: f64, beta: f64) -> Result<f64, BanditError> {
        if !(alpha.is_finite() && beta.is_finite() && alpha > 0.0 && beta > 0.0) {
            return Err(BanditError::InvalidParameters { alpha, beta });
        }
        let x = self.gamma(alpha);
        let y = self.gamma(beta);
        let total = x + y;
        let ratio = if total > 0.0 && total.is_finite() {
            x / total
        } else {
            // Both shapes tiny enough to underflow: fall back to the mean.
            alpha / (alpha + beta)
        };
        Ok(ratio.clamp(f64::EPSILON, 1.0 - f64::EPSILON))
    }

    /// One draw from `Gamma(shape, 1)`. `shape` must be positive.
    pub fn gamma(&mut self, shape: f64) -> f64 {
        if shape < 1.0 {
            let boosted = self.gamma(shape + 1.0);
            return boosted * self.open_uniform().powf(1.0 / shape);
        }

        let d = shape - 1.0 / 3.0;
        let c = 1.0 / (9.0 * d).sqrt();
        loop {
            let x = self.standard_normal();
            let v = 1.0 + c * x;
            if v <= 0.0 {
                continue;
            }
            let v = v * v * v;
            let u = self.open_uniform();
            let x2 = x * x;
            if u < 1.0 - 0.0331 * x2 * x2 {
                return d * v;
            }
            if u.ln() < 0.5 * x2 + d * (1.0 - v + v.ln()) {
                return d * v;
            }
        }
    }

    /// Standard normal via Box–Muller, two per pair of uniforms.
    pub fn standard_normal(&mut self) -> f64 {
        if let Some(spare) = self.spare_normal.take() {
            return spare;
        }
        let u1 = self.open_uniform();
        let u2: f64 = self.rng.gen();
        let radius = (-2.0 * u1.ln()).sqrt();
        self.spare_normal = Some(radius * (TAU * u2).sin());
        radius * (TAU * u2).cos()
    }

    /// Uniform in (0, 1].
    fn open_uniform(&mut self) -> f64 {
        1.0 - self.rng.gen::<f64>()
    }

    /// Uniform index below `n`. `n` must be non-zero.
    pub(crate) fn index(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n)
    }

    /// Uniform in [0, 1).
    pub(crate) fn unit(&mut self) -> f64 {
        self.rng.gen()
    }
}
