//! Truncation quality checks.
//!
//! Compares a truncated embedding against the full-precision original and
//! runs a permutation test to tell whether the observed similarity beats
//! chance.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use sillage_core::errors::ValidationError;
use sillage_core::vector;

/// Fixed seed so permutation p-values are reproducible.
const DEFAULT_PERMUTATION_SEED: u64 = 0x5111_A6E;

/// Acceptance thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    pub min_similarity: f32,
    pub norm_tolerance: f32,
    pub permutation_rounds: usize,
    pub significance_level: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_similarity: 0.85,
            norm_tolerance: 0.05,
            permutation_rounds: 200,
            significance_level: 0.05,
        }
    }
}

/// Outcome of one comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub target_dimension: usize,
    /// Cosine between the original's prefix and the candidate.
    pub similarity: f32,
    /// `| ||original|| - ||candidate|| |`.
    pub norm_difference: f32,
    pub acceptable: bool,
    pub p_value: f64,
    pub statistically_significant: bool,
}

/// Validates truncated embeddings against their source.
pub struct EmbeddingQualityValidator {
    thresholds: QualityThresholds,
    rng: Mutex<StdRng>,
}

impl EmbeddingQualityValidator {
    pub fn new(thresholds: QualityThresholds) -> Self {
        Self::with_seed(thresholds, DEFAULT_PERMUTATION_SEED)
    }

    pub fn with_seed(thresholds: QualityThresholds, seed: u64) -> Self {
        Self {
            thresholds,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn thresholds(&self) -> &QualityThresholds {
        &self.thresholds
    }

    /// Compare `candidate` with the first `target_dimension` coordinates of
    /// `original`.
    ///
    /// Degenerate inputs (empty or all-zero on either side) are rejected with
    /// similarity 0, norm difference 1 and p-value 1.
    pub fn validate(&self, original: &[f32], candidate: &[f32], target_dimension: usize) -> QualityReport {
        let dims = target_dimension.min(original.len());
        let reference = &original[..dims];

        if dims == 0 || vector::is_degenerate(reference) || vector::is_degenerate(candidate) {
            return QualityReport {
                target_dimension,
                similarity: 0.0,
                norm_difference: 1.0,
                acceptable: false,
                p_value: 1.0,
                statistically_significant: false,
            };
        }

        let similarity = vector::cosine_similarity(reference, candidate);
        let norm_difference = (vector::l2_norm(original) - vector::l2_norm(candidate)).abs();
        let p_value = self.permutation_p_value(reference, candidate, similarity);

        QualityReport {
            target_dimension,
            similarity,
            norm_difference,
            acceptable: similarity > self.thresholds.min_similarity
                && norm_difference < self.thresholds.norm_tolerance,
            p_value,
            statistically_significant: p_value < self.thresholds.significance_level,
        }
    }

    /// Like [`validate`](Self::validate), but maps a rejection to the
    /// violated threshold.
    pub fn ensure_acceptable(
        &self,
        original: &[f32],
        candidate: &[f32],
        target_dimension: usize,
    ) -> Result<QualityReport, ValidationError> {
        let report = self.validate(original, candidate, target_dimension);
        if report.acceptable {
            return Ok(report);
        }
        let prefix = &original[..target_dimension.min(original.len())];
        if prefix.is_empty() || vector::is_degenerate(prefix) || vector::is_degenerate(candidate) {
            return Err(ValidationError::DegenerateInput {
                dimension: target_dimension,
                reason: "empty or zero vector".to_string(),
            });
        }
        if report.similarity <= self.thresholds.min_similarity {
            return Err(ValidationError::QualityBelowThreshold {
                dimension: target_dimension,
                similarity: report.similarity,
                threshold: self.thresholds.min_similarity,
            });
        }
        Err(ValidationError::NormOutOfTolerance {
            dimension: target_dimension,
            difference: report.norm_difference,
            tolerance: self.thresholds.norm_tolerance,
        })
    }

    /// Fraction of shuffled candidates scoring at least as well as the
    /// observed similarity, with the +1 correction so p is never zero.
    fn permutation_p_value(&self, reference: &[f32], candidate: &[f32], observed: f32) -> f64 {
        let rounds = self.thresholds.permutation_rounds;
        if rounds == 0 {
            return 1.0;
        }
        let mut shuffled = candidate.to_vec();
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let mut at_least = 0usize;
        for _ in 0..rounds {
            shuffled.shuffle(&mut *rng);
            if vector::cosine_similarity(reference, &shuffled) >= observed {
                at_least += 1;
            }
        }
        (at_least + 1) as f64 / (rounds + 1) as f64
    }
}

impl Default for EmbeddingQualityValidator {
    fn default() -> Self {
        Self::new(QualityThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_sin(n: usize) -> Vec<f32> {
        vector::normalize(&(0..n).map(|i| (i as f32 / 7.0).sin()).collect::<Vec<_>>())
    }

    #[test]
    fn normalised_prefix_is_acceptable_and_significant() {
        let original = unit_sin(256);
        let candidate = vector::truncate_normalized(&original, 128).unwrap();
        let report = EmbeddingQualityValidator::default().validate(&original, &candidate, 128);
        assert!((report.similarity - 1.0).abs() < 1e-4);
        assert!(report.norm_difference < 1e-3);
        assert!(report.acceptable);
        assert!(report.statistically_significant, "p = {}", report.p_value);
    }

    #[test]
    fn zero_candidate_is_rejected() {
        let original = unit_sin(16);
        let report = EmbeddingQualityValidator::default().validate(&original, &[0.0; 8], 8);
        assert_eq!(report.similarity, 0.0);
        assert_eq!(report.norm_difference, 1.0);
        assert!(!report.acceptable);
        assert_eq!(report.p_value, 1.0);
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let v = EmbeddingQualityValidator::default();
        assert!(!v.validate(&[], &[1.0], 1).acceptable);
        assert!(!v.validate(&[1.0], &[], 1).acceptable);
    }

    #[test]
    fn orthogonal_candidate_fails_similarity() {
        let original = vec![1.0, 0.0, 0.0, 0.0];
        let err = EmbeddingQualityValidator::default()
            .ensure_acceptable(&original, &[0.0, 1.0], 2)
            .unwrap_err();
        assert!(matches!(err, ValidationError::QualityBelowThreshold { dimension: 2, .. }));
    }

    #[test]
    fn unnormalised_prefix_fails_norm_tolerance() {
        let original = vec![0.6, 0.0, 0.8, 0.0];
        let err = EmbeddingQualityValidator::default()
            .ensure_acceptable(&original, &[0.6, 0.0], 2)
            .unwrap_err();
        assert!(matches!(err, ValidationError::NormOutOfTolerance { .. }));
    }

    #[test]
    fn same_seed_gives_same_p_value() {
        let original = unit_sin(64);
        let candidate: Vec<f32> = original[..32].iter().map(|x| x + 0.05).collect();
        let a = EmbeddingQualityValidator::with_seed(QualityThresholds::default(), 7).validate(&original, &candidate, 32);
        let b = EmbeddingQualityValidator::with_seed(QualityThresholds::default(), 7).validate(&original, &candidate, 32);
        assert_eq!(a.p_value, b.p_value);
    }
}
