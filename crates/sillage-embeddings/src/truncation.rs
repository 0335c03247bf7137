//! Matryoshka dimension reduction.
//!
//! A full-precision embedding is reduced to every requested target dimension
//! under one of a closed set of strategies. End truncation keeps the leading
//! coordinates; the projection strategies map onto the first `d` rows of a
//! fitted (PCA) or supplied (learned) basis.

use serde::{Deserialize, Serialize};
use sillage_core::errors::EmbeddingError;
use sillage_core::models::{EmbeddingSet, TruncationStrategy};
use sillage_core::vector;
use tracing::debug;

/// Power-iteration rounds per principal component.
const PCA_MAX_ITERATIONS: usize = 100;
/// Convergence tolerance on successive component estimates.
const PCA_TOLERANCE: f32 = 1e-6;

/// Orthonormal-ish projection rows plus the centring vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionBasis {
    rows: Vec<Vec<f32>>,
    mean: Vec<f32>,
}

impl ProjectionBasis {
    /// Number of available components.
    pub fn components(&self) -> usize {
        self.rows.len()
    }

    /// Length of the vectors this basis projects.
    pub fn source_dims(&self) -> usize {
        self.mean.len()
    }

    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }
}

/// Quality figures for one truncation call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TruncationMetrics {
    /// Mean cosine similarity between the reference and processed vectors.
    pub average_similarity_retention: f32,
    /// Mean `min(n, t) / max(n, t)` of processed norm vs target norm.
    pub norm_preservation_ratio: f32,
    /// Requested dimensions that could not be produced.
    pub skipped_dimensions: Vec<usize>,
}

/// Result of reducing one embedding to several dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruncationOutcome {
    pub success: bool,
    pub embeddings: EmbeddingSet,
    pub metrics: TruncationMetrics,
    pub strategy: TruncationStrategy,
    pub error: Option<String>,
}

/// Per-dimension output of a strategy before normalisation.
struct Reduced {
    vector: Vec<f32>,
    /// Retention reference: the prefix for end truncation, the
    /// source-space reconstruction for projections.
    reference: Vec<f32>,
    /// Norm the processed vector should keep when not renormalised.
    reference_norm: f32,
}

type StrategyFn = fn(&EmbeddingTruncator, &[f32], usize) -> Result<Reduced, EmbeddingError>;

/// Strategy dispatch table.
fn strategy_fn(strategy: TruncationStrategy) -> StrategyFn {
    match strategy {
        TruncationStrategy::EndTruncation => end_truncation,
        TruncationStrategy::PcaTruncation | TruncationStrategy::LearnedTruncation => projection,
    }
}

fn end_truncation(
    _: &EmbeddingTruncator,
    source: &[f32],
    dims: usize,
) -> Result<Reduced, EmbeddingError> {
    let prefix = vector::truncate(source, dims)?;
    let reference_norm = vector::l2_norm(&prefix);
    Ok(Reduced {
        vector: prefix.clone(),
        reference: prefix,
        reference_norm,
    })
}

fn projection(
    truncator: &EmbeddingTruncator,
    source: &[f32],
    dims: usize,
) -> Result<Reduced, EmbeddingError> {
    let basis = truncator
        .basis
        .as_ref()
        .ok_or_else(|| EmbeddingError::InvalidEmbedding {
            reason: format!("{} has no fitted basis", truncator.strategy.as_str()),
        })?;
    if source.len() != basis.source_dims() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: basis.source_dims(),
            actual: source.len(),
        });
    }
    if dims > basis.components() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: dims,
            actual: basis.components(),
        });
    }

    let centred: Vec<f32> = source.iter().zip(&basis.mean).map(|(x, m)| x - m).collect();
    let coords: Vec<f32> = basis.rows[..dims]
        .iter()
        .map(|row| vector::dot(row, &centred))
        .collect();

    // Source-space reconstruction from the kept coordinates.
    let mut reconstruction = basis.mean.clone();
    for (coord, row) in coords.iter().zip(&basis.rows) {
        for (r, w) in reconstruction.iter_mut().zip(row) {
            *r += coord * w;
        }
    }
    Ok(Reduced {
        vector: coords,
        reference: reconstruction,
        reference_norm: vector::l2_norm(&centred),
    })
}

/// Reduces full embeddings to a ladder of target dimensions.
#[derive(Debug, Clone)]
pub struct EmbeddingTruncator {
    strategy: TruncationStrategy,
    basis: Option<ProjectionBasis>,
}

impl EmbeddingTruncator {
    pub fn new(strategy: TruncationStrategy) -> Self {
        Self {
            strategy,
            basis: None,
        }
    }

    pub fn strategy(&self) -> TruncationStrategy {
        self.strategy
    }

    pub fn basis(&self) -> Option<&ProjectionBasis> {
        self.basis.as_ref()
    }

    /// Whether the configured strategy can run.
    pub fn is_ready(&self) -> bool {
        self.strategy == TruncationStrategy::EndTruncation || self.basis.is_some()
    }

    /// Fit a PCA basis from sample embeddings by power iteration with deflation.
    ///
    /// At most `min(components, samples, source dims)` components are kept;
    /// fitting stops early once the residual variance is exhausted.
    pub fn fit_pca(mut self, samples: &[Vec<f32>], components: usize) -> Result<Self, EmbeddingError> {
        let basis = fit_principal_basis(samples, components)?;
        debug!(components = basis.components(), "fitted PCA basis");
        self.strategy = TruncationStrategy::PcaTruncation;
        self.basis = Some(basis);
        Ok(self)
    }

    /// Install an externally learned projection. Rows must share one length.
    pub fn with_learned_basis(mut self, rows: Vec<Vec<f32>>) -> Result<Self, EmbeddingError> {
        let source_dims = rows.first().map(Vec::len).unwrap_or(0);
        if source_dims == 0 {
            return Err(EmbeddingError::InvalidEmbedding {
                reason: "learned basis is empty".to_string(),
            });
        }
        if let Some(bad) = rows.iter().find(|r| r.len() != source_dims) {
            return Err(EmbeddingError::DimensionMismatch {
                expected: source_dims,
                actual: bad.len(),
            });
        }
        self.strategy = TruncationStrategy::LearnedTruncation;
        self.basis = Some(ProjectionBasis {
            rows,
            mean: vec![0.0; source_dims],
        });
        Ok(self)
    }

    /// Reduce `source` to every dimension in `target_dims`.
    ///
    /// Dimensions the strategy cannot produce (larger than the source, or
    /// beyond the fitted basis) are skipped and reported, never errored.
    /// With `preserve_norm` every output is rescaled to unit length.
    pub fn truncate(
        &self,
        source: &[f32],
        target_dims: &[usize],
        preserve_norm: bool,
    ) -> TruncationOutcome {
        if source.is_empty() {
            return self.failed("source embedding is empty".to_string());
        }
        if !self.is_ready() {
            return self.failed(format!("{} has no fitted basis", self.strategy.as_str()));
        }

        let reduce = strategy_fn(self.strategy);
        let mut embeddings = EmbeddingSet::new();
        let mut skipped = Vec::new();
        let mut retention_sum = 0.0f32;
        let mut norm_ratio_sum = 0.0f32;

        for &dims in target_dims {
            if dims == 0 || dims > source.len() {
                skipped.push(dims);
                continue;
            }
            let reduced = match reduce(self, source, dims) {
                Ok(r) => r,
                Err(e) => {
                    debug!(dims, error = %e, "dimension skipped");
                    skipped.push(dims);
                    continue;
                }
            };

            let mut out = reduced.vector;
            if preserve_norm {
                vector::normalize_in_place(&mut out);
            }
            let retention = match self.strategy {
                TruncationStrategy::EndTruncation => vector::cosine_similarity(&reduced.reference, &out),
                _ => vector::cosine_similarity(source, &reduced.reference),
            };
            let target_norm = if preserve_norm { 1.0 } else { reduced.reference_norm };
            retention_sum += retention;
            norm_ratio_sum += norm_ratio(vector::l2_norm(&out), target_norm);
            embeddings.insert(out);
        }

        let produced = embeddings.len();
        let metrics = TruncationMetrics {
            average_similarity_retention: if produced == 0 { 0.0 } else { retention_sum / produced as f32 },
            norm_preservation_ratio: if produced == 0 { 0.0 } else { norm_ratio_sum / produced as f32 },
            skipped_dimensions: skipped,
        };

        TruncationOutcome {
            success: produced > 0 || target_dims.is_empty(),
            error: (produced == 0 && !target_dims.is_empty())
                .then(|| "no requested dimension could be produced".to_string()),
            embeddings,
            metrics,
            strategy: self.strategy,
        }
    }

    fn failed(&self, reason: String) -> TruncationOutcome {
        TruncationOutcome {
            success: false,
            embeddings: EmbeddingSet::new(),
            metrics: TruncationMetrics::default(),
            strategy: self.strategy,
            error: Some(reason),
        }
    }
}

fn norm_ratio(actual: f32, target: f32) -> f32 {
    let (lo, hi) = if actual < target { (actual, target) } else { (target, actual) };
    if hi <= f32::EPSILON {
        1.0
    } else {
        lo / hi
    }
}

/// Principal components of `samples`, strongest first.
fn fit_principal_basis(
    samples: &[Vec<f32>],
    components: usize,
) -> Result<ProjectionBasis, EmbeddingError> {
    let n = samples.first().map(Vec::len).unwrap_or(0);
    if n == 0 {
        return Err(EmbeddingError::InvalidEmbedding {
            reason: "PCA needs at least one non-empty sample".to_string(),
        });
    }
    if let Some(bad) = samples.iter().find(|s| s.len() != n) {
        return Err(EmbeddingError::DimensionMismatch {
            expected: n,
            actual: bad.len(),
        });
    }

    let count = samples.len() as f32;
    let mut mean = vec![0.0f32; n];
    for s in samples {
        for (m, x) in mean.iter_mut().zip(s) {
            *m += x / count;
        }
    }
    let centred: Vec<Vec<f32>> = samples
        .iter()
        .map(|s| s.iter().zip(&mean).map(|(x, m)| x - m).collect())
        .collect();

    let wanted = components.min(samples.len()).min(n);
    let mut rows: Vec<Vec<f32>> = Vec::with_capacity(wanted);

    for k in 0..wanted {
        let mut v: Vec<f32> = (0..n)
            .map(|j| (((j * 31 + k * 17) % 97) as f32 + 1.0) / 97.0)
            .collect();
        orthogonalize(&mut v, &rows);
        if vector::l2_norm(&v) <= f32::EPSILON {
            break;
        }
        vector::normalize_in_place(&mut v);

        let mut converged = false;
        for _ in 0..PCA_MAX_ITERATIONS {
            // C·v without materialising the covariance: Σ x (x·v).
            let mut next = vec![0.0f32; n];
            for x in &centred {
                let proj = vector::dot(x, &v);
                for (acc, xi) in next.iter_mut().zip(x) {
                    *acc += proj * xi;
                }
            }
            orthogonalize(&mut next, &rows);
            if vector::l2_norm(&next) <= f32::EPSILON {
                break;
            }
            vector::normalize_in_place(&mut next);
            let delta: f32 = next.iter().zip(&v).map(|(a, b)| (a - b).abs()).sum();
            v = next;
            if delta < PCA_TOLERANCE {
                converged = true;
                break;
            }
        }

        // Residual variance along v; zero means the sample rank is exhausted.
        let variance: f32 = centred.iter().map(|x| vector::dot(x, &v).powi(2)).sum();
        if variance <= f32::EPSILON {
            break;
        }
        debug!(component = k, converged, variance, "principal component");
        rows.push(v);
    }

    if rows.is_empty() {
        return Err(EmbeddingError::InvalidEmbedding {
            reason: "samples have no variance".to_string(),
        });
    }
    Ok(ProjectionBasis { rows, mean })
}

/// Gram-Schmidt against the already accepted rows.
fn orthogonalize(v: &mut [f32], rows: &[Vec<f32>]) {
    for row in rows {
        let proj = vector::dot(v, row);
        for (x, r) in v.iter_mut().zip(row) {
            *x -= proj * r;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sin_embedding(n: usize) -> Vec<f32> {
        (0..n).map(|i| (i as f32 / 100.0).sin()).collect()
    }

    #[test]
    fn end_truncation_is_prefix_without_normalisation() {
        let source = sin_embedding(64);
        let out = EmbeddingTruncator::new(TruncationStrategy::EndTruncation).truncate(&source, &[16, 32], false);
        assert!(out.success);
        assert_eq!(out.embeddings.get(16).unwrap(), &source[..16]);
        assert_eq!(out.embeddings.get(32).unwrap(), &source[..32]);
        assert!((out.metrics.norm_preservation_ratio - 1.0).abs() < 1e-6);
    }

    #[test]
    fn end_truncation_normalises_when_asked() {
        let source = sin_embedding(64);
        let out = EmbeddingTruncator::new(TruncationStrategy::EndTruncation).truncate(&source, &[16], true);
        let v = out.embeddings.get(16).unwrap();
        assert!((vector::l2_norm(v) - 1.0).abs() < 1e-3);
        assert!(out.metrics.average_similarity_retention > 0.999);
        assert!(out.metrics.norm_preservation_ratio > 0.95);
    }

    #[test]
    fn oversized_dimensions_are_skipped() {
        let source = sin_embedding(32);
        let out = EmbeddingTruncator::new(TruncationStrategy::EndTruncation).truncate(&source, &[16, 64], true);
        assert!(out.success);
        assert_eq!(out.embeddings.dimensions(), vec![16]);
        assert_eq!(out.metrics.skipped_dimensions, vec![64]);
    }

    #[test]
    fn projection_without_basis_fails() {
        let out = EmbeddingTruncator::new(TruncationStrategy::PcaTruncation).truncate(&sin_embedding(8), &[4], true);
        assert!(!out.success);
        assert!(out.error.unwrap().contains("pca_truncation"));
    }

    #[test]
    fn empty_source_fails() {
        let out = EmbeddingTruncator::new(TruncationStrategy::EndTruncation).truncate(&[], &[4], true);
        assert!(!out.success);
    }

    #[test]
    fn learned_identity_basis_matches_prefix() {
        let n = 8;
        let rows: Vec<Vec<f32>> = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect();
        let truncator = EmbeddingTruncator::new(TruncationStrategy::LearnedTruncation)
            .with_learned_basis(rows)
            .unwrap();
        let source: Vec<f32> = (1..=8).map(|i| i as f32).collect();
        let out = truncator.truncate(&source, &[3], false);
        assert_eq!(out.embeddings.get(3).unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn pca_captures_dominant_direction() {
        // Samples vary almost entirely along the first axis.
        let samples: Vec<Vec<f32>> = (0..20)
            .map(|i| {
                let t = i as f32 - 10.0;
                vec![t, 0.01 * t.sin(), 0.0, 0.0]
            })
            .collect();
        let truncator = EmbeddingTruncator::new(TruncationStrategy::EndTruncation)
            .fit_pca(&samples, 2)
            .unwrap();
        assert_eq!(truncator.strategy(), TruncationStrategy::PcaTruncation);
        let first = &truncator.basis().unwrap().rows()[0];
        assert!(first[0].abs() > 0.99, "first component should align with axis 0: {first:?}");

        let out = truncator.truncate(&[5.0, 0.0, 0.0, 0.0], &[1], false);
        assert!(out.success);
        assert!(out.metrics.average_similarity_retention > 0.99);
    }

    #[test]
    fn pca_stops_at_sample_rank() {
        let samples = vec![vec![1.0, 0.0, 0.0, 0.0], vec![-1.0, 0.0, 0.0, 0.0]];
        let truncator = EmbeddingTruncator::new(TruncationStrategy::PcaTruncation)
            .fit_pca(&samples, 4)
            .unwrap();
        assert_eq!(truncator.basis().unwrap().components(), 1);
        let out = truncator.truncate(&[0.5, 0.1, 0.0, 0.0], &[1, 2], true);
        assert_eq!(out.embeddings.dimensions(), vec![1]);
        assert_eq!(out.metrics.skipped_dimensions, vec![2]);
    }
}
