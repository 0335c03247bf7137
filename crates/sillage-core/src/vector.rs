//! Vector primitives shared by truncation, validation, and search.
//!
//! Matryoshka-trained models put the most important information in the
//! leading coordinates, so prefix truncation plus re-normalisation yields a
//! usable lower-precision embedding.

use crate::errors::EmbeddingError;

/// Dot product over the common prefix of `a` and `b`.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Euclidean (L2) norm.
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scale `v` to unit L2 norm. Zero vectors are returned unchanged.
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let mut out = v.to_vec();
    normalize_in_place(&mut out);
    out
}

/// In-place variant of [`normalize`].
pub fn normalize_in_place(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// First `target_dims` coordinates of `embedding`.
///
/// # Errors
/// Returns `DimensionMismatch` if `target_dims > embedding.len()`.
pub fn truncate(embedding: &[f32], target_dims: usize) -> Result<Vec<f32>, EmbeddingError> {
    if target_dims > embedding.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: target_dims,
            actual: embedding.len(),
        });
    }
    Ok(embedding[..target_dims].to_vec())
}

/// Truncate, then re-normalise to unit length.
pub fn truncate_normalized(
    embedding: &[f32],
    target_dims: usize,
) -> Result<Vec<f32>, EmbeddingError> {
    let mut out = truncate(embedding, target_dims)?;
    normalize_in_place(&mut out);
    Ok(out)
}

/// Cosine similarity over the common prefix, clamped to [-1, 1].
///
/// Returns 0.0 when either side is empty or has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let (a, b) = (&a[..n], &b[..n]);
    let denom = l2_norm(a) * l2_norm(b);
    if denom <= f32::EPSILON {
        return 0.0;
    }
    (dot(a, b) / denom).clamp(-1.0, 1.0)
}

/// Whether `v` has unit norm within `tolerance`.
pub fn is_unit(v: &[f32], tolerance: f32) -> bool {
    (l2_norm(v) - 1.0).abs() <= tolerance
}

/// Whether every coordinate is exactly zero (or the vector is empty).
pub fn is_degenerate(v: &[f32]) -> bool {
    v.iter().all(|x| *x == 0.0)
}
