/// Embedding quality validation failures. Surfaced as warnings, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("similarity {similarity:.4} at {dimension} dims is below threshold {threshold:.4}")]
    QualityBelowThreshold {
        dimension: usize,
        similarity: f32,
        threshold: f32,
    },

    #[error("norm difference {difference:.4} at {dimension} dims exceeds tolerance {tolerance:.4}")]
    NormOutOfTolerance {
        dimension: usize,
        difference: f32,
        tolerance: f32,
    },

    #[error("degenerate input at {dimension} dims: {reason}")]
    DegenerateInput { dimension: usize, reason: String },
}
