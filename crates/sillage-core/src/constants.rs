/// Bytes per stored embedding scalar (single-precision accounting).
pub const BYTES_PER_SCALAR: usize = 4;

/// Tolerance used when asserting that a vector is unit length.
pub const UNIT_NORM_TOLERANCE: f32 = 1e-3;

/// Lowest precision level.
pub const PRECISION_LOW: usize = 256;
/// Default precision for moderate queries.
pub const PRECISION_DEFAULT: usize = 512;
/// Precision floor for expert users.
pub const PRECISION_EXPERT: usize = 1024;
/// Highest precision level.
pub const PRECISION_MAX: usize = 2048;

/// Termination reasons reported by progressive search.
pub const REASON_HIGH_CONFIDENCE: &str = "high_confidence_results";
pub const REASON_ALL_STAGES: &str = "all_stages_completed";
pub const REASON_STORE_ERROR: &str = "store_error";
pub const REASON_MALFORMED: &str = "malformed_embedding";
pub const REASON_CANCELLED: &str = "cancelled";
pub const REASON_TIMEOUT: &str = "timeout";
