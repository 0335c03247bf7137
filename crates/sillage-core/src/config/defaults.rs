// Single source of truth for all default values.

// --- Embeddings ---
pub const DEFAULT_DIMENSION_LADDER: [usize; 4] = [256, 512, 1024, 2048];
pub const DEFAULT_EMBEDDING_MODEL: &str = "voyage-3-large";
pub const DEFAULT_EMBEDDING_PROVIDER: &str = "http";
pub const DEFAULT_NORMALIZE_EMBEDDINGS: bool = true;
pub const DEFAULT_ENABLE_CACHING: bool = true;
pub const DEFAULT_GENERATOR_CACHE_SIZE: u64 = 10_000;
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_VALIDATE_QUALITY: bool = false;
pub const DEFAULT_MIN_SIMILARITY: f32 = 0.85;
pub const DEFAULT_NORM_TOLERANCE: f32 = 0.05;

// --- Cache tiers ---
pub const DEFAULT_HOT_CAPACITY: usize = 1_000;
pub const DEFAULT_WARM_CAPACITY: usize = 10_000;
pub const DEFAULT_COLD_CAPACITY: usize = 100_000;
pub const DEFAULT_MAX_TOTAL_BYTES: usize = 268_435_456; // 256 MB
pub const DEFAULT_EVICTION_FRACTION: f64 = 0.2;
pub const DEFAULT_AUTO_EVICT: bool = true;
pub const DEFAULT_MISS_LOG_SIZE: usize = 1_024;

// --- Search ---
pub const DEFAULT_ENABLE_EARLY_TERMINATION: bool = true;
pub const DEFAULT_EARLY_TERMINATION_CONFIDENCE: f32 = 0.95;
pub const DEFAULT_CONFIDENCE_TOP_K: usize = 5;
pub const DEFAULT_STAGE_TIMEOUT_MS: u64 = 2_000;
pub const DEFAULT_COMPLEXITY_SIMPLE: f32 = 0.3;
pub const DEFAULT_COMPLEXITY_COMPLEX: f32 = 0.8;

// --- Bandit ---
pub const DEFAULT_ALGORITHMS: [&str; 3] = ["content_based", "collaborative", "hybrid"];
pub const DEFAULT_FALLBACK_ALGORITHM: &str = "hybrid";
pub const DEFAULT_EXPLORATION_DECAY: f64 = 0.995;
pub const DEFAULT_MIN_EXPLORATION_RATE: f64 = 0.05;
pub const DEFAULT_ARM_STORE_TIMEOUT_MS: u64 = 500;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
