/// Bandit subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum BanditError {
    #[error("no arms available for selection")]
    NoArms,

    #[error("invalid beta parameters: alpha={alpha}, beta={beta}")]
    InvalidParameters { alpha: f64, beta: f64 },

    #[error("reward {reward} is outside [0, 1]")]
    InvalidReward { reward: f64 },

    #[error("arm store failed: {reason}")]
    ArmStoreFailed { reason: String },

    #[error("arm store timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}
