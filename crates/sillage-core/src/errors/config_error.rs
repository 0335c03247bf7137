/// Configuration errors. Fatal at construction time.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("dimension ladder is empty")]
    EmptyLadder,

    #[error("dimension ladder must be strictly ascending: {previous} is followed by {next}")]
    NonAscendingLadder { previous: usize, next: usize },

    #[error("dimension ladder contains a zero dimension")]
    ZeroDimension,

    #[error("invalid search stages: {reason}")]
    InvalidStages { reason: String },

    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{strategy} requires a fitted projection basis")]
    MissingProjectionBasis { strategy: String },

    #[error("config parse error: {reason}")]
    Parse { reason: String },
}
