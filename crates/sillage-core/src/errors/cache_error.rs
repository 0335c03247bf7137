/// Embedding cache errors. Callers treat every variant as a miss.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("entry {key} needs {bytes} bytes, budget is {budget}")]
    EntryTooLarge {
        key: String,
        bytes: usize,
        budget: usize,
    },

    #[error("unknown cache key: {key}")]
    UnknownKey { key: String },
}
