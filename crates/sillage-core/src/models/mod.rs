mod bandit;
mod degradation_event;
mod embedding;
mod realtime;
mod search;

pub use bandit::{BanditArm, ContextKey};
pub use degradation_event::DegradationEvent;
pub use embedding::{Embedding, EmbeddingSet, TruncationStrategy};
pub use realtime::{ActivityEvent, ActivityType, RealtimeMessage};
pub use search::{SearchResult, SearchStage};
