//! # sillage-bandit
//!
//! Thompson Sampling over recommendation algorithms. Each (context,
//! algorithm) pair carries a Beta posterior; selection draws once per arm
//! and plays the maximum, and feedback folds rewards back in.

pub mod beta;
pub mod contextual;
pub mod feedback;
pub mod regret;
pub mod store;
pub mod strategy;
pub mod thompson;

pub use beta::BetaDistributionSampler;
pub use contextual::{ContextualBanditSelector, ContextualSelection};
pub use feedback::{implicit_reward, reward_from_rating, FeedbackProcessor, PosteriorUpdate};
pub use regret::{RegretBoundsCalculator, RegretReport, RoundOutcome};
pub use store::InMemoryArmStore;
pub use strategy::{MultiArmedBanditStrategy, StrategyDecision};
pub use thompson::{AlgorithmSelection, SelectionReason, ThompsonSamplingSelector};
