//! AdaptiveMatryoshkaSearch: choose the precision a query needs before
//! searching, so simple queries never pay for 2048-dim scoring.

use serde::{Deserialize, Serialize};
use sillage_core::cancellation::CancellationToken;
use sillage_core::config::SearchConfig;
use sillage_core::constants::{PRECISION_DEFAULT, PRECISION_EXPERT, PRECISION_LOW, PRECISION_MAX};
use sillage_core::errors::ConfigError;
use sillage_core::models::EmbeddingSet;
use sillage_core::traits::VectorStore;
use tracing::debug;

use crate::plan::SearchPlan;
use crate::progressive::{ProgressiveMatryoshkaSearch, ProgressiveSearchOutcome};

/// Self-declared expertise of the person searching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Beginner,
    Intermediate,
    Expert,
}

/// What the adaptive layer knows about a query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryProfile {
    /// 0.0 (trivial) to 1.0 (highly specific).
    pub complexity_score: f32,
    #[serde(default)]
    pub user_type: Option<UserType>,
}

impl QueryProfile {
    pub fn new(complexity_score: f32) -> Self {
        Self {
            complexity_score,
            user_type: None,
        }
    }

    pub fn with_user_type(mut self, user_type: UserType) -> Self {
        self.user_type = Some(user_type);
        self
    }
}

/// Complexity band edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexityThresholds {
    /// Below this a query is simple.
    pub simple: f32,
    /// Above this a query is complex.
    pub complex: f32,
}

impl Default for ComplexityThresholds {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for ComplexityThresholds {
    fn from(config: &SearchConfig) -> Self {
        Self {
            simple: config.complexity_simple,
            complex: config.complexity_complex,
        }
    }
}

/// Why a precision was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrecisionReason {
    #[serde(rename = "simple_query_low_precision_sufficient")]
    SimpleQuery,
    #[serde(rename = "complex_query_high_precision_required")]
    ComplexQuery,
    #[serde(rename = "moderate_complexity_default_precision")]
    ModerateDefault,
    #[serde(rename = "expert_user_precision_boost")]
    ExpertBoost,
}

impl PrecisionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SimpleQuery => "simple_query_low_precision_sufficient",
            Self::ComplexQuery => "complex_query_high_precision_required",
            Self::ModerateDefault => "moderate_complexity_default_precision",
            Self::ExpertBoost => "expert_user_precision_boost",
        }
    }
}

/// Chosen precision level with its reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecisionDecision {
    pub precision: usize,
    pub reason: PrecisionReason,
}

/// Decision plus the search it drove.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveSearchOutcome {
    pub decision: PrecisionDecision,
    pub outcome: ProgressiveSearchOutcome,
}

/// Maps query profiles to precision levels and precision levels to plans.
#[derive(Debug, Clone, Default)]
pub struct AdaptiveMatryoshkaSearch {
    thresholds: ComplexityThresholds,
    base_plan: SearchPlan,
}

impl AdaptiveMatryoshkaSearch {
    pub fn new(thresholds: ComplexityThresholds, base_plan: SearchPlan) -> Self {
        Self {
            thresholds,
            base_plan,
        }
    }

    pub fn thresholds(&self) -> ComplexityThresholds {
        self.thresholds
    }

    /// Complexity decides first; an expert can only raise a moderate
    /// query's precision, never lower it.
    pub fn select_precision(&self, profile: &QueryProfile) -> PrecisionDecision {
        let score = profile.complexity_score;
        let decision = if score < self.thresholds.simple {
            PrecisionDecision {
                precision: PRECISION_LOW,
                reason: PrecisionReason::SimpleQuery,
            }
        } else if score > self.thresholds.complex {
            PrecisionDecision {
                precision: PRECISION_MAX,
                reason: PrecisionReason::ComplexQuery,
            }
        } else if profile.user_type == Some(UserType::Expert) {
            PrecisionDecision {
                precision: PRECISION_DEFAULT.max(PRECISION_EXPERT),
                reason: PrecisionReason::ExpertBoost,
            }
        } else {
            PrecisionDecision {
                precision: PRECISION_DEFAULT,
                reason: PrecisionReason::ModerateDefault,
            }
        };
        debug!(
            complexity = score,
            user_type = ?profile.user_type,
            precision = decision.precision,
            reason = decision.reason.as_str(),
            "precision selected"
        );
        decision
    }

    /// The base plan cut off at the decided precision.
    pub fn plan_for(&self, decision: &PrecisionDecision) -> Result<SearchPlan, ConfigError> {
        self.base_plan.capped_at(decision.precision)
    }

    /// Select a precision for `profile` and run the matching plan.
    pub async fn search<S: VectorStore>(
        &self,
        engine: &ProgressiveMatryoshkaSearch<S>,
        query: &EmbeddingSet,
        profile: &QueryProfile,
        cancel: &CancellationToken,
    ) -> Result<AdaptiveSearchOutcome, ConfigError> {
        let decision = self.select_precision(profile);
        let plan = self.plan_for(&decision)?;
        let outcome = engine.search_with_plan(&plan, query, cancel).await;
        Ok(AdaptiveSearchOutcome { decision, outcome })
    }
}
