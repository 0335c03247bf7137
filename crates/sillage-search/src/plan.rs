//! Validated stage lists for progressive search.

use serde::{Deserialize, Serialize};
use sillage_core::config::{validate_stages, SearchConfig};
use sillage_core::errors::ConfigError;
use sillage_core::models::SearchStage;

/// Non-empty list of stages, strictly ascending in dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SearchStage>", into = "Vec<SearchStage>")]
pub struct SearchPlan(Vec<SearchStage>);

impl SearchPlan {
    pub fn new(stages: Vec<SearchStage>) -> Result<Self, ConfigError> {
        validate_stages(&stages)?;
        Ok(Self(stages))
    }

    /// One-stage plan.
    pub fn single(stage: SearchStage) -> Result<Self, ConfigError> {
        Self::new(vec![stage])
    }

    pub fn stages(&self) -> &[SearchStage] {
        &self.0
    }

    /// Highest-precision (last) stage.
    pub fn final_stage(&self) -> &SearchStage {
        // Non-empty by construction.
        &self.0[self.0.len() - 1]
    }

    pub fn max_dimension(&self) -> usize {
        self.final_stage().dimension
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stages up to `precision`, ending exactly at `precision`.
    ///
    /// When no stage sits at `precision`, one is appended that borrows the
    /// candidate count and threshold of the next stage above it (or of the
    /// final stage if the plan stops short).
    pub fn capped_at(&self, precision: usize) -> Result<Self, ConfigError> {
        let mut stages: Vec<SearchStage> = self
            .0
            .iter()
            .filter(|s| s.dimension <= precision)
            .copied()
            .collect();
        if stages.last().map(|s| s.dimension) != Some(precision) {
            let template = self
                .0
                .iter()
                .find(|s| s.dimension > precision)
                .unwrap_or_else(|| self.final_stage());
            stages.push(SearchStage::new(
                precision,
                template.candidate_count,
                template.similarity_threshold,
            ));
        }
        Self::new(stages)
    }
}

impl Default for SearchPlan {
    fn default() -> Self {
        Self(SearchConfig::default().stages)
    }
}

impl TryFrom<Vec<SearchStage>> for SearchPlan {
    type Error = ConfigError;

    fn try_from(stages: Vec<SearchStage>) -> Result<Self, Self::Error> {
        Self::new(stages)
    }
}

impl From<SearchPlan> for Vec<SearchStage> {
    fn from(plan: SearchPlan) -> Self {
        plan.0
    }
}
