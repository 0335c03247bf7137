//! Context-partitioned selection: the same Thompson rule, with arms keyed
//! by a hash of the request's context attributes.

use serde::{Deserialize, Serialize};
use sillage_core::models::ContextKey;
use sillage_core::traits::ArmStore;

use crate::thompson::{AlgorithmSelection, ThompsonSamplingSelector};

/// Selection plus the partition it was drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextualSelection {
    pub context_key: ContextKey,
    pub selection: AlgorithmSelection,
}

pub struct ContextualBanditSelector<S> {
    selector: ThompsonSamplingSelector<S>,
}

impl<S: ArmStore> ContextualBanditSelector<S> {
    pub fn new(selector: ThompsonSamplingSelector<S>) -> Self {
        Self { selector }
    }

    pub fn selector(&self) -> &ThompsonSamplingSelector<S> {
        &self.selector
    }

    /// Order-independent partition key for `attributes`.
    pub fn context_key(attributes: &serde_json::Map<String, serde_json::Value>) -> ContextKey {
        ContextKey::from_attributes(attributes)
    }

    pub async fn select(
        &self,
        candidates: &[String],
        attributes: &serde_json::Map<String, serde_json::Value>,
    ) -> ContextualSelection {
        let context_key = Self::context_key(attributes);
        let selection = self.selector.select(candidates, Some(&context_key)).await;
        ContextualSelection {
            context_key,
            selection,
        }
    }
}
