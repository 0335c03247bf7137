//! In-memory arm persistence on a `DashMap`.

use dashmap::DashMap;
use sillage_core::errors::SillageResult;
use sillage_core::models::{BanditArm, ContextKey};
use sillage_core::traits::ArmStore;

type ArmKey = (Option<ContextKey>, String);

/// Arms keyed by (context, algorithm). Concurrent readers and writers on
/// different keys never block each other.
#[derive(Debug, Default)]
pub struct InMemoryArmStore {
    arms: DashMap<ArmKey, BanditArm>,
}

impl InMemoryArmStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with `arms`.
    pub fn with_arms(arms: impl IntoIterator<Item = BanditArm>) -> Self {
        let store = Self::new();
        for arm in arms {
            store.put(arm);
        }
        store
    }

    pub fn get(&self, context_key: Option<&ContextKey>, algorithm: &str) -> Option<BanditArm> {
        self.arms
            .get(&(context_key.cloned(), algorithm.to_string()))
            .map(|r| r.clone())
    }

    pub fn len(&self) -> usize {
        self.arms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    fn put(&self, arm: BanditArm) {
        self.arms
            .insert((arm.context_key.clone(), arm.algorithm_name.clone()), arm);
    }
}

impl ArmStore for InMemoryArmStore {
    async fn load_arms(&self, context_key: Option<&ContextKey>) -> SillageResult<Vec<BanditArm>> {
        let mut arms: Vec<BanditArm> = self
            .arms
            .iter()
            .filter(|entry| entry.key().0.as_ref() == context_key)
            .map(|entry| entry.value().clone())
            .collect();
        arms.sort_by(|a, b| a.algorithm_name.cmp(&b.algorithm_name));
        Ok(arms)
    }

    async fn save_arm(&self, arm: &BanditArm) -> SillageResult<()> {
        self.put(arm.clone());
        Ok(())
    }
}
