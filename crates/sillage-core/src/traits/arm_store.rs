use std::future::Future;
use std::sync::Arc;

use crate::errors::SillageResult;
use crate::models::{BanditArm, ContextKey};

/// Persistence for bandit posteriors.
pub trait ArmStore: Send + Sync {
    /// Arms recorded for `context_key` (`None` = the global partition).
    fn load_arms(
        &self,
        context_key: Option<&ContextKey>,
    ) -> impl Future<Output = SillageResult<Vec<BanditArm>>> + Send;

    /// Insert or replace an arm keyed by (context, algorithm).
    fn save_arm(&self, arm: &BanditArm) -> impl Future<Output = SillageResult<()>> + Send;
}

/// Selectors and feedback processors share one store.
impl<T: ArmStore> ArmStore for Arc<T> {
    fn load_arms(
        &self,
        context_key: Option<&ContextKey>,
    ) -> impl Future<Output = SillageResult<Vec<BanditArm>>> + Send {
        (**self).load_arms(context_key)
    }

    fn save_arm(&self, arm: &BanditArm) -> impl Future<Output = SillageResult<()>> + Send {
        (**self).save_arm(arm)
    }
}
