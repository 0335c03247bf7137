//! Feedback → posterior updates.
//!
//! A reward `r ∈ [0, 1]` adds `r` to alpha and `1 − r` to beta. Updates to
//! the same (context, algorithm) arm are serialised so concurrent feedback
//! never loses a contribution.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sillage_core::config::BanditConfig;
use sillage_core::errors::{BanditError, SillageResult};
use sillage_core::models::{ActivityEvent, ActivityType, BanditArm, ContextKey, RealtimeMessage};
use sillage_core::traits::{ArmStore, RealtimePublisher};
use sillage_observability::events;
use tokio::sync::Mutex;
use tracing::warn;

/// Top of the star-rating scale used by activity events.
pub const RATING_SCALE_MAX: f64 = 5.0;

/// Reward implied by an activity, or `None` if it says nothing about the
/// recommendation.
pub fn implicit_reward(activity: &ActivityType) -> Option<f64> {
    match activity {
        ActivityType::Purchase => Some(1.0),
        ActivityType::AddToCollection => Some(0.8),
        ActivityType::SampleRequest => Some(0.6),
        ActivityType::Rating { stars } => reward_from_rating(*stars, RATING_SCALE_MAX).ok(),
        ActivityType::View => Some(0.3),
        ActivityType::Dismiss => Some(0.0),
        ActivityType::Search | ActivityType::RemoveFromCollection => None,
    }
}

/// `rating / max`, clamped to [0, 1].
///
/// # Errors
/// `InvalidReward` when `rating` is not finite or `max` is not positive.
pub fn reward_from_rating(rating: f64, max: f64) -> Result<f64, BanditError> {
    if !rating.is_finite() || !max.is_finite() || max <= 0.0 {
        return Err(BanditError::InvalidReward { reward: rating });
    }
    Ok((rating / max).clamp(0.0, 1.0))
}

/// Before/after view of one posterior change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosteriorUpdate {
    pub algorithm: String,
    pub context_key: Option<ContextKey>,
    pub reward: f64,
    pub alpha_before: f64,
    pub beta_before: f64,
    pub alpha_after: f64,
    pub beta_after: f64,
    pub pulls: u64,
}

impl PosteriorUpdate {
    pub fn expected_reward(&self) -> f64 {
        let total = self.alpha_after + self.beta_after;
        if total <= 0.0 {
            0.5
        } else {
            self.alpha_after / total
        }
    }
}

type ArmKey = (Option<ContextKey>, String);

/// Applies rewards to stored arms.
pub struct FeedbackProcessor<S> {
    store: S,
    store_timeout: Duration,
    locks: DashMap<ArmKey, Arc<Mutex<()>>>,
    publisher: Option<Arc<dyn RealtimePublisher>>,
}

impl<S: ArmStore> FeedbackProcessor<S> {
    pub fn new(store: S, config: &BanditConfig) -> Self {
        Self {
            store,
            store_timeout: Duration::from_millis(config.arm_store_timeout_ms),
            locks: DashMap::new(),
            publisher: None,
        }
    }

    /// Push a `RecommendationUpdate` after every user-attributed update.
    pub fn with_publisher(mut self, publisher: Arc<dyn RealtimePublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fold `reward` into the arm for (`context`, `algorithm`).
    ///
    /// # Errors
    /// `InvalidReward` outside [0, 1]; store failures and timeouts as
    /// `ArmStoreFailed` / `Timeout`.
    pub async fn process(
        &self,
        algorithm: &str,
        context: Option<&ContextKey>,
        reward: f64,
    ) -> SillageResult<PosteriorUpdate> {
        if !reward.is_finite() || !(0.0..=1.0).contains(&reward) {
            return Err(BanditError::InvalidReward { reward }.into());
        }

        let key = (context.cloned(), algorithm.to_string());
        // Clone the lock out so the map shard is not held across the await.
        let lock = Arc::clone(self.locks.entry(key.clone()).or_default().value());
        let result = {
            let _guard = lock.lock().await;
            self.apply(algorithm, context, reward).await
        };
        drop(lock);
        // Only the map's own reference left: no update is queued on this arm.
        self.locks.remove_if(&key, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    /// Arms with an update running or waiting.
    pub fn in_flight_arms(&self) -> usize {
        self.locks.len()
    }

    async fn apply(
        &self,
        algorithm: &str,
        context: Option<&ContextKey>,
        reward: f64,
    ) -> SillageResult<PosteriorUpdate> {
        let stored = self.bounded(self.store.load_arms(context)).await?;
        let mut arm = stored
            .into_iter()
            .find(|arm| arm.algorithm_name == algorithm)
            .unwrap_or_else(|| BanditArm::prior(algorithm, context.cloned()));

        let (alpha_before, beta_before) = (arm.alpha, arm.beta);
        arm.alpha += reward;
        arm.beta += 1.0 - reward;
        arm.pulls += 1;
        arm.updated_at = Utc::now();
        self.bounded(self.store.save_arm(&arm)).await?;

        events::posterior_updated(algorithm, reward, arm.alpha, arm.beta);
        Ok(PosteriorUpdate {
            algorithm: algorithm.to_string(),
            context_key: context.cloned(),
            reward,
            alpha_before,
            beta_before,
            alpha_after: arm.alpha,
            beta_after: arm.beta,
            pulls: arm.pulls,
        })
    }

    /// [`process`](Self::process), then notify `user_id` of the new
    /// expected reward.
    pub async fn process_for_user(
        &self,
        user_id: &str,
        algorithm: &str,
        context: Option<&ContextKey>,
        reward: f64,
    ) -> SillageResult<PosteriorUpdate> {
        let update = self.process(algorithm, context, reward).await?;
        self.notify(user_id, &update);
        Ok(update)
    }

    /// Map an activity to an implicit reward and apply it. Activities that
    /// carry no signal return `Ok(None)`.
    pub async fn process_event(
        &self,
        event: &ActivityEvent,
        algorithm: &str,
        context: Option<&ContextKey>,
    ) -> SillageResult<Option<PosteriorUpdate>> {
        let Some(reward) = implicit_reward(&event.event_type) else {
            return Ok(None);
        };
        self.process_for_user(&event.user_id, algorithm, context, reward)
            .await
            .map(Some)
    }

    fn notify(&self, user_id: &str, update: &PosteriorUpdate) {
        let Some(publisher) = self.publisher.as_ref() else {
            return;
        };
        let message = RealtimeMessage::RecommendationUpdate {
            user_id: user_id.to_string(),
            algorithm: update.algorithm.clone(),
            expected_reward: update.expected_reward(),
        };
        if let Err(e) = publisher.publish(user_id, message) {
            warn!(error = %e, user_id, "failed to publish recommendation update");
        }
    }

    async fn bounded<T>(
        &self,
        call: impl std::future::Future<Output = SillageResult<T>>,
    ) -> SillageResult<T> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(BanditError::Timeout {
                timeout_ms: self.store_timeout.as_millis() as u64,
            }
            .into()),
        }
    }
}
