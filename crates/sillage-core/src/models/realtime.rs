use serde::{Deserialize, Serialize};

/// Kinds of user activity the transport layer forwards to the core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ActivityType {
    View,
    Search,
    Rating { stars: f64 },
    AddToCollection,
    RemoveFromCollection,
    SampleRequest,
    Purchase,
    Dismiss,
}

/// A typed activity record from a user session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub event_type: ActivityType,
    pub user_id: String,
    #[serde(default)]
    pub fragrance_id: Option<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
    pub session_id: String,
}

/// Messages the core pushes to subscribers through a `RealtimePublisher`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum RealtimeMessage {
    RecommendationUpdate {
        user_id: String,
        algorithm: String,
        expected_reward: f64,
    },
    CollectionInsight {
        user_id: String,
        insight: String,
        #[serde(default)]
        payload: serde_json::Value,
    },
    PerformanceAlert {
        metric: String,
        value: f64,
        threshold: f64,
        message: String,
    },
}
