use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Deterministic, order-independent hash of a context attribute mapping.
///
/// Used to partition bandit arms per context. Keys are sorted before hashing;
/// nested JSON objects are already key-sorted by `serde_json::Map`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContextKey(String);

impl ContextKey {
    pub fn from_attributes<'a, I>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a serde_json::Value)>,
    {
        let sorted: BTreeMap<&String, &serde_json::Value> = attributes.into_iter().collect();
        let mut hasher = blake3::Hasher::new();
        for (key, value) in sorted {
            hasher.update(key.as_bytes());
            hasher.update(&[0x1f]);
            hasher.update(value.to_string().as_bytes());
            hasher.update(&[0x1e]);
        }
        Self(hasher.finalize().to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Beta posterior over the success probability of one recommendation algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BanditArm {
    pub algorithm_name: String,
    pub alpha: f64,
    pub beta: f64,
    #[serde(default)]
    pub context_key: Option<ContextKey>,
    /// Number of feedback events folded into the posterior.
    #[serde(default)]
    pub pulls: u64,
    pub updated_at: DateTime<Utc>,
}

impl BanditArm {
    /// Uniform Beta(1, 1) prior.
    pub fn prior(algorithm_name: impl Into<String>, context_key: Option<ContextKey>) -> Self {
        Self::with_params(algorithm_name, 1.0, 1.0, context_key)
    }

    pub fn with_params(
        algorithm_name: impl Into<String>,
        alpha: f64,
        beta: f64,
        context_key: Option<ContextKey>,
    ) -> Self {
        Self {
            algorithm_name: algorithm_name.into(),
            alpha,
            beta,
            context_key,
            pulls: 0,
            updated_at: Utc::now(),
        }
    }

    /// Posterior mean `alpha / (alpha + beta)`.
    pub fn mean(&self) -> f64 {
        let total = self.alpha + self.beta;
        if total <= 0.0 {
            0.5
        } else {
            self.alpha / total
        }
    }
}
