//! Structured log events for key engine operations.
//!
//! Each function emits a `tracing` event with structured fields.

/// Log a fresh embedding generation.
pub fn embedding_generated(model: &str, source_dims: usize, target_dims: usize, tokens: u32) {
    tracing::info!(
        event = "embedding_generated",
        model = %model,
        source_dims = source_dims,
        target_dims = target_dims,
        tokens = tokens,
        "embedding generated"
    );
}

/// Log an embedding provider failure.
pub fn provider_failed(provider: &str, reason: &str, fallback_configured: bool) {
    tracing::warn!(
        event = "provider_failed",
        provider = %provider,
        reason = %reason,
        fallback_configured = fallback_configured,
        "embedding provider failed"
    );
}

/// Log a cache eviction pass.
pub fn cache_evicted(evicted: usize, bytes_freed: usize, remaining: usize) {
    tracing::info!(
        event = "cache_evicted",
        evicted = evicted,
        bytes_freed = bytes_freed,
        remaining = remaining,
        "cache eviction completed"
    );
}

/// Log a completed (or early-terminated) progressive search.
pub fn search_completed(stages: usize, precision: usize, results: usize, latency_ms: f64, reason: &str) {
    tracing::info!(
        event = "search_completed",
        stages = stages,
        precision = precision,
        results = results,
        latency_ms = latency_ms,
        reason = %reason,
        "progressive search completed"
    );
}

/// Log a failed progressive search.
pub fn search_failed(stages: usize, reason: &str, error: &str) {
    tracing::warn!(
        event = "search_failed",
        stages = stages,
        reason = %reason,
        error = %error,
        "progressive search failed"
    );
}

/// Log a bandit arm selection.
pub fn bandit_arm_selected(algorithm: &str, sampled: f64, exploration: bool, fallback: bool) {
    tracing::debug!(
        event = "bandit_arm_selected",
        algorithm = %algorithm,
        sampled = sampled,
        exploration = exploration,
        fallback = fallback,
        "bandit arm selected"
    );
}

/// Log a posterior update from feedback.
pub fn posterior_updated(algorithm: &str, reward: f64, alpha: f64, beta: f64) {
    tracing::debug!(
        event = "posterior_updated",
        algorithm = %algorithm,
        reward = reward,
        alpha = alpha,
        beta = beta,
        "bandit posterior updated"
    );
}

/// Log a degradation trigger event.
pub fn degradation_triggered(component: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "degradation_triggered",
        component = %component,
        failure = %failure,
        fallback = %fallback,
        "degradation triggered"
    );
}
