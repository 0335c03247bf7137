use sillage_core::config::ObservabilityConfig;
use sillage_observability::tracing_setup;
use sillage_observability::{events, CacheMetrics, SearchMetrics};

#[test]
fn tracing_init_is_idempotent() {
    // The first call may or may not win depending on test ordering;
    // the second must never panic and must report the subscriber as taken.
    let _ = tracing_setup::init_tracing_with_filter("debug");
    assert!(!tracing_setup::init_tracing_with_filter("debug"));
    assert!(!tracing_setup::init_from_config(&ObservabilityConfig::default()));
    assert!(!tracing_setup::init_tracing());
}

#[test]
fn events_emit_without_panicking() {
    events::embedding_generated("voyage-3-large", 2048, 4, 12);
    events::provider_failed("mock", "quota exceeded", true);
    events::cache_evicted(3, 1024, 10);
    events::search_completed(2, 512, 10, 1.5, "high_confidence_results");
    events::search_failed(1, "store_error", "connection refused");
    events::bandit_arm_selected("hybrid", 0.7, false, false);
    events::posterior_updated("hybrid", 0.75, 1.75, 1.25);
    events::degradation_triggered("search", "store down", "single_resolution");
}

#[test]
fn metrics_serialize_to_json() {
    let mut cache = CacheMetrics::new();
    cache.record_lookup(Some(1));
    let json = serde_json::to_value(&cache).unwrap();
    assert_eq!(json["warm_hits"], 1);

    let mut search = SearchMetrics::new();
    search.record_failure();
    let json = serde_json::to_value(&search).unwrap();
    assert_eq!(json["failures"], 1);
}
