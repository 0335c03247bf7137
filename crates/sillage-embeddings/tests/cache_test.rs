//! Tiered cache behaviour: eviction ordering, tier movement, warming.

use sillage_core::config::CacheConfig;
use sillage_core::models::EmbeddingSet;
use sillage_embeddings::{GeneratorConfig, MatryoshkaEmbeddingGenerator, MultiTierEmbeddingCache};
use test_fixtures::mocks::{CountingProvider, FailingProvider};

fn set(dims: &[usize]) -> EmbeddingSet {
    dims.iter().map(|d| vec![0.25; *d]).collect()
}

fn small_budget(entries: usize, bytes_each: usize) -> CacheConfig {
    CacheConfig {
        hot_capacity: 4,
        warm_capacity: 4,
        cold_capacity: 100,
        // One entry short of fitting everything.
        max_total_bytes: (entries - 1) * bytes_each,
        auto_evict: false,
        ..CacheConfig::default()
    }
}

#[test]
fn eviction_removes_least_frequent_first() {
    let cache = MultiTierEmbeddingCache::new(small_budget(10, 16 * 4));
    for i in 0..10 {
        let key = format!("q{i}");
        cache.store(&key, set(&[16])).unwrap();
        // q0 is never read, q9 is read nine times.
        for _ in 0..i {
            cache.retrieve(&key, &[16]);
        }
    }

    let report = cache.perform_eviction(false);
    assert_eq!(report.evicted_keys, vec!["q0".to_string(), "q1".to_string()]);
    assert_eq!(report.bytes_freed, 2 * 16 * 4);
    assert!(report.mean_evicted_frequency < report.mean_retained_frequency);
    assert_eq!(report.remaining_entries, 8);
    assert_eq!(cache.len(), 8);
    assert_eq!(cache.stats().metrics.evictions, 2);
}

#[test]
fn eviction_invariant_holds_with_mixed_frequencies() {
    let frequencies = [5u64, 0, 3, 3, 8, 1, 0, 2, 7, 4, 6, 1];
    let cache = MultiTierEmbeddingCache::new(small_budget(frequencies.len(), 8 * 4));
    for (i, freq) in frequencies.iter().enumerate() {
        let key = format!("k{i}");
        cache.store(&key, set(&[8])).unwrap();
        for _ in 0..*freq {
            cache.retrieve(&key, &[8]);
        }
    }

    let report = cache.perform_eviction(false);
    // ceil(0.2 * 12) = 3 entries, the two never-read plus the oldest read-once.
    assert_eq!(report.evicted_keys.len(), 3);
    assert!(report.evicted_keys.contains(&"k1".to_string()));
    assert!(report.evicted_keys.contains(&"k6".to_string()));
    assert!(report.evicted_keys.contains(&"k5".to_string()));
    assert!(report.mean_evicted_frequency < report.mean_retained_frequency);
}

#[test]
fn auto_eviction_runs_on_store_over_budget() {
    let cache = MultiTierEmbeddingCache::new(CacheConfig {
        max_total_bytes: 3 * 8 * 4,
        auto_evict: true,
        ..CacheConfig::default()
    });
    for key in ["a", "b", "c"] {
        assert_eq!(cache.store(key, set(&[8])).unwrap().evicted, 0);
    }
    cache.retrieve("b", &[8]);
    cache.retrieve("c", &[8]);

    let report = cache.store("d", set(&[8])).unwrap();
    assert_eq!(report.evicted, 1);
    assert!(report.retained);
    assert!(!cache.contains("a"), "oldest never-read entry goes first");
    assert!(cache.contains("d"));
    assert!(cache.total_bytes() <= 3 * 8 * 4);
}

#[test]
fn tiers_cascade_and_stats_track_them() {
    let cache = MultiTierEmbeddingCache::new(CacheConfig {
        hot_capacity: 2,
        warm_capacity: 2,
        cold_capacity: 2,
        ..CacheConfig::default()
    });
    for i in 0..6 {
        cache.store(&format!("e{i}"), set(&[4])).unwrap();
    }
    let stats = cache.stats();
    assert_eq!((stats.hot_entries, stats.warm_entries, stats.cold_entries), (2, 2, 2));
    assert_eq!(stats.total_bytes, 6 * 4 * 4);

    cache.retrieve("e0", &[4]);
    cache.retrieve("missing", &[4]);
    let stats = cache.stats();
    assert_eq!(stats.metrics.cold_hits, 1);
    assert_eq!(stats.metrics.misses, 1);
    assert_eq!(stats.hot_entries, 2);
}

// ═══════════════════════════════════════════════════════════════════════════
// Warming
// ═══════════════════════════════════════════════════════════════════════════

fn queries(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn warming_precomputes_every_requested_dimension() {
    let cache = MultiTierEmbeddingCache::new(CacheConfig::default());
    let generator = MatryoshkaEmbeddingGenerator::new(CountingProvider::new(), GeneratorConfig::default()).unwrap();

    let report = cache
        .warm(&generator, &queries(&["rose", "oud", "iris"]), &[256, 512])
        .await;
    assert_eq!(report.queries_warmed, 3);
    assert_eq!(report.embeddings_precomputed, 6);
    assert!(report.failures.is_empty());
    // No lookup history: the warmed keys are the whole cache.
    assert!((report.expected_hit_rate_improvement - 1.0).abs() < 1e-9);

    let hit = cache.retrieve("oud", &[256, 512]);
    assert!(hit.cache_hit);
    assert!(hit.missing_dimensions.is_empty());
}

#[tokio::test]
async fn warming_estimate_uses_recent_misses() {
    let cache = MultiTierEmbeddingCache::new(CacheConfig::default());
    for key in ["rose", "rose", "oud", "amber"] {
        cache.retrieve(key, &[256]);
    }
    let generator = MatryoshkaEmbeddingGenerator::new(CountingProvider::new(), GeneratorConfig::default()).unwrap();

    let report = cache.warm(&generator, &queries(&["rose"]), &[256]).await;
    assert!((report.expected_hit_rate_improvement - 0.5).abs() < 1e-9);
}

#[tokio::test]
async fn warming_records_failed_queries() {
    let cache = MultiTierEmbeddingCache::new(CacheConfig::default());
    let generator = MatryoshkaEmbeddingGenerator::new(FailingProvider::new(), GeneratorConfig::default()).unwrap();

    let report = cache.warm(&generator, &queries(&["rose", "oud"]), &[256]).await;
    assert_eq!(report.queries_warmed, 0);
    assert_eq!(report.failures, queries(&["rose", "oud"]));
    assert_eq!(report.expected_hit_rate_improvement, 0.0);
    assert!(cache.is_empty());
}
