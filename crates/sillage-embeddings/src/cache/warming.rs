//! Cache warming from popular queries.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sillage_core::traits::EmbeddingProvider;
use tracing::{info, warn};

use super::MultiTierEmbeddingCache;
use crate::generator::MatryoshkaEmbeddingGenerator;

/// Outcome of [`MultiTierEmbeddingCache::warm`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarmingReport {
    pub queries_warmed: usize,
    /// Embeddings written, counting each requested dimension per query.
    pub embeddings_precomputed: usize,
    /// Queries whose generation failed.
    pub failures: Vec<String>,
    /// Estimated gain in hit rate from the newly warmed keys.
    pub expected_hit_rate_improvement: f64,
}

impl MultiTierEmbeddingCache {
    /// Precompute `dims` for each query through `generator` and store them.
    ///
    /// Queries already cached with every requested dimension are counted as
    /// warmed without touching the entry. The expected improvement is the
    /// share of recent misses the newly warmed keys cover; with no lookup
    /// history it is the newly warmed share of the cache.
    pub async fn warm<P: EmbeddingProvider>(
        &self,
        generator: &MatryoshkaEmbeddingGenerator<P>,
        popular_queries: &[String],
        dims: &[usize],
    ) -> WarmingReport {
        // Snapshot before generating: a generator sharing this cache records
        // its own lookups as misses.
        let misses = self.recent_misses();
        let mut report = WarmingReport::default();
        let mut newly_warmed: HashSet<&str> = HashSet::new();

        for query in popular_queries {
            let was_cached = self.contains(query);
            let result = generator.generate(query).await;
            if !result.success {
                warn!(query = %query, error = ?result.error, "cache warming failed");
                report.failures.push(query.clone());
                continue;
            }

            let subset = result.embeddings.subset(dims);
            let already_complete = self
                .entry(query)
                .is_some_and(|e| dims.iter().all(|d| e.embeddings.contains(*d)));
            if !already_complete {
                if let Err(e) = self.store(query, subset.clone()) {
                    warn!(query = %query, error = %e, "cache warming store failed");
                    report.failures.push(query.clone());
                    continue;
                }
            }

            report.queries_warmed += 1;
            report.embeddings_precomputed += subset.len();
            if !was_cached {
                newly_warmed.insert(query.as_str());
            }
        }

        report.expected_hit_rate_improvement = self.estimate_improvement(&newly_warmed, &misses);
        info!(
            warmed = report.queries_warmed,
            precomputed = report.embeddings_precomputed,
            failures = report.failures.len(),
            improvement = report.expected_hit_rate_improvement,
            "cache warming complete"
        );
        report
    }

    fn estimate_improvement(&self, newly_warmed: &HashSet<&str>, misses: &[String]) -> f64 {
        if newly_warmed.is_empty() {
            return 0.0;
        }
        if !misses.is_empty() {
            let covered = misses
                .iter()
                .filter(|k| newly_warmed.contains(k.as_str()))
                .count();
            return covered as f64 / misses.len() as f64;
        }
        let total = self.len();
        if total == 0 {
            0.0
        } else {
            newly_warmed.len() as f64 / total as f64
        }
    }
}
