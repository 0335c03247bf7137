//! Metrics collected in-process and exposed through `stats()` accessors.

mod cache_metrics;
mod search_metrics;

pub use cache_metrics::CacheMetrics;
pub use search_metrics::SearchMetrics;

/// Value at percentile `p` (0.0–1.0) of an unsorted sample set.
pub(crate) fn percentile(samples: &[f64], p: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    let idx = ((p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64).round() as usize).min(sorted.len() - 1);
    sorted[idx]
}
