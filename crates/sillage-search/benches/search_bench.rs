use criterion::{criterion_group, criterion_main, Criterion};
use sillage_core::cancellation::CancellationToken;
use sillage_core::config::DimensionLadder;
use sillage_core::models::{EmbeddingSet, SearchStage};
use sillage_core::traits::VectorStore;
use sillage_search::{
    AdaptiveMatryoshkaSearch, InMemoryVectorStore, ProgressiveMatryoshkaSearch,
    ProgressiveSearchConfig, QueryProfile, SearchPlan,
};
use test_fixtures::document_embedding;

const DOCS: u64 = 5_000;
const FULL_DIMS: usize = 2048;

fn corpus() -> InMemoryVectorStore {
    let store = InMemoryVectorStore::new(DimensionLadder::default());
    for seed in 1..=DOCS {
        store
            .insert(format!("doc-{seed}"), document_embedding(seed, FULL_DIMS), None)
            .unwrap();
    }
    store
}

fn query() -> EmbeddingSet {
    vec![document_embedding(0, FULL_DIMS)].into_iter().collect()
}

/// Thresholds at -1 so every stage sees a full candidate set.
fn open_plan() -> SearchPlan {
    SearchPlan::new(vec![
        SearchStage::new(256, 1000, -1.0),
        SearchStage::new(512, 100, -1.0),
        SearchStage::new(2048, 10, -1.0),
    ])
    .unwrap()
}

fn bench_single_resolution(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = corpus();
    let q = document_embedding(0, FULL_DIMS);
    c.bench_function("single_resolution_2048", |b| {
        b.to_async(&rt)
            .iter(|| store.similarity_search(&q, 2048, 10, -1.0))
    });
}

fn bench_progressive(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let search = ProgressiveMatryoshkaSearch::new(
        corpus(),
        ProgressiveSearchConfig {
            plan: open_plan(),
            enable_early_termination: false,
            ..ProgressiveSearchConfig::default()
        },
    );
    let query = query();
    let cancel = CancellationToken::new();
    c.bench_function("progressive_three_stage", |b| {
        b.to_async(&rt).iter(|| search.search(&query, &cancel))
    });
}

fn bench_adaptive_simple(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let search = ProgressiveMatryoshkaSearch::new(corpus(), ProgressiveSearchConfig::default());
    let adaptive = AdaptiveMatryoshkaSearch::new(Default::default(), open_plan());
    let query = query();
    let cancel = CancellationToken::new();
    let profile = QueryProfile::new(0.1);
    c.bench_function("adaptive_simple_query", |b| {
        b.to_async(&rt)
            .iter(|| adaptive.search(&search, &query, &profile, &cancel))
    });
}

criterion_group!(
    benches,
    bench_single_resolution,
    bench_progressive,
    bench_adaptive_simple
);
criterion_main!(benches);
