use criterion::{criterion_group, criterion_main, Criterion};
use sillage_core::config::CacheConfig;
use sillage_core::models::TruncationStrategy;
use sillage_embeddings::{
    EmbeddingTruncator, GeneratorConfig, HashingEmbeddingProvider, MatryoshkaEmbeddingGenerator,
    MultiTierEmbeddingCache,
};

const LADDER: [usize; 4] = [256, 512, 1024, 2048];

fn full_embedding() -> Vec<f32> {
    (0..2048).map(|i| (i as f32 / 100.0).sin()).collect()
}

fn bench_end_truncation(c: &mut Criterion) {
    let truncator = EmbeddingTruncator::new(TruncationStrategy::EndTruncation);
    let source = full_embedding();
    c.bench_function("end_truncation_ladder_4", |b| {
        b.iter(|| truncator.truncate(&source, &LADDER, true))
    });
}

fn bench_generate_uncached(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let generator = MatryoshkaEmbeddingGenerator::new(
        HashingEmbeddingProvider::new(),
        GeneratorConfig {
            enable_caching: false,
            ..GeneratorConfig::default()
        },
    )
    .unwrap();

    c.bench_function("hashing_generate_uncached", |b| {
        b.to_async(&rt)
            .iter(|| generator.generate("bergamot neroli petitgrain with a musky drydown"))
    });
}

fn bench_generate_cache_hit(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let generator =
        MatryoshkaEmbeddingGenerator::new(HashingEmbeddingProvider::new(), GeneratorConfig::default()).unwrap();
    rt.block_on(generator.generate("cached query text"));

    c.bench_function("generate_cache_hit", |b| {
        b.to_async(&rt).iter(|| generator.generate("cached query text"))
    });
}

fn bench_tier_retrieve(c: &mut Criterion) {
    let cache = MultiTierEmbeddingCache::new(CacheConfig::default());
    let set = LADDER.iter().map(|d| vec![0.1f32; *d]).collect();
    cache.store("hot-key", set).unwrap();

    c.bench_function("tier_cache_retrieve_hot", |b| {
        b.iter(|| cache.retrieve("hot-key", &[256, 512]))
    });
}

criterion_group!(
    benches,
    bench_end_truncation,
    bench_generate_uncached,
    bench_generate_cache_hit,
    bench_tier_retrieve
);
criterion_main!(benches);
