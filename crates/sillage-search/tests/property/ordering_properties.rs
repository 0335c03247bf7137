//! Result ordering holds for arbitrary corpora and queries.

use proptest::prelude::*;
use sillage_core::cancellation::CancellationToken;
use sillage_core::config::DimensionLadder;
use sillage_core::models::{EmbeddingSet, SearchStage};
use sillage_core::traits::VectorStore;
use sillage_search::{InMemoryVectorStore, ProgressiveMatryoshkaSearch, ProgressiveSearchConfig, SearchPlan};
use test_fixtures::document_embedding;

const DIMS: usize = 32;

fn corpus(seeds: &[u64]) -> InMemoryVectorStore {
    let store = InMemoryVectorStore::new(DimensionLadder::new(vec![8, 16, 32]).unwrap());
    for seed in seeds {
        store
            .insert(format!("d{seed}"), document_embedding(*seed, DIMS), None)
            .unwrap();
    }
    store
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn store_results_are_non_increasing(
        seeds in prop::collection::hash_set(1u64..10_000, 1..40),
        query_seed in 10_000u64..20_000,
        dimension in prop::sample::select(vec![8usize, 12, 16, 32]),
    ) {
        let seeds: Vec<u64> = seeds.into_iter().collect();
        let store = corpus(&seeds);
        let query = document_embedding(query_seed, DIMS);
        let results = runtime()
            .block_on(store.similarity_search(&query, dimension, 100, -1.0))
            .unwrap();
        prop_assert_eq!(results.len(), seeds.len());
        prop_assert!(results.windows(2).all(|w| w[0].similarity >= w[1].similarity));
        prop_assert!(results.iter().all(|r| (-1.0..=1.0).contains(&r.similarity)));
    }

    #[test]
    fn progressive_results_are_sorted_and_capped(
        seeds in prop::collection::hash_set(1u64..10_000, 1..60),
        query_seed in 10_000u64..20_000,
        final_count in 1usize..8,
    ) {
        let seeds: Vec<u64> = seeds.into_iter().collect();
        let plan = SearchPlan::new(vec![
            SearchStage::new(8, 30, -1.0),
            SearchStage::new(16, 15, -1.0),
            SearchStage::new(32, final_count, -1.0),
        ])
        .unwrap();
        let search = ProgressiveMatryoshkaSearch::new(
            corpus(&seeds),
            ProgressiveSearchConfig {
                plan,
                enable_early_termination: false,
                ..ProgressiveSearchConfig::default()
            },
        );
        let query: EmbeddingSet = vec![document_embedding(query_seed, DIMS)].into_iter().collect();
        let outcome = runtime().block_on(search.search(&query, &CancellationToken::new()));

        prop_assert!(outcome.success);
        prop_assert_eq!(outcome.stages_executed, 3);
        prop_assert_eq!(outcome.results.len(), final_count.min(seeds.len()));
        prop_assert!(outcome.results.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    }
}
