use proptest::prelude::*;
use sillage_core::constants::UNIT_NORM_TOLERANCE;
use sillage_core::models::TruncationStrategy;
use sillage_core::vector::{l2_norm, truncate_normalized};
use sillage_embeddings::EmbeddingTruncator;

fn source(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-1.0f32..1.0, len).prop_filter("leading coordinate carries signal", |v| v[0].abs() > 1e-2)
}

proptest! {
    #[test]
    fn end_truncation_matches_normalized_prefix(v in source(16..128), dims in prop::collection::btree_set(1usize..160, 1..5)) {
        let dims: Vec<usize> = dims.into_iter().collect();
        let out = EmbeddingTruncator::new(TruncationStrategy::EndTruncation).truncate(&v, &dims, true);
        prop_assert!(out.success);
        for d in &dims {
            if *d > v.len() {
                prop_assert!(out.metrics.skipped_dimensions.contains(d));
                prop_assert!(!out.embeddings.contains(*d));
            } else {
                let got = out.embeddings.get(*d).unwrap();
                let expected = truncate_normalized(&v, *d).unwrap();
                prop_assert_eq!(got.len(), *d);
                for (a, b) in got.iter().zip(&expected) {
                    prop_assert!((a - b).abs() < 1e-6);
                }
                prop_assert!((l2_norm(got) - 1.0).abs() <= UNIT_NORM_TOLERANCE);
            }
        }
    }

    #[test]
    fn retention_and_norm_ratio_stay_in_unit_range(v in source(8..64), d in 1usize..8, preserve in any::<bool>()) {
        let out = EmbeddingTruncator::new(TruncationStrategy::EndTruncation).truncate(&v, &[d], preserve);
        prop_assert!((0.0..=1.0 + 1e-6).contains(&out.metrics.average_similarity_retention));
        prop_assert!((0.0..=1.0 + 1e-6).contains(&out.metrics.norm_preservation_ratio));
    }
}
