use proptest::prelude::*;
use sillage_core::constants::UNIT_NORM_TOLERANCE;
use sillage_core::vector::{cosine_similarity, l2_norm, truncate, truncate_normalized};

fn non_degenerate(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-1.0f32..1.0, len).prop_filter("needs signal", |v| l2_norm(v) > 1e-3)
}

proptest! {
    #[test]
    fn truncation_is_a_prefix(v in non_degenerate(8..256), frac in 0.05f64..1.0) {
        let d = ((v.len() as f64 * frac).ceil() as usize).clamp(1, v.len());
        let t = truncate(&v, d).unwrap();
        prop_assert_eq!(&t[..], &v[..d]);
    }

    #[test]
    fn normalized_truncation_is_unit(v in non_degenerate(8..256), frac in 0.05f64..1.0) {
        let d = ((v.len() as f64 * frac).ceil() as usize).clamp(1, v.len());
        let prefix = &v[..d];
        prop_assume!(l2_norm(prefix) > 1e-3);
        let t = truncate_normalized(&v, d).unwrap();
        prop_assert!((l2_norm(&t) - 1.0).abs() <= UNIT_NORM_TOLERANCE);
    }

    #[test]
    fn cosine_stays_in_range(a in non_degenerate(1..64), b in non_degenerate(1..64)) {
        let c = cosine_similarity(&a, &b);
        prop_assert!((-1.0..=1.0).contains(&c));
    }

    #[test]
    fn cosine_is_symmetric(a in non_degenerate(4..32), b in non_degenerate(4..32)) {
        prop_assert!((cosine_similarity(&a, &b) - cosine_similarity(&b, &a)).abs() < 1e-5);
    }
}
