//! Beta sampling and posterior updates hold for arbitrary parameters.

use proptest::prelude::*;
use sillage_bandit::{BetaDistributionSampler, MultiArmedBanditStrategy, RegretBoundsCalculator};
use sillage_core::errors::BanditError;

proptest! {
    #[test]
    fn samples_lie_strictly_inside_unit_interval(
        seed in any::<u64>(),
        alpha in 1e-3f64..1e4,
        beta in 1e-3f64..1e4,
    ) {
        let mut sampler = BetaDistributionSampler::seeded(seed);
        for _ in 0..16 {
            let x = sampler.sample(alpha, beta).unwrap();
            prop_assert!(x > 0.0 && x < 1.0, "Beta({alpha}, {beta}) drew {x}");
        }
    }

    #[test]
    fn non_positive_parameters_are_rejected(
        seed in any::<u64>(),
        bad in -1e3f64..=0.0,
        good in 1e-3f64..1e3,
    ) {
        let mut sampler = BetaDistributionSampler::seeded(seed);
        let is_invalid = |r: Result<f64, BanditError>| {
            matches!(r, Err(BanditError::InvalidParameters { .. }))
        };
        prop_assert!(is_invalid(sampler.sample(bad, good)));
        prop_assert!(is_invalid(sampler.sample(good, bad)));
    }

    #[test]
    fn exploration_rate_is_monotone_and_floored(
        decay in 0.0f64..=1.0,
        floor in 0.0f64..=1.0,
        t in 0u64..10_000,
    ) {
        let strategy = MultiArmedBanditStrategy::new(decay, floor, Some(0));
        let now = strategy.exploration_rate(t);
        let later = strategy.exploration_rate(t + 1);
        prop_assert!(later <= now + 1e-12);
        prop_assert!(now >= floor && now <= 1.0);
    }

    #[test]
    fn regret_bound_grows_with_rounds(arms in 1usize..50, t in 2u64..100_000) {
        let now = RegretBoundsCalculator::theoretical_bound(arms, t);
        let later = RegretBoundsCalculator::theoretical_bound(arms, t + 1);
        prop_assert!(later > now);
    }
}
