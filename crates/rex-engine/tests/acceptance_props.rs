use proptest::prelude::*;
use rex_engine::exchange_acceptance;

proptest! {
    #[test]
    fn acceptance_is_a_probability(
        energy_low in -1.0e6f64..1.0e6,
        energy_high in -1.0e6f64..1.0e6,
        temp_low in 0.01f64..100.0,
        spacing in 0.001f64..10.0,
    ) {
        let temp_high = temp_low + spacing;
        let p = exchange_acceptance(energy_low, temp_low, energy_high, temp_high);
        prop_assert!(p.is_finite());
        prop_assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn favorable_exponent_accepts_exactly(
        energy_high in -1.0e6f64..1.0e6,
        gap in 0.0f64..1.0e5,
        temp_low in 0.01f64..100.0,
        spacing in 0.001f64..10.0,
    ) {
        // The hotter rung holds the lower (or equal) energy, so the exponent
        // is non-positive and the probability must be exactly one, not
        // merely close to it.
        let energy_low = energy_high + gap;
        let temp_high = temp_low + spacing;
        let p = exchange_acceptance(energy_low, temp_low, energy_high, temp_high);
        prop_assert_eq!(p, 1.0);
    }

    #[test]
    fn unfavorable_exponent_never_exceeds_one(
        energy_low in -1.0e6f64..1.0e6,
        gap in 0.001f64..1.0e5,
        temp_low in 0.01f64..100.0,
        spacing in 0.001f64..10.0,
    ) {
        let energy_high = energy_low + gap;
        let temp_high = temp_low + spacing;
        let p = exchange_acceptance(energy_low, temp_low, energy_high, temp_high);
        prop_assert!(p < 1.0 || gap * (1.0 / temp_low - 1.0 / temp_high) < 1e-12);
    }

    #[test]
    fn acceptance_is_symmetric_under_pair_relabeling(
        energy_a in -1.0e3f64..1.0e3,
        energy_b in -1.0e3f64..1.0e3,
        temp_low in 0.1f64..10.0,
        spacing in 0.01f64..5.0,
    ) {
        // Swapping which replica sits where inverts the exponent sign, so
        // at least one direction of every pair always accepts.
        let temp_high = temp_low + spacing;
        let forward = exchange_acceptance(energy_a, temp_low, energy_b, temp_high);
        let backward = exchange_acceptance(energy_b, temp_low, energy_a, temp_high);
        prop_assert!(forward == 1.0 || backward == 1.0);
    }
}
