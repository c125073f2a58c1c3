use rand::RngCore;
use rex_core::rng::{derive_substream_seed, RngHandle};

#[test]
fn same_seed_yields_identical_sequences() {
    let mut a = RngHandle::from_seed(42);
    let mut b = RngHandle::from_seed(42);
    for _ in 0..64 {
        assert_eq!(a.next_u64(), b.next_u64());
    }
}

#[test]
fn substream_derivation_is_stable_and_distinct() {
    let base = derive_substream_seed(7, 0);
    assert_eq!(base, derive_substream_seed(7, 0));
    assert_ne!(base, derive_substream_seed(7, 1));
    assert_ne!(base, derive_substream_seed(8, 0));
}

#[test]
fn uniform_draws_stay_in_unit_interval() {
    let mut rng = RngHandle::from_seed(0xDEADBEEF);
    for _ in 0..10_000 {
        let u = rng.uniform();
        assert!((0.0..1.0).contains(&u), "draw out of range: {u}");
    }
}

#[test]
fn uniform_draws_are_reproducible() {
    let mut a = RngHandle::from_seed(314159);
    let mut b = RngHandle::from_seed(314159);
    let seq_a: Vec<f64> = (0..32).map(|_| a.uniform()).collect();
    let seq_b: Vec<f64> = (0..32).map(|_| b.uniform()).collect();
    assert_eq!(seq_a, seq_b);
}
