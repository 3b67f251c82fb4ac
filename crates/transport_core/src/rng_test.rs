use super::*;

// Pins the LCG formula's own output for seed 12345 (seed <- MULTIPLIER*seed
// + INCREMENT, clear bit 63, scale) rather than any illustrative literal, so
// this test can't silently pass for the wrong reason.
#[test]
fn lcg_sequence_for_seed_12345_matches_formula() {
  let mut rng = Rng::from_seed(12345);
  let a = rng.sample();
  let b = rng.sample();
  let c = rng.sample();
  assert!((a - 0.443_247_483_588_989_85).abs() < 1e-12);
  assert!((b - 0.299_064_253_615_563_5).abs() < 1e-12);
  assert!((c - 0.014_096_010_813_514_224).abs() < 1e-12);
}

#[test]
fn samples_are_always_in_open_unit_interval() {
  let mut rng = Rng::from_seed(0xDEAD_BEEF_CAFE_F00D);
  for _ in 0..10_000 {
    let v = rng.sample();
    assert!(v >= 0.0 && v < 1.0, "sample out of range: {v}");
  }
}

#[test]
fn same_seed_reproduces_same_sequence() {
  let mut a = Rng::from_seed(777);
  let mut b = Rng::from_seed(777);
  for _ in 0..100 {
    assert_eq!(a.sample(), b.sample());
  }
}

#[test]
fn sample_range_respects_bounds() {
  let mut rng = Rng::from_seed(42);
  for _ in 0..1000 {
    let v = rng.sample_range(-1.0, 1.0);
    assert!((-1.0..1.0).contains(&v));
  }
}

#[test]
fn spawn_is_a_pure_function_of_parent_and_salt() {
  let parent = 123_456_789u64;
  let a = Rng::spawn(parent, 0);
  let b = Rng::spawn(parent, 0);
  assert_eq!(a, b, "spawn must be deterministic given the same inputs");

  let c = Rng::spawn(parent, 1);
  assert_ne!(a, c, "different salts must decorrelate siblings");
}

#[test]
fn spawn_is_independent_of_call_order() {
  // Spawning child 3 then child 1 must match spawning child 1 then child 3 -
  // i.e. the result never depends on "what was spawned before", only on
  // (parent_seed, salt).
  let parent = 42u64;
  let order_a = (Rng::spawn(parent, 3), Rng::spawn(parent, 1));
  let order_b = (Rng::spawn(parent, 3), Rng::spawn(parent, 1));
  assert_eq!(order_a, order_b);
}

#[test]
fn spawned_seed_has_bit_63_cleared() {
  let child = Rng::spawn(99, 5);
  assert_eq!(child & (1 << 63), 0);
}
