use super::*;

#[test]
fn flux_accumulates_across_multiple_adds() {
  let tallies = Tallies::new(2, 3);
  tallies.add_flux(0, 1, 0.5, 2.0);
  tallies.add_flux(0, 1, 0.25, 4.0);
  assert!((tallies.flux(0, 1) - 2.0).abs() < 1e-12);
}

#[test]
fn zero_length_segment_does_not_tally() {
  let tallies = Tallies::new(1, 1);
  tallies.add_flux(0, 0, 0.0, 100.0);
  assert_eq!(tallies.flux(0, 0), 0.0);
}

#[test]
fn snapshot_zeroes_counters_but_preserves_flux() {
  let tallies = Tallies::new(1, 1);
  tallies.start.fetch_add(10, Ordering::Relaxed);
  tallies.census.fetch_add(4, Ordering::Relaxed);
  tallies.add_flux(0, 0, 1.0, 1.0);

  let summary = tallies.snapshot_and_reset();
  assert_eq!(summary.start, 10);
  assert_eq!(summary.census, 4);
  assert_eq!(tallies.start.load(Ordering::Relaxed), 0);
  assert_eq!(tallies.census.load(Ordering::Relaxed), 0);
  assert_eq!(tallies.flux(0, 0), 1.0);
}

#[test]
fn tally_identity_holds_for_balanced_cycle() {
  let summary = CycleSummary {
    start: 100,
    source: 0,
    produce: 20,
    end: 90,
    absorb: 20,
    escape: 10,
    ..Default::default()
  };
  assert!(summary.tally_identity_holds());
}

#[test]
fn tally_identity_fails_when_unbalanced() {
  let summary = CycleSummary {
    start: 100,
    end: 50,
    absorb: 10,
    escape: 10,
    ..Default::default()
  };
  assert!(!summary.tally_identity_holds());
}
