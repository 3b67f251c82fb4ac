//! Per-cycle atomic event counters and the per-cell, per-group scalar-flux
//! accumulator (§4.7), plus an optional rolling-window timing history.
//!
//! The event counters (`start`, `absorb`, `census`, ...) back the §8
//! testable tally identity and the seed-suite scenarios (S6, S7), so unlike
//! the supplementary metrics below they are not feature-gated — a driver
//! cannot decide termination or verify correctness without them. Only the
//! additional segment-timing rolling window (§10.4) is gated behind
//! `metrics`, kept zero-cost when the feature is off.

use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "metrics")]
use std::collections::VecDeque;
#[cfg(feature = "metrics")]
use std::sync::atomic::AtomicBool;
#[cfg(feature = "metrics")]
use std::sync::Mutex;

use crate::particle::CellId;

/// Runtime toggle for the optional segment-timing rolling window.
#[cfg(feature = "metrics")]
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Bump an `AtomicU64`-backed `f64` accumulator by `delta` via a
/// compare-exchange loop (no atomic-float type in `std`).
#[inline]
fn atomic_add_f64(slot: &AtomicU64, delta: f64) {
  let mut current = slot.load(Ordering::Relaxed);
  loop {
    let new = f64::from_bits(current) + delta;
    match slot.compare_exchange_weak(current, new.to_bits(), Ordering::Relaxed, Ordering::Relaxed) {
      Ok(_) => return,
      Err(observed) => current = observed,
    }
  }
}

/// A durable (non-atomic) snapshot of one cycle's counters, taken at cycle
/// end after the parallel phase has joined (§4.7, §8 property 2).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleSummary {
  pub start: u64,
  pub source: u64,
  pub rr: u64,
  pub split: u64,
  pub absorb: u64,
  pub census: u64,
  pub escape: u64,
  pub collision: u64,
  pub fission: u64,
  pub produce: u64,
  pub scatter: u64,
  pub num_segments: u64,
  pub end: u64,
}

impl CycleSummary {
  /// §8 property 2: `start + source == end + absorb + escape`, with
  /// `produce` accounting for the population change fission introduced.
  pub fn tally_identity_holds(&self) -> bool {
    self.start + self.source + self.produce == self.end + self.absorb + self.escape
  }
}

/// Per-cycle atomic event counters plus the per-cell, per-group scalar-flux
/// accumulator.
pub struct Tallies {
  pub start: AtomicU64,
  pub source: AtomicU64,
  pub rr: AtomicU64,
  pub split: AtomicU64,
  pub absorb: AtomicU64,
  pub census: AtomicU64,
  pub escape: AtomicU64,
  pub collision: AtomicU64,
  pub fission: AtomicU64,
  pub produce: AtomicU64,
  pub scatter: AtomicU64,
  pub num_segments: AtomicU64,
  pub end: AtomicU64,
  flux: Vec<AtomicU64>,
  n_groups: usize,
  #[cfg(feature = "metrics")]
  segment_lengths: Mutex<RollingWindow<f64>>,
}

impl Tallies {
  pub fn new(n_cells: usize, n_groups: usize) -> Self {
    Self {
      start: AtomicU64::new(0),
      source: AtomicU64::new(0),
      rr: AtomicU64::new(0),
      split: AtomicU64::new(0),
      absorb: AtomicU64::new(0),
      census: AtomicU64::new(0),
      escape: AtomicU64::new(0),
      collision: AtomicU64::new(0),
      fission: AtomicU64::new(0),
      produce: AtomicU64::new(0),
      scatter: AtomicU64::new(0),
      num_segments: AtomicU64::new(0),
      end: AtomicU64::new(0),
      flux: (0..n_cells * n_groups).map(|_| AtomicU64::new(0)).collect(),
      n_groups,
      #[cfg(feature = "metrics")]
      segment_lengths: Mutex::new(RollingWindow::new(4096)),
    }
  }

  /// Accumulate `seg_len * weight` into `flux[cell][group]` (§4.2 step 8).
  /// A zero-length segment suppresses tallying entirely.
  pub fn add_flux(&self, cell: CellId, group: usize, seg_len: f64, weight: f64) {
    if seg_len == 0.0 {
      return;
    }
    let idx = cell as usize * self.n_groups + group;
    atomic_add_f64(&self.flux[idx], seg_len * weight);
  }

  pub fn flux(&self, cell: CellId, group: usize) -> f64 {
    let idx = cell as usize * self.n_groups + group;
    f64::from_bits(self.flux[idx].load(Ordering::Relaxed))
  }

  #[cfg(feature = "metrics")]
  pub fn record_segment_length(&self, length: f64) {
    if COLLECT_METRICS.load(Ordering::Relaxed) {
      self.segment_lengths.lock().unwrap().push(length);
    }
  }

  /// Snapshot every atomic counter into a durable `CycleSummary` and zero
  /// them, matching "at cycle end the driver snapshots atomics into durable
  /// variables and zeroes the atomics" (§4.7). Does not touch the flux
  /// accumulator, which persists across cycles for the caller's own tally
  /// output.
  pub fn snapshot_and_reset(&self) -> CycleSummary {
    let take = |a: &AtomicU64| a.swap(0, Ordering::Relaxed);
    CycleSummary {
      start: take(&self.start),
      source: take(&self.source),
      rr: take(&self.rr),
      split: take(&self.split),
      absorb: take(&self.absorb),
      census: take(&self.census),
      escape: take(&self.escape),
      collision: take(&self.collision),
      fission: take(&self.fission),
      produce: take(&self.produce),
      scatter: take(&self.scatter),
      num_segments: take(&self.num_segments),
      end: take(&self.end),
    }
  }
}

/// Rolling window for storing recent values (e.g. segment-length history).
#[cfg(feature = "metrics")]
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
  buffer: VecDeque<T>,
  capacity: usize,
}

#[cfg(feature = "metrics")]
impl<T> RollingWindow<T> {
  pub fn new(capacity: usize) -> Self {
    Self {
      buffer: VecDeque::with_capacity(capacity),
      capacity,
    }
  }

  pub fn push(&mut self, value: T) {
    if self.buffer.len() >= self.capacity {
      self.buffer.pop_front();
    }
    self.buffer.push_back(value);
  }

  pub fn len(&self) -> usize {
    self.buffer.len()
  }

  pub fn is_empty(&self) -> bool {
    self.buffer.is_empty()
  }
}

#[cfg(test)]
#[path = "tallies_test.rs"]
mod tallies_test;
