//! Error taxonomy for the tracking core.
//!
//! Every fallible entry point returns `Result<_, TrackError>` rather than
//! panicking directly; call sites that hit a fatal variant are the ones that
//! decide to log it and abort (see `TrackError::abort`), matching the
//! "no exceptions for control flow, terminal outcomes carried by the event
//! tag" design.

use thiserror::Error;

/// Fatal, unrecoverable conditions encountered while tracking a particle or
/// building nuclear data. None of these are expected to occur with correctly
/// configured input; each represents either a closed-taxonomy invariant
/// violation or a misconfiguration caught at build time.
#[derive(Debug, Error, PartialEq)]
pub enum TrackError {
  /// The facet search exhausted `MAX_NUDGE_RETRIES` nudge-and-retry attempts
  /// without finding an exiting facet.
  #[error("facet search exhausted retries for particle {particle_id} in cell {cell_id}")]
  FacetSearchExhausted { particle_id: u64, cell_id: u32 },

  /// Reaction selection walked off the end of the isotope/reaction table
  /// without resolving a winner; indicates `sigma_total` disagreed with the
  /// sum of per-reaction cross sections.
  #[error("reaction selection failed to resolve an isotope/reaction for particle {particle_id}")]
  UnresolvedIsotope { particle_id: u64 },

  /// A fission event sampled more descendants than `max_production_size`
  /// allows.
  #[error("fission yield {yield_} exceeds max_production_size {max}")]
  FissionYieldExceeded { yield_: u64, max: u64 },

  /// The segment solver was invoked on a particle whose status was already
  /// terminal (exited/census/cloned).
  #[error("particle {particle_id} re-entered tracking in terminal status {status:?}")]
  TerminalParticleReentered {
    particle_id: u64,
    status: crate::particle::ParticleStatus,
  },

  /// Cross-section normalization requires a group whose upper energy
  /// boundary exceeds 1 MeV; none exists for the configured energy grid.
  #[error("no energy group boundary exceeds 1 MeV; cannot normalize cross sections")]
  NoReferenceGroupAbove1MeV,
}

impl TrackError {
  /// Log the error (when the `tracing` feature is enabled) and abort the
  /// process, matching the "Fatal: abort the process with diagnostic" policy.
  ///
  /// Panics unconditionally; callers use this only at the boundary between
  /// "this is a closed-taxonomy invariant violation" and "nothing downstream
  /// can meaningfully continue."
  #[cold]
  pub fn abort(self) -> ! {
    #[cfg(feature = "tracing")]
    tracing::error!(error = %self, "fatal invariant violation");
    panic!("fatal invariant violation: {self}");
  }
}
