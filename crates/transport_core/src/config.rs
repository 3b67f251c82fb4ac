//! Minimal driving configuration (§6.5), supplementing the distilled spec.
//!
//! These are plain data holders the tracking driver is generic over; they
//! carry no I/O behavior and no parsing logic — the CLI/input-deck surface
//! that would produce them stays out of scope (§6).

use crate::nuclear_data::ReactionKind;

/// One reaction channel's build inputs, as an input deck would supply them:
/// the polynomial coefficients for its microscopic cross section and the
/// already-split per-reaction target used to normalize it (§4.4 "Building a
/// reaction").
#[derive(Clone, Copy, Debug)]
pub struct ReactionSpec {
  pub kind: ReactionKind,
  pub nu_bar: f64,
  pub polynomial: [f64; 5],
  pub reaction_cross_section: f64,
}

/// A material's isotope/reaction makeup plus the two scalars (`mass`,
/// `source_rate`) the core's reaction-sampling and source-generation
/// collaborators need (§3, §6).
#[derive(Clone, Debug)]
pub struct MaterialSpec {
  pub name: String,
  pub mass: f64,
  pub n_isotopes: usize,
  pub reactions: Vec<ReactionSpec>,
  pub source_rate: f64,
}

/// Per-cycle driving parameters (§6.5).
#[derive(Clone, Copy, Debug)]
pub struct CycleConfig {
  pub dt: f64,
  pub max_production_size: u64,
}

/// Split a material's total cross section and three kind ratios into
/// per-reaction target cross sections, cyclically ordered
/// `[Scatter, Fission, Absorption, Scatter, Fission, Absorption, ...]`
/// (§4.4 "Adding an isotope").
///
/// `n_reactions / 3` channels go to each kind; a remainder of 1 adds one
/// more `Scatter` channel, a remainder of 2 adds one more each of `Scatter`
/// and `Fission`. Each channel's target is
/// `total * ratio_kind / (count_kind * (ratio_scatter + ratio_fission +
/// ratio_absorption))`.
pub fn split_reaction_targets(n_reactions: usize, total: f64, ratio_scatter: f64, ratio_fission: f64, ratio_absorption: f64) -> Vec<(ReactionKind, f64)> {
  let base = n_reactions / 3;
  let remainder = n_reactions % 3;

  let mut count_scatter = base;
  let mut count_fission = base;
  let count_absorption = base;

  if remainder == 1 {
    count_scatter += 1;
  } else if remainder == 2 {
    count_scatter += 1;
    count_fission += 1;
  }

  let total_weight = ratio_scatter + ratio_fission + ratio_absorption;
  let target_for = |kind: ReactionKind| -> f64 {
    let (ratio, count) = match kind {
      ReactionKind::Scatter => (ratio_scatter, count_scatter),
      ReactionKind::Fission => (ratio_fission, count_fission),
      ReactionKind::Absorption => (ratio_absorption, count_absorption),
    };
    if count == 0 {
      0.0
    } else {
      total * ratio / (count as f64 * total_weight)
    }
  };

  let kinds = [ReactionKind::Scatter, ReactionKind::Fission, ReactionKind::Absorption];
  (0..n_reactions).map(|i| (kinds[i % 3], target_for(kinds[i % 3]))).collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
