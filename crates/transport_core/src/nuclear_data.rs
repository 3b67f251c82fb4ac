//! Nuclear-data model: energy-group discretization, per-isotope reaction
//! cross sections, and reaction/collision sampling (§4.4).

use crate::error::TrackError;
use crate::rng::Rng;

/// The closed set of reaction kinds this core understands (§4.4, §9
/// "Polymorphic reactions" — a tagged variant, not a subclass hierarchy).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReactionKind {
  Scatter,
  Absorption,
  Fission,
}

/// Logarithmically spaced energy-group boundaries between `e_low` and
/// `e_high`.
///
/// `n_groups+1` boundaries; per §9's recorded open-question decision the
/// interior spacing divides log-space by `n_groups+1` (not `n_groups`),
/// matching the reference behaviour exactly, unconditionally.
#[derive(Clone, Debug)]
pub struct EnergyGrid {
  boundaries: Vec<f64>,
}

impl EnergyGrid {
  /// Build the grid. `n_groups` must be at least 1.
  pub fn new(n_groups: usize, e_low: f64, e_high: f64) -> Self {
    assert!(n_groups >= 1, "n_groups must be at least 1");
    let ln_low = e_low.ln();
    let ln_high = e_high.ln();
    let step = (ln_high - ln_low) / (n_groups + 1) as f64;

    let mut boundaries = Vec::with_capacity(n_groups + 1);
    boundaries.push(e_low);
    for i in 1..n_groups {
      boundaries.push((ln_low + step * i as f64).exp());
    }
    boundaries.push(e_high);
    Self { boundaries }
  }

  /// Number of energy groups (`boundaries.len() - 1`).
  pub fn n_groups(&self) -> usize {
    self.boundaries.len() - 1
  }

  /// Boundary at index `i` (`0..=n_groups`).
  pub fn boundary(&self, i: usize) -> f64 {
    self.boundaries[i]
  }

  /// Midpoint energy of group `i`.
  pub fn midpoint(&self, i: usize) -> f64 {
    0.5 * (self.boundaries[i] + self.boundaries[i + 1])
  }

  /// `G(E)`: index of the bin containing `energy`, clamped to `[0, n_groups
  /// - 1]` below/above the grid.
  ///
  /// Deliberate deviation from §8 property 8's literal wording (and from the
  /// reference implementation's `getEnergyGroup`, which returns `n_groups` —
  /// one past the last valid group — for `energy > e_high`): every table
  /// this index feeds (the cross-section cache, per-isotope cross-section
  /// vectors) is dimensioned to exactly `n_groups` entries, so returning
  /// `n_groups` here would hand every downstream consumer an out-of-bounds
  /// index instead of a group. Clamping to the last valid group keeps the
  /// invariant "`G(E)` is always a valid group index" intact; see
  /// DESIGN.md's open-question log for the recorded decision.
  ///
  /// Implemented via binary search over the interior boundaries.
  pub fn group_of(&self, energy: f64) -> usize {
    let n = self.n_groups();
    if energy <= self.boundaries[0] {
      return 0;
    }
    if energy >= self.boundaries[n] {
      return n - 1;
    }
    // boundaries[1..n] is the sorted interior; partition_point finds the
    // first boundary strictly greater than `energy`, which is the group's
    // upper edge.
    let idx = self.boundaries[1..n].partition_point(|&b| b <= energy);
    idx
  }

  /// First group index whose *upper* boundary exceeds `threshold`, or `None`
  /// if no such group exists (§9 "trajectory 1 MeV group" open question).
  pub fn first_group_with_upper_above(&self, threshold: f64) -> Option<usize> {
    (0..self.n_groups()).find(|&i| self.boundaries[i + 1] > threshold)
  }
}

/// One reaction channel of one isotope: its kind, mean fission multiplicity
/// (meaningless outside `Fission`), and per-group microscopic cross section.
#[derive(Clone, Debug)]
pub struct Reaction {
  pub kind: ReactionKind,
  pub nu_bar: f64,
  pub cross_section: Vec<f64>,
}

impl Reaction {
  /// Build a reaction's per-group cross-section table from a degree-4
  /// polynomial in `log10(E_mid)`, then renormalize so the group containing
  /// 1 MeV equals `reaction_cross_section` exactly (§4.4 "Building a
  /// reaction").
  pub fn build(
    kind: ReactionKind,
    nu_bar: f64,
    polynomial: [f64; 5],
    reaction_cross_section: f64,
    grid: &EnergyGrid,
  ) -> Result<Self, TrackError> {
    let [a, b, c, d, e] = polynomial;
    let mut cross_section: Vec<f64> = (0..grid.n_groups())
      .map(|i| {
        let x = grid.midpoint(i).log10();
        let p = a + b * x + c * x * x + d * x * x * x + e * x * x * x * x;
        10f64.powf(p)
      })
      .collect();

    let reference_group = grid
      .first_group_with_upper_above(1.0)
      .ok_or(TrackError::NoReferenceGroupAbove1MeV)?;
    let reference = cross_section[reference_group];
    let scale = if reference != 0.0 { reaction_cross_section / reference } else { 0.0 };
    for sigma in &mut cross_section {
      *sigma *= scale;
    }

    Ok(Self { kind, nu_bar, cross_section })
  }
}

/// A single isotope: an ordered list of reaction channels.
#[derive(Clone, Debug)]
pub struct Isotope {
  pub reactions: Vec<Reaction>,
}

impl Isotope {
  /// Total microscopic cross section at `group`: the sum over all reaction
  /// channels.
  pub fn sigma_total(&self, group: usize) -> f64 {
    self.reactions.iter().map(|r| r.cross_section[group]).sum()
  }
}

/// Global, read-only-after-construction nuclear data: the shared energy
/// grid and the ordered list of isotopes (§3 "Material / Isotope / Reaction
/// tree").
#[derive(Clone, Debug)]
pub struct NuclearData {
  pub grid: EnergyGrid,
  pub isotopes: Vec<Isotope>,
}

impl NuclearData {
  pub fn new(grid: EnergyGrid, isotopes: Vec<Isotope>) -> Self {
    Self { grid, isotopes }
  }

  /// Macroscopic cross section for `(reaction, isotope, group)` given the
  /// isotope's atom fraction and the cell's number density (§4.4).
  ///
  /// `reaction = None` requests the isotope's total (all reactions summed).
  /// Zero atom fraction or zero number density short-circuits to `1e-20`
  /// (§8 property 9), never an actual zero.
  pub fn sigma_macro(&self, isotope_idx: usize, reaction: Option<usize>, atom_fraction: f64, number_density: f64, group: usize) -> f64 {
    if atom_fraction == 0.0 || number_density == 0.0 {
      return 1e-20;
    }
    let iso = &self.isotopes[isotope_idx];
    let micro = match reaction {
      Some(r) => iso.reactions[r].cross_section[group],
      None => iso.sigma_total(group),
    };
    atom_fraction * number_density * micro
  }

  /// Sum of `sigma_macro(.., None, ..)` over every `(isotope, atom_fraction)`
  /// pair in a cell — the value the cross-section cache stores per
  /// `(cell, group)` (§4.5).
  pub fn sigma_total_cell(&self, isotope_idxs: &[usize], atom_fractions: &[f64], number_density: f64, group: usize) -> f64 {
    isotope_idxs
      .iter()
      .zip(atom_fractions)
      .map(|(&iso, &frac)| self.sigma_macro(iso, None, frac, number_density, group))
      .sum()
  }

  /// Select the `(isotope_idx, reaction_idx)` a collision reacts with,
  /// given a uniform draw already scaled by the particle's total cross
  /// section (§4.4 "Reaction selection").
  ///
  /// Walks isotopes in order, and within each, reactions in order,
  /// subtracting each macroscopic sigma from `target`; the first
  /// subtraction to drive `target` negative selects the winner.
  pub fn select_reaction(
    &self,
    mut target: f64,
    isotope_idxs: &[usize],
    atom_fractions: &[f64],
    number_density: f64,
    group: usize,
  ) -> Option<(usize, usize)> {
    for (&iso_idx, &atom_fraction) in isotope_idxs.iter().zip(atom_fractions) {
      let iso = &self.isotopes[iso_idx];
      for (react_idx, _) in iso.reactions.iter().enumerate() {
        let sigma = self.sigma_macro(iso_idx, Some(react_idx), atom_fraction, number_density, group);
        target -= sigma;
        if target < 0.0 {
          return Some((iso_idx, react_idx));
        }
      }
    }
    None
  }
}

/// Outcome of sampling a single collision: the reaction kind and, for
/// `Scatter`/`Fission`, the post-collision `(energy, cos_theta)` of each
/// resulting particle (§4.4 "Collision sampling").
#[derive(Clone, Debug)]
pub struct CollisionOutcome {
  pub kind: ReactionKind,
  /// Number of particles that continue after this collision: 0 for
  /// absorption, 1 for scatter, `nu_bar + u` floored (capped) for fission.
  pub n_out: u64,
  /// `(energy_mev, cos_theta)` per surviving particle. Length `n_out` for
  /// `Scatter`/`Fission`; empty for `Absorption`.
  pub children: Vec<(f64, f64)>,
}

/// Sample the outcome of a collision with the given reaction.
///
/// `mass` is the colliding isotope's material mass (used by the scatter
/// energy-loss law); `max_production_size` caps the fission yield, with an
/// exceeded cap reported as a fatal `TrackError::FissionYieldExceeded`
/// rather than silently clamped (§7).
pub fn sample_collision(reaction: &Reaction, energy: f64, mass: f64, max_production_size: u64, rng: &mut Rng) -> Result<CollisionOutcome, TrackError> {
  match reaction.kind {
    ReactionKind::Absorption => Ok(CollisionOutcome {
      kind: ReactionKind::Absorption,
      n_out: 0,
      children: Vec::new(),
    }),
    ReactionKind::Scatter => {
      let u1 = rng.sample();
      let energy_out = energy * (1.0 - u1 / mass);
      let cos_theta = rng.sample_range(-1.0, 1.0);
      Ok(CollisionOutcome {
        kind: ReactionKind::Scatter,
        n_out: 1,
        children: vec![(energy_out, cos_theta)],
      })
    }
    ReactionKind::Fission => {
      let u = rng.sample();
      let n_out = (reaction.nu_bar + u).floor() as u64;
      if n_out > max_production_size {
        return Err(TrackError::FissionYieldExceeded { yield_: n_out, max: max_production_size });
      }
      let mut children = Vec::with_capacity(n_out as usize);
      for _ in 0..n_out {
        let u = rng.sample_range(0.5, 1.0);
        let energy_out = 20.0 * u * u;
        let cos_theta = rng.sample_range(-1.0, 1.0);
        children.push((energy_out, cos_theta));
      }
      Ok(CollisionOutcome {
        kind: ReactionKind::Fission,
        n_out,
        children,
      })
    }
  }
}

#[cfg(test)]
#[path = "nuclear_data_test.rs"]
mod nuclear_data_test;
