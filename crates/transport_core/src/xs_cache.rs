//! Per-cell, per-energy-group total macroscopic cross-section cache (§4.5).
//!
//! Recomputed at the start of every cycle, in parallel over owned cells;
//! read-only for the remainder of the cycle while workers track particles.

use rayon::prelude::*;

use crate::mesh::MaterialBinding;
use crate::nuclear_data::NuclearData;
use crate::particle::CellId;

/// Dense `|owned cells| x n_groups` table of total macroscopic cross
/// sections.
pub struct XsCache {
  n_groups: usize,
  total: Vec<f64>,
}

impl XsCache {
  /// Allocate a cache sized for `n_cells` cells and `n_groups` energy
  /// groups, zero-filled until the first `refresh`.
  pub fn new(n_cells: usize, n_groups: usize) -> Self {
    Self {
      n_groups,
      total: vec![0.0; n_cells * n_groups],
    }
  }

  #[inline]
  fn index(&self, cell: CellId, group: usize) -> usize {
    cell as usize * self.n_groups + group
  }

  /// Total macroscopic cross section for `(cell, group)`.
  #[inline]
  pub fn total(&self, cell: CellId, group: usize) -> f64 {
    self.total[self.index(cell, group)]
  }

  /// Recompute every `(cell, group)` entry from scratch, in parallel over
  /// cells (§4.5, §10.1).
  pub fn refresh(&mut self, data: &NuclearData, material: &impl (MaterialBinding + Sync), n_cells: usize) {
    let n_groups = self.n_groups;
    self
      .total
      .par_chunks_mut(n_groups)
      .enumerate()
      .take(n_cells)
      .for_each(|(cell_idx, row)| {
        let cell = cell_idx as CellId;
        let isotope_ids = material.isotope_ids(cell);
        let atom_fractions = material.atom_fractions(cell);
        let number_density = material.number_density(cell);
        for (group, slot) in row.iter_mut().enumerate() {
          *slot = data.sigma_total_cell(isotope_ids, atom_fractions, number_density, group);
        }
      });
  }
}

#[cfg(test)]
#[path = "xs_cache_test.rs"]
mod xs_cache_test;
