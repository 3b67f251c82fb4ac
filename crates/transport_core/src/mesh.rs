//! External-collaborator ports (§6): mesh geometry, material binding,
//! boundary conditions, and the particle exchanger.
//!
//! The core never owns geometry, material assignment, or the
//! cross-subdomain transport layer — it consumes them through these
//! read-only-view traits, and a test-only `FakeMesh` brick-grid generator
//! plus `NullExchanger` let the crate's own tests and benches exercise
//! §4.2-§4.8 end to end without an external mesh library or MPI layer.

use crossbeam_channel::{Receiver, Sender};
use glam::DVec3;

use crate::geometry::Face;
use crate::particle::{CellId, ParticleId};

/// Read-only view over owned-cell geometry (§6 "Mesh provider").
pub trait MeshView {
  /// Number of cells this view owns.
  fn n_cells(&self) -> usize;

  /// The 6 faces of `cell`, each carrying its outward unit normal, center,
  /// and 4 corner nodes.
  fn faces(&self, cell: CellId) -> [Face; 6];

  /// Centroid of `cell`, used by the facet-search nudge-recovery path.
  fn cell_center(&self, cell: CellId) -> DVec3;

  /// Index into the material table for `cell`.
  fn material_index(&self, cell: CellId) -> usize;

  /// The cell and owning rank across `face` of `cell`, or `None` if `face`
  /// is a domain boundary.
  fn neighbor_across(&self, cell: CellId, face: usize) -> Option<(CellId, u32)>;

  /// Rank this mesh view's cells belong to.
  fn local_rank(&self) -> u32;
}

/// Read-only view over cell-to-material binding (§6 "Material binding").
pub trait MaterialBinding {
  fn number_density(&self, cell: CellId) -> f64;
  fn mass(&self, cell: CellId) -> f64;
  fn source_rate(&self, cell: CellId) -> f64;
  /// Global isotope ids present in `cell`.
  fn isotope_ids(&self, cell: CellId) -> &[usize];
  /// Atom fraction of each isotope in `cell`, parallel to `isotope_ids`.
  fn atom_fractions(&self, cell: CellId) -> &[f64];
}

/// Boundary-condition tag for a domain-boundary face (§6 "Boundary
/// condition provider").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryTag {
  Reflect,
  Escape,
  CellChange,
}

/// Per-(cell, face) boundary-condition lookup.
pub trait BoundaryConditions {
  fn boundary(&self, cell: CellId, face: usize) -> BoundaryTag;
}

/// Cross-subdomain particle exchange (§6 "Particle exchanger").
///
/// `exchange` hands off the full state of every particle named in
/// `out_local_ids` (via the caller's own migration hook on its particle
/// store) to the ranks in the parallel `out_ranks`, and returns the local
/// ids newly materialized from other ranks' outbound sets.
pub trait ParticleExchanger {
  fn begin_exchange(&mut self, tag: u64);
  fn exchange(&mut self, out_local_ids: &[ParticleId], out_ranks: &[u32]) -> Vec<ParticleId>;
}

/// Single-subdomain exchanger: every `cellChange` stays local, so
/// `subDChange` never occurs and no particle ever needs a real hop.
#[derive(Default, Debug, Clone, Copy)]
pub struct NullExchanger;

impl ParticleExchanger for NullExchanger {
  fn begin_exchange(&mut self, _tag: u64) {}

  fn exchange(&mut self, out_local_ids: &[ParticleId], _out_ranks: &[u32]) -> Vec<ParticleId> {
    debug_assert!(out_local_ids.is_empty(), "NullExchanger should never see a real subdomain change");
    Vec::new()
  }
}

/// A two-subdomain exchanger built on a pair of `crossbeam_channel` links,
/// one per direction. `begin_exchange` is a no-op: the channels
/// themselves carry the tag implicitly since each cycle sends exactly once
/// per outbound particle before the matching `exchange` call drains them.
pub struct ChannelExchanger {
  outbound: Sender<ParticleId>,
  inbound: Receiver<ParticleId>,
}

impl ChannelExchanger {
  pub fn new(outbound: Sender<ParticleId>, inbound: Receiver<ParticleId>) -> Self {
    Self { outbound, inbound }
  }

  /// Build a connected pair, `(a, b)`, where `a`'s outbound feeds `b`'s
  /// inbound and vice versa — the minimal two-rank loopback a test can
  /// exercise without a real distributed transport.
  pub fn paired() -> (Self, Self) {
    let (tx_a, rx_a) = crossbeam_channel::unbounded();
    let (tx_b, rx_b) = crossbeam_channel::unbounded();
    (Self::new(tx_a, rx_b), Self::new(tx_b, rx_a))
  }
}

impl ParticleExchanger for ChannelExchanger {
  fn begin_exchange(&mut self, _tag: u64) {}

  fn exchange(&mut self, out_local_ids: &[ParticleId], _out_ranks: &[u32]) -> Vec<ParticleId> {
    for &id in out_local_ids {
      // An unbounded channel never blocks; a full mailbox would indicate
      // the peer rank has stopped draining, which this single-process
      // loopback never does.
      let _ = self.outbound.send(id);
    }
    self.inbound.try_iter().collect()
  }
}

/// A brick-shaped grid of unit cubes, `nx * ny * nz` cells, each a unit cube
/// at integer offsets — the minimal geometry+material+boundary test double
/// needed to drive the core's own tests and the `segment_solver` benchmark.
pub struct FakeMesh {
  nx: usize,
  ny: usize,
  nz: usize,
  boundary: BoundaryTag,
  number_density: f64,
  mass: f64,
  source_rate: f64,
  isotope_ids: Vec<usize>,
  atom_fractions: Vec<f64>,
}

impl FakeMesh {
  /// A single-cell unit cube, the geometry used by S5-S7.
  pub fn single_cell(boundary: BoundaryTag) -> Self {
    Self::brick(1, 1, 1, boundary)
  }

  /// An `nx * ny * nz` brick of unit cubes sharing one material, with the
  /// given boundary condition applied uniformly at every domain edge.
  pub fn brick(nx: usize, ny: usize, nz: usize, boundary: BoundaryTag) -> Self {
    Self {
      nx,
      ny,
      nz,
      boundary,
      number_density: 1.0,
      mass: 1.0,
      source_rate: 0.0,
      isotope_ids: vec![0],
      atom_fractions: vec![1.0],
    }
  }

  fn coords(&self, cell: CellId) -> (usize, usize, usize) {
    let idx = cell as usize;
    let x = idx % self.nx;
    let y = (idx / self.nx) % self.ny;
    let z = idx / (self.nx * self.ny);
    (x, y, z)
  }

  fn cell_id(&self, x: usize, y: usize, z: usize) -> CellId {
    (x + y * self.nx + z * self.nx * self.ny) as CellId
  }
}

impl MeshView for FakeMesh {
  fn n_cells(&self) -> usize {
    self.nx * self.ny * self.nz
  }

  fn faces(&self, cell: CellId) -> [Face; 6] {
    let (x, y, z) = self.coords(cell);
    let (x, y, z) = (x as f64, y as f64, z as f64);
    let lo = DVec3::new(x, y, z);
    [
      // +x
      Face {
        normal: DVec3::new(1.0, 0.0, 0.0),
        center: lo + DVec3::new(1.0, 0.5, 0.5),
        nodes: [
          lo + DVec3::new(1.0, 0.0, 0.0),
          lo + DVec3::new(1.0, 1.0, 0.0),
          lo + DVec3::new(1.0, 1.0, 1.0),
          lo + DVec3::new(1.0, 0.0, 1.0),
        ],
      },
      // -x
      Face {
        normal: DVec3::new(-1.0, 0.0, 0.0),
        center: lo + DVec3::new(0.0, 0.5, 0.5),
        nodes: [
          lo + DVec3::new(0.0, 1.0, 0.0),
          lo + DVec3::new(0.0, 0.0, 0.0),
          lo + DVec3::new(0.0, 0.0, 1.0),
          lo + DVec3::new(0.0, 1.0, 1.0),
        ],
      },
      // +y
      Face {
        normal: DVec3::new(0.0, 1.0, 0.0),
        center: lo + DVec3::new(0.5, 1.0, 0.5),
        nodes: [
          lo + DVec3::new(0.0, 1.0, 0.0),
          lo + DVec3::new(1.0, 1.0, 0.0),
          lo + DVec3::new(1.0, 1.0, 1.0),
          lo + DVec3::new(0.0, 1.0, 1.0),
        ],
      },
      // -y
      Face {
        normal: DVec3::new(0.0, -1.0, 0.0),
        center: lo + DVec3::new(0.5, 0.0, 0.5),
        nodes: [
          lo + DVec3::new(0.0, 0.0, 0.0),
          lo + DVec3::new(1.0, 0.0, 0.0),
          lo + DVec3::new(1.0, 0.0, 1.0),
          lo + DVec3::new(0.0, 0.0, 1.0),
        ],
      },
      // +z
      Face {
        normal: DVec3::new(0.0, 0.0, 1.0),
        center: lo + DVec3::new(0.5, 0.5, 1.0),
        nodes: [
          lo + DVec3::new(0.0, 0.0, 1.0),
          lo + DVec3::new(1.0, 0.0, 1.0),
          lo + DVec3::new(1.0, 1.0, 1.0),
          lo + DVec3::new(0.0, 1.0, 1.0),
        ],
      },
      // -z
      Face {
        normal: DVec3::new(0.0, 0.0, -1.0),
        center: lo + DVec3::new(0.5, 0.5, 0.0),
        nodes: [
          lo + DVec3::new(0.0, 1.0, 0.0),
          lo + DVec3::new(1.0, 1.0, 0.0),
          lo + DVec3::new(1.0, 0.0, 0.0),
          lo + DVec3::new(0.0, 0.0, 0.0),
        ],
      },
    ]
  }

  fn cell_center(&self, cell: CellId) -> DVec3 {
    let (x, y, z) = self.coords(cell);
    DVec3::new(x as f64 + 0.5, y as f64 + 0.5, z as f64 + 0.5)
  }

  fn material_index(&self, _cell: CellId) -> usize {
    0
  }

  fn neighbor_across(&self, cell: CellId, face: usize) -> Option<(CellId, u32)> {
    let (x, y, z) = self.coords(cell);
    let (dx, dy, dz): (isize, isize, isize) = match face {
      0 => (1, 0, 0),
      1 => (-1, 0, 0),
      2 => (0, 1, 0),
      3 => (0, -1, 0),
      4 => (0, 0, 1),
      _ => (0, 0, -1),
    };
    let nx = x as isize + dx;
    let ny = y as isize + dy;
    let nz = z as isize + dz;
    if nx < 0 || ny < 0 || nz < 0 || nx as usize >= self.nx || ny as usize >= self.ny || nz as usize >= self.nz {
      None
    } else {
      Some((self.cell_id(nx as usize, ny as usize, nz as usize), self.local_rank()))
    }
  }

  fn local_rank(&self) -> u32 {
    0
  }
}

impl MaterialBinding for FakeMesh {
  fn number_density(&self, _cell: CellId) -> f64 {
    self.number_density
  }

  fn mass(&self, _cell: CellId) -> f64 {
    self.mass
  }

  fn source_rate(&self, _cell: CellId) -> f64 {
    self.source_rate
  }

  fn isotope_ids(&self, _cell: CellId) -> &[usize] {
    &self.isotope_ids
  }

  fn atom_fractions(&self, _cell: CellId) -> &[f64] {
    &self.atom_fractions
  }
}

impl BoundaryConditions for FakeMesh {
  fn boundary(&self, _cell: CellId, _face: usize) -> BoundaryTag {
    self.boundary
  }
}

#[cfg(test)]
#[path = "mesh_test.rs"]
mod mesh_test;
