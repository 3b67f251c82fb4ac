use super::*;
use crate::mesh::{BoundaryTag, FakeMesh};
use crate::nuclear_data::{EnergyGrid, Isotope, Reaction, ReactionKind};

fn single_isotope_data() -> NuclearData {
  let grid = EnergyGrid::new(4, 1e-3, 20.0);
  let reaction = Reaction::build(ReactionKind::Absorption, 0.0, [0.0; 5], 2.0, &grid).unwrap();
  NuclearData::new(grid, vec![Isotope { reactions: vec![reaction] }])
}

#[test]
fn refresh_fills_every_cell_and_group() {
  let mesh = FakeMesh::brick(2, 1, 1, BoundaryTag::Escape);
  let data = single_isotope_data();
  let mut cache = XsCache::new(mesh.n_cells(), data.grid.n_groups());
  cache.refresh(&data, &mesh, mesh.n_cells());

  for cell in 0..mesh.n_cells() as CellId {
    for group in 0..data.grid.n_groups() {
      let expected = data.sigma_total_cell(mesh.isotope_ids(cell), mesh.atom_fractions(cell), mesh.number_density(cell), group);
      assert_eq!(cache.total(cell, group), expected);
    }
  }
}

#[test]
fn fresh_cache_is_zeroed_before_first_refresh() {
  let cache = XsCache::new(3, 2);
  for cell in 0..3 {
    for group in 0..2 {
      assert_eq!(cache.total(cell as CellId, group), 0.0);
    }
  }
}
