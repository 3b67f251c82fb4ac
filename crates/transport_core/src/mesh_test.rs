use super::*;

#[test]
fn single_cell_has_no_neighbors_in_any_direction() {
  let mesh = FakeMesh::single_cell(BoundaryTag::Reflect);
  for face in 0..6 {
    assert!(mesh.neighbor_across(0, face).is_none());
  }
}

#[test]
fn brick_interior_cell_has_neighbors_on_all_sides() {
  let mesh = FakeMesh::brick(3, 3, 3, BoundaryTag::CellChange);
  let center = mesh.cell_id(1, 1, 1);
  for face in 0..6 {
    assert!(mesh.neighbor_across(center, face).is_some());
  }
}

#[test]
fn brick_corner_cell_has_boundary_on_three_sides() {
  let mesh = FakeMesh::brick(2, 2, 2, BoundaryTag::Escape);
  let corner = mesh.cell_id(0, 0, 0);
  let boundary_faces = (0..6).filter(|&f| mesh.neighbor_across(corner, f).is_none()).count();
  assert_eq!(boundary_faces, 3);
}

#[test]
fn cell_center_matches_unit_cube_centroid() {
  let mesh = FakeMesh::brick(2, 2, 2, BoundaryTag::Reflect);
  let id = mesh.cell_id(1, 0, 1);
  let center = mesh.cell_center(id);
  assert_eq!(center, DVec3::new(1.5, 0.5, 1.5));
}

#[test]
fn null_exchanger_is_a_no_op_for_empty_outbound() {
  let mut exchanger = NullExchanger;
  exchanger.begin_exchange(0);
  let incoming = exchanger.exchange(&[], &[]);
  assert!(incoming.is_empty());
}

#[test]
fn channel_exchanger_delivers_outbound_ids_to_its_paired_peer() {
  let (mut a, mut b) = ChannelExchanger::paired();
  a.begin_exchange(0);
  let incoming_at_a = a.exchange(&[7, 8], &[1, 1]);
  assert!(incoming_at_a.is_empty(), "a's own sends never loop back to a");

  let incoming_at_b = b.exchange(&[], &[]);
  let mut sorted = incoming_at_b;
  sorted.sort_unstable();
  assert_eq!(sorted, vec![7, 8]);
}
