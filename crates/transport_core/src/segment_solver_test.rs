use super::*;
use glam::DVec3;

use crate::mesh::{BoundaryTag, FakeMesh};
use crate::particle::ParticleStatus;

fn particle_at_center(direction: DVec3, time_to_census: f64) -> Particle {
  Particle {
    id: 1,
    cell: 0,
    position: DVec3::new(0.5, 0.5, 0.5),
    velocity: DVec3::ZERO,
    direction,
    kinetic_energy: 1.0,
    time_to_census,
    age: 0.0,
    weight: 1.0,
    num_segments: 0,
    num_collisions: 0,
    total_cross_section: 0.0,
    mean_free_path: 0.0,
    num_mean_free_paths: 0.0,
    energy_group: 0,
    last_event: EventTag::CellChange,
    last_face: 0,
    last_facet: 0,
    seed: 555,
    status: ParticleStatus::Alive,
  }
}

// S6 — sigma_total == 0 so d_coll is infinite; a particle at the cell center
// is 0.5 from the +x facet, so census only wins if time_to_census is small
// enough that speed * time_to_census < 0.5. At 1 MeV the neutron speed is
// ~13.8 cm/shake, so dt = 0.01 (d_census ~= 0.138) safely beats the facet.
#[test]
fn zero_cross_section_never_collides() {
  let mesh = FakeMesh::single_cell(BoundaryTag::Reflect);
  let cache = XsCache::new(mesh.n_cells(), 1);
  let tallies = Tallies::new(mesh.n_cells(), 1);

  let mut particle = particle_at_center(DVec3::new(1.0, 0.0, 0.0), 0.01);
  let event = run_segment(&mut particle, &mesh, &cache, &tallies).unwrap();
  assert_eq!(event, SegmentEvent::Census);
  assert!(particle.time_to_census >= 0.0);
}

#[test]
fn facet_crossing_reaches_boundary_at_expected_distance() {
  let mesh = FakeMesh::single_cell(BoundaryTag::Escape);
  let cache = XsCache::new(mesh.n_cells(), 1);
  let tallies = Tallies::new(mesh.n_cells(), 1);

  // Plenty of census time so the particle must exit via the +x face at
  // distance 0.5 rather than hitting census first.
  let mut particle = particle_at_center(DVec3::new(1.0, 0.0, 0.0), 1000.0);
  let event = run_segment(&mut particle, &mesh, &cache, &tallies).unwrap();
  match event {
    SegmentEvent::FaceEventUndefined { face, .. } => assert_eq!(face, 0),
    other => panic!("expected a face crossing, got {other:?}"),
  }
  assert!((particle.position.x - 1.0).abs() < 1e-9);
}

#[test]
fn forced_collision_sentinel_always_wins() {
  let mesh = FakeMesh::single_cell(BoundaryTag::Reflect);
  let cache = XsCache::new(mesh.n_cells(), 1);
  let tallies = Tallies::new(mesh.n_cells(), 1);

  let mut particle = particle_at_center(DVec3::new(1.0, 0.0, 0.0), 1000.0);
  particle.num_mean_free_paths = -0.5;
  let event = run_segment(&mut particle, &mesh, &cache, &tallies).unwrap();
  assert_eq!(event, SegmentEvent::Collision);
  assert_eq!(particle.num_mean_free_paths, 0.0);
}

#[test]
fn segment_count_increments_once_per_call() {
  let mesh = FakeMesh::single_cell(BoundaryTag::Reflect);
  let cache = XsCache::new(mesh.n_cells(), 1);
  let tallies = Tallies::new(mesh.n_cells(), 1);
  let mut particle = particle_at_center(DVec3::new(1.0, 0.0, 0.0), 0.05);
  run_segment(&mut particle, &mesh, &cache, &tallies).unwrap();
  assert_eq!(particle.num_segments, 1);
}

#[test]
fn flux_is_tallied_for_a_nonzero_segment() {
  let mesh = FakeMesh::single_cell(BoundaryTag::Reflect);
  let cache = XsCache::new(mesh.n_cells(), 1);
  let tallies = Tallies::new(mesh.n_cells(), 1);
  let mut particle = particle_at_center(DVec3::new(1.0, 0.0, 0.0), 0.05);
  run_segment(&mut particle, &mesh, &cache, &tallies).unwrap();
  assert!(tallies.flux(0, 0) > 0.0);
}
