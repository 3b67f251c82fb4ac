//! Event handlers (§4.1, C7): collision, facet-crossing (reflection,
//! escape, cell-change, subdomain-change), and census.

use std::f64::consts::PI;
use std::sync::atomic::Ordering;

use glam::DVec3;
use smallvec::SmallVec;

use crate::error::TrackError;
use crate::mesh::{BoundaryConditions, BoundaryTag, MeshView};
use crate::nuclear_data::{sample_collision, NuclearData, ReactionKind};
use crate::particle::{CellId, EventTag, Particle, ParticleStatus};
use crate::rng::Rng;
use crate::segment_solver::SegmentEvent;
use crate::tallies::Tallies;

/// One fission descendant staged for bulk creation by the driver (§4.8).
#[derive(Clone, Copy, Debug)]
pub struct StagedChild {
  pub seed: u64,
  pub global_id: u64,
  pub cell_dst: CellId,
  pub energy_out: f64,
  pub angle_out: f64,
}

/// What the driver should do with a particle after dispatching one segment
/// event (§4.1's dispatch table, restated as a return value instead of a
/// status mutation the caller has to re-derive).
#[derive(Debug)]
pub enum Dispatch {
  /// Still alive; the driver's inner loop should call `run_segment` again.
  ContinueAlive,
  /// Absorbed or escaped; removed from the population.
  Exited,
  /// Reached the end-of-cycle time budget.
  Census,
  /// An `nOut > 1` collision: `children` are staged for bulk creation, and
  /// the source particle itself (status `Cloned`) resumes next
  /// sub-iteration with `self_energy`/`self_angle` applied. Most fission
  /// events yield only a handful of descendants, so this stays inline
  /// rather than heap-allocating for the common case.
  Cloned { children: SmallVec<[StagedChild; 4]>, self_energy: f64, self_angle: f64 },
  /// A `cellChange` that crossed a subdomain boundary; the driver enqueues
  /// this particle for the exchanger and removes it from the local store.
  SubDChange { dest_cell: CellId, dest_rank: u32 },
}

/// Dispatch the outcome of one segment (§4.1). Mutates `particle` in place
/// for every case except `SubDChange`/`Cloned`, where the driver performs
/// the store-level removal/creation after the parallel phase joins.
#[allow(clippy::too_many_arguments)]
pub fn dispatch(
  particle: &mut Particle,
  event: SegmentEvent,
  mesh: &impl MeshView,
  boundary: &impl BoundaryConditions,
  nuclear_data: &NuclearData,
  isotope_ids: &[usize],
  atom_fractions: &[f64],
  number_density: f64,
  mass: f64,
  max_production_size: u64,
  tallies: &Tallies,
) -> Result<Dispatch, TrackError> {
  match event {
    SegmentEvent::Collision => {
      dispatch_collision(particle, nuclear_data, isotope_ids, atom_fractions, number_density, mass, max_production_size, tallies)
    }
    SegmentEvent::FaceEventUndefined { face, .. } => dispatch_face(particle, face, mesh, boundary, tallies),
    SegmentEvent::Census => {
      if particle.time_to_census < 0.0 {
        particle.time_to_census = 0.0;
      }
      particle.status = ParticleStatus::Census;
      tallies.census.fetch_add(1, Ordering::Relaxed);
      Ok(Dispatch::Census)
    }
  }
}

#[allow(clippy::too_many_arguments)]
fn dispatch_collision(
  particle: &mut Particle,
  nuclear_data: &NuclearData,
  isotope_ids: &[usize],
  atom_fractions: &[f64],
  number_density: f64,
  mass: f64,
  max_production_size: u64,
  tallies: &Tallies,
) -> Result<Dispatch, TrackError> {
  tallies.collision.fetch_add(1, Ordering::Relaxed);
  particle.num_collisions += 1;

  let mut rng = Rng::from_seed(particle.seed);
  let u = rng.sample();
  let target = u * particle.total_cross_section;

  let (iso_idx, react_idx) = nuclear_data
    .select_reaction(target, isotope_ids, atom_fractions, number_density, particle.energy_group)
    .ok_or(TrackError::UnresolvedIsotope { particle_id: particle.id })?;
  let reaction = &nuclear_data.isotopes[iso_idx].reactions[react_idx];

  let outcome = sample_collision(reaction, particle.kinetic_energy, mass, max_production_size, &mut rng)?;
  particle.seed = rng.seed();

  if outcome.kind == ReactionKind::Scatter {
    tallies.scatter.fetch_add(1, Ordering::Relaxed);
  } else if outcome.kind == ReactionKind::Fission {
    tallies.fission.fetch_add(1, Ordering::Relaxed);
  }

  // The dispatch table keys off nOut, not reaction kind: Absorption always
  // yields 0, Scatter always yields 1, but Fission can land on any of 0
  // (no descendant survives - treated exactly like an absorption exit), 1
  // (the source particle alone continues), or >1 (fan-out).
  match outcome.n_out {
    0 => {
      tallies.absorb.fetch_add(1, Ordering::Relaxed);
      particle.status = ParticleStatus::Exited;
      Ok(Dispatch::Exited)
    }
    1 => {
      let (energy, angle) = outcome.children[0];
      apply_trajectory_update(particle, nuclear_data, energy, angle);
      Ok(Dispatch::ContinueAlive)
    }
    _ => {
      let (self_energy, self_angle) = outcome.children[0];
      let children: SmallVec<[StagedChild; 4]> = outcome.children[1..]
        .iter()
        .enumerate()
        .map(|(i, &(energy_out, angle_out))| {
          let seed = Rng::spawn(particle.seed, i as u64 + 1);
          StagedChild {
            seed,
            global_id: seed,
            cell_dst: particle.cell,
            energy_out,
            angle_out,
          }
        })
        .collect();
      tallies.produce.fetch_add(children.len() as u64, Ordering::Relaxed);
      particle.status = ParticleStatus::Cloned;
      Ok(Dispatch::Cloned { children, self_energy, self_angle })
    }
  }
}

/// Apply the post-collision trajectory update (§4.4): rotate the direction
/// cosine by the sampled polar/azimuthal angles, set the new kinetic
/// energy and energy group, and draw a fresh mfp-to-collision.
pub fn apply_trajectory_update(particle: &mut Particle, nuclear_data: &NuclearData, energy: f64, cos_theta: f64) {
  let mut rng = Rng::from_seed(particle.seed);
  let phi = 2.0 * PI * rng.sample();
  let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

  particle.direction = rotate_direction(particle.direction, sin_theta, cos_theta, phi.sin(), phi.cos());
  particle.kinetic_energy = energy;
  particle.energy_group = nuclear_data.grid.group_of(energy);

  let u = rng.sample();
  particle.num_mean_free_paths = -u.ln();
  particle.seed = rng.seed();
}

/// Standard Monte Carlo scatter-angle rotation: decompose the current
/// direction into its polar component along its own axis
/// (`cos_theta0`/`sin_theta0`) and azimuth (`cos_phi0`/`sin_phi0`), then
/// compose with the sampled scattering angles to produce the new unit
/// direction.
fn rotate_direction(direction: DVec3, sin_theta: f64, cos_theta: f64, sin_phi: f64, cos_phi: f64) -> DVec3 {
  const THRESHOLD: f64 = 1.0e-6;
  let cos_theta0 = direction.z;
  let sin_theta0 = (1.0 - cos_theta0 * cos_theta0).max(0.0).sqrt();

  let (cos_phi0, sin_phi0) = if sin_theta0 > THRESHOLD {
    (direction.x / sin_theta0, direction.y / sin_theta0)
  } else {
    (1.0, 0.0)
  };

  let z = cos_theta0 * cos_theta - sin_theta0 * sin_theta * cos_phi;
  let x = sin_theta * cos_phi * cos_theta0 * cos_phi0 - sin_theta * sin_phi * sin_phi0 + cos_theta * sin_theta0 * cos_phi0;
  let y = sin_theta * cos_phi * cos_theta0 * sin_phi0 + sin_theta * sin_phi * cos_phi0 + cos_theta * sin_theta0 * sin_phi0;

  DVec3::new(x, y, z).normalize()
}

/// Involution used when a face's boundary condition is `Reflect` (§8
/// property 4): `v' = v - 2*(v . n)*n`.
pub fn reflect(direction: DVec3, normal: DVec3) -> DVec3 {
  direction - 2.0 * direction.dot(normal) * normal
}

fn dispatch_face(particle: &mut Particle, face: usize, mesh: &impl MeshView, boundary: &impl BoundaryConditions, tallies: &Tallies) -> Result<Dispatch, TrackError> {
  match boundary.boundary(particle.cell, face) {
    BoundaryTag::Reflect => {
      let normal = mesh.faces(particle.cell)[face].normal;
      particle.direction = reflect(particle.direction, normal);
      particle.last_event = EventTag::Reflection;
      Ok(Dispatch::ContinueAlive)
    }
    BoundaryTag::Escape => {
      tallies.escape.fetch_add(1, Ordering::Relaxed);
      particle.last_event = EventTag::Escape;
      particle.status = ParticleStatus::Exited;
      Ok(Dispatch::Exited)
    }
    BoundaryTag::CellChange => match mesh.neighbor_across(particle.cell, face) {
      Some((dest_cell, dest_rank)) if dest_rank == mesh.local_rank() => {
        particle.cell = dest_cell;
        particle.last_event = EventTag::CellChange;
        Ok(Dispatch::ContinueAlive)
      }
      Some((dest_cell, dest_rank)) => {
        particle.last_event = EventTag::SubDChange;
        Ok(Dispatch::SubDChange { dest_cell, dest_rank })
      }
      // A `CellChange` tag on a face with no neighbor is a mesh/boundary
      // misconfiguration; fail safe by treating it as an escape rather than
      // inventing a new fatal variant for a condition outside the closed
      // error taxonomy (§7).
      None => {
        tallies.escape.fetch_add(1, Ordering::Relaxed);
        particle.last_event = EventTag::Escape;
        particle.status = ParticleStatus::Exited;
        Ok(Dispatch::Exited)
      }
    },
  }
}

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;
