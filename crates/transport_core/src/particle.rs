//! Particle state: kinematics, bookkeeping, and the lifecycle status machine.

use glam::DVec3;

use crate::constants::{DIRECTION_NORM_TOLERANCE, FORCED_COLLISION_NMFP, NEUTRON_REST_MASS_ENERGY, SPEED_OF_LIGHT};

/// Stable identifier for a particle, also reused as the "future global id"
/// handed to its first fission descendant (§4.8).
pub type ParticleId = u64;

/// Identifier of the cell a particle currently resides in.
pub type CellId = u32;

/// Lifecycle status of a particle (§4.1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParticleStatus {
  /// Still being tracked; eligible for another segment.
  Alive,
  /// Underwent an `nOut > 1` collision; descendants were staged and this
  /// particle will resume with its own post-collision trajectory next
  /// sub-iteration.
  Cloned,
  /// Removed from the population (absorbed or escaped).
  Exited,
  /// Reached the end of the cycle's time budget.
  Census,
}

/// Tag recording which kind of segment-ending event last fired for a
/// particle (§3, §4.1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventTag {
  Collision,
  FaceEventUndefined,
  Census,
  CellChange,
  Escape,
  Reflection,
  SubDChange,
}

/// Compute neutron speed from kinetic energy (MeV) via the relativistic
/// closed form in §4.4:
/// `v = c * sqrt(1 - (m_n*c^2 / (E + m_n*c^2))^2)`.
#[inline]
pub fn speed_from_energy(kinetic_energy_mev: f64) -> f64 {
  let rest_over_total = NEUTRON_REST_MASS_ENERGY / (kinetic_energy_mev + NEUTRON_REST_MASS_ENERGY);
  SPEED_OF_LIGHT * (1.0 - rest_over_total * rest_over_total).sqrt()
}

/// A single tracked neutron.
#[derive(Clone, Debug)]
pub struct Particle {
  // Identity
  pub id: ParticleId,
  pub cell: CellId,

  // Kinematics
  pub position: DVec3,
  pub velocity: DVec3,
  /// Direction cosines (alpha, beta, gamma); unit norm.
  pub direction: DVec3,
  pub kinetic_energy: f64,

  // Bookkeeping
  pub time_to_census: f64,
  pub age: f64,
  pub weight: f64,
  pub num_segments: u64,
  pub num_collisions: u64,

  // Transport
  pub total_cross_section: f64,
  pub mean_free_path: f64,
  pub num_mean_free_paths: f64,
  pub energy_group: usize,

  // Event
  pub last_event: EventTag,
  pub last_face: usize,
  pub last_facet: usize,

  // RNG
  pub seed: u64,

  pub status: ParticleStatus,
}

impl Particle {
  /// Current speed, derived from kinetic energy.
  #[inline]
  pub fn speed(&self) -> f64 {
    speed_from_energy(self.kinetic_energy)
  }

  /// True if `num_mean_free_paths` currently holds the forced-collision
  /// sentinel rather than a sampled residual.
  #[inline]
  pub fn is_forced_collision(&self) -> bool {
    self.num_mean_free_paths == FORCED_COLLISION_NMFP
  }

  /// Check the universal per-step invariants from §8 property 1.
  ///
  /// Returns `Err` with a human-readable description of the first violation
  /// found; callers at a fatal boundary convert this into a `TrackError`.
  pub fn check_invariants(&self, dt_cycle: f64) -> Result<(), String> {
    if self.status == ParticleStatus::Alive {
      if !(0.0..=dt_cycle).contains(&self.time_to_census) {
        return Err(format!(
          "time_to_census {} outside [0, {}]",
          self.time_to_census, dt_cycle
        ));
      }
      let norm = self.direction.length();
      if (norm - 1.0).abs() > DIRECTION_NORM_TOLERANCE {
        return Err(format!("direction cosine norm {norm} not within tolerance of 1"));
      }
      if self.num_mean_free_paths < 0.0 && !self.is_forced_collision() {
        return Err(format!(
          "num_mean_free_paths {} is negative and not the forced-collision sentinel",
          self.num_mean_free_paths
        ));
      }
      if self.weight <= 0.0 {
        return Err(format!("weight {} must be positive for an alive particle", self.weight));
      }
    }
    Ok(())
  }
}

#[cfg(test)]
#[path = "particle_test.rs"]
mod particle_test;
