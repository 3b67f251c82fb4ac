//! Segment-outcome solver (§4.2): picks the event that ends a particle's
//! next straight-line segment and advances it there.

use crate::constants::{HUGE_DOUBLE, SUBFACETS_PER_FACE, TINY_DOUBLE};
use crate::error::TrackError;
use crate::geometry::nearest_facet_with_recovery;
use crate::mesh::MeshView;
use crate::particle::{EventTag, Particle};
use crate::rng::Rng;
use crate::tallies::Tallies;
use crate::xs_cache::XsCache;

/// The event that ended a segment, still undecided between cell-change,
/// reflection, escape, and subdomain-change for the `FaceEventUndefined`
/// case — that classification is the event handlers' job (§4.1, C7).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentEvent {
  Collision,
  FaceEventUndefined { face: usize, facet: usize },
  Census,
}

/// Run one segment of `particle`'s track: forced-collision check, sigma
/// lookup, mfp sampling, candidate-distance scan, position/time/age
/// advance, and the scalar-flux tally (§4.2 steps 1-8).
pub fn run_segment(particle: &mut Particle, mesh: &impl MeshView, cache: &XsCache, tallies: &Tallies) -> Result<SegmentEvent, TrackError> {
  // Step 1: forced-collision check.
  let force_collision = if particle.num_mean_free_paths < 0.0 {
    if particle.num_mean_free_paths > -900.0 {
      #[cfg(feature = "tracing")]
      tracing::warn!(particle_id = particle.id, nmfp = particle.num_mean_free_paths, "negative num_mean_free_paths drift");
    }
    particle.num_mean_free_paths = crate::constants::FORCED_COLLISION_NMFP;
    true
  } else {
    false
  };

  // Step 2: fetch sigma_total for (cell, group) from the cache.
  let sigma_total = cache.total(particle.cell, particle.energy_group);
  particle.total_cross_section = sigma_total;
  particle.mean_free_path = if sigma_total == 0.0 { HUGE_DOUBLE } else { 1.0 / sigma_total };

  // Step 3: sample a fresh mfp-to-collision if none is pending.
  if particle.num_mean_free_paths == 0.0 {
    let mut rng = Rng::from_seed(particle.seed);
    let u = rng.sample();
    particle.seed = rng.seed();
    particle.num_mean_free_paths = -u.ln();
  }

  // Step 4: candidate distances.
  let faces = mesh.faces(particle.cell);
  let cell_center = mesh.cell_center(particle.cell);
  let (facet_idx, raw_d_face) =
    nearest_facet_with_recovery(&faces, &mut particle.position, particle.direction, cell_center, particle.num_segments, particle.id, particle.cell)?;

  let mut d_coll = particle.num_mean_free_paths * particle.mean_free_path;
  let mut d_face = raw_d_face;
  let mut d_census = particle.speed() * particle.time_to_census;

  if force_collision {
    d_face = HUGE_DOUBLE;
    d_census = HUGE_DOUBLE;
    d_coll = TINY_DOUBLE;
  }

  // Step 5: pick the smallest, strict less-than so the earliest-declared
  // candidate (collision, then face, then census) wins ties.
  let mut seg_len = d_coll;
  let mut event = SegmentEvent::Collision;
  if d_face < seg_len {
    seg_len = d_face;
    event = SegmentEvent::FaceEventUndefined {
      face: facet_idx / SUBFACETS_PER_FACE,
      facet: facet_idx % SUBFACETS_PER_FACE,
    };
  }
  if d_census < seg_len {
    seg_len = d_census;
    event = SegmentEvent::Census;
  }

  // Step 6: update accounting.
  match event {
    SegmentEvent::Collision => particle.num_mean_free_paths = 0.0,
    _ => particle.num_mean_free_paths -= seg_len / particle.mean_free_path,
  }
  if let SegmentEvent::FaceEventUndefined { face, facet } = event {
    particle.last_face = face;
    particle.last_facet = facet;
  }

  // Step 7: advance position/time/age; step 8: tally scalar flux. A
  // zero-length segment suppresses both.
  if seg_len > 0.0 {
    particle.position += particle.direction * seg_len;
    let speed = particle.speed();
    if speed > 0.0 {
      particle.time_to_census -= seg_len / speed;
      particle.age += seg_len / speed;
    }
    tallies.add_flux(particle.cell, particle.energy_group, seg_len, particle.weight);
    #[cfg(feature = "metrics")]
    tallies.record_segment_length(seg_len);
  }

  if matches!(event, SegmentEvent::Census) && particle.time_to_census < 0.0 {
    particle.time_to_census = 0.0;
  }

  particle.num_segments += 1;
  tallies.num_segments.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
  particle.last_event = match event {
    SegmentEvent::Collision => EventTag::Collision,
    SegmentEvent::FaceEventUndefined { .. } => EventTag::FaceEventUndefined,
    SegmentEvent::Census => EventTag::Census,
  };

  Ok(event)
}

#[cfg(test)]
#[path = "segment_solver_test.rs"]
mod segment_solver_test;
