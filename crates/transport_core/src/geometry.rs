//! Facet geometry and nearest-exiting-facet search (§4.3).
//!
//! A cell's 6 quadrilateral faces are each split into 4 triangular
//! sub-facets anchored at the face center, for `SUBFACETS_PER_CELL` (24)
//! candidate exit triangles. Distance-to-facet is computed per sub-facet and
//! the nearest one along the particle's direction of travel is selected.

use glam::DVec3;

use crate::constants::{
  FACET_TOLERANCE, HUGE_DOUBLE, MAX_NUDGE_RETRIES, MAX_SEGMENTS_BEFORE_NUDGE, NUDGE_FACTOR_CAP, NUDGE_FACTOR_INITIAL, PLANE_TOLERANCE_FACTOR,
  SUBFACETS_PER_FACE,
};
use crate::error::TrackError;
use crate::particle::{CellId, ParticleId};

/// One quadrilateral face of a cell: outward unit normal, center point, and
/// the 4 corner nodes in winding order.
#[derive(Clone, Copy, Debug)]
pub struct Face {
  pub normal: DVec3,
  pub center: DVec3,
  pub nodes: [DVec3; 4],
}

/// Evaluate the 24 signed sub-facet distances for a particle at `position`
/// traveling along unit `direction`, across the cell's 6 faces.
///
/// Index `i` corresponds to face `i / SUBFACETS_PER_FACE`, sub-facet
/// `i % SUBFACETS_PER_FACE`, matching the `4*face + subfacet` convention
/// used to report the winning facet.
pub fn facet_distances(faces: &[Face; 6], position: DVec3, direction: DVec3) -> [f64; 24] {
  let mut out = [HUGE_DOUBLE; 24];
  for (face_idx, face) in faces.iter().enumerate() {
    let dot_n = face.normal.dot(direction);
    if dot_n <= 0.0 {
      // Not an exiting face from here; all 4 sub-facets stay at HUGE_DOUBLE.
      continue;
    }
    for sub in 0..SUBFACETS_PER_FACE {
      let v0 = face.center;
      let v1 = face.nodes[sub];
      let v2 = face.nodes[(sub + 1) % SUBFACETS_PER_FACE];
      out[face_idx * SUBFACETS_PER_FACE + sub] = triangle_distance(face.normal, v0, v1, v2, position, direction, dot_n);
    }
  }
  out
}

/// Distance from `position` to the triangle `(v0, v1, v2)` along `direction`,
/// or `HUGE_DOUBLE` if the ray misses the triangle or crosses behind the
/// particle beyond tolerance.
#[allow(clippy::too_many_arguments)]
fn triangle_distance(normal: DVec3, v0: DVec3, v1: DVec3, v2: DVec3, position: DVec3, direction: DVec3, dot_n: f64) -> f64 {
  // Plane through v0 with the face's outward normal: A·x+B·y+C·z+D=0.
  let d = -normal.dot(v0);
  let numerator = -(normal.dot(position) + d);

  let plane_tolerance = PLANE_TOLERANCE_FACTOR * position.length_squared();
  if numerator < 0.0 && numerator * numerator > plane_tolerance {
    return HUGE_DOUBLE;
  }

  let distance = numerator / dot_n;
  let p = position + direction * distance;

  // Drop the axis the normal is most aligned with; test bounding box and
  // winding in the remaining 2-D projection.
  let drop_axis = dominant_axis(normal);
  let (px, py) = project(p, drop_axis);
  let (ax, ay) = project(v0, drop_axis);
  let (bx, by) = project(v1, drop_axis);
  let (cx, cy) = project(v2, drop_axis);

  let (min_x, max_x) = min_max3(ax, bx, cx);
  let (min_y, max_y) = min_max3(ay, by, cy);
  if px < min_x - FACET_TOLERANCE || px > max_x + FACET_TOLERANCE || py < min_y - FACET_TOLERANCE || py > max_y + FACET_TOLERANCE {
    return HUGE_DOUBLE;
  }

  let c0 = cross2((ax, ay), (bx, by), (px, py));
  let c1 = cross2((bx, by), (cx, cy), (px, py));
  let c2 = cross2((cx, cy), (ax, ay), (px, py));

  let all_nonneg = c0 >= -FACET_TOLERANCE && c1 >= -FACET_TOLERANCE && c2 >= -FACET_TOLERANCE;
  let all_nonpos = c0 <= FACET_TOLERANCE && c1 <= FACET_TOLERANCE && c2 <= FACET_TOLERANCE;
  if all_nonneg || all_nonpos {
    distance
  } else {
    HUGE_DOUBLE
  }
}

/// Axis index (0=x, 1=y, 2=z) the normal's component is dominant on.
fn dominant_axis(normal: DVec3) -> usize {
  let abs = normal.abs();
  if abs.x >= abs.y && abs.x >= abs.z {
    0
  } else if abs.y >= abs.z {
    1
  } else {
    2
  }
}

/// Drop `axis` and return the remaining two coordinates in (lower, higher)
/// index order.
fn project(v: DVec3, axis: usize) -> (f64, f64) {
  match axis {
    0 => (v.y, v.z),
    1 => (v.x, v.z),
    _ => (v.x, v.y),
  }
}

fn min_max3(a: f64, b: f64, c: f64) -> (f64, f64) {
  (a.min(b).min(c), a.max(b).max(c))
}

fn cross2(o: (f64, f64), a: (f64, f64), p: (f64, f64)) -> f64 {
  (a.0 - o.0) * (p.1 - o.1) - (a.1 - o.1) * (p.0 - o.0)
}

/// Pick the nearest exiting facet from 24 candidate distances.
///
/// The smallest strictly positive distance wins; if none is positive, the
/// smallest-magnitude non-positive distance is accepted as a near-boundary
/// rescue. Returns `None` only if every candidate is `HUGE_DOUBLE`.
pub fn nearest_facet(distances: &[f64; 24]) -> Option<(usize, f64)> {
  let mut best_positive: Option<(usize, f64)> = None;
  let mut best_nonpositive: Option<(usize, f64)> = None;

  for (idx, &dist) in distances.iter().enumerate() {
    if dist >= HUGE_DOUBLE {
      continue;
    }
    if dist > 0.0 {
      if best_positive.map_or(true, |(_, d)| dist < d) {
        best_positive = Some((idx, dist));
      }
    } else if best_nonpositive.map_or(true, |(_, d)| dist.abs() < d.abs()) {
      best_nonpositive = Some((idx, dist));
    }
  }

  best_positive.or(best_nonpositive)
}

/// Nudge a stuck particle toward the cell center by `move_factor`, per the
/// facet-search recovery path.
pub fn nudge_position(position: DVec3, cell_center: DVec3, move_factor: f64) -> DVec3 {
  position + move_factor * (cell_center - position)
}

/// Find the nearest exiting facet for a particle, applying the
/// nudge-and-retry recovery path (§4.3) when the search is exhausted or the
/// particle has tracked more than `MAX_SEGMENTS_BEFORE_NUDGE` segments.
///
/// `position` is mutated in place by any nudge applied, since the recovery
/// is a real (if tiny) displacement of the particle, not just a probe.
/// Returns `(4*face + subfacet, distance)`, or a fatal
/// `TrackError::FacetSearchExhausted` if every retry still finds nothing.
pub fn nearest_facet_with_recovery(
  faces: &[Face; 6],
  position: &mut DVec3,
  direction: DVec3,
  cell_center: DVec3,
  num_segments: u64,
  particle_id: ParticleId,
  cell_id: CellId,
) -> Result<(usize, f64), TrackError> {
  let force_nudge = num_segments > MAX_SEGMENTS_BEFORE_NUDGE;

  if !force_nudge {
    let distances = facet_distances(faces, *position, direction);
    if let Some(found) = nearest_facet(&distances) {
      return Ok(found);
    }
  }

  let mut move_factor = NUDGE_FACTOR_INITIAL;
  for _ in 0..MAX_NUDGE_RETRIES {
    *position = nudge_position(*position, cell_center, move_factor);
    let distances = facet_distances(faces, *position, direction);
    if let Some(found) = nearest_facet(&distances) {
      return Ok(found);
    }
    move_factor = (move_factor * 2.0).min(NUDGE_FACTOR_CAP);
  }

  Err(TrackError::FacetSearchExhausted { particle_id, cell_id })
}

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;
