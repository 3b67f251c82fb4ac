//! Physical and numerical constants shared across the tracking pipeline.
//!
//! Mirrors the reference implementation's small set of magic numbers so that
//! every module that needs `_huge`/`_tiny`/`_smallDouble` reaches for the same
//! named constant instead of re-deriving it.

/// Speed of light in cm/shake (1 shake = 1e-8 s), the reference unit system.
pub const SPEED_OF_LIGHT: f64 = 299.792_458;

/// Neutron rest-mass energy in MeV.
pub const NEUTRON_REST_MASS_ENERGY: f64 = 939.565_379;

/// Stand-in for "infinite" distance/cross-section-derived mean free path.
pub const HUGE_DOUBLE: f64 = 1.0e75;

/// Smallest distance the segment solver will ever advance a particle.
pub const TINY_DOUBLE: f64 = 1.0e-13;

/// Sentinel stored in `num_mean_free_paths` to force a collision through the
/// normal event-selection pipeline rather than special-casing it.
///
/// Deliberately distinct from `0.0`, which instead means "sample a fresh
/// number of mean free paths".
pub const FORCED_COLLISION_NMFP: f64 = 1.0e-9;

/// `1 / (2^64 - 1)`, used to scale the 64-bit LCG output into `(0, 1)`.
pub const RNG_SCALE: f64 = 5.421_010_862_427_522_2e-20;

/// LCG multiplier (Knuth's MMIX constant).
pub const RNG_MULTIPLIER: u64 = 2_862_933_555_777_941_757;

/// LCG increment.
pub const RNG_INCREMENT: u64 = 3_037_000_493;

/// Tolerance for the plane-crossing rejection test in facet geometry,
/// expressed as the squared-distance factor: `plane_tolerance = PLANE_TOLERANCE_FACTOR * |pos|^2`.
pub const PLANE_TOLERANCE_FACTOR: f64 = 1.0e-16;

/// Tolerance used by the in-triangle bounding-box and cross-product tests.
pub const FACET_TOLERANCE: f64 = 1.0e-9;

/// Tolerance for unit-norm checks on direction cosines.
pub const DIRECTION_NORM_TOLERANCE: f64 = 1.0e-12;

/// Initial nudge factor applied when the facet search is exhausted.
pub const NUDGE_FACTOR_INITIAL: f64 = 0.5 * FORCED_COLLISION_NMFP;

/// Upper bound the nudge factor is allowed to grow to across retries.
pub const NUDGE_FACTOR_CAP: f64 = 1.0e-2;

/// Maximum number of nudge-and-retry attempts before the facet search fails hard.
pub const MAX_NUDGE_RETRIES: u32 = 10;

/// Segment count beyond which a particle is considered stuck and the facet
/// search's nudge-recovery path is forced even on an otherwise valid result.
pub const MAX_SEGMENTS_BEFORE_NUDGE: u64 = 10_000_000;

/// Number of triangular sub-facets per cell face.
pub const SUBFACETS_PER_FACE: usize = 4;

/// Number of faces per (hexahedral) cell.
pub const FACES_PER_CELL: usize = 6;

/// Number of nodes per (hexahedral) cell face.
pub const NODES_PER_FACE: usize = 4;

/// Total sub-facets per cell (`FACES_PER_CELL * SUBFACETS_PER_FACE`).
pub const SUBFACETS_PER_CELL: usize = FACES_PER_CELL * SUBFACETS_PER_FACE;

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
