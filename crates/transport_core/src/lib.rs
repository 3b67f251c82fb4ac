//! Tracking and nuclear-interaction core for a Monte Carlo neutron-transport
//! mini-app.
//!
//! This crate owns the per-particle segment solver, the collision/facet
//! event handlers, the nuclear-data and cross-section model, and the
//! per-cycle tracking driver. It does not own mesh generation, material
//! assignment, MPI-style particle exchange, source generation, or
//! population control (russian roulette/splitting) — those are consumed
//! through the ports in [`mesh`] and driven by a caller that owns the
//! outer simulation loop.

pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod events;
pub mod geometry;
pub mod mesh;
pub mod nuclear_data;
pub mod particle;
pub mod rng;
pub mod segment_solver;
pub mod tallies;
pub mod xs_cache;

pub use config::{CycleConfig, MaterialSpec, ReactionSpec};
pub use driver::{run_cycle, TrackerContext};
pub use error::TrackError;
pub use events::{apply_trajectory_update, dispatch, reflect, Dispatch, StagedChild};
pub use mesh::{BoundaryConditions, BoundaryTag, ChannelExchanger, FakeMesh, MaterialBinding, MeshView, NullExchanger, ParticleExchanger};
pub use nuclear_data::{NuclearData, ReactionKind};
pub use particle::{Particle, ParticleStatus};
pub use rng::Rng;
pub use segment_solver::{run_segment, SegmentEvent};
pub use tallies::{CycleSummary, Tallies};
