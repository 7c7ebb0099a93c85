//! Smoothed Particle Hydrodynamics (SPH) fluid simulation module for Bevy.
//!
//! The fluid is a fixed set of mass-carrying particles. Density, pressure,
//! viscosity, surface tension and gravity are estimated from kernel-weighted
//! sums over particle pairs, and motion is advanced with a leapfrog scheme.
//!
//! # Architecture
//!
//! - [`params`]: Simulation parameters (smoothing radius, gravity, domain, ...)
//! - [`kernels`]: SPH smoothing kernels
//! - [`particle`]: Particle state and lattice spawning
//! - [`spatial`]: All-pairs and uniform grid neighbor search
//! - [`solver`]: Density/pressure evaluation and force accumulation
//! - [`boundary`]: Domain box and the absorbing boundary policy
//! - [`simulation`]: The stepper that owns the particles
//! - [`recorder`]: Position log for offline inspection
//! - [`plugin`]: Bevy plugin for easy integration
//!
//! # Example
//!
//! ```rust,no_run
//! use sph_fluid::fluid::prelude::*;
//!
//! let mut sim = SphSimulation::new(8, SphParams::default()).unwrap();
//! for _ in 0..100 {
//!     sim.step(0.01);
//! }
//! let positions = sim.particle_positions();
//! assert_eq!(positions.len(), 512);
//! ```

pub mod boundary;
pub mod error;
pub mod kernels;
pub mod params;
pub mod particle;
pub mod plugin;
pub mod recorder;
pub mod simulation;
pub mod solver;
pub mod spatial;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::boundary::*;
    pub use super::error::*;
    pub use super::kernels::*;
    pub use super::params::*;
    pub use super::particle::*;
    pub use super::plugin::*;
    pub use super::recorder::*;
    pub use super::simulation::*;
    pub use super::solver::*;
    pub use super::spatial::*;
}
