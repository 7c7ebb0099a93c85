//! SPH fluid simulation for Bevy
//!
//! This library simulates a fluid volume as a set of particles using Smoothed
//! Particle Hydrodynamics, following Müller et al. (2003): poly6 density,
//! spiky pressure gradients, viscosity Laplacian diffusion and color field
//! surface tension, integrated with a leapfrog scheme.
//!
//! # Features
//!
//! - **Deterministic stepping**: four barrier phases per step over a
//!   double-buffered particle collection
//! - **Parallel passes**: density and force passes run on rayon
//! - **Neighbor search**: exact all-pairs sums or an equivalent uniform grid
//! - **Absorbing boundary**: particles leaving the domain box are frozen
//! - **Easy Integration**: Simple Bevy plugin interface, plus a position log
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use sph_fluid::prelude::*;
//!
//! fn main() {
//!     let mut app = App::new();
//!     app.add_plugins(
//!         SphPlugin::with_params(SphParams::water())
//!             .particles_per_axis(10)
//!             .with_position_log("positions.txt"),
//!     )
//!     .add_systems(Update, report);
//!
//!     for _ in 0..500 {
//!         app.update();
//!     }
//! }
//!
//! fn report(state: Res<FluidState>) {
//!     info!("frame {} density error {}", state.frame, state.avg_density_error);
//! }
//! ```
//!
//! Rendering is left to the host application; [`SphSimulation::instances`]
//! and [`DomainBox::edges`] provide the data a renderer needs.
//!
//! [`SphSimulation::instances`]: fluid::simulation::SphSimulation::instances
//! [`DomainBox::edges`]: fluid::boundary::DomainBox::edges

pub mod fluid;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::fluid::prelude::*;
}
