//! Error types for the SPH simulation.
//!
//! Construction of a simulation is the only fallible step of the physics core;
//! everything inside [`SphSimulation::step`](super::simulation::SphSimulation::step)
//! is total. I/O errors only come from the optional position recorder.

use std::path::PathBuf;

use bevy::prelude::*;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type SphResult<T> = Result<T, SphError>;

/// Errors raised while building a simulation or writing its position log.
#[derive(Error, Debug)]
pub enum SphError {
    /// The lattice would contain no particles.
    #[error("particle count must be positive, got {count}")]
    InvalidParticleCount {
        /// Requested count (particles per axis, or total for explicit sets).
        count: usize,
    },

    /// A scalar parameter is outside its allowed range.
    #[error("parameter `{name}` must be {expected}, got {value}")]
    InvalidParameter {
        /// Parameter name as it appears in [`SphParams`](super::params::SphParams).
        name: &'static str,
        /// Allowed range, e.g. "positive and finite".
        expected: &'static str,
        /// Offending value.
        value: f32,
    },

    /// The domain box is empty or inverted on some axis.
    #[error("invalid domain box: min {min} must be strictly below max {max}")]
    InvalidDomain {
        /// Minimum corner.
        min: Vec3,
        /// Maximum corner.
        max: Vec3,
    },

    /// The initial lattice does not fit strictly inside the domain box.
    #[error(
        "a lattice of {particles_per_axis}^3 particles spanning {lattice_min}..{lattice_max} \
         does not fit strictly inside the domain box"
    )]
    LatticeOutsideDomain {
        /// Requested particles per axis.
        particles_per_axis: usize,
        /// Lowest lattice point.
        lattice_min: Vec3,
        /// Highest lattice point.
        lattice_max: Vec3,
    },

    /// An explicitly supplied particle violates the particle invariants.
    #[error("particle {index} is invalid: {reason}")]
    InvalidParticle {
        /// Index in the supplied collection.
        index: usize,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Writing the position log failed.
    #[error("position log I/O error on {path}: {source}")]
    Io {
        /// File being written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl SphError {
    /// Convenience constructor for [`SphError::Io`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Checks that `value` is positive and finite.
    pub(crate) fn ensure_positive(name: &'static str, value: f32) -> SphResult<()> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(Self::InvalidParameter {
                name,
                expected: "positive and finite",
                value,
            })
        }
    }
}
