//! Fluid simulation parameters.
//!
//! Every constant the solver shares across particles lives here, so several
//! simulations with different settings can run side by side. Per-particle
//! physical properties are grouped in [`ParticleMaterial`].

use bevy::prelude::*;

use super::boundary::DomainBox;
use super::error::{SphError, SphResult};
use super::particle::ParticleMaterial;
use super::spatial::NeighborSearch;

/// Parameters controlling the SPH simulation.
#[derive(Resource, Clone, Debug, Reflect)]
#[reflect(Resource)]
pub struct SphParams {
    /// Smoothing kernel support radius (H), shared by every kernel evaluation.
    pub smoothing_radius: f32,

    /// Particle radius. Lattice spacing is twice this value.
    pub particle_radius: f32,

    /// Surface tension coefficient (sigma).
    pub tension_coefficient: f32,

    /// Minimum color field normal length before surface tension applies.
    /// The curvature estimate is unstable for small normals, so interior
    /// particles are skipped.
    pub surface_threshold: f32,

    /// Gravitational acceleration. Scaled by each particle's density.
    pub gravity: Vec3,

    /// Fixed timestep used by the plugin for each frame.
    pub timestep: f32,

    /// Axis-aligned simulation domain.
    pub domain: DomainBox,

    /// Corner the initial lattice grows from, before the half-spacing offset.
    pub lattice_origin: Vec3,

    /// Strategy for gathering particle pairs.
    pub neighbor_search: NeighborSearch,

    /// Physical properties given to every lattice particle.
    pub material: ParticleMaterial,
}

impl Default for SphParams {
    fn default() -> Self {
        Self {
            smoothing_radius: 1.0,
            particle_radius: 0.15,
            tension_coefficient: 1.0,
            surface_threshold: 0.5,
            gravity: Vec3::new(0.0, -9.8, 0.0),
            timestep: 0.01,
            domain: DomainBox::default(),
            lattice_origin: Vec3::ZERO,
            neighbor_search: NeighborSearch::AllPairs,
            material: ParticleMaterial::default(),
        }
    }
}

impl SphParams {
    /// Default water-like parameters.
    pub fn water() -> Self {
        Self::default()
    }

    /// Thick, slow fluid.
    pub fn viscous() -> Self {
        Self {
            material: ParticleMaterial {
                viscosity_coefficient: 40.0,
                ..ParticleMaterial::default()
            },
            ..Self::default()
        }
    }

    /// Parameters with surface tension disabled.
    pub fn no_surface_tension() -> Self {
        Self {
            tension_coefficient: 0.0,
            ..Self::default()
        }
    }

    pub fn with_smoothing_radius(mut self, smoothing_radius: f32) -> Self {
        self.smoothing_radius = smoothing_radius;
        self
    }

    pub fn with_particle_radius(mut self, particle_radius: f32) -> Self {
        self.particle_radius = particle_radius;
        self
    }

    pub fn with_tension(mut self, coefficient: f32, threshold: f32) -> Self {
        self.tension_coefficient = coefficient;
        self.surface_threshold = threshold;
        self
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_timestep(mut self, timestep: f32) -> Self {
        self.timestep = timestep;
        self
    }

    pub fn with_domain(mut self, domain: DomainBox) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_lattice_origin(mut self, origin: Vec3) -> Self {
        self.lattice_origin = origin;
        self
    }

    pub fn with_neighbor_search(mut self, neighbor_search: NeighborSearch) -> Self {
        self.neighbor_search = neighbor_search;
        self
    }

    pub fn with_material(mut self, material: ParticleMaterial) -> Self {
        self.material = material;
        self
    }

    /// Distance between neighboring lattice particles.
    pub fn particle_spacing(&self) -> f32 {
        2.0 * self.particle_radius
    }

    /// Checks every parameter the solver relies on.
    pub fn validate(&self) -> SphResult<()> {
        SphError::ensure_positive("smoothing_radius", self.smoothing_radius)?;
        SphError::ensure_positive("particle_radius", self.particle_radius)?;
        SphError::ensure_positive("timestep", self.timestep)?;
        if !(self.surface_threshold.is_finite() && self.surface_threshold >= 0.0) {
            return Err(SphError::InvalidParameter {
                name: "surface_threshold",
                expected: "non-negative and finite",
                value: self.surface_threshold,
            });
        }
        if !self.tension_coefficient.is_finite() {
            return Err(SphError::InvalidParameter {
                name: "tension_coefficient",
                expected: "finite",
                value: self.tension_coefficient,
            });
        }
        ensure_finite_vec("gravity", self.gravity)?;
        ensure_finite_vec("lattice_origin", self.lattice_origin)?;
        self.domain.validate()?;
        self.material.validate()
    }
}

fn ensure_finite_vec(name: &'static str, value: Vec3) -> SphResult<()> {
    match value.to_array().into_iter().find(|c| !c.is_finite()) {
        Some(component) => Err(SphError::InvalidParameter {
            name,
            expected: "finite",
            value: component,
        }),
        None => Ok(()),
    }
}
