//! Fluid particle data structures and lattice spawning.
//!
//! A particle is a mass point sampling the fluid, not a physical droplet.
//! Its density, pressure and force are recomputed every step by the solver.

use bevy::prelude::*;

use super::error::{SphError, SphResult};

/// Physical properties shared by particles of one fluid.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct ParticleMaterial {
    /// Particle mass.
    pub mass: f32,
    /// Density at which the fluid is pressure free.
    pub rest_density: f32,
    /// Viscosity coefficient (mu).
    pub viscosity_coefficient: f32,
    /// Gas constant (k) of the linear equation of state.
    pub gas_constant: f32,
    /// Carried along, not used by the force model.
    pub temperature: f32,
    /// Interface color value, not used by the force model.
    pub color_interface: f32,
    /// Surface color value, not used by the force model.
    pub color_surface: f32,
}

impl Default for ParticleMaterial {
    fn default() -> Self {
        Self {
            mass: 19.683,
            rest_density: 100.0,
            viscosity_coefficient: 10.0,
            gas_constant: 3.0,
            temperature: 500.0,
            color_interface: 1.0,
            color_surface: 1.0,
        }
    }
}

impl ParticleMaterial {
    /// Checks the invariants every particle built from this material relies on.
    pub fn validate(&self) -> SphResult<()> {
        SphError::ensure_positive("mass", self.mass)?;
        SphError::ensure_positive("rest_density", self.rest_density)?;
        for (name, value) in [
            ("viscosity_coefficient", self.viscosity_coefficient),
            ("gas_constant", self.gas_constant),
        ] {
            if !value.is_finite() {
                return Err(SphError::InvalidParameter {
                    name,
                    expected: "finite",
                    value,
                });
            }
        }
        Ok(())
    }
}

/// State of a single fluid particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub mass: f32,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Net force from the last force pass.
    pub force: Vec3,
    pub rest_density: f32,
    /// Density from the last density pass.
    pub actual_density: f32,
    pub viscosity_coefficient: f32,
    pub gas_constant: f32,
    /// Pressure from the last density pass.
    pub pressure: f32,
    pub temperature: f32,
    pub color_interface: f32,
    pub color_surface: f32,
}

impl Particle {
    /// Create a resting particle. Density starts at rest density so the first
    /// advection step divides by a valid value.
    pub fn new(position: Vec3, material: &ParticleMaterial) -> Self {
        Self {
            mass: material.mass,
            position,
            velocity: Vec3::ZERO,
            force: Vec3::ZERO,
            rest_density: material.rest_density,
            actual_density: material.rest_density,
            viscosity_coefficient: material.viscosity_coefficient,
            gas_constant: material.gas_constant,
            pressure: 0.0,
            temperature: material.temperature,
            color_interface: material.color_interface,
            color_surface: material.color_surface,
        }
    }

    /// Create a particle of the default material.
    pub fn at(position: Vec3) -> Self {
        Self::new(position, &ParticleMaterial::default())
    }

    /// Set initial velocity.
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the force and density treated as the previous step's result.
    pub fn with_previous_state(mut self, force: Vec3, density: f32) -> Self {
        self.force = force;
        self.actual_density = density;
        self.pressure = self.pressure_at(density);
        self
    }

    /// Linear equation of state: p = k * (rho - rho0).
    #[inline]
    pub fn pressure_at(&self, density: f32) -> f32 {
        self.gas_constant * (density - self.rest_density)
    }

    /// Acceleration implied by the stored force and density.
    #[inline]
    pub fn acceleration(&self) -> Vec3 {
        self.force / self.actual_density
    }

    /// Mass over density, the SPH volume weight of this particle.
    #[inline]
    pub fn volume(&self) -> f32 {
        self.mass / self.actual_density
    }

    /// Describes the first violated invariant, if any.
    pub(crate) fn invariant_violation(&self) -> Option<&'static str> {
        if !(self.mass.is_finite() && self.mass > 0.0) {
            Some("mass must be positive")
        } else if !(self.rest_density.is_finite() && self.rest_density > 0.0) {
            Some("rest density must be positive")
        } else if !(self.actual_density.is_finite() && self.actual_density > 0.0) {
            Some("density must be positive")
        } else if !(self.position.is_finite() && self.velocity.is_finite() && self.force.is_finite())
        {
            Some("position, velocity and force must be finite")
        } else {
            None
        }
    }
}

/// Generate a cubic lattice of `per_axis³` points.
///
/// Points are `spacing` apart, starting half a spacing past `origin`, and
/// ordered so that index = x * n² + y * n + z.
pub fn lattice_positions(per_axis: usize, spacing: f32, origin: Vec3) -> Vec<Vec3> {
    let offset = origin + Vec3::splat(0.5 * spacing);
    let mut positions = Vec::with_capacity(per_axis * per_axis * per_axis);

    for x in 0..per_axis {
        for y in 0..per_axis {
            for z in 0..per_axis {
                let cell = Vec3::new(x as f32, y as f32, z as f32);
                positions.push(offset + cell * spacing);
            }
        }
    }

    positions
}

/// GPU-compatible per-instance data for drawing each particle as a sphere.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    /// Position (xyz) + radius (w).
    pub position_radius: [f32; 4],
}

impl ParticleInstance {
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position_radius: [position.x, position.y, position.z, radius],
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(
            self.position_radius[0],
            self.position_radius[1],
            self.position_radius[2],
        )
    }

    /// Raw bytes of an instance slice, ready for a vertex buffer upload.
    pub fn as_bytes(instances: &[Self]) -> &[u8] {
        bytemuck::cast_slice(instances)
    }
}
