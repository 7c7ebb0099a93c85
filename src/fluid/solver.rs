//! SPH density and force evaluation.
//!
//! Both evaluators are pure functions of a particle collection and an index.
//! They read the collection only, and the stepper decides where results go.
//! Sums run over the given [`Neighbors`] in ascending index order.

use bevy::prelude::*;

use super::kernels::SphKernels;
use super::params::SphParams;
use super::particle::Particle;
use super::spatial::Neighbors;

/// Density and pressure of one particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DensitySample {
    pub density: f32,
    pub pressure: f32,
}

/// Estimate the density of particle `index` as sum_j m_j * W_poly6(x_i - x_j, h).
///
/// The particle itself is included and always contributes `m_i * W(0, h) > 0`.
pub fn compute_density(particles: &[Particle], index: usize, neighbors: Neighbors<'_>, h: f32) -> f32 {
    let position = particles[index].position;
    let mut density = 0.0;
    for j in neighbors {
        let other = &particles[j];
        density += other.mass * SphKernels::poly6(position - other.position, h);
    }
    density
}

/// Density followed by the equation of state.
pub fn compute_density_pressure(
    particles: &[Particle],
    index: usize,
    neighbors: Neighbors<'_>,
    h: f32,
) -> DensitySample {
    let density = compute_density(particles, index, neighbors, h);
    DensitySample {
        density,
        pressure: particles[index].pressure_at(density),
    }
}

/// Pressure force exerted on `a` by `b`.
///
/// Uses the averaged pressure (p_a + p_b) / 2, so with equal volumes the
/// force on `b` from `a` is the exact negation.
#[inline]
pub fn pressure_contribution(a: &Particle, b: &Particle, h: f32) -> Vec3 {
    -b.volume() * (a.pressure + b.pressure) * 0.5 * SphKernels::spiky_gradient(a.position - b.position, h)
}

/// The four force terms acting on one particle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ForceBreakdown {
    pub pressure: Vec3,
    pub viscosity: Vec3,
    pub surface_tension: Vec3,
    pub gravity: Vec3,
}

impl ForceBreakdown {
    /// Net force.
    pub fn total(&self) -> Vec3 {
        self.pressure + self.viscosity + self.surface_tension + self.gravity
    }
}

/// Accumulate pressure, viscosity, surface tension and gravity on particle `index`.
///
/// Densities and pressures in `particles` must already be up to date.
pub fn compute_forces(
    particles: &[Particle],
    index: usize,
    neighbors: Neighbors<'_>,
    params: &SphParams,
) -> ForceBreakdown {
    let h = params.smoothing_radius;
    let pi = &particles[index];

    let mut pressure = Vec3::ZERO;
    let mut viscosity = Vec3::ZERO;
    let mut color_normal = Vec3::ZERO;
    let mut color_laplacian = 0.0;

    for j in neighbors {
        let pj = &particles[j];
        let volume = pj.volume();
        let r = pi.position - pj.position;

        pressure += pressure_contribution(pi, pj, h);
        viscosity += volume * (pj.velocity - pi.velocity) * SphKernels::viscosity_laplacian(r, h);
        color_normal += volume * SphKernels::poly6_gradient(r, h);
        color_laplacian += volume * SphKernels::poly6_laplacian(r, h);
    }

    ForceBreakdown {
        pressure,
        viscosity: pi.viscosity_coefficient * viscosity,
        surface_tension: surface_tension(color_normal, color_laplacian, params),
        gravity: params.gravity * pi.actual_density,
    }
}

/// Surface tension from the color field normal and Laplacian.
///
/// Only applies near an interface, where |n| exceeds the threshold; the
/// curvature -L/|n| is meaningless for small normals.
pub fn surface_tension(normal: Vec3, laplacian: f32, params: &SphParams) -> Vec3 {
    let normal_len = normal.length();
    if normal_len > params.surface_threshold {
        let curvature = -laplacian / normal_len;
        params.tension_coefficient * curvature * normal
    } else {
        Vec3::ZERO
    }
}
