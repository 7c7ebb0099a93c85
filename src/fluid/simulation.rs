//! Fluid simulation core logic.
//!
//! [`SphSimulation`] owns the committed particle collection and a tentative
//! buffer of the same shape. Each step advects into the tentative buffer,
//! evaluates density and forces there, then selectively commits back. Every
//! phase is a full pass over all particles before the next one starts, so
//! sums always see a completely advected collection.

use bevy::prelude::*;
use rayon::prelude::*;

use super::boundary::DomainBox;
use super::error::{SphError, SphResult};
use super::params::SphParams;
use super::particle::{lattice_positions, Particle, ParticleInstance};
use super::solver::{compute_density_pressure, compute_forces, DensitySample};
use super::spatial::NeighborTable;

/// Main fluid simulation resource.
#[derive(Resource, Debug)]
pub struct SphSimulation {
    params: SphParams,
    /// Committed particle state, visible to readers.
    particles: Vec<Particle>,
    /// Post-advection state for the step in progress.
    tentative: Vec<Particle>,
    /// Per-particle results of the density pass.
    density_buffer: Vec<DensitySample>,
    /// Per-particle results of the force pass.
    force_buffer: Vec<Vec3>,
    neighbors: NeighborTable,
    /// Number of completed steps.
    frame: u64,
    /// Simulated time in seconds.
    time: f64,
}

impl SphSimulation {
    /// Builds a cubic lattice of `particles_per_axis³` particles inside the
    /// configured domain.
    pub fn new(particles_per_axis: usize, params: SphParams) -> SphResult<Self> {
        params.validate()?;
        if particles_per_axis == 0 {
            return Err(SphError::InvalidParticleCount {
                count: particles_per_axis,
            });
        }

        let positions = lattice_positions(
            particles_per_axis,
            params.particle_spacing(),
            params.lattice_origin,
        );
        let outside = positions
            .iter()
            .any(|&p| !params.domain.strictly_contains(p));
        if outside {
            let lattice_min = positions.iter().copied().fold(Vec3::INFINITY, Vec3::min);
            let lattice_max = positions.iter().copied().fold(Vec3::NEG_INFINITY, Vec3::max);
            return Err(SphError::LatticeOutsideDomain {
                particles_per_axis,
                lattice_min,
                lattice_max,
            });
        }

        let material = params.material;
        let particles = positions
            .into_iter()
            .map(|p| Particle::new(p, &material))
            .collect();

        info!(
            "Created SPH lattice of {}^3 particles in domain {}..{}",
            particles_per_axis, params.domain.min, params.domain.max
        );

        Ok(Self::with_particles(params, particles))
    }

    /// Builds a simulation from explicit particle states.
    ///
    /// Particles may start outside `domain`; they are frozen by the boundary
    /// policy on the first step.
    pub fn from_particles(
        params: SphParams,
        domain: DomainBox,
        particles: Vec<Particle>,
    ) -> SphResult<Self> {
        let params = params.with_domain(domain);
        params.validate()?;
        if particles.is_empty() {
            return Err(SphError::InvalidParticleCount { count: 0 });
        }
        if let Some((index, reason)) = particles
            .iter()
            .enumerate()
            .find_map(|(i, p)| p.invariant_violation().map(|reason| (i, reason)))
        {
            return Err(SphError::InvalidParticle { index, reason });
        }

        Ok(Self::with_particles(params, particles))
    }

    fn with_particles(params: SphParams, particles: Vec<Particle>) -> Self {
        let n = particles.len();
        Self {
            neighbors: NeighborTable::new(params.neighbor_search, params.smoothing_radius),
            params,
            tentative: particles.clone(),
            particles,
            density_buffer: Vec::with_capacity(n),
            force_buffer: Vec::with_capacity(n),
            frame: 0,
            time: 0.0,
        }
    }

    /// Advances the simulation by `dt` with the leapfrog scheme.
    pub fn step(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            warn!("Ignoring SPH step with invalid timestep {dt}");
            return;
        }

        self.advect_tentative(dt);
        self.neighbors.rebuild(&self.tentative);
        self.density_pass();
        self.force_pass();
        self.commit(dt);

        self.frame += 1;
        self.time += f64::from(dt);
        debug!("SPH step {} done (t = {:.4})", self.frame, self.time);
    }

    /// Advances the simulation by the configured timestep.
    pub fn step_default(&mut self) {
        self.step(self.params.timestep);
    }

    /// Phase 1: x' = x + v dt + 1/2 dt² F / rho, from last step's force and density.
    fn advect_tentative(&mut self, dt: f32) {
        let half_dt_sq = 0.5 * dt * dt;
        self.tentative.clone_from(&self.particles);
        for (tentative, committed) in self.tentative.iter_mut().zip(&self.particles) {
            tentative.position =
                committed.position + committed.velocity * dt + half_dt_sq * committed.acceleration();
        }
    }

    /// Phase 2: density and pressure of every tentative particle.
    fn density_pass(&mut self) {
        let tentative = &self.tentative;
        let neighbors = &self.neighbors;
        let h = self.params.smoothing_radius;

        (0..tentative.len())
            .into_par_iter()
            .map(|i| compute_density_pressure(tentative, i, neighbors.neighbors(i), h))
            .collect_into_vec(&mut self.density_buffer);

        for (particle, sample) in self.tentative.iter_mut().zip(&self.density_buffer) {
            particle.actual_density = sample.density;
            particle.pressure = sample.pressure;
        }
    }

    /// Phase 3: net force on every tentative particle.
    fn force_pass(&mut self) {
        let tentative = &self.tentative;
        let neighbors = &self.neighbors;
        let params = &self.params;

        (0..tentative.len())
            .into_par_iter()
            .map(|i| compute_forces(tentative, i, neighbors.neighbors(i), params).total())
            .collect_into_vec(&mut self.force_buffer);

        for (particle, force) in self.tentative.iter_mut().zip(&self.force_buffer) {
            particle.force = *force;
        }
    }

    /// Phase 4: trapezoidal velocity update and position commit.
    fn commit(&mut self, dt: f32) {
        let half_dt = 0.5 * dt;
        let domain = self.params.domain;

        for (committed, tentative) in self.particles.iter_mut().zip(&self.tentative) {
            if domain.is_outside(committed.position) {
                committed.velocity = Vec3::ZERO;
            } else {
                committed.velocity +=
                    half_dt * (tentative.acceleration() + committed.acceleration());
                committed.position = tentative.position;
            }
            committed.force = tentative.force;
            committed.actual_density = tentative.actual_density;
            committed.pressure = tentative.pressure;
        }
    }

    /// Snapshot of committed positions.
    pub fn particle_positions(&self) -> Vec<Vec3> {
        self.particles.iter().map(|p| p.position).collect()
    }

    /// Committed particle state.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Per-instance sphere data for renderers.
    pub fn instances(&self) -> Vec<ParticleInstance> {
        let radius = self.params.particle_radius;
        self.particles
            .iter()
            .map(|p| ParticleInstance::new(p.position, radius))
            .collect()
    }

    pub fn params(&self) -> &SphParams {
        &self.params
    }

    pub fn domain(&self) -> &DomainBox {
        &self.params.domain
    }

    /// Returns the number of particles.
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    /// Number of completed steps.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Simulated time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Mean relative deviation of density from rest density.
    pub fn average_density_error(&self) -> f32 {
        let sum: f32 = self
            .particles
            .iter()
            .map(|p| (p.actual_density - p.rest_density).abs() / p.rest_density)
            .sum();
        sum / self.particles.len() as f32
    }

    /// Total kinetic energy, sum of 1/2 m v².
    pub fn kinetic_energy(&self) -> f32 {
        self.particles
            .iter()
            .map(|p| 0.5 * p.mass * p.velocity.length_squared())
            .sum()
    }
}
