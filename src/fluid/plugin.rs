//! Bevy plugin for SPH fluid simulation.

use std::path::PathBuf;

use bevy::prelude::*;

use super::params::SphParams;
use super::recorder::{PositionRecorder, DEFAULT_SAMPLE_COUNT};
use super::simulation::SphSimulation;

/// Plugin that adds an SPH fluid simulation to a Bevy app.
///
/// The simulation advances one fixed [`SphParams::timestep`] per frame.
///
/// # Example
///
/// ```rust,ignore
/// use bevy::prelude::*;
/// use sph_fluid::prelude::*;
///
/// fn main() {
///     App::new()
///         .add_plugins(DefaultPlugins)
///         .add_plugins(SphPlugin::default().particles_per_axis(10))
///         .run();
/// }
/// ```
#[derive(Clone, Debug)]
pub struct SphPlugin {
    pub params: SphParams,
    pub particles_per_axis: usize,
    /// Where to write the position log, if anywhere.
    pub position_log: Option<PathBuf>,
    /// Particles per logged line.
    pub log_sample_count: usize,
}

impl Default for SphPlugin {
    fn default() -> Self {
        Self {
            params: SphParams::default(),
            particles_per_axis: 10,
            position_log: None,
            log_sample_count: DEFAULT_SAMPLE_COUNT,
        }
    }
}

impl SphPlugin {
    pub fn with_params(params: SphParams) -> Self {
        Self {
            params,
            ..default()
        }
    }

    pub fn particles_per_axis(mut self, particles_per_axis: usize) -> Self {
        self.particles_per_axis = particles_per_axis;
        self
    }

    /// Record the first few particle positions to `path` every frame.
    pub fn with_position_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.position_log = Some(path.into());
        self
    }

    pub fn with_log_sample_count(mut self, count: usize) -> Self {
        self.log_sample_count = count;
        self
    }
}

impl Plugin for SphPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<SphParams>();

        app.insert_resource(self.params.clone())
            .init_resource::<FluidState>();

        match SphSimulation::new(self.particles_per_axis, self.params.clone()) {
            Ok(simulation) => {
                app.insert_resource(simulation);
            }
            Err(err) => error!("SPH simulation not started: {err}"),
        }

        if let Some(path) = &self.position_log {
            match PositionRecorder::create(path, self.log_sample_count) {
                Ok(recorder) => {
                    app.insert_resource(recorder);
                }
                Err(err) => error!("Position log disabled: {err}"),
            }
        }

        app.add_systems(
            Update,
            (run_simulation, record_positions, update_fluid_state).chain(),
        );
    }
}

/// Runtime control and statistics for the simulation.
#[derive(Resource, Clone, Debug, Default)]
pub struct FluidState {
    /// Skip stepping while set.
    pub paused: bool,
    /// Advance a single step while paused.
    pub step_requested: bool,
    /// Steps advanced so far.
    pub frame: u64,
    /// Simulated time in seconds.
    pub time: f64,
    pub particle_count: usize,
    pub avg_density_error: f32,
}

impl FluidState {
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn request_step(&mut self) {
        self.step_requested = true;
    }
}

/// System to run the fluid simulation.
fn run_simulation(mut state: ResMut<FluidState>, simulation: Option<ResMut<SphSimulation>>) {
    let Some(mut simulation) = simulation else {
        return;
    };
    if state.paused && !state.step_requested {
        return;
    }
    state.step_requested = false;
    simulation.step_default();
}

/// System to append the current positions to the position log.
///
/// Failures are logged and the simulation keeps running.
fn record_positions(
    state: Res<FluidState>,
    simulation: Option<Res<SphSimulation>>,
    recorder: Option<ResMut<PositionRecorder>>,
) {
    let (Some(simulation), Some(mut recorder)) = (simulation, recorder) else {
        return;
    };
    // Only log frames that actually advanced.
    if simulation.frame() == state.frame {
        return;
    }
    if let Err(err) = recorder.record(&simulation) {
        error!("{err}");
    }
}

/// System to mirror simulation statistics into [`FluidState`].
fn update_fluid_state(mut state: ResMut<FluidState>, simulation: Option<Res<SphSimulation>>) {
    let Some(simulation) = simulation else {
        return;
    };
    if simulation.frame() == state.frame {
        return;
    }
    state.frame = simulation.frame();
    state.time = simulation.time();
    state.particle_count = simulation.num_particles();
    state.avg_density_error = simulation.average_density_error();

    if state.frame % 100 == 0 {
        info!(
            "Frame {}: {} particles, density error {:.2}%",
            state.frame,
            state.particle_count,
            state.avg_density_error * 100.0
        );
    }
}
