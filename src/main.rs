//! Headless SPH demo.
//!
//! Drops a block of fluid into the default domain box, runs a fixed number of
//! frames and logs the first few particle positions per frame.
//!
//! Usage: `sph_fluid [frames] [particles_per_axis] [log_path]`

use bevy::log::LogPlugin;
use bevy::prelude::*;
use sph_fluid::prelude::*;

const DEFAULT_FRAMES: u64 = 500;
const DEFAULT_PARTICLES_PER_AXIS: usize = 10;
const DEFAULT_LOG_PATH: &str = "particle_positions.txt";

fn main() {
    let mut app = App::new();
    // Logging comes first so argument warnings reach the subscriber.
    app.add_plugins(LogPlugin::default());

    let mut args = std::env::args().skip(1);
    let frames = parse_arg(args.next(), "frames", DEFAULT_FRAMES);
    let per_axis = parse_arg(args.next(), "particles_per_axis", DEFAULT_PARTICLES_PER_AXIS);
    let log_path = args.next().unwrap_or_else(|| DEFAULT_LOG_PATH.to_string());

    app.add_plugins(
        SphPlugin::with_params(SphParams::water())
            .particles_per_axis(per_axis)
            .with_position_log(&log_path),
    );

    if !app.world().contains_resource::<SphSimulation>() {
        // The plugin already logged why.
        std::process::exit(1);
    }

    for _ in 0..frames {
        app.update();
    }

    let state = app.world().resource::<FluidState>();
    info!(
        "Finished {} frames ({:.2}s simulated) with {} particles, density error {:.2}%; positions in {}",
        state.frame,
        state.time,
        state.particle_count,
        state.avg_density_error * 100.0,
        log_path
    );
}

fn parse_arg<T: std::str::FromStr + Copy + std::fmt::Display>(
    arg: Option<String>,
    name: &str,
    default: T,
) -> T {
    match arg {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Invalid {name} '{raw}', using {default}");
            default
        }),
    }
}
