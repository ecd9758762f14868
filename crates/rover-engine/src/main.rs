//! Engine binary for the Rover actor simulation.
//!
//! This is the main entry point that wires together the world, the actor
//! spawner and the tick loop. It loads configuration, initializes all
//! subsystems, and runs the simulation until a termination condition is
//! met.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `rover-config.yaml` (or `ROVER_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the world with its loaded area
//! 4. Spawn seed actors and their programs
//! 5. Create run control from simulation bounds
//! 6. Run the simulation loop
//! 7. Log the result

mod error;
mod report_callback;
mod spawner;

use std::path::PathBuf;
use std::sync::Arc;

use rover_core::config::SimulationConfig;
use rover_core::runner::{self, RunControl};
use rover_core::tick::SimulationState;
use rover_world::GridWorld;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::report_callback::ReportCallback;

/// Environment variable naming an alternative config file.
const CONFIG_PATH_ENV: &str = "ROVER_CONFIG";

/// Default config file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "rover-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("rover-engine starting");
    if !from_file {
        info!("Config file not found, using defaults");
    }
    info!(
        world_name = %config.world.name,
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        max_ticks = config.simulation.max_ticks,
        "Configuration loaded"
    );

    // 3. Build the world.
    let bounds = config.world_bounds()?;
    let world = GridWorld::with_overworld(bounds, config.world.loaded_region_radius)?;
    info!(
        border_radius = bounds.border_radius,
        min_y = bounds.min_y,
        max_y = bounds.max_y,
        loaded_region_radius = config.world.loaded_region_radius,
        "World created"
    );

    // 4. Spawn seed actors.
    let mut state = SimulationState::new(world, config.budget(), config.brain_config());
    let report = spawner::spawn_actors(&config, &mut state)?;
    if report.locations.is_empty() {
        warn!("spawn_count is 0, the run will end after one tick");
    }

    // 5. Create run control and wire Ctrl-C to a clean stop.
    let control = Arc::new(RunControl::new(config.tick_interval(), &config.simulation));
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, stopping after the current tick");
                control.request_stop();
            }
        });
    }

    // 6. Run the simulation.
    let mut callback = ReportCallback::new();
    let result = runner::run_simulation(&mut state, &control, &mut callback)
        .await
        .map_err(EngineError::from)?;

    // 7. Log results.
    runner::log_simulation_end(&result);
    callback.log_totals();

    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "rover-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration.
///
/// Uses `ROVER_CONFIG` when set, otherwise `rover-config.yaml` in the
/// current working directory. A missing file means defaults. The flag
/// tells whether a file was read.
fn load_config() -> Result<(SimulationConfig, bool), EngineError> {
    let path = std::env::var(CONFIG_PATH_ENV)
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        let config = SimulationConfig::from_file(&path)?;
        Ok((config, true))
    } else {
        Ok((SimulationConfig::parse("")?, false))
    }
}
