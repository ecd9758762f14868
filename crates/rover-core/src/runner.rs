//! Simulation loop runner.
//!
//! This module provides [`run_simulation`], the top-level async function
//! that drives the tick loop with support for:
//!
//! - **Bounded simulation**: stop after `max_ticks`
//! - **Fixed tick pacing**: a tokio interval between ticks
//! - **Stop requests**: another task can end the run cleanly
//! - **Idle detection**: the run ends once no actor remains
//!
//! The runner wraps the single-tick [`run_tick`] function and adds the
//! control plane around it.
//!
//! [`run_tick`]: crate::tick::run_tick

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::config::SimulationBoundsConfig;
use crate::tick::{self, SimulationState, TickError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Reason why the simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// A stop was requested through [`RunControl::request_stop`].
    StopRequested,
    /// No actor is left in the world.
    NoActors,
}

/// Shared run control: tick pacing, limit and stop flag.
#[derive(Debug)]
pub struct RunControl {
    tick_interval: Duration,
    max_ticks: u64,
    stop_requested: AtomicBool,
}

impl RunControl {
    /// Control for a run with the given pacing and bounds.
    pub const fn new(tick_interval: Duration, bounds: &SimulationBoundsConfig) -> Self {
        Self {
            tick_interval,
            max_ticks: bounds.max_ticks,
            stop_requested: AtomicBool::new(false),
        }
    }

    /// Time between ticks.
    pub const fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Tick limit (0 = unlimited).
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Ask the loop to stop before its next tick.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Whether `tick` is the last tick allowed.
    pub const fn tick_limit_reached(&self, tick: u64) -> bool {
        self.max_ticks > 0 && tick >= self.max_ticks
    }
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
    /// Commands executed over the whole run.
    pub total_commands: u64,
}

/// Callback invoked after each tick completes.
///
/// Implementations can use this to broadcast description updates, collect
/// statistics, or request a stop.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Run the simulation loop until a termination condition is met.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick execution fails unrecoverably.
pub async fn run_simulation(
    state: &mut SimulationState,
    control: &RunControl,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;
    let mut total_commands: u64 = 0;

    info!(
        max_ticks = control.max_ticks(),
        tick_interval_ms = u64::try_from(control.tick_interval().as_millis()).unwrap_or(u64::MAX),
        actors = state.actors.len(),
        "Simulation starting"
    );

    let mut interval = (!control.tick_interval().is_zero()).then(|| {
        let mut interval = tokio::time::interval(control.tick_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    let end_reason = loop {
        if control.is_stop_requested() {
            info!("Stop requested");
            break SimulationEndReason::StopRequested;
        }

        if let Some(interval) = interval.as_mut() {
            interval.tick().await;
        } else {
            tokio::task::yield_now().await;
        }

        let summary = tick::run_tick(state)?;
        total_ticks = total_ticks.saturating_add(1);
        total_commands = total_commands.saturating_add(u64::from(summary.commands_executed));

        callback.on_tick(&summary, state);

        let tick = summary.tick;
        let actors = summary.actors;
        last_summary = Some(summary);

        if actors == 0 {
            info!(tick, "No actors left in the world");
            break SimulationEndReason::NoActors;
        }

        if control.tick_limit_reached(tick) {
            info!(tick, max_ticks = control.max_ticks(), "Tick limit reached");
            break SimulationEndReason::MaxTicksReached;
        }
    };

    Ok(SimulationResult {
        end_reason,
        final_summary: last_summary,
        total_ticks,
        total_commands,
    })
}

/// Log the simulation end sequence.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        total_commands = result.total_commands,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            actors = summary.actors,
            animating = summary.animating,
            budget_used = ?summary.budget_used,
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}
