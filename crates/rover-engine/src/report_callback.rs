//! Tick callback that publishes description updates and keeps run totals.
//!
//! After each tick, changed actor descriptions are serialised to JSON and
//! emitted on the `rover::descriptions` tracing target, which is where an
//! observer would subscribe. Run-wide counters are logged when the run ends.

use rover_core::runner::TickCallback;
use rover_core::tick::{SimulationState, TickSummary};
use tracing::{debug, info, trace, warn};

/// Callback that bridges the tick cycle to observers.
#[derive(Debug, Default)]
pub struct ReportCallback {
    descriptions_sent: u64,
    relocations: u64,
    entities_pushed: u64,
    budget_deferrals: u64,
}

impl ReportCallback {
    /// A callback with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptions published so far.
    pub const fn descriptions_sent(&self) -> u64 {
        self.descriptions_sent
    }

    /// Log the run-wide counters.
    pub fn log_totals(&self) {
        info!(
            descriptions_sent = self.descriptions_sent,
            relocations = self.relocations,
            entities_pushed = self.entities_pushed,
            budget_deferrals = self.budget_deferrals,
            "Run totals"
        );
    }
}

impl TickCallback for ReportCallback {
    fn on_tick(&mut self, summary: &TickSummary, sim: &SimulationState) {
        for update in &summary.descriptions {
            match serde_json::to_string(&update.record) {
                Ok(json) => {
                    trace!(target: "rover::descriptions", tick = summary.tick, actor = %update.actor, record = %json, "description");
                    self.descriptions_sent = self.descriptions_sent.saturating_add(1);
                }
                Err(e) => {
                    warn!(actor = %update.actor, error = %e, "failed to serialise description");
                }
            }
        }

        self.relocations = self.relocations.saturating_add(u64::from(summary.relocations));
        self.entities_pushed = self
            .entities_pushed
            .saturating_add(u64::try_from(summary.entities_pushed).unwrap_or(u64::MAX));
        self.budget_deferrals = self
            .budget_deferrals
            .saturating_add(u64::from(summary.budget_deferred));

        debug!(
            tick = summary.tick,
            descriptions = summary.descriptions.len(),
            running_drivers = sim.running_drivers(),
            "Tick reported"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rover_brain::{Actor, ActorCommand, BrainConfig, EventQueueHost, WorkBudget};
    use rover_core::script::ProgramDriver;
    use rover_core::tick::run_tick;
    use rover_types::{ActorFamily, BlockPos, DimensionId, Location};
    use rover_world::{GridWorld, WorldBounds};

    use super::*;

    #[test]
    fn counts_published_descriptions() {
        let world = GridWorld::with_overworld(WorldBounds::default(), 0).unwrap();
        let mut state = SimulationState::new(world, WorkBudget::unlimited(), BrainConfig::default());
        let mut actor = Actor::new(ActorFamily::Normal, &state.brain_config);
        actor.attach_host(Box::new(EventQueueHost::new()));
        let id = actor.id();
        let location = Location::new(DimensionId::OVERWORLD, BlockPos::new(2, 0, 2));
        state.actors.spawn(&mut state.world, location, actor).unwrap();
        state.drivers.push(ProgramDriver::new(id, vec![ActorCommand::Wait], false));

        let mut callback = ReportCallback::new();
        // Starting the wait changes the animation.
        let summary = run_tick(&mut state).unwrap();
        callback.on_tick(&summary, &state);
        assert_eq!(callback.descriptions_sent(), 1);

        // Playing it out does not.
        let summary = run_tick(&mut state).unwrap();
        callback.on_tick(&summary, &state);
        assert_eq!(callback.descriptions_sent(), 1);
    }
}
