//! Tick cycle: the per-tick loop that drives the Rover simulation.
//!
//! Each tick runs through these phases:
//!
//! 1. **Clock** -- advance the tick counter and reset the work budget.
//! 2. **Scripts** -- every [`ProgramDriver`] resumes on delivered completions
//!    and submits its next instruction.
//! 3. **Neighbors** -- world changes from outside the actors are delivered
//!    to the actors next to them.
//! 4. **Actors** -- every live actor runs its update (at most one command,
//!    one animation step, upgrade hooks), in handle order.
//! 5. **Describe** -- actors whose observer-visible state changed hand over
//!    a description record for broadcast.
//!
//! The cycle is deterministic given the same initial state, apart from the
//! wall-clock cost charged to the work budget.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rover_brain::{
    ActorTable, BrainConfig, BrainError, TickContext, UpgradeRegistry, WorkBudget,
};
use rover_types::{ActorId, ActorRecord};
use rover_world::GridWorld;
use tracing::{debug, info};

use crate::clock::TickClock;
use crate::script::{DriverStatus, ProgramDriver};

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: crate::clock::ClockError,
    },

    /// An actor update failed.
    #[error("actor error: {source}")]
    Actor {
        /// The underlying actor error.
        #[from]
        source: BrainError,
    },
}

/// A description record ready for observers.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptionUpdate {
    /// The described actor.
    pub actor: ActorId,
    /// Its description.
    pub record: ActorRecord,
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Live actors at end of tick.
    pub actors: usize,
    /// Commands executed this tick.
    pub commands_executed: u32,
    /// Actors whose ready command was deferred by the budget.
    pub budget_deferred: u32,
    /// Actors whose animation advanced.
    pub animating: u32,
    /// Actors that moved to another block.
    pub relocations: u32,
    /// Entities displaced by movement.
    pub entities_pushed: usize,
    /// Instructions submitted by script drivers.
    pub instructions_issued: u32,
    /// Completions consumed by script drivers.
    pub completions_resumed: u32,
    /// Neighbor changes delivered to actors outside the actor phase.
    pub neighbor_reactions: usize,
    /// Command time charged to the budget.
    pub budget_used: Duration,
    /// Changed descriptions to broadcast.
    pub descriptions: Vec<DescriptionUpdate>,
    /// Wall-clock time the tick finished.
    pub completed_at: DateTime<Utc>,
}

/// The mutable simulation state passed through the tick cycle.
#[derive(Debug)]
pub struct SimulationState {
    /// The tick clock.
    pub clock: TickClock,
    /// The world the actors live in.
    pub world: GridWorld,
    /// Every placed actor.
    pub actors: ActorTable,
    /// The per-tick work budget.
    pub budget: WorkBudget,
    /// Actor runtime parameters.
    pub brain_config: BrainConfig,
    /// Known upgrades, for record import.
    pub registry: UpgradeRegistry,
    /// Scripts driving the actors.
    pub drivers: Vec<ProgramDriver>,
}

impl SimulationState {
    /// A state with no actors and no drivers.
    pub fn new(world: GridWorld, budget: WorkBudget, brain_config: BrainConfig) -> Self {
        Self {
            clock: TickClock::new(),
            world,
            actors: ActorTable::new(),
            budget,
            brain_config,
            registry: UpgradeRegistry::with_builtins(),
            drivers: Vec::new(),
        }
    }

    /// Drivers that are still running.
    pub fn running_drivers(&self) -> usize {
        self.drivers
            .iter()
            .filter(|driver| driver.status() == DriverStatus::Running)
            .count()
    }
}

/// Execute one complete tick of the simulation.
pub fn run_tick(state: &mut SimulationState) -> Result<TickSummary, TickError> {
    // --- Phase 1: Clock ---
    let tick = state.clock.advance()?;
    state.budget.begin_tick();

    // --- Phase 2: Scripts ---
    let mut instructions_issued: u32 = 0;
    let mut completions_resumed: u32 = 0;
    for driver in &mut state.drivers {
        let step = driver.step(&mut state.actors);
        if step.issued.is_some() {
            instructions_issued = instructions_issued.saturating_add(1);
        }
        if step.resumed.is_some() {
            completions_resumed = completions_resumed.saturating_add(1);
        }
    }

    // --- Phase 3: Neighbors ---
    let neighbors = state.actors.dispatch_neighbor_updates(&mut state.world);

    // --- Phase 4: Actors ---
    let mut commands_executed: u32 = 0;
    let mut budget_deferred: u32 = 0;
    let mut animating: u32 = 0;
    let mut relocations: u32 = 0;
    let mut entities_pushed: usize = 0;
    {
        let mut ctx = TickContext::new(&mut state.world, &mut state.budget, &state.brain_config);
        for handle in state.actors.handles() {
            let report = match state.actors.update(handle, &mut ctx) {
                Ok(report) => report,
                // Taken out of the world earlier in this tick.
                Err(BrainError::Retired { .. }) => continue,
                Err(err) => return Err(err.into()),
            };
            if report.executed.is_some() {
                commands_executed = commands_executed.saturating_add(1);
            }
            if report.budget_exhausted {
                budget_deferred = budget_deferred.saturating_add(1);
            }
            if report.animated {
                animating = animating.saturating_add(1);
            }
            if report.relocated {
                relocations = relocations.saturating_add(1);
            }
            entities_pushed = entities_pushed.saturating_add(report.pushed);
        }
    }
    // Changes made by commands reach neighbors before the next tick.
    state.actors.dispatch_neighbor_updates(&mut state.world);

    // --- Phase 5: Describe ---
    let mut descriptions = Vec::new();
    for handle in state.actors.handles() {
        let actor = state.actors.actor_mut(handle)?;
        if let Some(record) = actor.take_description() {
            descriptions.push(DescriptionUpdate {
                actor: actor.id(),
                record,
            });
        }
    }

    let summary = TickSummary {
        tick,
        actors: state.actors.len(),
        commands_executed,
        budget_deferred,
        animating,
        relocations,
        entities_pushed,
        instructions_issued,
        completions_resumed,
        neighbor_reactions: neighbors.delivered,
        budget_used: state.budget.global_used(),
        descriptions,
        completed_at: Utc::now(),
    };
    if summary.budget_deferred > 0 {
        info!(tick, deferred = summary.budget_deferred, "work budget exhausted this tick");
    }
    debug!(
        tick,
        actors = summary.actors,
        commands = summary.commands_executed,
        animating = summary.animating,
        relocations = summary.relocations,
        descriptions = summary.descriptions.len(),
        "Tick completed"
    );
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rover_brain::{Actor, ActorCommand, EventQueueHost, MoveDirection, TurnDirection};
    use rover_types::{ActorFamily, AnimationKind, BlockPos, CommandResult, DimensionId, Direction, Location};
    use rover_world::{BlockState, World, WorldBounds};

    use super::*;

    fn at(x: i32, y: i32, z: i32) -> Location {
        Location::new(DimensionId::OVERWORLD, BlockPos::new(x, y, z))
    }

    fn state() -> SimulationState {
        let world = GridWorld::with_overworld(WorldBounds::default(), 2).unwrap();
        SimulationState::new(world, WorkBudget::unlimited(), BrainConfig::default())
    }

    fn add_actor(state: &mut SimulationState, location: Location, fuel: i32, program: Vec<ActorCommand>) -> ActorId {
        let mut actor = Actor::new(ActorFamily::Normal, &state.brain_config);
        actor.add_fuel(fuel).unwrap();
        actor.attach_host(Box::new(EventQueueHost::new()));
        let id = actor.id();
        state.actors.spawn(&mut state.world, location, actor).unwrap();
        state.drivers.push(ProgramDriver::new(id, program, false));
        id
    }

    fn forward() -> ActorCommand {
        ActorCommand::Move {
            direction: MoveDirection::Forward,
        }
    }

    #[test]
    fn fuel_failure_leaves_level_untouched() {
        let mut state = state();
        let id = add_actor(&mut state, at(0, 1, 0), 0, vec![forward()]);
        run_tick(&mut state).unwrap();
        run_tick(&mut state).unwrap();
        let driver = state.drivers.first().unwrap();
        assert_eq!(
            driver.last_result(),
            Some(&CommandResult::failure("Out of fuel"))
        );
        let handle = state.actors.handle_of(id).unwrap();
        assert_eq!(state.actors.location(handle).unwrap(), at(0, 1, 0));
        assert_eq!(state.actors.actor(handle).unwrap().fuel_level(), 0);
    }

    #[test]
    fn programs_walk_actors_through_the_world() {
        let mut state = state();
        let program = vec![
            forward(),
            ActorCommand::Turn {
                direction: TurnDirection::Right,
            },
            forward(),
        ];
        let id = add_actor(&mut state, at(0, 1, 0), 10, program);

        let first = run_tick(&mut state).unwrap();
        assert_eq!(first.tick, 1);
        assert_eq!(first.instructions_issued, 1);
        assert_eq!(first.commands_executed, 1);
        assert_eq!(first.relocations, 1);
        assert_eq!(first.descriptions.len(), 1);
        assert_eq!(
            first.descriptions.first().map(|d| d.record.animation),
            Some(Some(AnimationKind::MoveForward.ordinal()))
        );

        for _ in 0..40 {
            run_tick(&mut state).unwrap();
        }
        let handle = state.actors.handle_of(id).unwrap();
        let actor = state.actors.actor(handle).unwrap();
        assert_eq!(state.actors.location(handle).unwrap(), at(1, 1, -1));
        assert_eq!(actor.facing(), Direction::East);
        assert_eq!(actor.fuel_level(), 8);
        assert!(actor.animation().is_idle());
        let driver = state.drivers.first().unwrap();
        assert_eq!(driver.status(), DriverStatus::Finished);
        assert_eq!(driver.completed(), 3);
        assert_eq!(driver.failed(), 0);
    }

    #[test]
    fn actors_block_each_other() {
        let mut state = state();
        add_actor(&mut state, at(0, 1, 0), 10, vec![forward()]);
        add_actor(&mut state, at(0, 1, -1), 10, vec![ActorCommand::Wait]);

        run_tick(&mut state).unwrap();
        run_tick(&mut state).unwrap();
        let driver = state.drivers.first().unwrap();
        assert_eq!(
            driver.last_result(),
            Some(&CommandResult::failure("Movement obstructed"))
        );
    }

    #[test]
    fn queue_stalls_for_the_animation_duration() {
        let mut state = state();
        add_actor(
            &mut state,
            at(0, 1, 0),
            10,
            vec![ActorCommand::Wait, ActorCommand::FuelLevel],
        );
        // Tick 1 starts the wait; ticks 2..=9 play it out.
        let summary = run_tick(&mut state).unwrap();
        assert_eq!(summary.commands_executed, 1);
        for _ in 2..=9 {
            let summary = run_tick(&mut state).unwrap();
            assert_eq!(summary.commands_executed, 0);
            assert_eq!(summary.animating, 1);
        }
        let summary = run_tick(&mut state).unwrap();
        assert_eq!(summary.commands_executed, 1);
    }

    #[test]
    fn exhausted_budget_defers_everyone() {
        let mut state = state();
        state.budget = WorkBudget::from_micros(0, 0);
        add_actor(&mut state, at(0, 1, 0), 10, vec![ActorCommand::Wait]);
        add_actor(&mut state, at(3, 1, 0), 10, vec![ActorCommand::Wait]);
        let summary = run_tick(&mut state).unwrap();
        assert_eq!(summary.commands_executed, 0);
        assert_eq!(summary.budget_deferred, 2);
        assert_eq!(summary.instructions_issued, 2);
    }

    #[test]
    fn external_world_changes_reach_neighbors() {
        let mut state = state();
        add_actor(&mut state, at(0, 1, 0), 10, Vec::new());
        state.world.drain_neighbor_updates();
        state.world.place_block(at(1, 1, 0), BlockState::solid("stone"));
        let summary = run_tick(&mut state).unwrap();
        assert_eq!(summary.neighbor_reactions, 1);
        assert_eq!(state.running_drivers(), 0);
    }
}
