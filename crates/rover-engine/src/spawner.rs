//! Actor spawner for seeding the simulation with initial actors.
//!
//! At simulation start, the spawner places `actors.spawn_count` actors at
//! random free positions of the loaded area, using the configured seed so
//! runs are reproducible. Each actor gets its starting fuel, configured
//! upgrades, an owner, a script host and (round-robin) one of the
//! configured instruction programs.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rover_brain::{Actor, BrainError, EventQueueHost, Upgrade, UpgradeRegistry};
use rover_core::config::SimulationConfig;
use rover_core::script::ProgramDriver;
use rover_core::tick::SimulationState;
use rover_types::{BlockPos, DimensionId, Direction, Location, OwnerIdentity, Side};
use rover_world::REGION_SIZE;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::EngineError;

/// Horizontal facings a spawned actor may start with.
const FACINGS: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

/// Placement attempts per requested actor before giving up.
const ATTEMPTS_PER_ACTOR: u32 = 16;

/// The output of the spawner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnReport {
    /// Where each actor was placed, in spawn order.
    pub locations: Vec<Location>,
    /// Actors that received a program.
    pub driven: usize,
}

/// Resolve an optional upgrade id.
fn resolve_upgrade(registry: &UpgradeRegistry, id: Option<&str>) -> Result<Option<Arc<dyn Upgrade>>, BrainError> {
    id.map(|id| {
        registry
            .get(id)
            .ok_or_else(|| BrainError::UnknownUpgrade { id: id.to_owned() })
    })
    .transpose()
}

/// Inclusive block range covered by `radius` loaded regions around the
/// origin, clamped to the world border.
fn spawn_range(config: &SimulationConfig) -> (i32, i32) {
    let radius = config.world.loaded_region_radius.max(0);
    let low = radius.saturating_mul(REGION_SIZE).saturating_neg();
    let high = radius
        .saturating_add(1)
        .saturating_mul(REGION_SIZE)
        .saturating_sub(1);
    let border = config.world.border_radius;
    (low.max(border.saturating_neg()), high.min(border))
}

/// The layer actors are placed on: y = 0, clamped into the world.
fn spawn_layer(config: &SimulationConfig) -> i32 {
    0.clamp(config.world.min_y, config.world.max_y.saturating_sub(1))
}

/// Place the configured actors and register their drivers on `state`.
///
/// # Errors
///
/// Returns [`EngineError::Actor`] if a configured upgrade id is unknown, and
/// [`EngineError::Spawner`] if actors were requested but none could be placed.
pub fn spawn_actors(config: &SimulationConfig, state: &mut SimulationState) -> Result<SpawnReport, EngineError> {
    let actors = &config.actors;
    let left = resolve_upgrade(&state.registry, actors.left_upgrade.as_deref())?;
    let right = resolve_upgrade(&state.registry, actors.right_upgrade.as_deref())?;
    let owner = OwnerIdentity::new(Uuid::now_v7(), config.world.name.clone());
    let fuel = i32::try_from(actors.initial_fuel).unwrap_or(i32::MAX);

    let (low, high) = spawn_range(config);
    let y = spawn_layer(config);
    let mut rng = StdRng::seed_from_u64(config.world.seed);
    let mut report = SpawnReport {
        locations: Vec::new(),
        driven: 0,
    };

    let wanted = usize::try_from(actors.spawn_count).unwrap_or(usize::MAX);
    let mut attempts = actors.spawn_count.saturating_mul(ATTEMPTS_PER_ACTOR);
    while report.locations.len() < wanted && attempts > 0 {
        attempts = attempts.saturating_sub(1);
        let pos = BlockPos::new(rng.random_range(low..=high), y, rng.random_range(low..=high));
        let location = Location::new(DimensionId::OVERWORLD, pos);
        let facing = FACINGS
            .get(rng.random_range(0..FACINGS.len()))
            .copied()
            .unwrap_or(Direction::North);

        let mut actor = Actor::new(actors.family, &state.brain_config).facing_towards(facing);
        actor.add_fuel(fuel)?;
        actor.set_owner(Some(owner.clone()))?;
        actor.set_upgrade(Side::Left, left.clone())?;
        actor.set_upgrade(Side::Right, right.clone())?;
        actor.attach_host(Box::new(EventQueueHost::new()));
        let id = actor.id();

        if let Err(err) = state.actors.spawn(&mut state.world, location, actor) {
            debug!(location = %location, error = %err, "spawn position rejected, retrying");
            continue;
        }

        let index = report.locations.len();
        report.locations.push(location);
        let program = index
            .checked_rem(actors.programs.len())
            .and_then(|slot| actors.programs.get(slot));
        if let Some(program) = program {
            state
                .drivers
                .push(ProgramDriver::new(id, program.clone(), actors.loop_programs));
            report.driven = report.driven.saturating_add(1);
        }
    }

    if report.locations.is_empty() && wanted > 0 {
        return Err(EngineError::Spawner {
            message: format!("no free position found for any of {wanted} actors"),
        });
    }
    if report.locations.len() < wanted {
        warn!(
            requested = actors.spawn_count,
            placed = report.locations.len(),
            "could not place every requested actor"
        );
    }
    info!(
        actors_spawned = report.locations.len(),
        driven = report.driven,
        family = ?actors.family,
        "Seed actors spawned"
    );
    Ok(report)
}
