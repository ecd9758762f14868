//! Atomic actor relocation (teleport).
//!
//! Moves an actor's full state to a new location:
//!
//! 1. Same location: nothing to do ([`RelocationOutcome::Unchanged`]).
//! 2. Unloaded, out-of-bounds or occupied destinations, and sources that
//!    are already relocating, are rejected with a [`BrainError`] before
//!    anything changes.
//! 3. The source slot is marked [`MoveState::InProgress`], which suppresses
//!    its reactions to neighbor changes caused by the relocation itself.
//! 4. The actor block is written at the destination, waterlogged only if
//!    the destination holds a water source.
//! 5. If the world holds the expected block afterwards, the whole actor
//!    moves to a new slot at the destination in one step and the source
//!    block is removed.
//! 6. Otherwise the destination write is reverted and the outcome is
//!    [`RelocationOutcome::RolledBack`].
//!
//! The `InProgress` mark is cleared on every path that does not commit.
//! Because the actor value moves between slots wholesale, no observer can
//! see a destination actor with partial state.

use rover_types::{ActorId, Location, MoveState};
use rover_world::{BlockState, BlockType, World};
use tracing::{debug, info};

use crate::error::BrainError;
use crate::table::{ActorHandle, ActorTable};

/// Transient description of one relocation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelocationTicket {
    /// The source slot.
    pub source: ActorHandle,
    /// The relocating actor's identity.
    pub actor: ActorId,
    /// Where the actor stands now.
    pub from: Location,
    /// Where it should end up.
    pub to: Location,
}

/// Result of a relocation that passed its preconditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelocationOutcome {
    /// Source and destination were the same location.
    Unchanged,
    /// The actor now lives at the destination under `handle`.
    Relocated {
        /// The actor's new handle.
        handle: ActorHandle,
    },
    /// A mid-protocol step failed and the world was restored.
    RolledBack {
        /// What went wrong.
        reason: String,
    },
}

impl RelocationOutcome {
    /// Whether the actor ends up at the destination.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Unchanged | Self::Relocated { .. })
    }
}

/// Relocate the actor behind `source` to `destination`.
pub fn relocate(
    table: &mut ActorTable,
    world: &mut dyn World,
    source: ActorHandle,
    destination: Location,
) -> Result<RelocationOutcome, BrainError> {
    let slot = table.slot(source)?;
    if slot.move_state() == MoveState::InProgress {
        return Err(BrainError::RelocationInProgress { actor: source });
    }
    let from = slot.location();
    if from == destination {
        return Ok(RelocationOutcome::Unchanged);
    }
    if !world.is_loaded(destination) {
        return Err(BrainError::DestinationUnloaded {
            location: destination,
        });
    }
    if !world.is_within_bounds(destination) {
        return Err(BrainError::DestinationOutOfBounds {
            location: destination,
        });
    }
    if table.handle_at(destination).is_some() || world.block_at(destination).is_some() {
        return Err(BrainError::DestinationOccupied {
            location: destination,
        });
    }
    let ticket = RelocationTicket {
        source,
        actor: slot.actor().id(),
        from,
        to: destination,
    };

    // Reactions owed from before the attempt are delivered normally.
    table.dispatch_neighbor_updates(world);
    table.set_move_state(source, MoveState::InProgress);
    let outcome = attempt(table, world, &ticket);
    if !matches!(outcome, Ok(RelocationOutcome::Relocated { .. })) {
        table.set_move_state(source, MoveState::NotMoved);
    }

    match &outcome {
        Ok(RelocationOutcome::Relocated { handle }) => {
            info!(actor = %ticket.actor, from = %ticket.from, to = %ticket.to, handle = %handle, "actor relocated");
        }
        Ok(RelocationOutcome::RolledBack { reason }) => {
            debug!(actor = %ticket.actor, from = %ticket.from, to = %ticket.to, reason = %reason, "relocation rolled back");
        }
        Ok(RelocationOutcome::Unchanged) => {}
        Err(err) => {
            debug!(actor = %ticket.actor, to = %ticket.to, error = %err, "relocation failed");
        }
    }
    outcome
}

fn rolled_back(reason: &str) -> RelocationOutcome {
    RelocationOutcome::RolledBack {
        reason: reason.to_owned(),
    }
}

/// Steps 4-6. The source is `InProgress` throughout.
fn attempt(
    table: &mut ActorTable,
    world: &mut dyn World,
    ticket: &RelocationTicket,
) -> Result<RelocationOutcome, BrainError> {
    let (family, facing) = {
        let actor = table.actor(ticket.source)?;
        (actor.family(), actor.facing())
    };
    let waterlogged = world.fluid_at(ticket.to).is_water_source();
    if !world.place_block(ticket.to, BlockState::actor(family, facing, waterlogged)) {
        table.dispatch_neighbor_updates(world);
        return Ok(rolled_back("destination refused the actor block"));
    }
    table.dispatch_neighbor_updates(world);

    let placed = world.block_at(ticket.to).map(|state| state.block);
    if placed != Some(BlockType::Actor(family)) {
        world.remove_block(ticket.to);
        table.dispatch_neighbor_updates(world);
        return Ok(rolled_back("destination holds an unexpected block"));
    }

    let handle = match table.transfer(ticket.source, ticket.to) {
        Ok(handle) => handle,
        Err(err) => {
            world.remove_block(ticket.to);
            table.dispatch_neighbor_updates(world);
            return Err(err);
        }
    };
    world.remove_block(ticket.from);
    world.notify_neighbors(ticket.to);
    table.dispatch_neighbor_updates(world);
    Ok(RelocationOutcome::Relocated { handle })
}
