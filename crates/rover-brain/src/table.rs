//! Handle-indexed arena of placed actors and the per-tick update.
//!
//! The table owns every live [`Actor`] together with the world location it
//! occupies and its relocation [`MoveState`]. Commands and relocation reach
//! "their" actor through an [`ActorHandle`] instead of a direct reference.
//!
//! A handle is retired when its actor is relocated (the actor continues
//! under a new handle) or removed from the world. Retired handles answer
//! [`BrainError::Retired`] forever.
//!
//! # Update order
//!
//! [`ActorTable::update`] runs, for one actor:
//!
//! 1. At most one queued command, if the actor is authoritative, idle, has
//!    work queued and the [`WorkBudget`](crate::budget::WorkBudget) allows.
//!    Its wall-clock cost is charged to the budget and its result is
//!    delivered as a completion event. If the command removed the actor,
//!    the update stops here.
//! 2. One animation step, unless the animation was started by this tick's
//!    command. Movement animations push entities first.
//! 3. Every installed upgrade's per-tick hook.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use rover_types::{ActorId, CommandId, Location, MoveState};
use rover_world::{BlockState, World};
use tracing::{debug, info, trace};

use crate::actor::Actor;
use crate::animation::push_entities;
use crate::budget::TickContext;
use crate::command::CommandContext;
use crate::error::BrainError;
use crate::queue::CommandEntry;

/// Index of one placed actor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActorHandle(u64);

impl ActorHandle {
    /// Return the raw index.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for ActorHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why a handle stopped being live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retirement {
    /// The actor was relocated and lives on under `to`.
    Moved {
        /// The actor's new handle.
        to: ActorHandle,
    },
    /// The actor was removed from the world.
    Removed,
}

/// One placed actor.
#[derive(Debug)]
pub struct ActorSlot {
    location: Location,
    move_state: MoveState,
    neighbor_reactions: u64,
    actor: Actor,
}

impl ActorSlot {
    /// Where the actor stands.
    pub const fn location(&self) -> Location {
        self.location
    }

    /// Relocation status.
    pub const fn move_state(&self) -> MoveState {
        self.move_state
    }

    /// Neighbor changes this slot has reacted to.
    pub const fn neighbor_reactions(&self) -> u64 {
        self.neighbor_reactions
    }

    /// The actor.
    pub const fn actor(&self) -> &Actor {
        &self.actor
    }
}

/// Outcome of one [`ActorTable::dispatch_neighbor_updates`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeighborDispatch {
    /// Updates an actor reacted to.
    pub delivered: usize,
    /// Updates suppressed because the target actor was relocating.
    pub inhibited: usize,
}

/// What happened to one actor during [`ActorTable::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorTickReport {
    /// The actor's handle after the update (changes on relocation).
    pub handle: ActorHandle,
    /// The command executed this tick, if any.
    pub executed: Option<CommandId>,
    /// Whether a command was ready but the budget was exhausted.
    pub budget_exhausted: bool,
    /// Whether the animation advanced.
    pub animated: bool,
    /// Entities displaced by the animation step.
    pub pushed: usize,
    /// Whether the executed command relocated the actor.
    pub relocated: bool,
    /// Whether the executed command removed the actor.
    pub removed: bool,
}

impl ActorTickReport {
    const fn new(handle: ActorHandle) -> Self {
        Self {
            handle,
            executed: None,
            budget_exhausted: false,
            animated: false,
            pushed: 0,
            relocated: false,
            removed: false,
        }
    }
}

/// Every placed actor of a simulation.
#[derive(Debug, Default)]
pub struct ActorTable {
    slots: BTreeMap<ActorHandle, ActorSlot>,
    by_location: BTreeMap<Location, ActorHandle>,
    retired: BTreeMap<ActorHandle, Retirement>,
    next_handle: u64,
    inhibited_reactions: u64,
}

impl ActorTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    /// Place `actor` at `location` and return its handle.
    ///
    /// The destination must be loaded, inside the world and empty. The
    /// actor's block is waterlogged when it replaces a water source.
    pub fn spawn(&mut self, world: &mut dyn World, location: Location, actor: Actor) -> Result<ActorHandle, BrainError> {
        if !world.is_loaded(location) {
            return Err(BrainError::DestinationUnloaded { location });
        }
        if !world.is_within_bounds(location) {
            return Err(BrainError::DestinationOutOfBounds { location });
        }
        if self.by_location.contains_key(&location) || world.block_at(location).is_some() {
            return Err(BrainError::DestinationOccupied { location });
        }
        let waterlogged = world.fluid_at(location).is_water_source();
        let state = BlockState::actor(actor.family(), actor.facing(), waterlogged);
        if !world.place_block(location, state) {
            return Err(BrainError::DestinationOccupied { location });
        }
        let id = actor.id();
        let handle = self.insert(location, actor);
        info!(actor = %id, handle = %handle, location = %location, "actor spawned");
        Ok(handle)
    }

    /// Take an actor out of the world. Its handle is retired and the
    /// returned actor rejects every mutator.
    ///
    /// Any continuation waiting on one of its queued commands stays
    /// suspended: no completion is ever delivered for them.
    pub fn remove(&mut self, world: &mut dyn World, handle: ActorHandle) -> Result<Actor, BrainError> {
        self.slot(handle)?;
        let mut slot = self.slots.remove(&handle).ok_or(BrainError::ActorNotFound(handle))?;
        slot.actor.mark_removed();
        self.by_location.remove(&slot.location);
        self.retired.insert(handle, Retirement::Removed);
        world.remove_block(slot.location);
        info!(
            actor = %slot.actor.id(),
            handle = %handle,
            location = %slot.location,
            abandoned_commands = slot.actor.queue().len(),
            "actor removed"
        );
        Ok(slot.actor)
    }

    fn insert(&mut self, location: Location, actor: Actor) -> ActorHandle {
        self.next_handle = self.next_handle.saturating_add(1);
        let handle = ActorHandle(self.next_handle);
        self.slots.insert(
            handle,
            ActorSlot {
                location,
                move_state: MoveState::NotMoved,
                neighbor_reactions: 0,
                actor,
            },
        );
        self.by_location.insert(location, handle);
        handle
    }

    /// Move the actor of `source` into a new slot at `destination` and
    /// retire `source` as moved. The world is not touched.
    pub(crate) fn transfer(&mut self, source: ActorHandle, destination: Location) -> Result<ActorHandle, BrainError> {
        self.slot(source)?;
        let slot = self.slots.remove(&source).ok_or(BrainError::ActorNotFound(source))?;
        self.by_location.remove(&slot.location);
        let handle = self.insert(destination, slot.actor);
        self.retired.insert(source, Retirement::Moved { to: handle });
        Ok(handle)
    }

    /// Set the relocation status of a live slot. Returns `false` if there is
    /// no such slot.
    pub(crate) fn set_move_state(&mut self, handle: ActorHandle, state: MoveState) -> bool {
        self.slots.get_mut(&handle).is_some_and(|slot| {
            slot.move_state = state;
            true
        })
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    fn missing(&self, handle: ActorHandle) -> BrainError {
        if self.retired.contains_key(&handle) {
            BrainError::Retired { actor: handle }
        } else {
            BrainError::ActorNotFound(handle)
        }
    }

    /// The slot behind `handle`.
    pub fn slot(&self, handle: ActorHandle) -> Result<&ActorSlot, BrainError> {
        self.slots.get(&handle).ok_or_else(|| self.missing(handle))
    }

    /// The actor behind `handle`.
    pub fn actor(&self, handle: ActorHandle) -> Result<&Actor, BrainError> {
        self.slot(handle).map(ActorSlot::actor)
    }

    /// The actor behind `handle`, mutably.
    pub fn actor_mut(&mut self, handle: ActorHandle) -> Result<&mut Actor, BrainError> {
        if !self.slots.contains_key(&handle) {
            return Err(self.missing(handle));
        }
        self.slots
            .get_mut(&handle)
            .map(|slot| &mut slot.actor)
            .ok_or(BrainError::ActorNotFound(handle))
    }

    /// Where the actor behind `handle` stands.
    pub fn location(&self, handle: ActorHandle) -> Result<Location, BrainError> {
        self.slot(handle).map(ActorSlot::location)
    }

    /// Relocation status of `handle`; retired-by-relocation handles report
    /// [`MoveState::Moved`].
    pub fn move_state(&self, handle: ActorHandle) -> Result<MoveState, BrainError> {
        match self.retired.get(&handle) {
            Some(Retirement::Moved { .. }) => Ok(MoveState::Moved),
            _ => self.slot(handle).map(ActorSlot::move_state),
        }
    }

    /// Why `handle` was retired, if it was.
    pub fn retirement(&self, handle: ActorHandle) -> Option<Retirement> {
        self.retired.get(&handle).copied()
    }

    /// The handle of the actor standing at `location`.
    pub fn handle_at(&self, location: Location) -> Option<ActorHandle> {
        self.by_location.get(&location).copied()
    }

    /// The live handle of the actor with identity `id`.
    pub fn handle_of(&self, id: ActorId) -> Option<ActorHandle> {
        self.slots
            .iter()
            .find(|(_, slot)| slot.actor.id() == id)
            .map(|(handle, _)| *handle)
    }

    /// Live handles in creation order.
    pub fn handles(&self) -> Vec<ActorHandle> {
        self.slots.keys().copied().collect()
    }

    /// Number of live actors.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether there are no live actors.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Live actors in creation order.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.slots.values().map(ActorSlot::actor)
    }

    /// Total neighbor reactions suppressed by relocation so far.
    pub const fn inhibited_reactions(&self) -> u64 {
        self.inhibited_reactions
    }

    // -----------------------------------------------------------------------
    // Neighbor updates
    // -----------------------------------------------------------------------

    /// Drain the world's neighbor notifications and deliver them.
    ///
    /// Only slots in [`MoveState::NotMoved`] react; a relocating actor
    /// ignores the transient world states its own relocation produces.
    pub fn dispatch_neighbor_updates(&mut self, world: &mut dyn World) -> NeighborDispatch {
        let mut dispatch = NeighborDispatch::default();
        let mut seen = BTreeSet::new();
        for update in world.drain_neighbor_updates() {
            let Some(handle) = self.by_location.get(&update.target).copied() else {
                continue;
            };
            let Some(slot) = self.slots.get_mut(&handle) else {
                continue;
            };
            match slot.move_state {
                MoveState::NotMoved => {
                    slot.neighbor_reactions = slot.neighbor_reactions.saturating_add(1);
                    dispatch.delivered = dispatch.delivered.saturating_add(1);
                    seen.insert(handle);
                }
                MoveState::InProgress | MoveState::Moved => {
                    self.inhibited_reactions = self.inhibited_reactions.saturating_add(1);
                    dispatch.inhibited = dispatch.inhibited.saturating_add(1);
                    debug!(handle = %handle, source = %update.source, "neighbor reaction inhibited");
                }
            }
        }
        if !seen.is_empty() {
            trace!(actors = seen.len(), delivered = dispatch.delivered, "neighbor updates dispatched");
        }
        dispatch
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Run one tick for the actor behind `handle`.
    pub fn update(&mut self, handle: ActorHandle, ctx: &mut TickContext<'_>) -> Result<ActorTickReport, BrainError> {
        let mut report = ActorTickReport::new(handle);
        let (actor_id, authoritative, ready) = {
            let actor = self.actor(handle)?;
            (
                actor.id(),
                actor.is_authoritative(),
                actor.animation().is_idle() && !actor.queue().is_empty(),
            )
        };

        let mut current = handle;
        let mut started_animation = false;
        if authoritative && ready {
            if ctx.budget.can_work(actor_id) {
                if let Some(entry) = self.actor_mut(handle)?.pop_command() {
                    current = self.run_command(handle, actor_id, entry, ctx, &mut report);
                    if report.removed {
                        return Ok(report);
                    }
                    started_animation = !self.actor(current)?.animation().is_idle();
                }
            } else {
                report.budget_exhausted = true;
                debug!(actor = %actor_id, "work budget exhausted, command deferred");
            }
        }

        let location = self.location(current)?;
        let actor = self.actor_mut(current)?;
        if !started_animation && !actor.animation().is_idle() {
            let animation = *actor.animation();
            if ctx.config.can_push
                && authoritative
                && let Some(dir) = animation.kind().movement_direction(actor.facing())
            {
                report.pushed = push_entities(
                    &mut *ctx.world,
                    location,
                    dir,
                    animation.progress(),
                    animation.duration(),
                );
            }
            actor.animation_mut().advance();
            report.animated = true;
        }
        if authoritative {
            actor.update_upgrades();
        }
        Ok(report)
    }

    /// Execute one popped command and deliver its completion. Returns the
    /// actor's handle afterwards.
    fn run_command(
        &mut self,
        handle: ActorHandle,
        actor_id: ActorId,
        entry: CommandEntry,
        ctx: &mut TickContext<'_>,
        report: &mut ActorTickReport,
    ) -> ActorHandle {
        let CommandEntry { id, command } = entry;
        let name = command.name();
        let started = Instant::now();
        let (result, current) = {
            let mut command_ctx = CommandContext::new(self, &mut *ctx.world, ctx.config, handle);
            let result = command.execute(&mut command_ctx);
            (result, command_ctx.handle())
        };
        let elapsed = started.elapsed();
        ctx.budget.track_work(actor_id, elapsed);
        debug!(
            actor = %actor_id,
            command_id = %id,
            command = name,
            success = result.is_success(),
            elapsed = ?elapsed,
            "command executed"
        );

        report.executed = Some(id);
        report.handle = current;
        report.relocated = current != handle;
        match self.actor_mut(current) {
            Ok(actor) => {
                actor.complete(id, result);
            }
            Err(_) => {
                report.removed = true;
                debug!(actor = %actor_id, command_id = %id, "actor left the world during its command, completion dropped");
            }
        }
        current
    }
}
