//! The command abstraction and the context commands execute in.
//!
//! A [`Command`] is an opaque unit of work owned by its queue entry until
//! it runs exactly once. Execution never fails with an error: whatever goes
//! wrong is folded into a [`CommandResult::Failure`].
//!
//! Commands reach their actor through a [`CommandContext`], which resolves
//! the actor by handle in the [`ActorTable`] rather than through a direct
//! reference. After a successful relocation the context follows the actor
//! to its new handle.

use core::fmt;

use rover_types::{CommandResult, Location};
use rover_world::World;

use crate::actor::Actor;
use crate::config::BrainConfig;
use crate::error::BrainError;
use crate::relocation::{RelocationOutcome, relocate};
use crate::table::{ActorHandle, ActorTable};

/// One unit of scripted, world-affecting work.
pub trait Command: fmt::Debug + Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Run the command against the actor behind `ctx`.
    fn execute(self: Box<Self>, ctx: &mut CommandContext<'_>) -> CommandResult;
}

/// Access to the executing actor and its world.
pub struct CommandContext<'a> {
    table: &'a mut ActorTable,
    world: &'a mut dyn World,
    config: &'a BrainConfig,
    handle: ActorHandle,
}

impl<'a> CommandContext<'a> {
    /// Build a context for the actor at `handle`.
    pub fn new(
        table: &'a mut ActorTable,
        world: &'a mut dyn World,
        config: &'a BrainConfig,
        handle: ActorHandle,
    ) -> Self {
        Self {
            table,
            world,
            config,
            handle,
        }
    }

    /// The executing actor's current handle.
    pub const fn handle(&self) -> ActorHandle {
        self.handle
    }

    /// Actor configuration.
    pub const fn config(&self) -> &BrainConfig {
        self.config
    }

    /// The executing actor's current location.
    pub fn location(&self) -> Result<Location, BrainError> {
        self.table.location(self.handle)
    }

    /// The executing actor.
    pub fn actor(&self) -> Result<&Actor, BrainError> {
        self.table.actor(self.handle)
    }

    /// The executing actor, mutably.
    pub fn actor_mut(&mut self) -> Result<&mut Actor, BrainError> {
        self.table.actor_mut(self.handle)
    }

    /// The world.
    pub fn world(&self) -> &dyn World {
        &*self.world
    }

    /// The world, mutably.
    pub fn world_mut(&mut self) -> &mut dyn World {
        &mut *self.world
    }

    /// Move the executing actor to `destination`.
    ///
    /// On success the context switches to the actor's new handle.
    pub fn relocate(&mut self, destination: Location) -> Result<RelocationOutcome, BrainError> {
        let outcome = relocate(self.table, &mut *self.world, self.handle, destination)?;
        if let RelocationOutcome::Relocated { handle } = outcome {
            self.handle = handle;
        }
        Ok(outcome)
    }

    /// Remove the executing actor from the world.
    pub fn remove_actor(&mut self) -> Result<Actor, BrainError> {
        self.table.remove(&mut *self.world, self.handle)
    }
}

/// A command backed by a closure.
pub struct FnCommand<F> {
    name: &'static str,
    run: F,
}

impl<F> fmt::Debug for FnCommand<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCommand").field("name", &self.name).finish_non_exhaustive()
    }
}

impl<F> Command for FnCommand<F>
where
    F: FnOnce(&mut CommandContext<'_>) -> CommandResult + Send,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn execute(self: Box<Self>, ctx: &mut CommandContext<'_>) -> CommandResult {
        (self.run)(ctx)
    }
}

/// Box a closure as a [`Command`].
pub fn command_fn<F>(name: &'static str, run: F) -> Box<dyn Command>
where
    F: FnOnce(&mut CommandContext<'_>) -> CommandResult + Send + 'static,
{
    Box::new(FnCommand { name, run })
}
