//! Error types for the rover-brain crate.
//!
//! These are precondition and capacity faults reported to the caller of an
//! actor operation. A command's own semantic failure (no fuel, obstruction)
//! is never a [`BrainError`]; it travels to the script as a
//! [`CommandResult::Failure`](rover_types::CommandResult::Failure).

use rover_types::{ActorId, AnimationKind, Location};

use crate::table::ActorHandle;

/// Errors that can occur during actor operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrainError {
    /// The command queue already holds its maximum number of entries.
    #[error("command queue full ({capacity} pending)")]
    QueueFull {
        /// The queue's capacity.
        capacity: usize,
    },

    /// A mutator was called on a presentation-only mirror.
    #[error("{operation} is only allowed on the authoritative actor")]
    NotAuthoritative {
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// The handle belonged to an actor that has been relocated or removed.
    #[error("actor {actor} has been retired")]
    Retired {
        /// The stale handle.
        actor: ActorHandle,
    },

    /// A mutator was called on an actor that was taken out of the world.
    #[error("{operation} called on actor {actor}, which was removed from the world")]
    Removed {
        /// The removed actor.
        actor: ActorId,
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// A mirror-only operation was called on the authoritative actor.
    #[error("{operation} is only allowed on a mirror")]
    MirrorOnly {
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// The handle never belonged to an actor of this table.
    #[error("actor not found: {0}")]
    ActorNotFound(ActorHandle),

    /// The destination's region is not loaded.
    #[error("destination {location} is not loaded")]
    DestinationUnloaded {
        /// The requested destination.
        location: Location,
    },

    /// The destination lies outside the world border or height limits.
    #[error("destination {location} is outside the world")]
    DestinationOutOfBounds {
        /// The requested destination.
        location: Location,
    },

    /// Another block or actor already occupies the destination.
    #[error("destination {location} is occupied")]
    DestinationOccupied {
        /// The requested destination.
        location: Location,
    },

    /// The actor is already being relocated.
    #[error("actor {actor} is already relocating")]
    RelocationInProgress {
        /// The relocating actor.
        actor: ActorHandle,
    },

    /// An animation was started while another was still playing.
    #[error("animation {current:?} is still playing")]
    AnimationBusy {
        /// The animation currently playing.
        current: AnimationKind,
    },

    /// A record named an upgrade the registry does not know.
    #[error("unknown upgrade: {id}")]
    UnknownUpgrade {
        /// The unresolved upgrade id.
        id: String,
    },

    /// A record could not be applied.
    #[error("invalid record: {reason}")]
    InvalidRecord {
        /// What is wrong with the record.
        reason: String,
    },
}
