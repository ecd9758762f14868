//! Shared type definitions for the Rover actor simulation.
//!
//! This crate is the single source of truth for the value types that flow
//! between the world, the per-actor command engine, the tick driver and
//! observers. Record and event types derive `ts-rs` bindings so observer
//! front-ends can consume them.
//!
//! # Modules
//!
//! - [`ids`] -- Actor, command, dimension and entity identifiers
//! - [`enums`] -- Directions, sides, animation kinds, families, move states
//! - [`structs`] -- Positions, volumes, fluids, owner identity, inventory
//! - [`results`] -- Command results and the script events carrying them
//! - [`records`] -- Saved-state and description records

pub mod enums;
pub mod ids;
pub mod records;
pub mod results;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ActorFamily, AnimationKind, Authority, Direction, FluidKind, MoveState, Side};
pub use ids::{ActorId, CommandId, DimensionId, EntityHandle};
pub use records::{ActorRecord, OwnerRecord};
pub use results::{CommandResult, RESPONSE_EVENT, ScriptEvent};
pub use structs::{
    Aabb, BlockPos, FluidSnapshot, Inventory, ItemStack, Location, OwnerIdentity, Vec3,
};
