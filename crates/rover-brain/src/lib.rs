//! Per-actor command execution for the Rover actor simulation.
//!
//! This crate is the logic layer for robot actors: everything that operates
//! on actor state through the [`World`](rover_world::World) collaborator
//! without owning a clock, a config file or a runtime. It sits between
//! `rover-types` / `rover-world` and the `rover-core` tick driver.
//!
//! # Modules
//!
//! - [`actor`] -- The actor aggregate ([`Actor`]), authority, records
//! - [`animation`] -- Animation timing, presentation helpers, entity pushing
//! - [`bridge`] -- Continuation bridge between the queue and script hosts
//! - [`budget`] -- Per-tick work budget and the explicit [`TickContext`]
//! - [`builtin`] -- Built-in tool and sensor upgrades
//! - [`command`] -- The [`Command`] trait and [`CommandContext`]
//! - [`commands`] -- Built-in instructions ([`ActorCommand`])
//! - [`config`] -- Actor runtime parameters ([`BrainConfig`])
//! - [`error`] -- Error types for actor operations ([`BrainError`])
//! - [`fuel`] -- Fuel accounting ([`FuelLedger`])
//! - [`queue`] -- Bounded FIFO command queue with id issuance
//! - [`relocation`] -- Atomic teleport with rollback
//! - [`table`] -- Handle-indexed actor arena and the per-actor tick
//! - [`upgrade`] -- Upgrade slots, peripherals and the upgrade registry

pub mod actor;
pub mod animation;
pub mod bridge;
pub mod budget;
pub mod builtin;
pub mod command;
pub mod commands;
pub mod config;
pub mod error;
pub mod fuel;
pub mod queue;
pub mod relocation;
pub mod table;
pub mod upgrade;

// Re-export primary types at crate root for convenience.
pub use actor::{Actor, MAX_COLOUR};
pub use animation::{AnimationState, push_entities, push_volume};
pub use bridge::{EventQueueHost, PendingCall, ScriptHost};
pub use budget::{TickContext, WorkBudget};
pub use builtin::{DEFAULT_SENSOR_RANGE, SensorPeripheral, SensorUpgrade, ToolUpgrade};
pub use command::{Command, CommandContext, FnCommand, command_fn};
pub use commands::{ActorCommand, MOVE_FUEL_COST, MoveDirection, TurnDirection};
pub use config::{BrainConfig, DEFAULT_ANIMATION_DURATION, DEFAULT_QUEUE_CAPACITY};
pub use error::BrainError;
pub use fuel::FuelLedger;
pub use queue::{CommandEntry, CommandQueue};
pub use relocation::{RelocationOutcome, RelocationTicket, relocate};
pub use table::{
    ActorHandle, ActorSlot, ActorTable, ActorTickReport, NeighborDispatch, Retirement,
};
pub use upgrade::{Peripheral, Upgrade, UpgradeRegistry, UpgradeSlots, UpgradeTick};
