//! The world collaborator consumed by actors.
//!
//! The command engine never owns the world. It reaches it through the
//! [`World`] trait for loaded/bounds checks, block placement, fluid
//! queries, entity enumeration and displacement, and neighbor
//! notifications. [`GridWorld`] is the in-memory implementation used by
//! the engine binary and the test suites.
//!
//! [`GridWorld`]: crate::grid::GridWorld

use rover_types::{Aabb, ActorFamily, DimensionId, Direction, EntityHandle, FluidSnapshot, Location, Vec3};
use serde::{Deserialize, Serialize};

/// What kind of block occupies a position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    /// Inert terrain identified by name.
    Solid(String),
    /// The block form of an actor of the given family.
    Actor(ActorFamily),
}

/// Full state of a placed block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockState {
    /// Block type.
    pub block: BlockType,
    /// Horizontal facing.
    pub facing: Direction,
    /// Whether the block shares its cell with a water source.
    pub waterlogged: bool,
}

impl BlockState {
    /// A dry terrain block.
    pub fn solid(name: impl Into<String>) -> Self {
        Self {
            block: BlockType::Solid(name.into()),
            facing: Direction::North,
            waterlogged: false,
        }
    }

    /// The block form of an actor.
    pub const fn actor(family: ActorFamily, facing: Direction, waterlogged: bool) -> Self {
        Self {
            block: BlockType::Actor(family),
            facing,
            waterlogged,
        }
    }
}

/// A pending "your neighbor changed" notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NeighborUpdate {
    /// The position that should react.
    pub target: Location,
    /// The position whose block changed.
    pub source: Location,
}

/// World operations the actor core depends on.
pub trait World {
    /// Whether the region containing `location` is loaded.
    fn is_loaded(&self, location: Location) -> bool;

    /// Whether `location` lies inside the world border and height limits.
    fn is_within_bounds(&self, location: Location) -> bool;

    /// The block at `location`, `None` for air.
    fn block_at(&self, location: Location) -> Option<BlockState>;

    /// Place a block. Returns `false` if the world refused the write.
    fn place_block(&mut self, location: Location, state: BlockState) -> bool;

    /// Clear the block at `location`.
    fn remove_block(&mut self, location: Location);

    /// The fluid at `location`.
    fn fluid_at(&self, location: Location) -> FluidSnapshot;

    /// Entities whose bounds intersect `volume`.
    fn entities_in(&self, dimension: DimensionId, volume: &Aabb) -> Vec<EntityHandle>;

    /// Move an entity by `delta`.
    fn displace_entity(&mut self, entity: EntityHandle, delta: Vec3);

    /// Tell the six neighbors of `location` that it changed.
    fn notify_neighbors(&mut self, location: Location);

    /// Take every neighbor notification queued since the last drain.
    fn drain_neighbor_updates(&mut self) -> Vec<NeighborUpdate>;
}
