//! In-memory block world.
//!
//! A [`GridWorld`] holds any number of dimensions. Each dimension has a
//! square world border, a height range, a set of loaded 16x16 regions, a
//! sparse block map and a sparse fluid map. Free entities live in a shared
//! table keyed by [`EntityHandle`].
//!
//! Two test hooks let callers exercise failure paths of block placement:
//! [`GridWorld::reject_placement_at`] makes a position refuse writes, and
//! [`GridWorld::substitute_placement_at`] makes a write land as a
//! different block than requested.

use std::collections::{BTreeMap, BTreeSet};

use rover_types::{Aabb, BlockPos, DimensionId, EntityHandle, FluidSnapshot, Location, Vec3};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::WorldError;
use crate::world::{BlockState, NeighborUpdate, World};

/// Edge length of a loadable region, in blocks.
pub const REGION_SIZE: i32 = 16;

/// Region coordinate `(rx, rz)` containing a block position.
pub const fn region_of(pos: BlockPos) -> (i32, i32) {
    (pos.x.div_euclid(REGION_SIZE), pos.z.div_euclid(REGION_SIZE))
}

/// Border and height limits of one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldBounds {
    /// Maximum absolute X and Z coordinate.
    pub border_radius: i32,
    /// Lowest valid Y (inclusive).
    pub min_y: i32,
    /// Highest valid Y (exclusive).
    pub max_y: i32,
}

impl WorldBounds {
    /// Validate and construct bounds.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidBounds`] for a negative radius or an
    /// empty height range.
    pub fn new(border_radius: i32, min_y: i32, max_y: i32) -> Result<Self, WorldError> {
        if border_radius < 0 {
            return Err(WorldError::InvalidBounds {
                reason: format!("border radius {border_radius} is negative"),
            });
        }
        if min_y >= max_y {
            return Err(WorldError::InvalidBounds {
                reason: format!("min_y {min_y} must be below max_y {max_y}"),
            });
        }
        Ok(Self {
            border_radius,
            min_y,
            max_y,
        })
    }

    /// Whether `pos` is inside these bounds.
    pub const fn contains(&self, pos: BlockPos) -> bool {
        pos.x.unsigned_abs() <= self.border_radius.unsigned_abs()
            && pos.z.unsigned_abs() <= self.border_radius.unsigned_abs()
            && pos.y >= self.min_y
            && pos.y < self.max_y
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            border_radius: 256,
            min_y: -64,
            max_y: 320,
        }
    }
}

/// Mutable state of one dimension.
#[derive(Debug, Clone, Default)]
struct Dimension {
    bounds: WorldBounds,
    loaded: BTreeSet<(i32, i32)>,
    blocks: BTreeMap<BlockPos, BlockState>,
    fluids: BTreeMap<BlockPos, FluidSnapshot>,
}

/// A free-moving entity.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Entity {
    dimension: DimensionId,
    bounds: Aabb,
}

/// The in-memory world.
#[derive(Debug, Clone, Default)]
pub struct GridWorld {
    dimensions: BTreeMap<DimensionId, Dimension>,
    entities: BTreeMap<EntityHandle, Entity>,
    next_entity: u64,
    neighbor_updates: Vec<NeighborUpdate>,
    rejected_placements: BTreeSet<Location>,
    substitutions: BTreeMap<Location, BlockState>,
}

impl GridWorld {
    /// Create a world with no dimensions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a world with a single overworld dimension whose regions
    /// within `loaded_radius` regions of the origin are loaded.
    ///
    /// # Errors
    ///
    /// Propagates [`WorldError`] from dimension registration.
    pub fn with_overworld(bounds: WorldBounds, loaded_radius: i32) -> Result<Self, WorldError> {
        let mut world = Self::new();
        world.add_dimension(DimensionId::OVERWORLD, bounds)?;
        world.load_area(DimensionId::OVERWORLD, BlockPos::default(), loaded_radius)?;
        Ok(world)
    }

    // -------------------------------------------------------------------
    // Dimensions and regions
    // -------------------------------------------------------------------

    /// Register a new, fully unloaded dimension.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateDimension`] if `id` already exists.
    pub fn add_dimension(&mut self, id: DimensionId, bounds: WorldBounds) -> Result<(), WorldError> {
        if self.dimensions.contains_key(&id) {
            return Err(WorldError::DuplicateDimension(id));
        }
        self.dimensions.insert(
            id,
            Dimension {
                bounds,
                ..Dimension::default()
            },
        );
        Ok(())
    }

    /// Mark one region as loaded.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DimensionNotFound`] for an unknown dimension.
    pub fn load_region(&mut self, dimension: DimensionId, region: (i32, i32)) -> Result<(), WorldError> {
        self.dimension_mut(dimension)?.loaded.insert(region);
        Ok(())
    }

    /// Mark one region as unloaded.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DimensionNotFound`] for an unknown dimension.
    pub fn unload_region(&mut self, dimension: DimensionId, region: (i32, i32)) -> Result<(), WorldError> {
        self.dimension_mut(dimension)?.loaded.remove(&region);
        Ok(())
    }

    /// Load every region within `radius` regions of the region containing
    /// `center`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DimensionNotFound`] for an unknown dimension.
    pub fn load_area(&mut self, dimension: DimensionId, center: BlockPos, radius: i32) -> Result<(), WorldError> {
        let (cx, cz) = region_of(center);
        let dim = self.dimension_mut(dimension)?;
        let radius = radius.max(0);
        for rx in cx.saturating_sub(radius)..=cx.saturating_add(radius) {
            for rz in cz.saturating_sub(radius)..=cz.saturating_add(radius) {
                dim.loaded.insert((rx, rz));
            }
        }
        Ok(())
    }

    fn dimension_mut(&mut self, id: DimensionId) -> Result<&mut Dimension, WorldError> {
        self.dimensions
            .get_mut(&id)
            .ok_or(WorldError::DimensionNotFound(id))
    }

    // -------------------------------------------------------------------
    // Terrain
    // -------------------------------------------------------------------

    /// Set (or clear with [`FluidSnapshot::EMPTY`]) the fluid at a location.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DimensionNotFound`] for an unknown dimension.
    pub fn set_fluid(&mut self, location: Location, fluid: FluidSnapshot) -> Result<(), WorldError> {
        let dim = self.dimension_mut(location.dimension)?;
        if fluid == FluidSnapshot::EMPTY {
            dim.fluids.remove(&location.pos);
        } else {
            dim.fluids.insert(location.pos, fluid);
        }
        Ok(())
    }

    /// Number of non-air blocks in a dimension.
    pub fn block_count(&self, dimension: DimensionId) -> usize {
        self.dimensions
            .get(&dimension)
            .map_or(0, |dim| dim.blocks.len())
    }

    /// Make every future placement at `location` fail.
    pub fn reject_placement_at(&mut self, location: Location) {
        self.rejected_placements.insert(location);
    }

    /// Make every future placement at `location` store `state` instead of
    /// the requested block.
    pub fn substitute_placement_at(&mut self, location: Location, state: BlockState) {
        self.substitutions.insert(location, state);
    }

    // -------------------------------------------------------------------
    // Entities
    // -------------------------------------------------------------------

    /// Add a free entity occupying `bounds`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DimensionNotFound`] for an unknown dimension.
    pub fn spawn_entity(&mut self, dimension: DimensionId, bounds: Aabb) -> Result<EntityHandle, WorldError> {
        if !self.dimensions.contains_key(&dimension) {
            return Err(WorldError::DimensionNotFound(dimension));
        }
        self.next_entity = self.next_entity.saturating_add(1);
        let handle = EntityHandle(self.next_entity);
        self.entities.insert(handle, Entity { dimension, bounds });
        Ok(handle)
    }

    /// Current bounds of an entity.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EntityNotFound`] for an unknown handle.
    pub fn entity_bounds(&self, entity: EntityHandle) -> Result<Aabb, WorldError> {
        self.entities
            .get(&entity)
            .map(|e| e.bounds)
            .ok_or(WorldError::EntityNotFound(entity))
    }

    /// Neighbor notifications queued but not yet drained.
    pub fn pending_neighbor_updates(&self) -> &[NeighborUpdate] {
        &self.neighbor_updates
    }

    fn queue_neighbor_updates(&mut self, source: Location) {
        for target in source.neighbors() {
            self.neighbor_updates.push(NeighborUpdate { target, source });
        }
    }
}

impl World for GridWorld {
    fn is_loaded(&self, location: Location) -> bool {
        self.dimensions
            .get(&location.dimension)
            .is_some_and(|dim| dim.loaded.contains(&region_of(location.pos)))
    }

    fn is_within_bounds(&self, location: Location) -> bool {
        self.dimensions
            .get(&location.dimension)
            .is_some_and(|dim| dim.bounds.contains(location.pos))
    }

    fn block_at(&self, location: Location) -> Option<BlockState> {
        self.dimensions
            .get(&location.dimension)
            .and_then(|dim| dim.blocks.get(&location.pos))
            .cloned()
    }

    fn place_block(&mut self, location: Location, state: BlockState) -> bool {
        if self.rejected_placements.contains(&location) {
            trace!(location = %location, "placement rejected");
            return false;
        }
        let stored = self.substitutions.get(&location).cloned().unwrap_or(state);
        let Some(dim) = self.dimensions.get_mut(&location.dimension) else {
            return false;
        };
        dim.blocks.insert(location.pos, stored);
        self.queue_neighbor_updates(location);
        true
    }

    fn remove_block(&mut self, location: Location) {
        let removed = self
            .dimensions
            .get_mut(&location.dimension)
            .and_then(|dim| dim.blocks.remove(&location.pos));
        if removed.is_some() {
            self.queue_neighbor_updates(location);
        }
    }

    fn fluid_at(&self, location: Location) -> FluidSnapshot {
        self.dimensions
            .get(&location.dimension)
            .and_then(|dim| dim.fluids.get(&location.pos))
            .copied()
            .unwrap_or(FluidSnapshot::EMPTY)
    }

    fn entities_in(&self, dimension: DimensionId, volume: &Aabb) -> Vec<EntityHandle> {
        self.entities
            .iter()
            .filter(|(_, e)| e.dimension == dimension && e.bounds.intersects(volume))
            .map(|(handle, _)| *handle)
            .collect()
    }

    fn displace_entity(&mut self, entity: EntityHandle, delta: Vec3) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.bounds = e.bounds.translated(delta);
        }
    }

    fn notify_neighbors(&mut self, location: Location) {
        self.queue_neighbor_updates(location);
    }

    fn drain_neighbor_updates(&mut self) -> Vec<NeighborUpdate> {
        std::mem::take(&mut self.neighbor_updates)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rover_types::{ActorFamily, Direction, FluidKind};

    use super::*;

    fn overworld() -> GridWorld {
        GridWorld::with_overworld(WorldBounds::new(64, 0, 128).unwrap(), 1).unwrap()
    }

    fn at(x: i32, y: i32, z: i32) -> Location {
        Location::new(DimensionId::OVERWORLD, BlockPos::new(x, y, z))
    }

    #[test]
    fn region_math_floors_negative_coordinates() {
        assert_eq!(region_of(BlockPos::new(0, 0, 0)), (0, 0));
        assert_eq!(region_of(BlockPos::new(15, 0, 15)), (0, 0));
        assert_eq!(region_of(BlockPos::new(16, 0, -1)), (1, -1));
        assert_eq!(region_of(BlockPos::new(-16, 0, -17)), (-1, -2));
    }

    #[test]
    fn invalid_bounds_rejected() {
        assert!(WorldBounds::new(-1, 0, 10).is_err());
        assert!(WorldBounds::new(10, 5, 5).is_err());
    }

    #[test]
    fn loaded_area_and_bounds() {
        let world = overworld();
        assert!(world.is_loaded(at(0, 10, 0)));
        assert!(world.is_loaded(at(-16, 10, 31)));
        assert!(!world.is_loaded(at(32, 10, 0)));
        assert!(world.is_within_bounds(at(64, 0, -64)));
        assert!(!world.is_within_bounds(at(65, 0, 0)));
        assert!(!world.is_within_bounds(at(0, 128, 0)));
        assert!(!world.is_loaded(Location::new(DimensionId(9), BlockPos::default())));
    }

    #[test]
    fn placing_and_removing_notifies_neighbors() {
        let mut world = overworld();
        let loc = at(1, 1, 1);
        assert!(world.place_block(loc, BlockState::solid("stone")));
        assert_eq!(world.block_at(loc), Some(BlockState::solid("stone")));
        assert_eq!(world.drain_neighbor_updates().len(), 6);

        world.remove_block(loc);
        assert_eq!(world.block_at(loc), None);
        let updates = world.drain_neighbor_updates();
        assert_eq!(updates.len(), 6);
        assert!(updates.iter().all(|u| u.source == loc));

        // Removing air is silent.
        world.remove_block(loc);
        assert!(world.pending_neighbor_updates().is_empty());
    }

    #[test]
    fn placement_hooks() {
        let mut world = overworld();
        let rejected = at(2, 2, 2);
        world.reject_placement_at(rejected);
        assert!(!world.place_block(rejected, BlockState::solid("stone")));
        assert_eq!(world.block_at(rejected), None);

        let swapped = at(3, 3, 3);
        world.substitute_placement_at(swapped, BlockState::solid("gravel"));
        let wanted = BlockState::actor(ActorFamily::Normal, Direction::North, false);
        assert!(world.place_block(swapped, wanted));
        assert_eq!(world.block_at(swapped), Some(BlockState::solid("gravel")));
    }

    #[test]
    fn fluids_default_to_empty() {
        let mut world = overworld();
        let loc = at(0, 5, 0);
        assert_eq!(world.fluid_at(loc), FluidSnapshot::EMPTY);
        world.set_fluid(loc, FluidSnapshot::WATER_SOURCE).unwrap();
        assert_eq!(world.fluid_at(loc).kind, FluidKind::Water);
        world.set_fluid(loc, FluidSnapshot::EMPTY).unwrap();
        assert_eq!(world.fluid_at(loc), FluidSnapshot::EMPTY);
    }

    #[test]
    fn entities_are_found_and_displaced() {
        let mut world = overworld();
        let bounds = Aabb::new(Vec3::new(0.2, 0.0, 0.2), Vec3::new(0.8, 1.8, 0.8));
        let handle = world.spawn_entity(DimensionId::OVERWORLD, bounds).unwrap();

        let cell = Aabb::block(BlockPos::new(0, 0, 0));
        assert_eq!(world.entities_in(DimensionId::OVERWORLD, &cell), vec![handle]);

        world.displace_entity(handle, Vec3::new(1.0, 0.0, 0.0));
        assert!(world.entities_in(DimensionId::OVERWORLD, &cell).is_empty());
        let moved = world.entity_bounds(handle).unwrap();
        assert!((moved.min.x - 1.2).abs() < 1e-9);
        assert!(world.spawn_entity(DimensionId(3), bounds).is_err());
    }
}
