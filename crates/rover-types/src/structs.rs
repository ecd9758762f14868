//! Core value structs: positions, volumes, fluids, identities, inventory.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::enums::{Direction, FluidKind};
use crate::ids::DimensionId;

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// Integer block coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct BlockPos {
    /// East-west axis.
    pub x: i32,
    /// Vertical axis.
    pub y: i32,
    /// North-south axis.
    pub z: i32,
}

impl BlockPos {
    /// Construct a position from its components.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The neighboring position one step in `dir`.
    ///
    /// Saturates at the coordinate limits; the world border rejects those
    /// positions long before they are reachable.
    pub const fn offset(self, dir: Direction) -> Self {
        let (dx, dy, dz) = dir.offset();
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            z: self.z.saturating_add(dz),
        }
    }

    /// Minimum corner of this block as a floating-point vector.
    pub fn corner(self) -> Vec3 {
        Vec3::new(f64::from(self.x), f64::from(self.y), f64::from(self.z))
    }
}

impl core::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A block position inside a specific dimension.
///
/// Actor identity in the world is tied to its `Location`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct Location {
    /// The dimension the position lives in.
    pub dimension: DimensionId,
    /// The block position.
    pub pos: BlockPos,
}

impl Location {
    /// Construct a location.
    pub const fn new(dimension: DimensionId, pos: BlockPos) -> Self {
        Self { dimension, pos }
    }

    /// The neighboring location one step in `dir`, same dimension.
    pub const fn offset(self, dir: Direction) -> Self {
        Self {
            dimension: self.dimension,
            pos: self.pos.offset(dir),
        }
    }

    /// All six face-adjacent neighbors.
    pub const fn neighbors(self) -> [Self; 6] {
        [
            self.offset(Direction::Down),
            self.offset(Direction::Up),
            self.offset(Direction::North),
            self.offset(Direction::South),
            self.offset(Direction::West),
            self.offset(Direction::East),
        ]
    }
}

impl core::fmt::Display for Location {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}@{}", self.pos, self.dimension)
    }
}

// ---------------------------------------------------------------------------
// Continuous space
// ---------------------------------------------------------------------------

/// Floating-point 3D vector used for entity displacement and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Construct a vector from components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The unit vector of a grid direction, scaled by `scale`.
    pub fn along(dir: Direction, scale: f64) -> Self {
        let (dx, dy, dz) = dir.offset();
        Self {
            x: f64::from(dx) * scale,
            y: f64::from(dy) * scale,
            z: f64::from(dz) * scale,
        }
    }

    /// Component-wise sum.
    pub fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Construct a box from its corners.
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// The unit cube occupied by a block.
    pub fn block(pos: BlockPos) -> Self {
        let min = pos.corner();
        Self {
            min,
            max: min.add(Vec3::new(1.0, 1.0, 1.0)),
        }
    }

    /// Whether the two boxes overlap with non-zero volume.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// This box moved by `delta`.
    pub fn translated(&self, delta: Vec3) -> Self {
        Self {
            min: self.min.add(delta),
            max: self.max.add(delta),
        }
    }
}

// ---------------------------------------------------------------------------
// Fluids
// ---------------------------------------------------------------------------

/// Snapshot of the fluid at one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FluidSnapshot {
    /// Fluid kind, `Empty` when dry.
    pub kind: FluidKind,
    /// Whether the fluid is a still source rather than flowing.
    pub is_source: bool,
}

impl FluidSnapshot {
    /// A dry position.
    pub const EMPTY: Self = Self {
        kind: FluidKind::Empty,
        is_source: false,
    };

    /// A still water source.
    pub const WATER_SOURCE: Self = Self {
        kind: FluidKind::Water,
        is_source: true,
    };

    /// Whether this is a still water source.
    pub const fn is_water_source(&self) -> bool {
        matches!(self.kind, FluidKind::Water) && self.is_source
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The principal that owns an actor. Purely informational.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OwnerIdentity {
    /// Stable principal id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
}

impl OwnerIdentity {
    /// Construct an identity.
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Rebuild an identity from its two 64-bit halves.
    pub fn from_parts(upper: u64, lower: u64, name: impl Into<String>) -> Self {
        Self::new(Uuid::from_u64_pair(upper, lower), name)
    }

    /// The two 64-bit halves of the id, most significant first.
    pub fn parts(&self) -> (u64, u64) {
        self.id.as_u64_pair()
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// A stack of identical items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ItemStack {
    /// Item identifier.
    pub item: String,
    /// Number of items in the stack.
    pub count: u32,
}

/// Fixed-size slot container owned exclusively by one actor.
///
/// The command core treats it as opaque: it is sized, indexed and moved
/// wholesale during relocation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Inventory {
    /// Slot contents; `None` is an empty slot.
    slots: Vec<Option<ItemStack>>,
}

impl Inventory {
    /// An empty inventory with `size` slots.
    pub fn with_size(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    /// Number of slots.
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Contents of a slot, `None` when empty or out of range.
    pub fn get(&self, slot: usize) -> Option<&ItemStack> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Replace a slot's contents, returning what was there.
    ///
    /// Out-of-range slots are ignored and return `None`.
    pub fn set(&mut self, slot: usize, stack: Option<ItemStack>) -> Option<ItemStack> {
        self.slots
            .get_mut(slot)
            .and_then(|current| core::mem::replace(current, stack))
    }

    /// Whether every slot is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}
