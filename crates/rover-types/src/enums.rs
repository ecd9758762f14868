//! Enumeration types shared across the Rover workspace.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Directions and sides
// ---------------------------------------------------------------------------

/// One of the six axis-aligned directions of the block grid.
///
/// Actors only ever face one of the four horizontal directions; `Up` and
/// `Down` appear as movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Negative Y.
    Down,
    /// Positive Y.
    Up,
    /// Negative Z.
    North,
    /// Positive Z.
    South,
    /// Negative X.
    West,
    /// Positive X.
    East,
}

impl Direction {
    /// Unit offset `(dx, dy, dz)` of this direction.
    pub const fn offset(self) -> (i32, i32, i32) {
        match self {
            Self::Down => (0, -1, 0),
            Self::Up => (0, 1, 0),
            Self::North => (0, 0, -1),
            Self::South => (0, 0, 1),
            Self::West => (-1, 0, 0),
            Self::East => (1, 0, 0),
        }
    }

    /// The direction pointing the other way.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Down => Self::Up,
            Self::Up => Self::Down,
            Self::North => Self::South,
            Self::South => Self::North,
            Self::West => Self::East,
            Self::East => Self::West,
        }
    }

    /// Rotate a quarter turn counter-clockwise (seen from above).
    ///
    /// Vertical directions are returned unchanged.
    pub const fn rotate_left(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
            Self::East => Self::North,
            vertical @ (Self::Up | Self::Down) => vertical,
        }
    }

    /// Rotate a quarter turn clockwise (seen from above).
    ///
    /// Vertical directions are returned unchanged.
    pub const fn rotate_right(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
            vertical @ (Self::Up | Self::Down) => vertical,
        }
    }

    /// Whether this is one of the four horizontal directions.
    pub const fn is_horizontal(self) -> bool {
        !matches!(self, Self::Up | Self::Down)
    }

    /// Yaw in degrees for a horizontal facing (south = 0, west = 90,
    /// north = 180, east = 270). Vertical directions map to 0.
    pub const fn yaw_degrees(self) -> f32 {
        match self {
            Self::South | Self::Up | Self::Down => 0.0,
            Self::West => 90.0,
            Self::North => 180.0,
            Self::East => 270.0,
        }
    }
}

/// One of the two attachment sides of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Left-hand attachment.
    Left,
    /// Right-hand attachment.
    Right,
}

impl Side {
    /// Both sides, left first.
    pub const ALL: [Self; 2] = [Self::Left, Self::Right];
}

// ---------------------------------------------------------------------------
// Animation
// ---------------------------------------------------------------------------

/// The animation an actor is currently playing.
///
/// The declaration order is the persisted ordinal (see
/// [`AnimationKind::ordinal`]); do not reorder.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    /// Idle. Commands may execute.
    #[default]
    None,
    /// Sliding into the block in front.
    MoveForward,
    /// Sliding into the block behind.
    MoveBack,
    /// Sliding into the block above.
    MoveUp,
    /// Sliding into the block below.
    MoveDown,
    /// Quarter turn counter-clockwise.
    TurnLeft,
    /// Quarter turn clockwise.
    TurnRight,
    /// Swinging the tool on the left side.
    SwingLeftTool,
    /// Swinging the tool on the right side.
    SwingRightTool,
    /// Full-length pause.
    Wait,
    /// Half-length pause.
    ShortWait,
}

impl AnimationKind {
    /// All kinds in ordinal order.
    pub const ALL: [Self; 11] = [
        Self::None,
        Self::MoveForward,
        Self::MoveBack,
        Self::MoveUp,
        Self::MoveDown,
        Self::TurnLeft,
        Self::TurnRight,
        Self::SwingLeftTool,
        Self::SwingRightTool,
        Self::Wait,
        Self::ShortWait,
    ];

    /// Persisted ordinal of this kind.
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::None => 0,
            Self::MoveForward => 1,
            Self::MoveBack => 2,
            Self::MoveUp => 3,
            Self::MoveDown => 4,
            Self::TurnLeft => 5,
            Self::TurnRight => 6,
            Self::SwingLeftTool => 7,
            Self::SwingRightTool => 8,
            Self::Wait => 9,
            Self::ShortWait => 10,
        }
    }

    /// Inverse of [`AnimationKind::ordinal`]. Unknown ordinals yield `None`.
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.ordinal() == ordinal)
    }

    /// Whether this is one of the four movement animations.
    pub const fn is_movement(self) -> bool {
        matches!(
            self,
            Self::MoveForward | Self::MoveBack | Self::MoveUp | Self::MoveDown
        )
    }

    /// Whether this is a pause animation (`Wait` or `ShortWait`).
    pub const fn is_wait(self) -> bool {
        matches!(self, Self::Wait | Self::ShortWait)
    }

    /// Direction of travel for a movement animation given the actor's facing.
    pub const fn movement_direction(self, facing: Direction) -> Option<Direction> {
        match self {
            Self::MoveForward => Some(facing),
            Self::MoveBack => Some(facing.opposite()),
            Self::MoveUp => Some(Direction::Up),
            Self::MoveDown => Some(Direction::Down),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Actor classification
// ---------------------------------------------------------------------------

/// The family (tier) an actor belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum ActorFamily {
    /// Standard actor.
    #[default]
    Normal,
    /// Advanced actor with a larger fuel tank.
    Advanced,
    /// Operator-controlled actor that never needs fuel.
    Command,
}

impl ActorFamily {
    /// Whether actors of this family are exempt from fuel accounting.
    pub const fn is_fuel_exempt(self) -> bool {
        matches!(self, Self::Command)
    }
}

/// Whether an actor instance is the live, authoritative one or a
/// presentation-only mirror fed from description records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Authority {
    /// Live instance. All mutators are allowed.
    #[default]
    Server,
    /// Read-only mirror. Mutators are rejected.
    Mirror,
}

/// Relocation status of one placed actor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum MoveState {
    /// Normal. Reacts to neighbor changes.
    #[default]
    NotMoved,
    /// A relocation attempt is running. Neighbor reactions are inhibited.
    InProgress,
    /// The state has been transferred elsewhere. Final.
    Moved,
}

// ---------------------------------------------------------------------------
// Fluids
// ---------------------------------------------------------------------------

/// Fluid occupying a block position.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum FluidKind {
    /// No fluid.
    #[default]
    Empty,
    /// Water.
    Water,
    /// Lava.
    Lava,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotations_are_inverse() {
        for dir in [Direction::North, Direction::East, Direction::South, Direction::West] {
            assert_eq!(dir.rotate_left().rotate_right(), dir);
            assert_eq!(dir.rotate_right().rotate_right().rotate_right().rotate_right(), dir);
        }
        assert_eq!(Direction::Up.rotate_left(), Direction::Up);
    }

    #[test]
    fn opposite_offsets_cancel() {
        for dir in [
            Direction::Down,
            Direction::Up,
            Direction::North,
            Direction::South,
            Direction::West,
            Direction::East,
        ] {
            let (ax, ay, az) = dir.offset();
            let (bx, by, bz) = dir.opposite().offset();
            assert_eq!((bx, by, bz), (ax.saturating_neg(), ay.saturating_neg(), az.saturating_neg()));
        }
    }

    #[test]
    fn animation_ordinals_roundtrip() {
        for kind in AnimationKind::ALL {
            assert_eq!(AnimationKind::from_ordinal(kind.ordinal()), Some(kind));
        }
        assert_eq!(AnimationKind::from_ordinal(11), None);
    }

    #[test]
    fn movement_direction_follows_facing() {
        assert_eq!(
            AnimationKind::MoveForward.movement_direction(Direction::East),
            Some(Direction::East)
        );
        assert_eq!(
            AnimationKind::MoveBack.movement_direction(Direction::East),
            Some(Direction::West)
        );
        assert_eq!(AnimationKind::TurnLeft.movement_direction(Direction::East), None);
    }

    #[test]
    fn only_command_family_is_fuel_exempt() {
        assert!(!ActorFamily::Normal.is_fuel_exempt());
        assert!(!ActorFamily::Advanced.is_fuel_exempt());
        assert!(ActorFamily::Command.is_fuel_exempt());
    }
}
