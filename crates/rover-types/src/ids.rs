//! Type-safe identifier wrappers.
//!
//! Actor identities are UUID v7 so they sort by creation time and survive
//! relocation unchanged. Command ids, dimension ids and entity handles are
//! plain integers: they are only meaningful inside one actor, one world, or
//! one simulation run.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Stable identity of an actor's brain. Survives relocation.
    ActorId
}

/// Actor-scoped, monotonically increasing command identifier.
///
/// The first id an actor issues is `1`; ids are never reused and are not
/// comparable across actors.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct CommandId(pub u64);

impl CommandId {
    /// Return the raw counter value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for CommandId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one dimension (world) of the simulation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct DimensionId(pub u32);

impl DimensionId {
    /// The dimension actors are spawned into by default.
    pub const OVERWORLD: Self = Self(0);
}

impl core::fmt::Display for DimensionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "dim{}", self.0)
    }
}

/// Handle of a free-moving entity (not a block) inside a world.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct EntityHandle(pub u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_ids_are_unique() {
        let a = ActorId::new();
        let b = ActorId::new();
        assert_ne!(a, b);
        assert_ne!(a.into_inner(), Uuid::nil());
    }

    #[test]
    fn actor_id_serde_roundtrip() {
        let id = ActorId::new();
        let json = serde_json::to_string(&id).unwrap_or_default();
        let back: Result<ActorId, _> = serde_json::from_str(&json);
        assert_eq!(back.ok(), Some(id));
    }

    #[test]
    fn command_ids_order_by_counter() {
        assert!(CommandId(1) < CommandId(2));
        assert_eq!(CommandId(16).get(), 16);
        assert_eq!(CommandId(3).to_string(), "3");
    }
}
