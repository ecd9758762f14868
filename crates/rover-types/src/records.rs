//! Persistence and description records for actor state.
//!
//! The same [`ActorRecord`] shape serves two purposes:
//!
//! - **Saved state** -- durable storage: the common fields plus the
//!   selected slot, owner and inventory.
//! - **Description** -- lightweight sync to observers: the common fields
//!   plus the current animation ordinal and progress.
//!
//! Fields that do not apply to a flavour are left as `None`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::structs::Inventory;

/// Owner identity as stored: two 64-bit halves plus a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OwnerRecord {
    /// Most significant half of the owner id.
    pub upper_id: u64,
    /// Least significant half of the owner id.
    pub lower_id: u64,
    /// Display name.
    pub name: String,
}

/// Serialized snapshot of an actor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActorRecord {
    /// Stored fuel level.
    pub fuel: u32,
    /// Cosmetic colour (`0xRRGGBB`), absent when undyed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<u32>,
    /// Cosmetic overlay identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<String>,
    /// Identifier of the left upgrade.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_upgrade: Option<String>,
    /// Attached data of the left upgrade.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_upgrade_data: Option<Value>,
    /// Identifier of the right upgrade.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_upgrade: Option<String>,
    /// Attached data of the right upgrade.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_upgrade_data: Option<Value>,
    /// Selected inventory slot (saved state only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_slot: Option<u32>,
    /// Owning principal (saved state only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerRecord>,
    /// Inventory contents (saved state only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Inventory>,
    /// Animation ordinal (description only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<u8>,
    /// Animation progress in ticks (description only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_progress: Option<u32>,
}
