//! Side attachments (upgrades) and the peripherals they expose.
//!
//! An actor has two sides. Each side holds at most one [`Upgrade`] plus an
//! optional JSON data blob owned by that upgrade. Upgrades that provide a
//! peripheral derive a [`Peripheral`] object the scripting layer can call.
//!
//! Whenever either side changes, peripherals are re-derived for *both*
//! sides. A freshly derived peripheral that is [`Peripheral::same_as`] the
//! cached one is discarded and the cached instance kept, so scripts holding
//! the old reference see no churn.
//!
//! Installing an upgrade that is [`Upgrade::same_as`] the current one is a
//! no-op. By default upgrades compare by [`Upgrade::id`]; configurable
//! kinds also compare their settings.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use rover_types::{ActorId, Side};
use serde_json::{Map, Value};
use tracing::debug;

/// Behaviour shared by every upgrade kind.
pub trait Upgrade: core::fmt::Debug + Send + Sync {
    /// Stable identifier, persisted in records.
    fn id(&self) -> &str;

    /// Whether this upgrade exposes a peripheral to scripts.
    fn provides_peripheral(&self) -> bool {
        false
    }

    /// Build the peripheral for `actor` on `side`.
    fn derive_peripheral(&self, _actor: ActorId, _side: Side) -> Option<Arc<dyn Peripheral>> {
        None
    }

    /// Whether this upgrade can be swung as a tool.
    fn is_tool(&self) -> bool {
        false
    }

    /// Per-tick hook.
    fn update(&self, _tick: &mut UpgradeTick<'_>) {}

    /// Structural equality with another upgrade.
    fn same_as(&self, other: &dyn Upgrade) -> bool {
        self.id() == other.id()
    }

    /// Downcasting support for [`Upgrade::same_as`].
    fn as_any(&self) -> &dyn Any;
}

/// A script-visible capability derived from an upgrade.
pub trait Peripheral: core::fmt::Debug + Send + Sync {
    /// Peripheral type name as seen by scripts.
    fn kind(&self) -> &str;

    /// Structural equality with another peripheral.
    fn same_as(&self, other: &dyn Peripheral) -> bool;

    /// Downcasting support for [`Peripheral::same_as`].
    fn as_any(&self) -> &dyn Any;
}

/// What an upgrade sees during its per-tick hook.
#[derive(Debug)]
pub struct UpgradeTick<'a> {
    /// The actor the upgrade is installed on.
    pub actor: ActorId,
    /// The side it is installed on.
    pub side: Side,
    /// The side's data blob, created on demand.
    pub data: &'a mut Map<String, Value>,
}

/// Everything installed on one side.
#[derive(Debug, Clone, Default)]
struct SideSlot {
    upgrade: Option<Arc<dyn Upgrade>>,
    data: Option<Map<String, Value>>,
    peripheral: Option<Arc<dyn Peripheral>>,
}

/// Upgrades installed on an actor's two sides.
#[derive(Debug, Clone, Default)]
pub struct UpgradeSlots {
    left: SideSlot,
    right: SideSlot,
    derivations: u64,
}

impl UpgradeSlots {
    /// No upgrades on either side.
    pub fn new() -> Self {
        Self::default()
    }

    const fn slot(&self, side: Side) -> &SideSlot {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    const fn slot_mut(&mut self, side: Side) -> &mut SideSlot {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// The upgrade on `side`, if any.
    pub fn upgrade(&self, side: Side) -> Option<&Arc<dyn Upgrade>> {
        self.slot(side).upgrade.as_ref()
    }

    /// The cached peripheral on `side`, if any.
    pub fn peripheral(&self, side: Side) -> Option<&Arc<dyn Peripheral>> {
        self.slot(side).peripheral.as_ref()
    }

    /// The data blob of `side`, if one exists.
    pub fn data(&self, side: Side) -> Option<&Map<String, Value>> {
        self.slot(side).data.as_ref()
    }

    /// The data blob of `side`, created empty if missing.
    pub fn data_mut(&mut self, side: Side) -> &mut Map<String, Value> {
        self.slot_mut(side).data.get_or_insert_with(Map::new)
    }

    /// Replace the data blob of `side` wholesale.
    pub fn set_data(&mut self, side: Side, data: Option<Map<String, Value>>) {
        self.slot_mut(side).data = data;
    }

    /// How many times peripherals have been re-derived.
    pub const fn derivation_count(&self) -> u64 {
        self.derivations
    }

    /// Install (or with `None`, remove) the upgrade on `side`.
    ///
    /// Returns `false` when `upgrade` equals the installed one and nothing
    /// changed. Otherwise the side's data blob is cleared and peripherals
    /// are re-derived for both sides.
    pub fn set_upgrade(&mut self, actor: ActorId, side: Side, upgrade: Option<Arc<dyn Upgrade>>) -> bool {
        let unchanged = match (self.upgrade(side), upgrade.as_ref()) {
            (None, None) => true,
            (Some(current), Some(next)) => current.same_as(next.as_ref()),
            _ => false,
        };
        if unchanged {
            return false;
        }
        let slot = self.slot_mut(side);
        slot.data = None;
        slot.upgrade = upgrade;
        self.rederive(actor);
        true
    }

    /// Re-derive both sides' peripherals, keeping equal cached instances.
    pub fn rederive(&mut self, actor: ActorId) {
        for side in Side::ALL {
            let slot = self.slot_mut(side);
            let derived = slot
                .upgrade
                .as_ref()
                .filter(|upgrade| upgrade.provides_peripheral())
                .and_then(|upgrade| upgrade.derive_peripheral(actor, side));
            slot.peripheral = match (slot.peripheral.take(), derived) {
                (Some(cached), Some(fresh)) if cached.same_as(fresh.as_ref()) => Some(cached),
                (_, fresh) => fresh,
            };
        }
        self.derivations = self.derivations.saturating_add(1);
        debug!(actor = %actor, derivations = self.derivations, "peripherals re-derived");
    }

    /// Run every installed upgrade's per-tick hook.
    ///
    /// Returns whether any side's data blob changed.
    pub fn update(&mut self, actor: ActorId) -> bool {
        let mut changed = false;
        for side in Side::ALL {
            let Some(upgrade) = self.upgrade(side).cloned() else {
                continue;
            };
            let before = self.data(side).cloned();
            let mut tick = UpgradeTick {
                actor,
                side,
                data: self.data_mut(side),
            };
            upgrade.update(&mut tick);
            changed |= before.as_ref() != self.data(side);
        }
        changed
    }
}

/// Lookup table from upgrade id to upgrade instance.
#[derive(Debug, Clone, Default)]
pub struct UpgradeRegistry {
    upgrades: BTreeMap<String, Arc<dyn Upgrade>>,
}

impl UpgradeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in tool and sensor upgrades.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(crate::builtin::ToolUpgrade));
        registry.register(Arc::new(crate::builtin::SensorUpgrade::default()));
        registry
    }

    /// Add (or replace) an upgrade under its id.
    pub fn register(&mut self, upgrade: Arc<dyn Upgrade>) {
        self.upgrades.insert(upgrade.id().to_owned(), upgrade);
    }

    /// Resolve an id.
    pub fn get(&self, id: &str) -> Option<Arc<dyn Upgrade>> {
        self.upgrades.get(id).cloned()
    }

    /// Registered ids in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.upgrades.keys().map(String::as_str)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::builtin::{SensorUpgrade, ToolUpgrade};

    fn sensor(range: u32) -> Arc<dyn Upgrade> {
        Arc::new(SensorUpgrade { range })
    }

    #[test]
    fn empty_sides_return_nothing() {
        let slots = UpgradeSlots::new();
        for side in Side::ALL {
            assert!(slots.upgrade(side).is_none());
            assert!(slots.peripheral(side).is_none());
            assert!(slots.data(side).is_none());
        }
    }

    #[test]
    fn setting_the_same_upgrade_twice_derives_once() {
        let actor = ActorId::new();
        let mut slots = UpgradeSlots::new();
        assert!(slots.set_upgrade(actor, Side::Left, Some(sensor(8))));
        assert_eq!(slots.derivation_count(), 1);
        let first = Arc::clone(slots.peripheral(Side::Left).unwrap());

        // Equal descriptor, distinct instance.
        assert!(!slots.set_upgrade(actor, Side::Left, Some(sensor(8))));
        assert_eq!(slots.derivation_count(), 1);
        assert!(Arc::ptr_eq(slots.peripheral(Side::Left).unwrap(), &first));
    }

    #[test]
    fn differently_configured_upgrade_replaces_installed_one() {
        let actor = ActorId::new();
        let mut slots = UpgradeSlots::new();
        slots.set_upgrade(actor, Side::Left, Some(sensor(8)));
        slots.data_mut(Side::Left).insert(String::from("ticks"), Value::from(3));
        let wide = Arc::clone(slots.peripheral(Side::Left).unwrap());

        assert!(slots.set_upgrade(actor, Side::Left, Some(sensor(2))));
        assert_eq!(slots.derivation_count(), 2);
        assert!(slots.data(Side::Left).is_none());
        let narrow = slots.peripheral(Side::Left).unwrap();
        assert!(!Arc::ptr_eq(narrow, &wide));
        let range = narrow
            .as_any()
            .downcast_ref::<crate::builtin::SensorPeripheral>()
            .map(|p| p.range);
        assert_eq!(range, Some(2));
    }

    #[test]
    fn equal_rederivation_keeps_cached_peripheral() {
        let actor = ActorId::new();
        let mut slots = UpgradeSlots::new();
        slots.set_upgrade(actor, Side::Left, Some(sensor(8)));
        let cached = Arc::clone(slots.peripheral(Side::Left).unwrap());

        // Changing the other side re-derives both.
        assert!(slots.set_upgrade(actor, Side::Right, Some(Arc::new(ToolUpgrade))));
        assert_eq!(slots.derivation_count(), 2);
        assert!(Arc::ptr_eq(slots.peripheral(Side::Left).unwrap(), &cached));
        assert!(slots.peripheral(Side::Right).is_none());
    }

    #[test]
    fn changing_upgrade_clears_data() {
        let actor = ActorId::new();
        let mut slots = UpgradeSlots::new();
        slots.set_upgrade(actor, Side::Right, Some(sensor(8)));
        slots.data_mut(Side::Right).insert(String::from("k"), Value::from(1));
        assert!(slots.data(Side::Right).is_some());

        slots.set_upgrade(actor, Side::Right, Some(Arc::new(ToolUpgrade)));
        assert!(slots.data(Side::Right).is_none());

        slots.set_upgrade(actor, Side::Right, None);
        assert!(slots.upgrade(Side::Right).is_none());
        assert_eq!(slots.derivation_count(), 3);
    }

    #[test]
    fn update_runs_hooks_with_data() {
        let actor = ActorId::new();
        let mut slots = UpgradeSlots::new();
        slots.set_upgrade(actor, Side::Left, Some(sensor(4)));
        assert!(slots.update(actor));
        assert!(slots.update(actor));
        let ticks = slots.data(Side::Left).and_then(|d| d.get("ticks")).and_then(Value::as_u64);
        assert_eq!(ticks, Some(2));
    }

    #[test]
    fn hooks_that_leave_data_alone_report_no_change() {
        let actor = ActorId::new();
        let mut slots = UpgradeSlots::new();
        assert!(!slots.update(actor));
        slots.set_upgrade(actor, Side::Right, Some(Arc::new(ToolUpgrade)));
        slots.set_data(Side::Right, Some(Map::new()));
        assert!(!slots.update(actor));
    }

    #[test]
    fn registry_resolves_builtins() {
        let registry = UpgradeRegistry::with_builtins();
        assert!(registry.get("tool").is_some_and(|u| u.is_tool()));
        assert!(registry.get("sensor").is_some_and(|u| u.provides_peripheral()));
        assert!(registry.get("laser").is_none());
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["sensor", "tool"]);
    }
}
