//! The actor aggregate.
//!
//! An [`Actor`] owns exactly one command queue, animation state, fuel
//! ledger and set of upgrade slots, plus its owner, selected slot,
//! cosmetics, facing, inventory and (optionally) the script host its
//! completions are delivered to.
//!
//! # Authority
//!
//! Only the live, [`Authority::Server`] instance may be mutated. A
//! [`Authority::Mirror`] is fed exclusively by
//! [`Actor::import_description`]; every mutator on it fails with
//! [`BrainError::NotAuthoritative`]. Once an actor has been taken out of
//! the world its mutators fail with [`BrainError::Removed`].
//!
//! # Records
//!
//! [`Actor::export_state`] / [`Actor::import_state`] cover durable state.
//! [`Actor::export_description`] / [`Actor::import_description`] cover the
//! lightweight observer sync, which adds the animation and drops owner,
//! slot and inventory. Any observer-visible change raises the description
//! dirty flag that [`Actor::take_description`] clears.

use std::sync::Arc;

use rover_types::{
    ActorFamily, ActorId, ActorRecord, AnimationKind, Authority, CommandId, CommandResult,
    Direction, Inventory, OwnerIdentity, OwnerRecord, Side,
};
use serde_json::{Map, Value};
use tracing::warn;

use crate::animation::AnimationState;
use crate::bridge::{self, PendingCall, ScriptHost};
use crate::command::Command;
use crate::config::BrainConfig;
use crate::error::BrainError;
use crate::fuel::FuelLedger;
use crate::queue::{CommandEntry, CommandQueue};
use crate::upgrade::{Peripheral, Upgrade, UpgradeRegistry, UpgradeSlots};

/// Largest accepted colour value (`0xRRGGBB`).
pub const MAX_COLOUR: u32 = 0x00FF_FFFF;

/// One robot actor.
#[derive(Debug)]
pub struct Actor {
    id: ActorId,
    family: ActorFamily,
    authority: Authority,
    facing: Direction,
    queue: CommandQueue,
    animation: AnimationState,
    fuel: FuelLedger,
    upgrades: UpgradeSlots,
    owner: Option<OwnerIdentity>,
    selected_slot: usize,
    colour: Option<u32>,
    overlay: Option<String>,
    inventory: Inventory,
    host: Option<Box<dyn ScriptHost>>,
    description_dirty: bool,
    removed: bool,
}

impl Actor {
    /// A fresh, authoritative actor facing north with an empty tank.
    pub fn new(family: ActorFamily, config: &BrainConfig) -> Self {
        Self::with_authority(ActorId::new(), family, Authority::Server, config)
    }

    /// A presentation-only mirror of actor `id`.
    pub fn mirror(id: ActorId, family: ActorFamily, config: &BrainConfig) -> Self {
        Self::with_authority(id, family, Authority::Mirror, config)
    }

    fn with_authority(id: ActorId, family: ActorFamily, authority: Authority, config: &BrainConfig) -> Self {
        Self {
            id,
            family,
            authority,
            facing: Direction::North,
            queue: CommandQueue::new(config.queue_capacity),
            animation: AnimationState::new(config.animation_duration),
            fuel: FuelLedger::new(config.fuel_limit_for(family), config.fuel_required_for(family)),
            upgrades: UpgradeSlots::new(),
            owner: None,
            selected_slot: 0,
            colour: None,
            overlay: None,
            inventory: Inventory::with_size(config.inventory_size),
            host: None,
            description_dirty: false,
            removed: false,
        }
    }

    /// Builder: set the initial facing.
    #[must_use]
    pub const fn facing_towards(mut self, facing: Direction) -> Self {
        self.facing = facing;
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Stable identity. Survives relocation.
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Actor family.
    pub const fn family(&self) -> ActorFamily {
        self.family
    }

    /// Whether this is the live or a mirror instance.
    pub const fn authority(&self) -> Authority {
        self.authority
    }

    /// Whether mutators are allowed.
    pub const fn is_authoritative(&self) -> bool {
        matches!(self.authority, Authority::Server) && !self.removed
    }

    /// Whether the actor was taken out of the world.
    pub const fn is_removed(&self) -> bool {
        self.removed
    }

    pub(crate) const fn mark_removed(&mut self) {
        self.removed = true;
    }

    /// Horizontal facing.
    pub const fn facing(&self) -> Direction {
        self.facing
    }

    /// Pending commands.
    pub const fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    /// Animation state.
    pub const fn animation(&self) -> &AnimationState {
        &self.animation
    }

    /// Fuel ledger.
    pub const fn fuel(&self) -> &FuelLedger {
        &self.fuel
    }

    /// Current fuel level.
    pub const fn fuel_level(&self) -> u32 {
        self.fuel.level()
    }

    /// Upgrade slots.
    pub const fn upgrades(&self) -> &UpgradeSlots {
        &self.upgrades
    }

    /// Upgrade installed on `side`.
    pub fn upgrade(&self, side: Side) -> Option<&Arc<dyn Upgrade>> {
        self.upgrades.upgrade(side)
    }

    /// Peripheral exposed on `side`.
    pub fn peripheral(&self, side: Side) -> Option<&Arc<dyn Peripheral>> {
        self.upgrades.peripheral(side)
    }

    /// Owning principal.
    pub const fn owner(&self) -> Option<&OwnerIdentity> {
        self.owner.as_ref()
    }

    /// Selected inventory slot.
    pub const fn selected_slot(&self) -> usize {
        self.selected_slot
    }

    /// Cosmetic colour.
    pub const fn colour(&self) -> Option<u32> {
        self.colour
    }

    /// Cosmetic overlay.
    pub fn overlay(&self) -> Option<&str> {
        self.overlay.as_deref()
    }

    /// Inventory.
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Whether observers have not yet seen the latest description.
    pub const fn description_dirty(&self) -> bool {
        self.description_dirty
    }

    // -----------------------------------------------------------------------
    // Script host
    // -----------------------------------------------------------------------

    /// Attach the script host and expose the current peripherals to it.
    pub fn attach_host(&mut self, mut host: Box<dyn ScriptHost>) {
        for side in Side::ALL {
            host.attach_peripheral(side, self.upgrades.peripheral(side).cloned());
        }
        self.host = Some(host);
    }

    /// Detach and return the script host.
    pub fn detach_host(&mut self) -> Option<Box<dyn ScriptHost>> {
        self.host.take()
    }

    /// The attached script host.
    pub fn host_mut(&mut self) -> Option<&mut (dyn ScriptHost + 'static)> {
        self.host.as_deref_mut()
    }

    /// Submit a command and return the token its caller suspends on.
    pub fn execute(&mut self, command: Box<dyn Command>) -> Result<PendingCall, BrainError> {
        self.ensure_authoritative("execute")?;
        let id = self.queue.enqueue(command)?;
        Ok(PendingCall::new(id))
    }

    /// Deliver the result of command `id` to the script host.
    ///
    /// Returns `false` if no host is attached and the completion was dropped.
    pub fn complete(&mut self, id: CommandId, result: CommandResult) -> bool {
        bridge::complete(self.host.as_deref_mut().map(|h| h as &mut dyn ScriptHost), id, result)
    }

    // -----------------------------------------------------------------------
    // Mutators
    // -----------------------------------------------------------------------

    const fn ensure_authoritative(&self, operation: &'static str) -> Result<(), BrainError> {
        if self.removed {
            Err(BrainError::Removed {
                actor: self.id,
                operation,
            })
        } else if self.is_authoritative() {
            Ok(())
        } else {
            Err(BrainError::NotAuthoritative { operation })
        }
    }

    /// Add `max(amount, 0)` fuel, clamped at the limit.
    pub fn add_fuel(&mut self, amount: i32) -> Result<(), BrainError> {
        self.ensure_authoritative("add_fuel")?;
        let before = self.fuel.level();
        self.fuel.add(amount);
        self.description_dirty |= before != self.fuel.level();
        Ok(())
    }

    /// Consume fuel; `Ok(false)` when there is not enough.
    pub fn consume_fuel(&mut self, amount: i32) -> Result<bool, BrainError> {
        self.ensure_authoritative("consume_fuel")?;
        let before = self.fuel.level();
        let consumed = self.fuel.consume(amount);
        self.description_dirty |= before != self.fuel.level();
        Ok(consumed)
    }

    /// Overwrite the fuel level, clamped to the limit.
    pub fn set_fuel_level(&mut self, level: u32) -> Result<(), BrainError> {
        self.ensure_authoritative("set_fuel_level")?;
        self.fuel.set_level(level);
        self.description_dirty = true;
        Ok(())
    }

    /// Start an animation. Fails if one is already playing.
    pub fn start_animation(&mut self, kind: AnimationKind) -> Result<(), BrainError> {
        self.ensure_authoritative("start_animation")?;
        self.animation.start(kind)?;
        self.description_dirty = true;
        Ok(())
    }

    /// Change the facing.
    pub fn set_facing(&mut self, facing: Direction) -> Result<(), BrainError> {
        self.ensure_authoritative("set_facing")?;
        self.facing = facing;
        Ok(())
    }

    /// Select an inventory slot. Out-of-range slots are ignored (`Ok(false)`).
    pub fn set_selected_slot(&mut self, slot: usize) -> Result<bool, BrainError> {
        self.ensure_authoritative("set_selected_slot")?;
        if slot >= self.inventory.size() {
            return Ok(false);
        }
        self.selected_slot = slot;
        Ok(true)
    }

    /// Set the colour. Values above `0xFFFFFF` clear it.
    pub fn set_colour(&mut self, colour: Option<u32>) -> Result<(), BrainError> {
        self.ensure_authoritative("set_colour")?;
        self.apply_colour(colour);
        Ok(())
    }

    fn apply_colour(&mut self, colour: Option<u32>) {
        let colour = colour.filter(|c| *c <= MAX_COLOUR);
        if colour != self.colour {
            self.colour = colour;
            self.description_dirty = true;
        }
    }

    /// Set the overlay.
    pub fn set_overlay(&mut self, overlay: Option<String>) -> Result<(), BrainError> {
        self.ensure_authoritative("set_overlay")?;
        if overlay != self.overlay {
            self.overlay = overlay;
            self.description_dirty = true;
        }
        Ok(())
    }

    /// Set the owner wholesale.
    pub fn set_owner(&mut self, owner: Option<OwnerIdentity>) -> Result<(), BrainError> {
        self.ensure_authoritative("set_owner")?;
        self.owner = owner;
        Ok(())
    }

    /// Install or remove the upgrade on `side`.
    ///
    /// Returns `Ok(false)` when the same upgrade was already installed.
    pub fn set_upgrade(&mut self, side: Side, upgrade: Option<Arc<dyn Upgrade>>) -> Result<bool, BrainError> {
        self.ensure_authoritative("set_upgrade")?;
        Ok(self.install_upgrade(side, upgrade))
    }

    fn install_upgrade(&mut self, side: Side, upgrade: Option<Arc<dyn Upgrade>>) -> bool {
        if !self.upgrades.set_upgrade(self.id, side, upgrade) {
            return false;
        }
        if let Some(host) = self.host.as_deref_mut() {
            for side in Side::ALL {
                host.attach_peripheral(side, self.upgrades.peripheral(side).cloned());
            }
        }
        self.description_dirty = true;
        true
    }

    /// The data blob of `side`, created on demand.
    pub fn upgrade_data_mut(&mut self, side: Side) -> Result<&mut Map<String, Value>, BrainError> {
        self.ensure_authoritative("upgrade_data_mut")?;
        self.description_dirty = true;
        Ok(self.upgrades.data_mut(side))
    }

    /// The inventory, mutably.
    pub fn inventory_mut(&mut self) -> Result<&mut Inventory, BrainError> {
        self.ensure_authoritative("inventory_mut")?;
        Ok(&mut self.inventory)
    }

    pub(crate) fn pop_command(&mut self) -> Option<CommandEntry> {
        self.queue.pop()
    }

    pub(crate) const fn animation_mut(&mut self) -> &mut AnimationState {
        &mut self.animation
    }

    pub(crate) fn update_upgrades(&mut self) {
        self.description_dirty |= self.upgrades.update(self.id);
    }

    // -----------------------------------------------------------------------
    // Records
    // -----------------------------------------------------------------------

    fn common_record(&self) -> ActorRecord {
        let blob = |side| self.upgrades.data(side).cloned().map(Value::Object);
        let upgrade_id = |side| self.upgrades.upgrade(side).map(|u| u.id().to_owned());
        ActorRecord {
            fuel: self.fuel.level(),
            colour: self.colour,
            overlay: self.overlay.clone(),
            left_upgrade: upgrade_id(Side::Left),
            left_upgrade_data: blob(Side::Left),
            right_upgrade: upgrade_id(Side::Right),
            right_upgrade_data: blob(Side::Right),
            ..ActorRecord::default()
        }
    }

    /// Durable state: common fields plus selected slot, owner and inventory.
    pub fn export_state(&self) -> ActorRecord {
        ActorRecord {
            selected_slot: u32::try_from(self.selected_slot).ok(),
            owner: self.owner.as_ref().map(|owner| {
                let (upper_id, lower_id) = owner.parts();
                OwnerRecord {
                    upper_id,
                    lower_id,
                    name: owner.name.clone(),
                }
            }),
            inventory: Some(self.inventory.clone()),
            ..self.common_record()
        }
    }

    /// Observer sync: common fields plus animation ordinal and progress.
    pub fn export_description(&self) -> ActorRecord {
        ActorRecord {
            animation: Some(self.animation.kind().ordinal()),
            animation_progress: Some(self.animation.progress()),
            ..self.common_record()
        }
    }

    /// Return the description and clear the dirty flag, if it was set.
    pub fn take_description(&mut self) -> Option<ActorRecord> {
        if !self.description_dirty {
            return None;
        }
        self.description_dirty = false;
        Some(self.export_description())
    }

    /// Restore durable state. Nothing is applied if the record is invalid.
    pub fn import_state(&mut self, record: &ActorRecord, registry: &UpgradeRegistry) -> Result<(), BrainError> {
        self.ensure_authoritative("import_state")?;
        let upgrades = resolve_upgrades(record, registry)?;
        self.apply_common(record, upgrades);
        if let Some(slot) = record.selected_slot {
            let slot = usize::try_from(slot).unwrap_or(usize::MAX);
            if slot < self.inventory.size() {
                self.selected_slot = slot;
            }
        }
        self.owner = record
            .owner
            .as_ref()
            .map(|owner| OwnerIdentity::from_parts(owner.upper_id, owner.lower_id, owner.name.clone()));
        if let Some(inventory) = &record.inventory {
            self.inventory = inventory.clone();
        }
        Ok(())
    }

    /// Apply a description received from the authoritative actor.
    ///
    /// Only mirrors accept descriptions; the live actor restores state
    /// through [`Actor::import_state`].
    pub fn import_description(&mut self, record: &ActorRecord, registry: &UpgradeRegistry) -> Result<(), BrainError> {
        if !matches!(self.authority, Authority::Mirror) {
            return Err(BrainError::MirrorOnly {
                operation: "import_description",
            });
        }
        let animation = match record.animation {
            Some(ordinal) => Some(AnimationKind::from_ordinal(ordinal).ok_or_else(|| {
                BrainError::InvalidRecord {
                    reason: format!("unknown animation ordinal {ordinal}"),
                }
            })?),
            None => None,
        };
        let upgrades = resolve_upgrades(record, registry)?;
        self.apply_common(record, upgrades);
        if let Some(kind) = animation {
            self.animation.sync_from_description(kind);
        }
        Ok(())
    }

    fn apply_common(&mut self, record: &ActorRecord, upgrades: ResolvedUpgrades) {
        self.fuel.set_level(record.fuel);
        self.apply_colour(record.colour);
        self.overlay.clone_from(&record.overlay);
        self.install_upgrade(Side::Left, upgrades.left);
        self.upgrades.set_data(Side::Left, upgrades.left_data);
        self.install_upgrade(Side::Right, upgrades.right);
        self.upgrades.set_data(Side::Right, upgrades.right_data);
        self.description_dirty = true;
    }
}

/// Upgrades and data blobs of a record, validated before anything is applied.
struct ResolvedUpgrades {
    left: Option<Arc<dyn Upgrade>>,
    left_data: Option<Map<String, Value>>,
    right: Option<Arc<dyn Upgrade>>,
    right_data: Option<Map<String, Value>>,
}

fn resolve_upgrades(record: &ActorRecord, registry: &UpgradeRegistry) -> Result<ResolvedUpgrades, BrainError> {
    Ok(ResolvedUpgrades {
        left: resolve_upgrade(record.left_upgrade.as_deref(), registry)?,
        left_data: resolve_data(record.left_upgrade_data.as_ref(), Side::Left)?,
        right: resolve_upgrade(record.right_upgrade.as_deref(), registry)?,
        right_data: resolve_data(record.right_upgrade_data.as_ref(), Side::Right)?,
    })
}

fn resolve_upgrade(id: Option<&str>, registry: &UpgradeRegistry) -> Result<Option<Arc<dyn Upgrade>>, BrainError> {
    let Some(id) = id else {
        return Ok(None);
    };
    registry.get(id).map(Some).ok_or_else(|| {
        warn!(upgrade = id, "record names an unknown upgrade");
        BrainError::UnknownUpgrade { id: id.to_owned() }
    })
}

fn resolve_data(data: Option<&Value>, side: Side) -> Result<Option<Map<String, Value>>, BrainError> {
    match data {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map.clone())),
        Some(_) => Err(BrainError::InvalidRecord {
            reason: format!("{side:?} upgrade data is not an object"),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rover_types::{ItemStack, RESPONSE_EVENT};
    use uuid::Uuid;

    use super::*;
    use crate::bridge::EventQueueHost;
    use crate::builtin::{SensorUpgrade, ToolUpgrade};
    use crate::command::command_fn;

    fn config() -> BrainConfig {
        BrainConfig::default()
    }

    fn noop() -> Box<dyn Command> {
        command_fn("noop", |_| CommandResult::success())
    }

    #[test]
    fn new_actor_defaults() {
        let actor = Actor::new(ActorFamily::Advanced, &config());
        assert!(actor.is_authoritative());
        assert_eq!(actor.fuel_level(), 0);
        assert_eq!(actor.fuel().limit(), 100_000);
        assert!(actor.animation().is_idle());
        assert_eq!(actor.inventory().size(), 16);
        assert!(!actor.description_dirty());
    }

    #[test]
    fn mirrors_reject_every_mutator() {
        let mut mirror = Actor::mirror(ActorId::new(), ActorFamily::Normal, &config());
        let rejected = |r: Result<(), BrainError>| matches!(r, Err(BrainError::NotAuthoritative { .. }));
        assert!(rejected(mirror.add_fuel(5)));
        assert!(rejected(mirror.consume_fuel(1).map(|_| ())));
        assert!(rejected(mirror.set_fuel_level(5)));
        assert!(rejected(mirror.start_animation(AnimationKind::Wait)));
        assert!(rejected(mirror.set_selected_slot(1).map(|_| ())));
        assert!(rejected(mirror.set_colour(Some(1))));
        assert!(rejected(mirror.set_overlay(None)));
        assert!(rejected(mirror.set_upgrade(Side::Left, None).map(|_| ())));
        assert!(rejected(mirror.execute(noop()).map(|_| ())));
        assert!(rejected(mirror.inventory_mut().map(|_| ())));
        assert_eq!(mirror.fuel_level(), 0);
    }

    #[test]
    fn live_actor_rejects_descriptions() {
        let registry = UpgradeRegistry::with_builtins();
        let mut live = Actor::new(ActorFamily::Normal, &config());
        live.add_fuel(30).unwrap();
        let stray = ActorRecord {
            fuel: 5,
            right_upgrade: Some(String::from("tool")),
            ..ActorRecord::default()
        };
        assert_eq!(
            live.import_description(&stray, &registry),
            Err(BrainError::MirrorOnly {
                operation: "import_description"
            })
        );
        assert_eq!(live.fuel_level(), 30);
        assert!(live.upgrade(Side::Right).is_none());
    }

    #[test]
    fn colour_outside_rgb_range_clears() {
        let mut actor = Actor::new(ActorFamily::Normal, &config());
        actor.set_colour(Some(0x00FF_0000)).unwrap();
        assert_eq!(actor.colour(), Some(0x00FF_0000));
        actor.set_colour(Some(0x0100_0000)).unwrap();
        assert_eq!(actor.colour(), None);
    }

    #[test]
    fn selected_slot_ignores_out_of_range() {
        let mut actor = Actor::new(ActorFamily::Normal, &config());
        assert!(actor.set_selected_slot(15).unwrap());
        assert!(!actor.set_selected_slot(16).unwrap());
        assert_eq!(actor.selected_slot(), 15);
    }

    #[test]
    fn execute_returns_increasing_ids() {
        let mut actor = Actor::new(ActorFamily::Normal, &config());
        let first = actor.execute(noop()).unwrap();
        let second = actor.execute(noop()).unwrap();
        assert_eq!(first.id(), CommandId(1));
        assert_eq!(second.id(), CommandId(2));
        assert_eq!(actor.queue().len(), 2);
    }

    #[test]
    fn completion_reaches_attached_host() {
        let mut actor = Actor::new(ActorFamily::Normal, &config());
        assert!(!actor.complete(CommandId(1), CommandResult::success()));

        actor.attach_host(Box::new(EventQueueHost::new()));
        let call = actor.execute(noop()).unwrap();
        assert!(actor.complete(call.id(), CommandResult::success_with(vec![Value::from(3)])));
        let host = actor.host_mut().unwrap();
        assert_eq!(call.poll(host), Some(CommandResult::success_with(vec![Value::from(3)])));
    }

    #[test]
    fn upgrade_changes_reach_the_host() {
        let mut actor = Actor::new(ActorFamily::Normal, &config());
        actor.attach_host(Box::new(EventQueueHost::new()));
        assert!(actor.set_upgrade(Side::Left, Some(Arc::new(SensorUpgrade::default()))).unwrap());
        assert!(actor.peripheral(Side::Left).is_some());
        assert!(actor.description_dirty());
        assert!(!actor.set_upgrade(Side::Left, Some(Arc::new(SensorUpgrade::default()))).unwrap());
    }

    #[test]
    fn state_record_roundtrip() {
        let registry = UpgradeRegistry::with_builtins();
        let mut actor = Actor::new(ActorFamily::Normal, &config());
        actor.add_fuel(750).unwrap();
        actor.set_colour(Some(0x0012_3456)).unwrap();
        actor.set_overlay(Some(String::from("stripes"))).unwrap();
        actor.set_upgrade(Side::Left, Some(Arc::new(ToolUpgrade))).unwrap();
        actor.set_upgrade(Side::Right, Some(Arc::new(SensorUpgrade::default()))).unwrap();
        actor
            .upgrade_data_mut(Side::Right)
            .unwrap()
            .insert(String::from("ticks"), Value::from(4));
        actor.set_selected_slot(3).unwrap();
        actor
            .set_owner(Some(OwnerIdentity::new(Uuid::now_v7(), "ada")))
            .unwrap();
        actor
            .inventory_mut()
            .unwrap()
            .set(3, Some(ItemStack { item: String::from("coal"), count: 9 }));

        let record = actor.export_state();
        let mut restored = Actor::new(ActorFamily::Normal, &config());
        restored.import_state(&record, &registry).unwrap();
        assert_eq!(restored.export_state(), record);
        assert_eq!(restored.owner(), actor.owner());
        assert_eq!(record.animation, None);
    }

    #[test]
    fn invalid_record_applies_nothing() {
        let registry = UpgradeRegistry::with_builtins();
        let mut actor = Actor::new(ActorFamily::Normal, &config());
        actor.add_fuel(10).unwrap();
        let record = ActorRecord {
            fuel: 99,
            left_upgrade: Some(String::from("laser")),
            ..ActorRecord::default()
        };
        assert_eq!(
            actor.import_state(&record, &registry),
            Err(BrainError::UnknownUpgrade { id: String::from("laser") })
        );
        assert_eq!(actor.fuel_level(), 10);

        let bad_data = ActorRecord {
            fuel: 99,
            right_upgrade_data: Some(Value::from(1)),
            ..ActorRecord::default()
        };
        assert!(matches!(
            actor.import_state(&bad_data, &registry),
            Err(BrainError::InvalidRecord { .. })
        ));
        assert_eq!(actor.fuel_level(), 10);
    }

    #[test]
    fn description_feeds_a_mirror() {
        let registry = UpgradeRegistry::with_builtins();
        let mut live = Actor::new(ActorFamily::Normal, &config());
        live.add_fuel(42).unwrap();
        live.set_upgrade(Side::Right, Some(Arc::new(ToolUpgrade))).unwrap();
        live.start_animation(AnimationKind::MoveForward).unwrap();

        let description = live.take_description().unwrap();
        assert!(live.take_description().is_none());
        assert_eq!(description.animation, Some(AnimationKind::MoveForward.ordinal()));
        assert_eq!(description.owner, None);

        let mut mirror = Actor::mirror(live.id(), ActorFamily::Normal, &config());
        mirror.import_description(&description, &registry).unwrap();
        assert_eq!(mirror.fuel_level(), 42);
        assert!(mirror.upgrade(Side::Right).is_some_and(|u| u.is_tool()));
        assert_eq!(mirror.animation().kind(), AnimationKind::MoveForward);

        let waiting = ActorRecord {
            animation: Some(AnimationKind::Wait.ordinal()),
            ..description.clone()
        };
        let mut idle_mirror = Actor::mirror(live.id(), ActorFamily::Normal, &config());
        idle_mirror.import_description(&waiting, &registry).unwrap();
        assert!(idle_mirror.animation().is_idle());

        let bogus = ActorRecord {
            animation: Some(200),
            ..description
        };
        assert!(matches!(
            idle_mirror.import_description(&bogus, &registry),
            Err(BrainError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn completion_event_uses_the_shared_name() {
        let mut actor = Actor::new(ActorFamily::Normal, &config());
        actor.attach_host(Box::new(EventQueueHost::new()));
        actor.complete(CommandId(7), CommandResult::failure("nope"));
        let host = actor.host_mut().unwrap();
        let taken = host.suspend_until(RESPONSE_EVENT, &mut |event| {
            (event.args.first() == Some(&Value::from(7_u64))).then(CommandResult::success)
        });
        assert_eq!(taken, Some(CommandResult::success()));
    }
}
