//! Built-in actor commands.
//!
//! [`ActorCommand`] is the serialisable instruction set scripts and
//! configuration files use. Each variant validates its preconditions, then
//! mutates the actor and starts the matching animation. Domain problems
//! ("Movement obstructed", "Out of fuel", ...) are reported as
//! [`CommandResult::Failure`].

use rover_types::{AnimationKind, CommandResult, Direction, Side};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::command::{Command, CommandContext};
use crate::error::BrainError;
use crate::relocation::RelocationOutcome;

/// Fuel spent per block moved.
pub const MOVE_FUEL_COST: i32 = 1;

/// Movement relative to the actor's facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    /// The block in front.
    Forward,
    /// The block behind.
    Back,
    /// The block above.
    Up,
    /// The block below.
    Down,
}

impl MoveDirection {
    /// Absolute direction of travel for an actor facing `facing`.
    pub const fn resolve(self, facing: Direction) -> Direction {
        match self {
            Self::Forward => facing,
            Self::Back => facing.opposite(),
            Self::Up => Direction::Up,
            Self::Down => Direction::Down,
        }
    }

    /// Animation played while moving this way.
    pub const fn animation(self) -> AnimationKind {
        match self {
            Self::Forward => AnimationKind::MoveForward,
            Self::Back => AnimationKind::MoveBack,
            Self::Up => AnimationKind::MoveUp,
            Self::Down => AnimationKind::MoveDown,
        }
    }
}

/// Quarter-turn direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnDirection {
    /// Counter-clockwise.
    Left,
    /// Clockwise.
    Right,
}

/// A built-in instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ActorCommand {
    /// Move one block, spending [`MOVE_FUEL_COST`] fuel.
    Move {
        /// Which way.
        direction: MoveDirection,
    },
    /// Turn in place.
    Turn {
        /// Which way.
        direction: TurnDirection,
    },
    /// Swing the tool installed on `side`.
    Swing {
        /// The side holding the tool.
        side: Side,
    },
    /// Pause for a full animation.
    Wait,
    /// Pause for half an animation.
    ShortWait,
    /// Select an inventory slot.
    Select {
        /// Zero-based slot index.
        slot: u32,
    },
    /// Report the fuel level, or `"unlimited"` when fuel is not required.
    FuelLevel,
}

impl ActorCommand {
    /// Box into a queueable [`Command`].
    pub fn boxed(self) -> Box<dyn Command> {
        Box::new(self)
    }

    fn run(self, ctx: &mut CommandContext<'_>) -> Result<CommandResult, BrainError> {
        match self {
            Self::Move { direction } => move_actor(ctx, direction),
            Self::Turn { direction } => {
                let actor = ctx.actor_mut()?;
                let (facing, animation) = match direction {
                    TurnDirection::Left => (actor.facing().rotate_left(), AnimationKind::TurnLeft),
                    TurnDirection::Right => (actor.facing().rotate_right(), AnimationKind::TurnRight),
                };
                actor.set_facing(facing)?;
                actor.start_animation(animation)?;
                Ok(CommandResult::success())
            }
            Self::Swing { side } => {
                let actor = ctx.actor_mut()?;
                if !actor.upgrade(side).is_some_and(|upgrade| upgrade.is_tool()) {
                    return Ok(CommandResult::failure("No tool to swing with"));
                }
                actor.start_animation(match side {
                    Side::Left => AnimationKind::SwingLeftTool,
                    Side::Right => AnimationKind::SwingRightTool,
                })?;
                Ok(CommandResult::success())
            }
            Self::Wait => {
                ctx.actor_mut()?.start_animation(AnimationKind::Wait)?;
                Ok(CommandResult::success())
            }
            Self::ShortWait => {
                ctx.actor_mut()?.start_animation(AnimationKind::ShortWait)?;
                Ok(CommandResult::success())
            }
            Self::Select { slot } => {
                let selected = match usize::try_from(slot) {
                    Ok(slot) => ctx.actor_mut()?.set_selected_slot(slot)?,
                    Err(_) => false,
                };
                Ok(if selected {
                    CommandResult::success()
                } else {
                    CommandResult::failure("Slot out of range")
                })
            }
            Self::FuelLevel => {
                let fuel = ctx.actor()?.fuel();
                let level = if fuel.is_required() {
                    Value::from(fuel.level())
                } else {
                    Value::from("unlimited")
                };
                Ok(CommandResult::success_with(vec![level]))
            }
        }
    }
}

fn move_actor(ctx: &mut CommandContext<'_>, direction: MoveDirection) -> Result<CommandResult, BrainError> {
    let from = ctx.location()?;
    let actor = ctx.actor()?;
    let to = from.offset(direction.resolve(actor.facing()));
    let fueled = actor.fuel().has(MOVE_FUEL_COST);

    let world = ctx.world();
    if !world.is_within_bounds(to) {
        return Ok(CommandResult::failure("Cannot leave the world"));
    }
    if !world.is_loaded(to) {
        return Ok(CommandResult::failure("Cannot leave loaded world"));
    }
    if world.block_at(to).is_some() {
        return Ok(CommandResult::failure("Movement obstructed"));
    }
    if !fueled {
        return Ok(CommandResult::failure("Out of fuel"));
    }

    match ctx.relocate(to)? {
        RelocationOutcome::Relocated { .. } => {
            let actor = ctx.actor_mut()?;
            actor.consume_fuel(MOVE_FUEL_COST)?;
            actor.start_animation(direction.animation())?;
            Ok(CommandResult::success())
        }
        RelocationOutcome::Unchanged | RelocationOutcome::RolledBack { .. } => {
            Ok(CommandResult::failure("Movement failed"))
        }
    }
}

impl Command for ActorCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::Move { .. } => "move",
            Self::Turn { .. } => "turn",
            Self::Swing { .. } => "swing",
            Self::Wait => "wait",
            Self::ShortWait => "short_wait",
            Self::Select { .. } => "select",
            Self::FuelLevel => "fuel_level",
        }
    }

    fn execute(self: Box<Self>, ctx: &mut CommandContext<'_>) -> CommandResult {
        self.run(ctx).unwrap_or_else(|err| CommandResult::failure(err.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rover_types::{ActorFamily, BlockPos, DimensionId, Location};
    use rover_world::{BlockState, GridWorld, World, WorldBounds};

    use super::*;
    use crate::actor::Actor;
    use crate::bridge::EventQueueHost;
    use crate::budget::{TickContext, WorkBudget};
    use crate::builtin::ToolUpgrade;
    use crate::config::BrainConfig;
    use crate::table::{ActorHandle, ActorTable};

    struct Fixture {
        config: BrainConfig,
        world: GridWorld,
        table: ActorTable,
        handle: ActorHandle,
    }

    fn at(x: i32, y: i32, z: i32) -> Location {
        Location::new(DimensionId::OVERWORLD, BlockPos::new(x, y, z))
    }

    fn fixture(fuel: i32) -> Fixture {
        let config = BrainConfig::default();
        let mut world = GridWorld::with_overworld(WorldBounds::new(20, 0, 8).unwrap(), 0).unwrap();
        let mut table = ActorTable::new();
        let mut actor = Actor::new(ActorFamily::Normal, &config);
        actor.add_fuel(fuel).unwrap();
        let handle = table.spawn(&mut world, at(1, 1, 1), actor).unwrap();
        Fixture {
            config,
            world,
            table,
            handle,
        }
    }

    impl Fixture {
        fn run(&mut self, command: ActorCommand) -> CommandResult {
            let mut ctx = CommandContext::new(&mut self.table, &mut self.world, &self.config, self.handle);
            let result = Box::new(command).execute(&mut ctx);
            self.handle = ctx.handle();
            result
        }

        fn actor(&self) -> &Actor {
            self.table.actor(self.handle).unwrap()
        }
    }

    fn forward() -> ActorCommand {
        ActorCommand::Move {
            direction: MoveDirection::Forward,
        }
    }

    #[test]
    fn move_relocates_and_spends_fuel() {
        let mut f = fixture(10);
        let result = f.run(forward());
        assert!(result.is_success());
        // Facing north.
        assert_eq!(f.table.location(f.handle).unwrap(), at(1, 1, 0));
        assert_eq!(f.actor().fuel_level(), 9);
        assert_eq!(f.actor().animation().kind(), AnimationKind::MoveForward);
    }

    #[test]
    fn move_reports_domain_failures() {
        let mut f = fixture(0);
        assert_eq!(f.run(forward()).error_message(), Some("Out of fuel"));
        assert_eq!(f.table.location(f.handle).unwrap(), at(1, 1, 1));

        let mut f = fixture(10);
        f.world.place_block(at(1, 1, 0), BlockState::solid("stone"));
        assert_eq!(f.run(forward()).error_message(), Some("Movement obstructed"));
        assert_eq!(f.actor().fuel_level(), 10);
        assert!(f.actor().animation().is_idle());
    }

    #[test]
    fn move_below_the_world_fails() {
        let mut f = fixture(10);
        let down = ActorCommand::Move {
            direction: MoveDirection::Down,
        };
        assert!(f.run(down.clone()).is_success());
        f.table.actor_mut(f.handle).unwrap().animation_mut().reset();
        // Now at y = 0, the bottom of the world.
        assert_eq!(f.run(down).error_message(), Some("Cannot leave the world"));
        assert_eq!(f.actor().fuel_level(), 9);
    }

    #[test]
    fn move_into_unloaded_area_fails() {
        let mut f = fixture(20);
        let back = ActorCommand::Move {
            direction: MoveDirection::Back,
        };
        // Region (0, 0) covers z = 0..16; walk south to its edge.
        for _ in 1..15 {
            assert!(f.run(back.clone()).is_success());
            f.table.actor_mut(f.handle).unwrap().animation_mut().reset();
        }
        assert_eq!(f.table.location(f.handle).unwrap(), at(1, 1, 15));
        assert_eq!(f.run(back).error_message(), Some("Cannot leave loaded world"));
    }

    #[test]
    fn turn_rotates_facing() {
        let mut f = fixture(0);
        let result = f.run(ActorCommand::Turn {
            direction: TurnDirection::Right,
        });
        assert!(result.is_success());
        assert_eq!(f.actor().facing(), Direction::East);
        assert_eq!(f.actor().animation().kind(), AnimationKind::TurnRight);
    }

    #[test]
    fn swing_requires_a_tool() {
        let mut f = fixture(0);
        let swing = ActorCommand::Swing { side: Side::Left };
        assert_eq!(f.run(swing.clone()).error_message(), Some("No tool to swing with"));

        f.table
            .actor_mut(f.handle)
            .unwrap()
            .set_upgrade(Side::Left, Some(Arc::new(ToolUpgrade)))
            .unwrap();
        assert!(f.run(swing).is_success());
        assert_eq!(f.actor().animation().kind(), AnimationKind::SwingLeftTool);
    }

    #[test]
    fn busy_animation_surfaces_as_failure() {
        let mut f = fixture(0);
        assert!(f.run(ActorCommand::Wait).is_success());
        let result = f.run(ActorCommand::ShortWait);
        assert!(!result.is_success());
    }

    #[test]
    fn select_checks_inventory_size() {
        let mut f = fixture(0);
        assert!(f.run(ActorCommand::Select { slot: 15 }).is_success());
        assert_eq!(f.actor().selected_slot(), 15);
        assert_eq!(
            f.run(ActorCommand::Select { slot: 16 }).error_message(),
            Some("Slot out of range")
        );
        assert_eq!(f.actor().selected_slot(), 15);
    }

    #[test]
    fn fuel_level_reports_unlimited_for_exempt_actors() {
        let mut f = fixture(42);
        assert_eq!(
            f.run(ActorCommand::FuelLevel),
            CommandResult::success_with(vec![Value::from(42)])
        );

        let config = BrainConfig::default();
        let mut world = GridWorld::with_overworld(WorldBounds::default(), 0).unwrap();
        let mut table = ActorTable::new();
        let handle = table
            .spawn(&mut world, at(0, 1, 0), Actor::new(ActorFamily::Command, &config))
            .unwrap();
        let mut ctx = CommandContext::new(&mut table, &mut world, &config, handle);
        let result = Box::new(ActorCommand::FuelLevel).execute(&mut ctx);
        assert_eq!(result, CommandResult::success_with(vec![Value::from("unlimited")]));
    }

    #[test]
    fn queued_move_completes_through_the_host() {
        let mut f = fixture(5);
        let actor = f.table.actor_mut(f.handle).unwrap();
        actor.attach_host(Box::new(EventQueueHost::new()));
        let call = actor.execute(forward().boxed()).unwrap();

        let mut budget = WorkBudget::unlimited();
        budget.begin_tick();
        let mut ctx = TickContext::new(&mut f.world, &mut budget, &f.config);
        let report = f.table.update(f.handle, &mut ctx).unwrap();
        assert!(report.relocated);
        assert_ne!(report.handle, f.handle);

        let host = f.table.actor_mut(report.handle).unwrap().host_mut().unwrap();
        assert_eq!(call.poll(host), Some(CommandResult::success()));
    }

    #[test]
    fn commands_parse_from_tagged_json() {
        let parsed: ActorCommand =
            serde_json::from_str(r#"{"op":"move","direction":"forward"}"#).unwrap();
        assert_eq!(parsed, forward());
        let parsed: ActorCommand = serde_json::from_str(r#"{"op":"short_wait"}"#).unwrap();
        assert_eq!(parsed, ActorCommand::ShortWait);
        assert_eq!(ActorCommand::FuelLevel.boxed().name(), "fuel_level");
    }
}
