//! Shared per-tick work budget.
//!
//! The [`WorkBudget`] is the only object shared across actors. The tick
//! driver resets it with [`WorkBudget::begin_tick`], then every actor asks
//! [`WorkBudget::can_work`] before executing a command and reports the
//! measured wall-clock cost with [`WorkBudget::track_work`] afterwards.
//! Both a global cap and a per-actor cap apply.
//!
//! The budget travels to actors inside a [`TickContext`], never as ambient
//! state.

use std::collections::BTreeMap;
use std::time::Duration;

use rover_types::ActorId;
use rover_world::World;

use crate::config::BrainConfig;

/// Global and per-actor time caps for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkBudget {
    max_global: Duration,
    max_actor: Duration,
    global_used: Duration,
    per_actor: BTreeMap<ActorId, Duration>,
}

impl WorkBudget {
    /// Create a budget with the given caps.
    pub const fn new(max_global: Duration, max_actor: Duration) -> Self {
        Self {
            max_global,
            max_actor,
            global_used: Duration::ZERO,
            per_actor: BTreeMap::new(),
        }
    }

    /// Create a budget from caps expressed in microseconds.
    pub const fn from_micros(max_global_us: u64, max_actor_us: u64) -> Self {
        Self::new(
            Duration::from_micros(max_global_us),
            Duration::from_micros(max_actor_us),
        )
    }

    /// A budget that never runs out.
    pub const fn unlimited() -> Self {
        Self::new(Duration::MAX, Duration::MAX)
    }

    /// Reset consumption at the start of a tick.
    pub fn begin_tick(&mut self) {
        self.global_used = Duration::ZERO;
        self.per_actor.clear();
    }

    /// Whether `actor` may still perform work this tick.
    pub fn can_work(&self, actor: ActorId) -> bool {
        self.global_used < self.max_global && self.actor_used(actor) < self.max_actor
    }

    /// Charge `elapsed` to both the global and the actor's allowance.
    pub fn track_work(&mut self, actor: ActorId, elapsed: Duration) {
        self.global_used = self.global_used.saturating_add(elapsed);
        let used = self.per_actor.entry(actor).or_insert(Duration::ZERO);
        *used = used.saturating_add(elapsed);
    }

    /// Time consumed by all actors this tick.
    pub const fn global_used(&self) -> Duration {
        self.global_used
    }

    /// Time consumed by one actor this tick.
    pub fn actor_used(&self, actor: ActorId) -> Duration {
        self.per_actor.get(&actor).copied().unwrap_or(Duration::ZERO)
    }

    /// Global time still available this tick.
    pub const fn remaining(&self) -> Duration {
        self.max_global.saturating_sub(self.global_used)
    }
}

/// Everything an actor's `update` needs from the outside world for one tick.
pub struct TickContext<'a> {
    /// The world the actors live in.
    pub world: &'a mut dyn World,
    /// The shared work budget.
    pub budget: &'a mut WorkBudget,
    /// Actor configuration.
    pub config: &'a BrainConfig,
}

impl<'a> TickContext<'a> {
    /// Bundle the per-tick collaborators.
    pub const fn new(world: &'a mut dyn World, budget: &'a mut WorkBudget, config: &'a BrainConfig) -> Self {
        Self {
            world,
            budget,
            config,
        }
    }
}
