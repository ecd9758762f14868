//! Runtime parameters for actor brains.
//!
//! These values correspond to the `actors` section of `rover-config.yaml`.
//! The [`BrainConfig`] struct bundles every tunable so that callers (tick
//! driver, tests) can override defaults.

use rover_types::ActorFamily;

/// Default number of pending commands an actor may hold.
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Default length of every animation, in ticks.
pub const DEFAULT_ANIMATION_DURATION: u32 = 8;

/// Configuration shared by every actor of a simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrainConfig {
    /// Whether non-exempt families consume fuel (default: true).
    pub fuel_required: bool,

    /// Fuel tank size of `Normal` actors (default: 20000).
    pub fuel_limit: u32,

    /// Fuel tank size of `Advanced` actors (default: 100000).
    pub advanced_fuel_limit: u32,

    /// Whether movement animations displace entities (default: true).
    pub can_push: bool,

    /// Maximum pending commands per actor (default: 16).
    pub queue_capacity: usize,

    /// Animation length in ticks (default: 8).
    ///
    /// `ShortWait` starts half-way through the same duration.
    pub animation_duration: u32,

    /// Number of inventory slots per actor (default: 16).
    pub inventory_size: usize,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            fuel_required: true,
            fuel_limit: 20_000,
            advanced_fuel_limit: 100_000,
            can_push: true,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            animation_duration: DEFAULT_ANIMATION_DURATION,
            inventory_size: 16,
        }
    }
}

impl BrainConfig {
    /// Fuel tank size for an actor family.
    pub const fn fuel_limit_for(&self, family: ActorFamily) -> u32 {
        match family {
            ActorFamily::Advanced => self.advanced_fuel_limit,
            ActorFamily::Normal | ActorFamily::Command => self.fuel_limit,
        }
    }

    /// Whether actors of `family` consume fuel.
    pub const fn fuel_required_for(&self, family: ActorFamily) -> bool {
        self.fuel_required && !family.is_fuel_exempt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = BrainConfig::default();
        assert!(cfg.fuel_required);
        assert_eq!(cfg.fuel_limit, 20_000);
        assert_eq!(cfg.advanced_fuel_limit, 100_000);
        assert_eq!(cfg.queue_capacity, 16);
        assert_eq!(cfg.animation_duration, 8);
        assert_eq!(cfg.inventory_size, 16);
    }

    #[test]
    fn fuel_rules_follow_family() {
        let cfg = BrainConfig::default();
        assert_eq!(cfg.fuel_limit_for(ActorFamily::Normal), 20_000);
        assert_eq!(cfg.fuel_limit_for(ActorFamily::Advanced), 100_000);
        assert!(cfg.fuel_required_for(ActorFamily::Advanced));
        assert!(!cfg.fuel_required_for(ActorFamily::Command));

        let relaxed = BrainConfig {
            fuel_required: false,
            ..BrainConfig::default()
        };
        assert!(!relaxed.fuel_required_for(ActorFamily::Normal));
    }
}
