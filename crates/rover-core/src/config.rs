//! Configuration loading and typed config structures for the Rover simulation.
//!
//! The canonical configuration lives in `rover-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.
//! Every field has a default, so an empty document is a valid config.

use std::path::Path;
use std::time::Duration;

use rover_brain::{ActorCommand, BrainConfig, MoveDirection, TurnDirection, WorkBudget};
use rover_types::ActorFamily;
use rover_world::WorldBounds;
use serde::Deserialize;

/// Environment variable overriding `logging.level`.
pub const LOG_LEVEL_ENV: &str = "ROVER_LOG_LEVEL";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The document parsed but describes an unusable simulation.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `rover-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (name, seed, timing, extent).
    #[serde(default)]
    pub world: WorldConfig,

    /// Actor parameters and the programs they run.
    #[serde(default)]
    pub actors: ActorsConfig,

    /// Per-tick work budget.
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Simulation boundary parameters.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `ROVER_LOG_LEVEL` overrides `logging.level` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.logging.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.actors.queue_capacity == 0 {
            return Err(invalid("actors.queue_capacity must be at least 1"));
        }
        if self.actors.animation_duration == 0 {
            return Err(invalid("actors.animation_duration must be at least 1"));
        }
        if self.world.loaded_region_radius < 0 {
            return Err(invalid("world.loaded_region_radius must not be negative"));
        }
        self.world_bounds()?;
        Ok(())
    }

    /// The runtime actor parameters.
    pub fn brain_config(&self) -> BrainConfig {
        BrainConfig {
            fuel_required: self.actors.fuel_required,
            fuel_limit: self.actors.fuel_limit,
            advanced_fuel_limit: self.actors.advanced_fuel_limit,
            can_push: self.actors.can_push,
            queue_capacity: self.actors.queue_capacity,
            animation_duration: self.actors.animation_duration,
            inventory_size: self.actors.inventory_size,
        }
    }

    /// A fresh work budget with the configured limits.
    pub const fn budget(&self) -> WorkBudget {
        WorkBudget::from_micros(self.budget.max_global_time_us, self.budget.max_actor_time_us)
    }

    /// The configured world extent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the extent is empty.
    pub fn world_bounds(&self) -> Result<WorldBounds, ConfigError> {
        WorldBounds::new(self.world.border_radius, self.world.min_y, self.world.max_y)
            .map_err(|err| invalid(&err.to_string()))
    }

    /// Real-time pause between ticks.
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.world.tick_interval_ms)
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducible placement.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Real-time milliseconds per tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Horizontal world border, in blocks from the origin.
    #[serde(default = "default_border_radius")]
    pub border_radius: i32,

    /// Lowest buildable Y (inclusive).
    #[serde(default = "default_min_y")]
    pub min_y: i32,

    /// Build height (exclusive).
    #[serde(default = "default_max_y")]
    pub max_y: i32,

    /// Regions (16x16 columns) loaded around the origin in each direction.
    #[serde(default = "default_loaded_region_radius")]
    pub loaded_region_radius: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            tick_interval_ms: default_tick_interval_ms(),
            border_radius: default_border_radius(),
            min_y: default_min_y(),
            max_y: default_max_y(),
            loaded_region_radius: default_loaded_region_radius(),
        }
    }
}

/// Actor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActorsConfig {
    /// Whether non-command actors consume fuel.
    #[serde(default = "default_true")]
    pub fuel_required: bool,

    /// Fuel tank of normal actors.
    #[serde(default = "default_fuel_limit")]
    pub fuel_limit: u32,

    /// Fuel tank of advanced actors.
    #[serde(default = "default_advanced_fuel_limit")]
    pub advanced_fuel_limit: u32,

    /// Whether movement pushes entities.
    #[serde(default = "default_true")]
    pub can_push: bool,

    /// Pending commands per actor.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Animation length in ticks.
    #[serde(default = "default_animation_duration")]
    pub animation_duration: u32,

    /// Inventory slots per actor.
    #[serde(default = "default_inventory_size")]
    pub inventory_size: usize,

    /// Number of actors placed at startup.
    #[serde(default = "default_spawn_count")]
    pub spawn_count: u32,

    /// Family of spawned actors.
    #[serde(default)]
    pub family: ActorFamily,

    /// Fuel given to each spawned actor.
    #[serde(default = "default_initial_fuel")]
    pub initial_fuel: u32,

    /// Upgrade id installed on the left side of spawned actors.
    #[serde(default)]
    pub left_upgrade: Option<String>,

    /// Upgrade id installed on the right side of spawned actors.
    #[serde(default)]
    pub right_upgrade: Option<String>,

    /// Whether programs restart after their last instruction.
    #[serde(default = "default_true")]
    pub loop_programs: bool,

    /// Instruction programs, assigned to spawned actors round-robin.
    #[serde(default = "default_programs")]
    pub programs: Vec<Vec<ActorCommand>>,
}

impl Default for ActorsConfig {
    fn default() -> Self {
        Self {
            fuel_required: true,
            fuel_limit: default_fuel_limit(),
            advanced_fuel_limit: default_advanced_fuel_limit(),
            can_push: true,
            queue_capacity: default_queue_capacity(),
            animation_duration: default_animation_duration(),
            inventory_size: default_inventory_size(),
            spawn_count: default_spawn_count(),
            family: ActorFamily::default(),
            initial_fuel: default_initial_fuel(),
            left_upgrade: None,
            right_upgrade: None,
            loop_programs: true,
            programs: default_programs(),
        }
    }
}

/// Work budget configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BudgetConfig {
    /// Command time available to all actors together, per tick.
    #[serde(default = "default_max_global_time_us")]
    pub max_global_time_us: u64,

    /// Command time available to a single actor, per tick.
    #[serde(default = "default_max_actor_time_us")]
    pub max_actor_time_us: u64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_global_time_us: default_max_global_time_us(),
            max_actor_time_us: default_max_actor_time_us(),
        }
    }
}

/// Simulation boundary configuration.
///
/// A `max_ticks` of 0 means unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Maximum number of ticks before the simulation ends (0 = unlimited).
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
}

impl Default for SimulationBoundsConfig {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl LoggingConfig {
    /// Override the level with `ROVER_LOG_LEVEL` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(LOG_LEVEL_ENV) {
            self.level = val;
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Rover".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    50
}

const fn default_border_radius() -> i32 {
    256
}

const fn default_min_y() -> i32 {
    -64
}

const fn default_max_y() -> i32 {
    320
}

const fn default_loaded_region_radius() -> i32 {
    4
}

const fn default_fuel_limit() -> u32 {
    20_000
}

const fn default_advanced_fuel_limit() -> u32 {
    100_000
}

const fn default_queue_capacity() -> usize {
    rover_brain::DEFAULT_QUEUE_CAPACITY
}

const fn default_animation_duration() -> u32 {
    rover_brain::DEFAULT_ANIMATION_DURATION
}

const fn default_inventory_size() -> usize {
    16
}

const fn default_spawn_count() -> u32 {
    3
}

const fn default_initial_fuel() -> u32 {
    1000
}

fn default_programs() -> Vec<Vec<ActorCommand>> {
    vec![
        vec![
            ActorCommand::Move {
                direction: MoveDirection::Forward,
            },
            ActorCommand::Move {
                direction: MoveDirection::Forward,
            },
            ActorCommand::Turn {
                direction: TurnDirection::Right,
            },
            ActorCommand::FuelLevel,
        ],
        vec![
            ActorCommand::Move {
                direction: MoveDirection::Up,
            },
            ActorCommand::Wait,
            ActorCommand::Move {
                direction: MoveDirection::Down,
            },
            ActorCommand::ShortWait,
        ],
    ]
}

const fn default_max_global_time_us() -> u64 {
    10_000
}

const fn default_max_actor_time_us() -> u64 {
    5_000
}

const fn default_max_ticks() -> u64 {
    200
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.world.tick_interval_ms, 50);
        assert_eq!(config.actors.queue_capacity, 16);
        assert_eq!(config.actors.animation_duration, 8);
        assert_eq!(config.simulation.max_ticks, 200);
        assert_eq!(config.brain_config(), BrainConfig::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  name: "Test Quarry"
  seed: 7
  tick_interval_ms: 0
  border_radius: 64
  min_y: 0
  max_y: 128
  loaded_region_radius: 1

actors:
  fuel_required: false
  fuel_limit: 500
  advanced_fuel_limit: 900
  can_push: false
  queue_capacity: 4
  animation_duration: 6
  inventory_size: 9
  spawn_count: 2
  family: advanced
  initial_fuel: 50
  left_upgrade: sensor
  loop_programs: false
  programs:
    - - { op: move, direction: forward }
      - { op: turn, direction: left }
      - { op: swing, side: right }
      - { op: select, slot: 3 }
      - { op: fuel_level }

budget:
  max_global_time_us: 2000
  max_actor_time_us: 500

simulation:
  max_ticks: 30

logging:
  level: "debug"
"#;
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.world.name, "Test Quarry");
        assert_eq!(config.world.loaded_region_radius, 1);
        assert_eq!(config.actors.family, ActorFamily::Advanced);
        assert_eq!(config.actors.left_upgrade.as_deref(), Some("sensor"));
        assert!(config.actors.right_upgrade.is_none());
        assert_eq!(config.actors.programs.len(), 1);
        assert_eq!(
            config.actors.programs.first().and_then(|p| p.get(2)),
            Some(&ActorCommand::Swing {
                side: rover_types::Side::Right
            })
        );
        assert_eq!(config.simulation.max_ticks, 30);

        let brain = config.brain_config();
        assert!(!brain.fuel_required);
        assert_eq!(brain.queue_capacity, 4);
        assert_eq!(brain.animation_duration, 6);
        assert_eq!(config.tick_interval(), Duration::ZERO);
        assert_eq!(config.world_bounds().unwrap().max_y, 128);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("world:\n  seed: 9\n").unwrap();
        assert_eq!(config.world.seed, 9);
        assert_eq!(config.actors.spawn_count, 3);
        assert_eq!(config.actors.programs.len(), 2);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(SimulationConfig::parse("").is_ok());
    }

    #[test]
    fn rejects_unusable_values() {
        let zero_queue = SimulationConfig::parse("actors:\n  queue_capacity: 0\n");
        assert!(matches!(zero_queue, Err(ConfigError::Invalid { .. })));
        let flat_world = SimulationConfig::parse("world:\n  min_y: 10\n  max_y: 10\n");
        assert!(matches!(flat_world, Err(ConfigError::Invalid { .. })));
        let garbage = SimulationConfig::parse("actors: [1, 2");
        assert!(matches!(garbage, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("rover-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
