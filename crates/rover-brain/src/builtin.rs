//! Built-in upgrades: a swingable tool and a peripheral-providing sensor.

use std::any::Any;
use std::sync::Arc;

use rover_types::{ActorId, Side};
use serde_json::Value;

use crate::upgrade::{Peripheral, Upgrade, UpgradeTick};

/// Default sensing radius of the sensor upgrade, in blocks.
pub const DEFAULT_SENSOR_RANGE: u32 = 8;

/// A tool that can be swung. Exposes no peripheral.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolUpgrade;

impl Upgrade for ToolUpgrade {
    fn id(&self) -> &str {
        "tool"
    }

    fn is_tool(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A sensor exposing a peripheral. Counts the ticks it has been installed
/// in its data blob under `"ticks"`.
#[derive(Debug, Clone, Copy)]
pub struct SensorUpgrade {
    /// Sensing radius in blocks.
    pub range: u32,
}

impl Default for SensorUpgrade {
    fn default() -> Self {
        Self {
            range: DEFAULT_SENSOR_RANGE,
        }
    }
}

impl Upgrade for SensorUpgrade {
    fn id(&self) -> &str {
        "sensor"
    }

    fn provides_peripheral(&self) -> bool {
        true
    }

    fn derive_peripheral(&self, actor: ActorId, side: Side) -> Option<Arc<dyn Peripheral>> {
        Some(Arc::new(SensorPeripheral {
            actor,
            side,
            range: self.range,
        }))
    }

    fn update(&self, tick: &mut UpgradeTick<'_>) {
        let ticks = tick
            .data
            .get("ticks")
            .and_then(Value::as_u64)
            .unwrap_or(0)
            .saturating_add(1);
        tick.data.insert(String::from("ticks"), Value::from(ticks));
    }

    fn same_as(&self, other: &dyn Upgrade) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| other.range == self.range)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Peripheral derived from a [`SensorUpgrade`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorPeripheral {
    /// The actor the sensor is mounted on.
    pub actor: ActorId,
    /// The side it is mounted on.
    pub side: Side,
    /// Sensing radius in blocks.
    pub range: u32,
}

impl Peripheral for SensorPeripheral {
    fn kind(&self) -> &str {
        "sensor"
    }

    fn same_as(&self, other: &dyn Peripheral) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| other.range == self.range)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn sensors_compare_by_range() {
        let actor = ActorId::new();
        let a = SensorUpgrade { range: 8 }.derive_peripheral(actor, Side::Left).unwrap();
        let b = SensorUpgrade { range: 8 }
            .derive_peripheral(ActorId::new(), Side::Right)
            .unwrap();
        let c = SensorUpgrade { range: 2 }.derive_peripheral(actor, Side::Left).unwrap();
        assert!(a.same_as(b.as_ref()));
        assert!(!a.same_as(c.as_ref()));
        assert_eq!(a.kind(), "sensor");
    }

    #[test]
    fn sensor_upgrades_compare_by_range() {
        let wide = SensorUpgrade { range: 8 };
        assert!(wide.same_as(&SensorUpgrade { range: 8 }));
        assert!(!wide.same_as(&SensorUpgrade { range: 2 }));
        assert!(!wide.same_as(&ToolUpgrade));
        assert!(ToolUpgrade.same_as(&ToolUpgrade));
    }

    #[test]
    fn tool_has_no_peripheral() {
        assert!(!ToolUpgrade.provides_peripheral());
        assert!(ToolUpgrade.derive_peripheral(ActorId::new(), Side::Left).is_none());
        assert!(ToolUpgrade.is_tool());
    }
}
