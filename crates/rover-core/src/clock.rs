//! Simulation tick clock.
//!
//! The clock is the single source of truth for simulation time. It counts
//! ticks with checked arithmetic and remembers when the run started.

use chrono::{DateTime, Utc};

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// Tick counter for one simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickClock {
    /// Current tick number (0 before the first tick runs).
    tick: u64,
    /// Wall-clock time the clock was created.
    started_at: DateTime<Utc>,
}

impl TickClock {
    /// A clock at tick 0.
    pub fn new() -> Self {
        Self::from_tick(0)
    }

    /// A clock resumed at `tick` (state restoration and tests).
    pub fn from_tick(tick: u64) -> Self {
        Self {
            tick,
            started_at: Utc::now(),
        }
    }

    /// Advance by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// The current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// When the clock was created.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn advances_from_zero() {
        let mut clock = TickClock::new();
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.advance().unwrap(), 1);
        assert_eq!(clock.advance().unwrap(), 2);
        assert_eq!(clock.tick(), 2);
    }

    #[test]
    fn overflow_is_an_error() {
        let mut clock = TickClock::from_tick(u64::MAX);
        assert!(matches!(clock.advance(), Err(ClockError::TickOverflow)));
        assert_eq!(clock.tick(), u64::MAX);
    }
}
