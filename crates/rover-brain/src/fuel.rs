//! Per-actor fuel accounting.
//!
//! Invariant: `0 <= level <= limit` after every call. Consumption is
//! all-or-nothing. Families that do not need fuel always succeed and never
//! change the level on consumption.

/// Bounded fuel counter of one actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuelLedger {
    level: u32,
    limit: u32,
    required: bool,
}

impl FuelLedger {
    /// An empty tank of size `limit`.
    pub const fn new(limit: u32, required: bool) -> Self {
        Self {
            level: 0,
            limit,
            required,
        }
    }

    /// Current fuel level.
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Tank size.
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Whether this actor needs fuel at all.
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Whether `amount` could be consumed right now.
    pub const fn has(&self, amount: i32) -> bool {
        !self.required || self.level >= non_negative(amount)
    }

    /// Consume `max(amount, 0)` fuel.
    ///
    /// Returns `false` without touching the level when there is not enough.
    pub const fn consume(&mut self, amount: i32) -> bool {
        if !self.required {
            return true;
        }
        match self.level.checked_sub(non_negative(amount)) {
            Some(rest) => {
                self.level = rest;
                true
            }
            None => false,
        }
    }

    /// Add `max(amount, 0)` fuel, clamped at the limit.
    pub fn add(&mut self, amount: i32) {
        self.level = self.level.saturating_add(non_negative(amount)).min(self.limit);
    }

    /// Overwrite the level, clamped to `[0, limit]`.
    pub fn set_level(&mut self, level: u32) {
        self.level = level.min(self.limit);
    }
}

/// `max(amount, 0)` as an unsigned quantity.
const fn non_negative(amount: i32) -> u32 {
    if amount < 0 { 0 } else { amount.unsigned_abs() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_is_all_or_nothing() {
        let mut fuel = FuelLedger::new(20_000, true);
        fuel.add(500);
        assert!(fuel.consume(10));
        assert_eq!(fuel.level(), 490);
        assert!(!fuel.consume(1_000));
        assert_eq!(fuel.level(), 490);
    }

    #[test]
    fn negative_amounts_count_as_zero() {
        let mut fuel = FuelLedger::new(100, true);
        fuel.add(-50);
        assert_eq!(fuel.level(), 0);
        assert!(fuel.consume(-5));
        assert_eq!(fuel.level(), 0);
    }

    #[test]
    fn level_never_exceeds_limit() {
        let mut fuel = FuelLedger::new(100, true);
        fuel.add(80);
        fuel.add(80);
        assert_eq!(fuel.level(), 100);
        fuel.add(i32::MAX);
        assert_eq!(fuel.level(), 100);
        fuel.set_level(u32::MAX);
        assert_eq!(fuel.level(), 100);
    }

    #[test]
    fn exempt_actors_always_succeed() {
        let mut fuel = FuelLedger::new(100, false);
        assert!(fuel.has(1_000));
        assert!(fuel.consume(1_000));
        assert_eq!(fuel.level(), 0);
    }

    #[test]
    fn interleaved_operations_keep_bounds() {
        let mut fuel = FuelLedger::new(50, true);
        for step in 0..40_i32 {
            if step.rem_euclid(3) == 0 {
                let _ = fuel.consume(step);
            } else {
                fuel.add(step);
            }
            assert!(fuel.level() <= fuel.limit());
        }
    }
}
