//! Two-phase clock generation.

use pulse_common::{Logic, LogicVec};
use serde::{Deserialize, Serialize};

/// Level of the generated clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClockLevel {
    /// Logic 0.
    #[default]
    Low,
    /// Logic 1.
    High,
}

impl ClockLevel {
    /// The opposite level.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            ClockLevel::Low => ClockLevel::High,
            ClockLevel::High => ClockLevel::Low,
        }
    }

    /// Returns `true` for [`ClockLevel::High`].
    pub fn is_high(self) -> bool {
        self == ClockLevel::High
    }

    /// Interprets a model's clock bit. Anything other than `1` counts as low.
    pub fn from_logic(level: Logic) -> Self {
        if level == Logic::One {
            ClockLevel::High
        } else {
            ClockLevel::Low
        }
    }
}

impl From<ClockLevel> for LogicVec {
    fn from(level: ClockLevel) -> Self {
        LogicVec::from_bool(level.is_high())
    }
}

/// Alternates the clock level once per half-cycle.
///
/// The machine has no terminal state; the driver loop decides when to stop
/// calling [`toggle`](ClockDriver::toggle).
#[derive(Debug, Clone)]
pub struct ClockDriver {
    level: ClockLevel,
    transitions: u64,
}

impl ClockDriver {
    /// Creates a driver resting at `initial`.
    pub fn new(initial: ClockLevel) -> Self {
        Self {
            level: initial,
            transitions: 0,
        }
    }

    /// Current level.
    pub fn level(&self) -> ClockLevel {
        self.level
    }

    /// Number of transitions made so far.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// Flips the level and returns the new one.
    pub fn toggle(&mut self) -> ClockLevel {
        self.level = self.level.toggled();
        self.transitions += 1;
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_level_is_low() {
        assert_eq!(ClockLevel::default(), ClockLevel::Low);
    }

    #[test]
    fn toggle_alternates() {
        let mut clk = ClockDriver::new(ClockLevel::Low);
        let levels: Vec<_> = (0..6).map(|_| clk.toggle()).collect();
        assert_eq!(
            levels,
            [
                ClockLevel::High,
                ClockLevel::Low,
                ClockLevel::High,
                ClockLevel::Low,
                ClockLevel::High,
                ClockLevel::Low
            ]
        );
        assert_eq!(clk.transitions(), 6);
    }

    #[test]
    fn starts_from_given_level() {
        let mut clk = ClockDriver::new(ClockLevel::High);
        assert_eq!(clk.level(), ClockLevel::High);
        assert_eq!(clk.toggle(), ClockLevel::Low);
    }

    #[test]
    fn from_logic_treats_unknown_as_low() {
        assert_eq!(ClockLevel::from_logic(Logic::One), ClockLevel::High);
        assert_eq!(ClockLevel::from_logic(Logic::Zero), ClockLevel::Low);
        assert_eq!(ClockLevel::from_logic(Logic::X), ClockLevel::Low);
        assert_eq!(ClockLevel::from_logic(Logic::Z), ClockLevel::Low);
    }

    #[test]
    fn converts_to_single_bit() {
        let v: LogicVec = ClockLevel::High.into();
        assert_eq!(v, LogicVec::from_bool(true));
    }
}
