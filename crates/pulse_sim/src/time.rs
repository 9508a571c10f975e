//! Simulated time with picosecond resolution.
//!
//! [`VirtualTime`] only moves forward, and only in whole [`Quantum`] steps.
//! A quantum is never zero: the type cannot be constructed from zero, so the
//! "each advancement strictly increases time" invariant holds by construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;

/// Picoseconds per nanosecond.
pub const PS_PER_NS: u64 = 1_000;
/// Picoseconds per microsecond.
pub const PS_PER_US: u64 = 1_000_000;
/// Picoseconds per millisecond.
pub const PS_PER_MS: u64 = 1_000_000_000;

/// A fixed, strictly positive time step in picoseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quantum(NonZeroU64);

impl Quantum {
    /// Creates a quantum of `ps` picoseconds, or `None` for zero.
    pub const fn from_ps(ps: u64) -> Option<Self> {
        match NonZeroU64::new(ps) {
            Some(q) => Some(Self(q)),
            None => None,
        }
    }

    /// The step length in picoseconds.
    pub const fn as_ps(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for Quantum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&VirtualTime::from_ps(self.as_ps()), f)
    }
}

/// A point in simulated time, counted in picoseconds from zero.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct VirtualTime {
    ps: u64,
}

impl VirtualTime {
    /// Time zero.
    pub const ZERO: Self = Self { ps: 0 };

    /// Creates a time point from picoseconds.
    pub const fn from_ps(ps: u64) -> Self {
        Self { ps }
    }

    /// Creates a time point from nanoseconds.
    ///
    /// # Panics
    ///
    /// Panics if `ns` is not representable in picoseconds.
    pub const fn from_ns(ns: u64) -> Self {
        match ns.checked_mul(PS_PER_NS) {
            Some(ps) => Self { ps },
            None => panic!("simulated time overflow converting nanoseconds to picoseconds"),
        }
    }

    /// Picoseconds since time zero.
    pub const fn as_ps(self) -> u64 {
        self.ps
    }

    /// Returns this time moved forward by one quantum.
    ///
    /// # Panics
    ///
    /// Panics if the picosecond counter overflows `u64`.
    #[must_use]
    pub fn advance(self, quantum: Quantum) -> Self {
        let ps = self
            .ps
            .checked_add(quantum.as_ps())
            .unwrap_or_else(|| panic!("simulated time overflow at {} ps", self.ps));
        Self { ps }
    }
}

impl fmt::Display for VirtualTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ps = self.ps;
        if ps >= PS_PER_MS && ps % PS_PER_MS == 0 {
            write!(f, "{} ms", ps / PS_PER_MS)
        } else if ps >= PS_PER_US && ps % PS_PER_US == 0 {
            write!(f, "{} us", ps / PS_PER_US)
        } else if ps >= PS_PER_NS && ps % PS_PER_NS == 0 {
            write!(f, "{} ns", ps / PS_PER_NS)
        } else {
            write!(f, "{ps} ps")
        }
    }
}
