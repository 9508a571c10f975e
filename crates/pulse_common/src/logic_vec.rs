//! Packed 4-state vectors holding the value of one model signal.

use crate::logic::Logic;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Levels packed per `u64` word (2 bits each).
const LEVELS_PER_WORD: u32 = 32;

/// A fixed-width vector of [`Logic`] levels, index 0 being the LSB.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicVec {
    width: u32,
    words: Vec<u64>,
}

impl LogicVec {
    /// Creates a vector of `width` levels, all `Zero`.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            words: vec![0; width.div_ceil(LEVELS_PER_WORD) as usize],
        }
    }

    /// Creates a vector of `width` levels, all `X` (an uninitialized register).
    pub fn all_x(width: u32) -> Self {
        let mut v = Self::new(width);
        for i in 0..width {
            v.set(i, Logic::X);
        }
        v
    }

    /// Creates a single-bit vector.
    pub fn from_bool(value: bool) -> Self {
        let mut v = Self::new(1);
        v.set(0, Logic::from(value));
        v
    }

    /// Creates a `width`-bit vector from the low bits of `value`.
    pub fn from_u64(value: u64, width: u32) -> Self {
        let mut v = Self::new(width);
        for i in 0..width.min(64) {
            if (value >> i) & 1 == 1 {
                v.set(i, Logic::One);
            }
        }
        v
    }

    /// Parses an MSB-first string such as `"10xz"`.
    pub fn from_binary_str(s: &str) -> Option<Self> {
        let mut v = Self::new(s.len() as u32);
        for (i, c) in s.chars().rev().enumerate() {
            v.set(i as u32, Logic::from_char(c)?);
        }
        Some(v)
    }

    /// Number of levels in the vector.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the level at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: u32) -> Logic {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word = self.words[(index / LEVELS_PER_WORD) as usize];
        Logic::from_bits(word >> ((index % LEVELS_PER_WORD) * 2))
    }

    /// Overwrites the level at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn set(&mut self, index: u32, value: Logic) {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let shift = (index % LEVELS_PER_WORD) * 2;
        let word = &mut self.words[(index / LEVELS_PER_WORD) as usize];
        *word = (*word & !(0b11u64 << shift)) | ((value as u64) << shift);
    }

    /// Interprets the vector as an unsigned integer.
    ///
    /// `None` if any level is `X`/`Z` or the vector is wider than 64 bits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.width > 64 {
            return None;
        }
        let mut out = 0u64;
        for i in 0..self.width {
            match self.get(i) {
                Logic::Zero => {}
                Logic::One => out |= 1u64 << i,
                Logic::X | Logic::Z => return None,
            }
        }
        Some(out)
    }

    /// Iterates levels from MSB to LSB.
    pub fn iter_msb_first(&self) -> impl Iterator<Item = Logic> + '_ {
        (0..self.width).rev().map(move |i| self.get(i))
    }
}

impl fmt::Display for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for level in self.iter_msb_first() {
            write!(f, "{level}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicVec({self})")
    }
}
