//! The boundary to the hardware model under test.
//!
//! The driver never looks inside a model. It only uses the capability set of
//! the [`Model`] trait: drive an input, settle, ask whether the model is done,
//! and read the visible signals. A compiled RTL model, a hand-written
//! behavioral model, and a test stub are interchangeable behind it.

use pulse_common::LogicVec;
use serde::{Deserialize, Serialize};

use crate::context::SimContext;
use crate::error::SimError;

/// Hierarchy separator in signal names.
pub const SCOPE_SEPARATOR: char = '.';

/// A signal the model exposes for reading and tracing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalDecl {
    /// Hierarchical name, scopes separated by `.` (e.g. `dut.alu.acc`).
    pub name: String,
    /// Width in bits.
    pub width: u32,
}

impl SignalDecl {
    /// Creates a declaration.
    pub fn new(name: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            width,
        }
    }

    /// Number of hierarchy levels, counting the signal itself.
    ///
    /// `clk` is at depth 1, `dut.alu.acc` at depth 3.
    pub fn depth(&self) -> usize {
        self.name.split(SCOPE_SEPARATOR).count()
    }

    /// The enclosing scopes, outermost first.
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        let mut parts: Vec<&str> = self.name.split(SCOPE_SEPARATOR).collect();
        parts.pop();
        parts.into_iter()
    }

    /// The name without its scopes.
    pub fn leaf(&self) -> &str {
        self.name
            .rsplit(SCOPE_SEPARATOR)
            .next()
            .unwrap_or(&self.name)
    }
}

/// Values of a model's signals at one instant, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSnapshot {
    values: Vec<LogicVec>,
}

impl SignalSnapshot {
    /// Wraps values given in declaration order.
    pub fn new(values: Vec<LogicVec>) -> Self {
        Self { values }
    }

    /// All values.
    pub fn values(&self) -> &[LogicVec] {
        &self.values
    }

    /// The value of the `index`-th declared signal.
    pub fn get(&self, index: usize) -> Option<&LogicVec> {
        self.values.get(index)
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the snapshot has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<LogicVec> for SignalSnapshot {
    fn from_iter<I: IntoIterator<Item = LogicVec>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// An opaque hardware model driven by the clock loop.
pub trait Model {
    /// Signals the model exposes. Must not change over the model's lifetime.
    fn signals(&self) -> Vec<SignalDecl>;

    /// Drives `value` onto the input called `name`.
    ///
    /// Outputs are not updated until the next [`settle`](Model::settle).
    fn apply_input(&mut self, name: &str, value: &LogicVec) -> Result<(), SimError>;

    /// Propagates input changes until the model's signals are stable.
    ///
    /// The model may call [`SimContext::finish`] to end the run.
    fn settle(&mut self, ctx: &mut SimContext) -> Result<(), SimError>;

    /// Model-owned completion predicate, checked before the first clock cycle
    /// and after every full cycle.
    fn is_complete(&self) -> bool {
        false
    }

    /// Current values of [`signals`](Model::signals), in the same order.
    fn read_signals(&self) -> SignalSnapshot;
}

impl<M: Model + ?Sized> Model for Box<M> {
    fn signals(&self) -> Vec<SignalDecl> {
        (**self).signals()
    }

    fn apply_input(&mut self, name: &str, value: &LogicVec) -> Result<(), SimError> {
        (**self).apply_input(name, value)
    }

    fn settle(&mut self, ctx: &mut SimContext) -> Result<(), SimError> {
        (**self).settle(ctx)
    }

    fn is_complete(&self) -> bool {
        (**self).is_complete()
    }

    fn read_signals(&self) -> SignalSnapshot {
        (**self).read_signals()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_counts_levels() {
        assert_eq!(SignalDecl::new("clk", 1).depth(), 1);
        assert_eq!(SignalDecl::new("dut.alu.acc", 8).depth(), 3);
    }

    #[test]
    fn scopes_and_leaf() {
        let d = SignalDecl::new("dut.alu.acc", 8);
        assert_eq!(d.scopes().collect::<Vec<_>>(), ["dut", "alu"]);
        assert_eq!(d.leaf(), "acc");

        let top = SignalDecl::new("clk", 1);
        assert_eq!(top.scopes().count(), 0);
        assert_eq!(top.leaf(), "clk");
    }

    #[test]
    fn snapshot_from_iter() {
        let snap: SignalSnapshot = [LogicVec::from_bool(true), LogicVec::from_u64(3, 4)]
            .into_iter()
            .collect();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.get(1).and_then(LogicVec::to_u64), Some(3));
        assert!(snap.get(2).is_none());
        assert!(!snap.is_empty());
    }
}
