//! Settle-before-read discipline around a [`Model`].
//!
//! [`Evaluator`] owns the model for the whole run. Every input write marks
//! the model unsettled; reading signals from an unsettled model is an error
//! rather than a silent read of stale outputs.

use pulse_common::LogicVec;

use crate::context::SimContext;
use crate::error::SimError;
use crate::model::{Model, SignalSnapshot};

/// Exclusive owner of the model under test.
#[derive(Debug)]
pub struct Evaluator<M> {
    model: M,
    settled: bool,
    settles: u64,
}

impl<M: Model> Evaluator<M> {
    /// Takes ownership of a freshly constructed model.
    ///
    /// The model counts as unsettled until the first [`settle`](Self::settle).
    pub fn new(model: M) -> Self {
        Self {
            model,
            settled: false,
            settles: 0,
        }
    }

    /// Drives an input and marks the model unsettled.
    pub fn apply_input(&mut self, name: &str, value: &LogicVec) -> Result<(), SimError> {
        self.settled = false;
        self.model.apply_input(name, value)
    }

    /// Runs the model's settle operation once.
    pub fn settle(&mut self, ctx: &mut SimContext) -> Result<(), SimError> {
        self.model.settle(ctx)?;
        self.settled = true;
        self.settles += 1;
        Ok(())
    }

    /// Reads the visible signals of a settled model.
    pub fn read_signals(&self) -> Result<SignalSnapshot, SimError> {
        if !self.settled {
            return Err(SimError::UnsettledRead);
        }
        Ok(self.model.read_signals())
    }

    /// The model's own completion predicate.
    pub fn is_complete(&self) -> bool {
        self.model.is_complete()
    }

    /// Whether no input has changed since the last settle.
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Number of settle operations performed.
    pub fn settles(&self) -> u64 {
        self.settles
    }

    /// Shared access to the model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Releases the model.
    pub fn into_model(self) -> M {
        self.model
    }
}
