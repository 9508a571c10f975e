//! Shared signal value types for the Pulse testbench driver.
//!
//! Models report their visible state as 4-state [`Logic`] values packed into
//! [`LogicVec`]s; the driver and the waveform sinks only ever see these types.

#![warn(missing_docs)]

pub mod logic;
pub mod logic_vec;

pub use logic::Logic;
pub use logic_vec::LogicVec;
