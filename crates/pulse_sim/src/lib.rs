//! Two-phase clock driver and waveform tracer for opaque hardware models.
//!
//! This crate pushes a [`Model`] through simulated time the way a
//! hand-written C++ testbench drives a compiled RTL model: advance time by a
//! fixed quantum, toggle the clock, settle the model, dump a waveform sample,
//! and repeat until the model asks to finish.
//!
//! # Usage
//!
//! ```ignore
//! use pulse_sim::{simulate, DriverConfig, SimContext};
//!
//! let ctx = SimContext::with_args(std::env::args().skip(1));
//! let summary = simulate(my_model, ctx, &DriverConfig::default())?;
//! println!("finished at {}", summary.final_time);
//! ```
//!
//! # Modules
//!
//! - `error`: Error type shared by every operation
//! - `time`: Picosecond virtual time and the positive quantum
//! - `context`: Run context holding time, forwarded arguments and the finish flag
//! - `clock`: Two-phase clock state machine
//! - `model`: The model capability trait and signal snapshots
//! - `evaluator`: Settle-before-read ownership of the model
//! - `waveform`: Trace sinks (VCD, in-memory, null)
//! - `trace`: Scoped trace recorder
//! - `driver`: The clock loop and termination check

#![warn(missing_docs)]

pub mod clock;
pub mod context;
pub mod driver;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod time;
pub mod trace;
pub mod waveform;

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

pub use clock::{ClockDriver, ClockLevel};
pub use context::SimContext;
pub use driver::{RunOutcome, RunSummary, SimDriver};
pub use error::SimError;
pub use evaluator::Evaluator;
pub use model::{Model, SignalDecl, SignalSnapshot};
pub use time::{Quantum, VirtualTime};
pub use trace::{TraceRecorder, DEFAULT_TRACE_DEPTH};
pub use waveform::{MemoryTrace, NullSink, TraceSink, VcdSink, WaveformSample};

/// Half-period of the generated clock.
pub const DEFAULT_QUANTUM: Quantum = match Quantum::from_ps(5) {
    Some(q) => q,
    None => panic!("default quantum must be positive"),
};

/// Name of the model input the clock is driven onto.
pub const DEFAULT_CLOCK_PORT: &str = "clk";

/// Settings for one simulation run.
///
/// The defaults are fixed: a 5 ps half-period on `clk`, 99 traced hierarchy
/// levels, and no waveform file.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Time advanced per half-cycle.
    pub quantum: Quantum,
    /// Model input receiving the clock.
    pub clock_port: String,
    /// Deepest hierarchy level written to the waveform.
    pub trace_depth: usize,
    /// Waveform output path. `None` disables the waveform file.
    pub waveform_path: Option<PathBuf>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            quantum: DEFAULT_QUANTUM,
            clock_port: DEFAULT_CLOCK_PORT.to_string(),
            trace_depth: DEFAULT_TRACE_DEPTH,
            waveform_path: None,
        }
    }
}

/// Runs `model` to completion, writing a VCD file if the config names one.
///
/// Fails before the first cycle if the waveform file cannot be created.
pub fn simulate<M: Model>(
    model: M,
    ctx: SimContext,
    config: &DriverConfig,
) -> Result<RunSummary, SimError> {
    let sink: Box<dyn TraceSink> = match &config.waveform_path {
        Some(path) => {
            let file = File::create(path).map_err(|source| SimError::TraceOpen {
                path: path.clone(),
                source,
            })?;
            Box::new(VcdSink::new(BufWriter::new(file)))
        }
        None => Box::new(NullSink),
    };

    let mut driver = SimDriver::new(model, sink, ctx, config)?;
    driver.run()
}
