//! Runs the bundled counter testbench once.
//!
//! Builds the simulation context from the forwarded arguments, constructs the
//! testbench, drives it until it calls `$finish`, and prints a short summary.

use std::path::Path;

use pulse_sim::{DriverConfig, SimContext};

use crate::counter_tb::CounterTb;
use crate::Cli;

/// Waveform file written by every run.
pub const DEFAULT_WAVEFORM_PATH: &str = "counter_tb.vcd";

/// Runs the testbench, writing its waveform to `waveform_path`.
///
/// Returns exit code 0 when the testbench finishes normally.
pub fn run(cli: &Cli, waveform_path: &Path) -> Result<i32, Box<dyn std::error::Error>> {
    let ctx = SimContext::with_args(cli.sim_args.iter().cloned());
    let model = CounterTb::from_context(&ctx)?;
    let config = DriverConfig {
        waveform_path: Some(waveform_path.to_path_buf()),
        ..DriverConfig::default()
    };

    if !cli.quiet {
        eprintln!("   Starting simulation...");
    }

    let summary = pulse_sim::simulate(model, ctx, &config)?;

    if !cli.quiet {
        eprintln!(
            "   Simulation finished at {} ({} cycles)",
            summary.final_time, summary.cycles
        );
        eprintln!("   Waveform: {}", waveform_path.display());
    }

    Ok(0)
}
