//! The `pulse` binary: drives the bundled counter testbench through simulated time.
//!
//! Every argument after the flags is forwarded untouched to the simulation
//! context, so the testbench can read `+name=value` plusargs from it. The run
//! writes a VCD waveform to `counter_tb.vcd` in the working directory.

#![warn(missing_docs)]

mod counter_tb;
mod run;

use std::path::Path;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Command-line arguments of the `pulse` binary.
#[derive(Parser, Debug)]
#[command(name = "pulse", version, about = "Two-phase clock testbench driver")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Arguments forwarded to the simulation (e.g. `+cycles=50`).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub sim_args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    match run::run(&cli, Path::new(run::DEFAULT_WAVEFORM_PATH)) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over the flags.
fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "warn"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
