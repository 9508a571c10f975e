//! Error types for the testbench driver.
//!
//! Every fallible operation in this crate returns a [`SimError`]. None of
//! them are recovered from inside the driver loop: an error stops the run,
//! the trace is closed, and the error reaches the caller.

use std::io;
use std::path::PathBuf;

/// Errors that can occur while driving a model.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// An I/O error occurred while writing waveform data.
    #[error("waveform I/O error: {0}")]
    WaveformIo(#[from] io::Error),

    /// The waveform file could not be created.
    #[error("cannot open waveform file {}: {source}", path.display())]
    TraceOpen {
        /// Path of the waveform file.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The model reported an evaluation failure.
    #[error("model evaluation failed: {reason}")]
    ModelFailure {
        /// Description supplied by the model.
        reason: String,
    },

    /// An input was driven that the model does not have.
    #[error("model has no input named '{name}'")]
    UnknownInput {
        /// The requested input name.
        name: String,
    },

    /// A value of the wrong width was driven onto an input.
    #[error("width mismatch on '{name}': expected {expected} bits, got {actual}")]
    WidthMismatch {
        /// The input name.
        name: String,
        /// Declared width of the input.
        expected: u32,
        /// Width of the driven value.
        actual: u32,
    },

    /// Model outputs were read after an input change without settling first.
    #[error("model read before settling pending input changes")]
    UnsettledRead,

    /// A sample's timestamp did not advance past the previous sample.
    #[error("non-monotonic waveform sample: {next_ps} ps after {previous_ps} ps")]
    NonMonotonicSample {
        /// Timestamp of the last recorded sample in picoseconds.
        previous_ps: u64,
        /// Rejected timestamp in picoseconds.
        next_ps: u64,
    },

    /// A snapshot did not carry one value per declared signal.
    #[error("snapshot has {actual} values but {expected} signals are declared")]
    SnapshotMismatch {
        /// Number of declared signals.
        expected: usize,
        /// Number of values in the snapshot.
        actual: usize,
    },

    /// The trace was written to after it was closed.
    #[error("waveform trace is already closed")]
    TraceClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waveform_io_display() {
        let e = SimError::WaveformIo(io::Error::other("disk full"));
        assert_eq!(e.to_string(), "waveform I/O error: disk full");
    }

    #[test]
    fn trace_open_display() {
        let e = SimError::TraceOpen {
            path: PathBuf::from("/nope/tb.vcd"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such directory"),
        };
        assert_eq!(
            e.to_string(),
            "cannot open waveform file /nope/tb.vcd: no such directory"
        );
    }

    #[test]
    fn model_failure_display() {
        let e = SimError::ModelFailure {
            reason: "bus contention".into(),
        };
        assert_eq!(e.to_string(), "model evaluation failed: bus contention");
    }

    #[test]
    fn unknown_input_display() {
        let e = SimError::UnknownInput { name: "rst".into() };
        assert_eq!(e.to_string(), "model has no input named 'rst'");
    }

    #[test]
    fn width_mismatch_display() {
        let e = SimError::WidthMismatch {
            name: "clk".into(),
            expected: 1,
            actual: 8,
        };
        assert_eq!(
            e.to_string(),
            "width mismatch on 'clk': expected 1 bits, got 8"
        );
    }

    #[test]
    fn non_monotonic_display() {
        let e = SimError::NonMonotonicSample {
            previous_ps: 10,
            next_ps: 10,
        };
        assert_eq!(
            e.to_string(),
            "non-monotonic waveform sample: 10 ps after 10 ps"
        );
    }

    #[test]
    fn snapshot_mismatch_display() {
        let e = SimError::SnapshotMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(
            e.to_string(),
            "snapshot has 2 values but 3 signals are declared"
        );
    }

    #[test]
    fn io_error_converts() {
        let e: SimError = io::Error::new(io::ErrorKind::BrokenPipe, "gone").into();
        assert!(matches!(e, SimError::WaveformIo(_)));
    }
}
