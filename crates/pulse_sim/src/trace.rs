//! Scoped waveform recording.
//!
//! [`TraceRecorder`] owns a [`TraceSink`] from the moment signals are
//! declared until the sink is closed. It enforces the trace invariants
//! (strictly increasing timestamps, one value of the declared width per
//! traced signal) and closes the sink exactly once: explicitly through
//! [`TraceRecorder::close`], or from `Drop` when a run ends through an error
//! or a panic.

use crate::error::SimError;
use crate::model::{SignalDecl, SignalSnapshot};
use crate::time::VirtualTime;
use crate::waveform::{TraceSink, WaveformSample};

/// Hierarchy depth traced when no other limit is given.
pub const DEFAULT_TRACE_DEPTH: usize = 99;

/// Owner of an open waveform sink.
pub struct TraceRecorder<S: TraceSink> {
    sink: S,
    /// Indices into the model's declarations that are traced.
    traced: Vec<usize>,
    /// Declarations of the traced signals, parallel to `traced`.
    visible: Vec<SignalDecl>,
    declared: usize,
    last_time: Option<VirtualTime>,
    samples: u64,
    closed: bool,
}

impl<S: TraceSink> TraceRecorder<S> {
    /// Declares the model's signals to `sink`, keeping those at most `depth`
    /// hierarchy levels deep.
    ///
    /// If the declaration fails the sink is closed before the error returns.
    pub fn open(mut sink: S, signals: &[SignalDecl], depth: usize) -> Result<Self, SimError> {
        let traced: Vec<usize> = signals
            .iter()
            .enumerate()
            .filter(|(_, d)| d.depth() <= depth)
            .map(|(i, _)| i)
            .collect();
        let visible: Vec<SignalDecl> = traced.iter().map(|&i| signals[i].clone()).collect();

        if let Err(e) = sink.declare(&visible) {
            if let Err(close_err) = sink.close() {
                tracing::warn!("closing waveform after failed open: {close_err}");
            }
            return Err(e);
        }
        tracing::debug!(
            traced = traced.len(),
            declared = signals.len(),
            depth,
            "waveform trace opened"
        );

        Ok(Self {
            sink,
            traced,
            visible,
            declared: signals.len(),
            last_time: None,
            samples: 0,
            closed: false,
        })
    }

    /// Appends the traced part of `snapshot` at `time`.
    ///
    /// Every traced value must have its declared width.
    pub fn sample(&mut self, time: VirtualTime, snapshot: &SignalSnapshot) -> Result<(), SimError> {
        if self.closed {
            return Err(SimError::TraceClosed);
        }
        if let Some(previous) = self.last_time {
            if time <= previous {
                return Err(SimError::NonMonotonicSample {
                    previous_ps: previous.as_ps(),
                    next_ps: time.as_ps(),
                });
            }
        }
        if snapshot.len() != self.declared {
            return Err(SimError::SnapshotMismatch {
                expected: self.declared,
                actual: snapshot.len(),
            });
        }

        let values = snapshot.values();
        for (&i, decl) in self.traced.iter().zip(&self.visible) {
            let actual = values[i].width();
            if actual != decl.width {
                return Err(SimError::WidthMismatch {
                    name: decl.name.clone(),
                    expected: decl.width,
                    actual,
                });
            }
        }

        let sample = WaveformSample {
            time,
            snapshot: self.traced.iter().map(|&i| values[i].clone()).collect(),
        };
        self.sink.dump(&sample)?;
        self.last_time = Some(time);
        self.samples += 1;
        Ok(())
    }

    /// Flushes and closes the sink. Later calls do nothing.
    pub fn close(&mut self) -> Result<(), SimError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        tracing::debug!(samples = self.samples, "waveform trace closed");
        self.sink.close()
    }

    /// Whether the sink has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of samples written.
    pub fn sample_count(&self) -> u64 {
        self.samples
    }

    /// Number of signals that made it into the trace.
    pub fn traced_count(&self) -> usize {
        self.traced.len()
    }

    /// Timestamp of the last sample.
    pub fn last_time(&self) -> Option<VirtualTime> {
        self.last_time
    }

    /// The sink being written.
    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<S: TraceSink> Drop for TraceRecorder<S> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("failed to close waveform trace: {e}");
        }
    }
}
