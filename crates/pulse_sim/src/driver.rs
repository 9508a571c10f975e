//! The clock loop.
//!
//! Each half-cycle flips the clock onto the model's clock input, advances
//! time by one quantum, settles the model, and samples the trace. Before the
//! first cycle and after both half-cycles of every cycle the loop asks
//! whether the model, or the run context, has finished. [`SimDriver::run`]
//! has no other way to stop: a
//! model that never finishes keeps the loop running forever, exactly like a
//! testbench that never calls `$finish`.

use crate::clock::{ClockDriver, ClockLevel};
use crate::context::SimContext;
use crate::error::SimError;
use crate::evaluator::Evaluator;
use crate::model::Model;
use crate::time::{Quantum, VirtualTime};
use crate::trace::TraceRecorder;
use crate::waveform::TraceSink;
use crate::DriverConfig;

/// Why a run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The model or the run context reported completion.
    Finished,
    /// [`SimDriver::run_for`] reached its cycle cap first.
    CycleCapReached,
}

/// Summary of a completed run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Simulated time when the loop stopped.
    pub final_time: VirtualTime,
    /// Full clock cycles executed.
    pub cycles: u64,
    /// Waveform samples written.
    pub samples: u64,
    /// Why the loop stopped.
    pub outcome: RunOutcome,
}

/// Drives one model through simulated time and traces it into one sink.
pub struct SimDriver<M: Model, S: TraceSink> {
    ctx: SimContext,
    clock: ClockDriver,
    evaluator: Evaluator<M>,
    recorder: TraceRecorder<S>,
    quantum: Quantum,
    clock_port: String,
    cycles: u64,
}

impl<M: Model, S: TraceSink> SimDriver<M, S> {
    /// Takes ownership of `model` and `sink` and prepares the first cycle.
    ///
    /// The model is settled once so its reset values are visible; the clock
    /// starts from the model's reset level of `config.clock_port` (low if the
    /// model does not expose that signal). The sink is then opened with the
    /// model's signal declarations.
    ///
    /// A finish requested during the reset settle ends the run before its
    /// first cycle.
    pub fn new(
        model: M,
        sink: S,
        mut ctx: SimContext,
        config: &DriverConfig,
    ) -> Result<Self, SimError> {
        let mut evaluator = Evaluator::new(model);
        evaluator.settle(&mut ctx)?;

        let signals = evaluator.model().signals();
        let reset = evaluator.read_signals()?;
        let initial = signals
            .iter()
            .position(|d| d.name == config.clock_port)
            .and_then(|i| reset.get(i))
            .filter(|v| v.width() > 0)
            .map(|v| ClockLevel::from_logic(v.get(0)))
            .unwrap_or_default();

        let recorder = TraceRecorder::open(sink, &signals, config.trace_depth)?;

        Ok(Self {
            ctx,
            clock: ClockDriver::new(initial),
            evaluator,
            recorder,
            quantum: config.quantum,
            clock_port: config.clock_port.clone(),
            cycles: 0,
        })
    }

    /// Runs one half-cycle and returns the new clock level.
    ///
    /// If the model rejects the clock write, neither time nor the clock
    /// level moves.
    pub fn half_cycle(&mut self) -> Result<ClockLevel, SimError> {
        let level = self.clock.level().toggled();
        self.evaluator.apply_input(&self.clock_port, &level.into())?;
        self.clock.toggle();
        let now = self.ctx.time_inc(self.quantum);
        self.evaluator.settle(&mut self.ctx)?;
        let snapshot = self.evaluator.read_signals()?;
        self.recorder.sample(now, &snapshot)?;
        tracing::trace!(time = %now, clk = ?level, "half-cycle");
        Ok(level)
    }

    /// Runs both half-cycles of one clock period.
    pub fn cycle(&mut self) -> Result<(), SimError> {
        self.half_cycle()?;
        self.half_cycle()?;
        self.cycles += 1;
        Ok(())
    }

    /// The termination predicate: the model says it is complete, or it has
    /// requested a finish through the run context.
    pub fn is_finished(&self) -> bool {
        self.evaluator.is_complete() || self.ctx.got_finish()
    }

    /// Runs cycles until the model finishes, then closes the trace.
    ///
    /// There is no time limit. On error the trace is closed before the error
    /// is returned.
    pub fn run(&mut self) -> Result<RunSummary, SimError> {
        self.drive(None)
    }

    /// Like [`run`](Self::run), but stops after `max_cycles` cycles even if the
    /// model has not finished.
    ///
    /// The cap is opt-in; nothing applies one implicitly.
    pub fn run_for(&mut self, max_cycles: u64) -> Result<RunSummary, SimError> {
        self.drive(Some(max_cycles))
    }

    fn drive(&mut self, cap: Option<u64>) -> Result<RunSummary, SimError> {
        tracing::info!(quantum = %self.quantum, clock = %self.clock_port, "simulation started");
        match self.loop_until_done(cap) {
            Ok(outcome) => {
                self.recorder.close()?;
                let summary = self.summary(outcome);
                tracing::info!(
                    time = %summary.final_time,
                    cycles = summary.cycles,
                    samples = summary.samples,
                    "simulation finished"
                );
                Ok(summary)
            }
            Err(e) => {
                tracing::error!(time = %self.ctx.time(), "simulation aborted: {e}");
                if let Err(close_err) = self.recorder.close() {
                    tracing::warn!("failed to close waveform trace: {close_err}");
                }
                Err(e)
            }
        }
    }

    fn loop_until_done(&mut self, cap: Option<u64>) -> Result<RunOutcome, SimError> {
        let mut ran = 0u64;
        loop {
            if self.is_finished() {
                return Ok(RunOutcome::Finished);
            }
            if cap.is_some_and(|max| ran >= max) {
                return Ok(RunOutcome::CycleCapReached);
            }
            self.cycle()?;
            ran += 1;
        }
    }

    fn summary(&self, outcome: RunOutcome) -> RunSummary {
        RunSummary {
            final_time: self.ctx.time(),
            cycles: self.cycles,
            samples: self.recorder.sample_count(),
            outcome,
        }
    }

    /// Current simulated time.
    pub fn time(&self) -> VirtualTime {
        self.ctx.time()
    }

    /// Current clock level.
    pub fn clock_level(&self) -> ClockLevel {
        self.clock.level()
    }

    /// Full cycles executed so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Settle operations performed so far, including the reset settle.
    pub fn settles(&self) -> u64 {
        self.evaluator.settles()
    }

    /// The run context.
    pub fn context(&self) -> &SimContext {
        &self.ctx
    }

    /// The model under test.
    pub fn model(&self) -> &M {
        self.evaluator.model()
    }

    /// The waveform sink.
    pub fn sink(&self) -> &S {
        self.recorder.sink()
    }

    /// Whether the waveform trace has been closed.
    pub fn trace_closed(&self) -> bool {
        self.recorder.is_closed()
    }
}
