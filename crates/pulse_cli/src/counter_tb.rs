//! The testbench model bundled with the `pulse` binary.
//!
//! A free-running 8-bit counter held in synchronous reset for the first two
//! clock edges, wrapped in a testbench that calls `$finish` after a number of
//! rising edges given by the `+cycles=N` plusarg (default 20).

use pulse_common::LogicVec;
use pulse_sim::{Model, SignalDecl, SignalSnapshot, SimContext, SimError};

/// Rising edges spent in reset.
const RESET_CYCLES: u64 = 2;

/// Rising edges simulated when `+cycles` is not given.
pub const DEFAULT_CYCLES: u64 = 20;

/// Counter testbench: `clk` in, `rst`, `dut.count`, `dut.wrap`, `tb.cycle` out.
#[derive(Debug, Clone)]
pub struct CounterTb {
    clk: bool,
    prev_clk: bool,
    rst: bool,
    /// `None` until the first reset edge, shown as `x` in the waveform.
    count: Option<u8>,
    wrap: bool,
    cycle: u64,
    limit: u64,
}

impl CounterTb {
    /// Builds the testbench, reading `+cycles=N` from the run context.
    pub fn from_context(ctx: &SimContext) -> Result<Self, SimError> {
        let limit = match ctx.plusarg("cycles") {
            Some(raw) => raw.parse().map_err(|_| SimError::ModelFailure {
                reason: format!("invalid +cycles value '{raw}'"),
            })?,
            None => DEFAULT_CYCLES,
        };
        Ok(Self::with_limit(limit))
    }

    /// Builds the testbench with an explicit edge limit.
    pub fn with_limit(limit: u64) -> Self {
        Self {
            clk: false,
            prev_clk: false,
            rst: true,
            count: None,
            wrap: false,
            cycle: 0,
            limit,
        }
    }

    fn rising_edge(&mut self, ctx: &mut SimContext) {
        if self.rst {
            self.count = Some(0);
            self.wrap = false;
        } else {
            let (next, wrapped) = self.count.unwrap_or(0).overflowing_add(1);
            self.count = Some(next);
            self.wrap = wrapped;
        }
        self.cycle += 1;
        self.rst = self.cycle < RESET_CYCLES;

        if self.cycle >= self.limit {
            tracing::info!(cycle = self.cycle, time = %ctx.time(), "$finish called");
            ctx.finish();
        }
    }
}

impl Model for CounterTb {
    fn signals(&self) -> Vec<SignalDecl> {
        vec![
            SignalDecl::new("clk", 1),
            SignalDecl::new("rst", 1),
            SignalDecl::new("dut.count", 8),
            SignalDecl::new("dut.wrap", 1),
            SignalDecl::new("tb.cycle", 32),
        ]
    }

    fn apply_input(&mut self, name: &str, value: &LogicVec) -> Result<(), SimError> {
        if name != "clk" {
            return Err(SimError::UnknownInput { name: name.into() });
        }
        if value.width() != 1 {
            return Err(SimError::WidthMismatch {
                name: name.into(),
                expected: 1,
                actual: value.width(),
            });
        }
        self.clk = value.to_u64() == Some(1);
        Ok(())
    }

    fn settle(&mut self, ctx: &mut SimContext) -> Result<(), SimError> {
        if self.clk && !self.prev_clk {
            self.rising_edge(ctx);
        }
        self.prev_clk = self.clk;
        Ok(())
    }

    fn read_signals(&self) -> SignalSnapshot {
        let count = match self.count {
            Some(c) => LogicVec::from_u64(u64::from(c), 8),
            None => LogicVec::all_x(8),
        };
        SignalSnapshot::new(vec![
            LogicVec::from_bool(self.clk),
            LogicVec::from_bool(self.rst),
            count,
            LogicVec::from_bool(self.wrap),
            LogicVec::from_u64(self.cycle, 32),
        ])
    }
}
