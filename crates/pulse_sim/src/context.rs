//! The run context shared between the driver and the model.
//!
//! [`SimContext`] is the time authority: it owns the current [`VirtualTime`],
//! the process arguments forwarded to the model, and the finish flag a model
//! raises to end the run. Only the driver can advance time.

use crate::time::{Quantum, VirtualTime};

/// Simulated time, forwarded arguments, and the finish request of one run.
#[derive(Debug, Clone, Default)]
pub struct SimContext {
    time: VirtualTime,
    args: Vec<String>,
    finished: bool,
}

impl SimContext {
    /// Creates a context at time zero with no arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context carrying the given process arguments verbatim.
    pub fn with_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// The arguments forwarded from the command line, uninterpreted.
    pub fn command_args(&self) -> &[String] {
        &self.args
    }

    /// Current simulated time.
    pub fn time(&self) -> VirtualTime {
        self.time
    }

    /// Advances simulated time by one quantum and returns the new time.
    pub(crate) fn time_inc(&mut self, quantum: Quantum) -> VirtualTime {
        self.time = self.time.advance(quantum);
        self.time
    }

    /// Requests the end of the run, like `$finish` in a testbench.
    ///
    /// The driver notices the request after the current clock cycle completes.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// Whether a model has requested the end of the run.
    pub fn got_finish(&self) -> bool {
        self.finished
    }

    /// Returns `true` if any `+` argument starts with `name`.
    ///
    /// Matches by prefix, so `has_plusarg("trace")` is satisfied by `+trace`
    /// as well as `+trace=all`.
    pub fn has_plusarg(&self, name: &str) -> bool {
        self.plusargs().any(|body| body.starts_with(name))
    }

    /// Returns the value of the first `+name=value` argument.
    pub fn plusarg(&self, name: &str) -> Option<&str> {
        self.plusargs().find_map(|body| {
            body.strip_prefix(name)
                .and_then(|rest| rest.strip_prefix('='))
        })
    }

    fn plusargs(&self) -> impl Iterator<Item = &str> {
        self.args.iter().filter_map(|a| a.strip_prefix('+'))
    }
}
