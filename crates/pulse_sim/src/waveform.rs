//! Waveform sinks.
//!
//! A [`TraceSink`] receives the signal declarations once, then one
//! [`WaveformSample`] per evaluation, then a single close. The on-disk format
//! is the sink's business: [`VcdSink`] writes an IEEE 1364 Value Change Dump
//! readable by GTKWave or Surfer, [`MemoryTrace`] keeps samples in memory,
//! and [`NullSink`] discards them.

use std::io::Write;

use pulse_common::LogicVec;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::model::{SignalDecl, SignalSnapshot};
use crate::time::VirtualTime;

/// One entry of the waveform trace: every traced signal at one instant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveformSample {
    /// When the snapshot was taken.
    pub time: VirtualTime,
    /// Traced signal values, in declaration order.
    pub snapshot: SignalSnapshot,
}

/// Destination for waveform samples.
pub trait TraceSink {
    /// Announces the traced signals. Called once, before any sample.
    fn declare(&mut self, signals: &[SignalDecl]) -> Result<(), SimError>;

    /// Appends a sample.
    fn dump(&mut self, sample: &WaveformSample) -> Result<(), SimError>;

    /// Flushes and closes the destination.
    fn close(&mut self) -> Result<(), SimError>;
}

impl<S: TraceSink + ?Sized> TraceSink for Box<S> {
    fn declare(&mut self, signals: &[SignalDecl]) -> Result<(), SimError> {
        (**self).declare(signals)
    }

    fn dump(&mut self, sample: &WaveformSample) -> Result<(), SimError> {
        (**self).dump(sample)
    }

    fn close(&mut self) -> Result<(), SimError> {
        (**self).close()
    }
}

/// A sink that accepts and discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn declare(&mut self, _signals: &[SignalDecl]) -> Result<(), SimError> {
        Ok(())
    }

    fn dump(&mut self, _sample: &WaveformSample) -> Result<(), SimError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), SimError> {
        Ok(())
    }
}

/// An append-only in-memory trace.
#[derive(Debug, Clone, Default)]
pub struct MemoryTrace {
    signals: Vec<SignalDecl>,
    samples: Vec<WaveformSample>,
    closes: usize,
}

impl MemoryTrace {
    /// Creates an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declared signals.
    pub fn signals(&self) -> &[SignalDecl] {
        &self.signals
    }

    /// Samples in the order they were appended.
    pub fn samples(&self) -> &[WaveformSample] {
        &self.samples
    }

    /// Whether the trace has been closed.
    pub fn is_closed(&self) -> bool {
        self.closes > 0
    }

    /// How many times `close` was called.
    pub fn close_count(&self) -> usize {
        self.closes
    }
}

impl TraceSink for MemoryTrace {
    fn declare(&mut self, signals: &[SignalDecl]) -> Result<(), SimError> {
        self.signals = signals.to_vec();
        Ok(())
    }

    fn dump(&mut self, sample: &WaveformSample) -> Result<(), SimError> {
        if self.is_closed() {
            return Err(SimError::TraceClosed);
        }
        self.samples.push(sample.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), SimError> {
        self.closes += 1;
        Ok(())
    }
}

/// Value Change Dump writer with a 1 ps timescale.
///
/// The first sample writes every value inside `$dumpvars`; later samples
/// write a timestamp followed by the values that changed.
pub struct VcdSink<W: Write> {
    writer: W,
    codes: Vec<String>,
    widths: Vec<u32>,
    previous: Option<Vec<LogicVec>>,
    closed: bool,
}

impl<W: Write> VcdSink<W> {
    /// Creates a sink writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            codes: Vec::new(),
            widths: Vec::new(),
            previous: None,
            closed: false,
        }
    }

    /// The underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consumes the sink, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Short identifier for the `index`-th variable.
    ///
    /// Printable ASCII from `!` (0x21) to `~` (0x7E), growing to several
    /// characters past 94 variables.
    fn id_code(index: usize) -> String {
        let mut code = String::new();
        let mut n = index;
        loop {
            code.push(char::from(b'!' + (n % 94) as u8));
            n /= 94;
            if n == 0 {
                break code;
            }
            n -= 1;
        }
    }

    fn write_value(&mut self, index: usize, value: &LogicVec) -> Result<(), SimError> {
        let code = &self.codes[index];
        if self.widths[index] == 1 {
            let bit = if value.width() == 0 {
                'x'
            } else {
                value.get(0).vcd_char()
            };
            writeln!(self.writer, "{bit}{code}")?;
        } else {
            let bits: String = value.iter_msb_first().map(|l| l.vcd_char()).collect();
            writeln!(self.writer, "b{bits} {code}")?;
        }
        Ok(())
    }

    fn write_scopes(&mut self, signals: &[SignalDecl]) -> Result<(), SimError> {
        let mut open: Vec<String> = Vec::new();
        for (index, decl) in signals.iter().enumerate() {
            let wanted: Vec<&str> = decl.scopes().collect();
            let common = open
                .iter()
                .zip(&wanted)
                .take_while(|(a, b)| a.as_str() == **b)
                .count();
            while open.len() > common {
                open.pop();
                writeln!(self.writer, "$upscope $end")?;
            }
            for scope in &wanted[common..] {
                writeln!(self.writer, "$scope module {scope} $end")?;
                open.push((*scope).to_string());
            }
            writeln!(
                self.writer,
                "$var wire {} {} {} $end",
                decl.width,
                self.codes[index],
                decl.leaf()
            )?;
        }
        for _ in open {
            writeln!(self.writer, "$upscope $end")?;
        }
        Ok(())
    }
}

impl<W: Write> TraceSink for VcdSink<W> {
    fn declare(&mut self, signals: &[SignalDecl]) -> Result<(), SimError> {
        self.codes = (0..signals.len()).map(Self::id_code).collect();
        self.widths = signals.iter().map(|d| d.width).collect();

        writeln!(self.writer, "$version")?;
        writeln!(self.writer, "  Pulse testbench driver")?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$timescale")?;
        writeln!(self.writer, "  1ps")?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$scope module TOP $end")?;
        self.write_scopes(signals)?;
        writeln!(self.writer, "$upscope $end")?;
        writeln!(self.writer, "$enddefinitions $end")?;
        Ok(())
    }

    fn dump(&mut self, sample: &WaveformSample) -> Result<(), SimError> {
        if self.closed {
            return Err(SimError::TraceClosed);
        }
        let values = sample.snapshot.values();
        if values.len() != self.codes.len() {
            return Err(SimError::SnapshotMismatch {
                expected: self.codes.len(),
                actual: values.len(),
            });
        }

        let changed: Vec<usize> = match &self.previous {
            None => (0..values.len()).collect(),
            Some(prev) => (0..values.len()).filter(|&i| prev[i] != values[i]).collect(),
        };
        let first = self.previous.is_none();

        writeln!(self.writer, "#{}", sample.time.as_ps())?;
        if first {
            writeln!(self.writer, "$dumpvars")?;
        }
        for i in changed {
            self.write_value(i, &values[i])?;
        }
        if first {
            writeln!(self.writer, "$end")?;
        }
        // only a fully written sample becomes the baseline for the next diff
        self.previous = Some(values.to_vec());
        Ok(())
    }

    fn close(&mut self) -> Result<(), SimError> {
        if !self.closed {
            self.closed = true;
            self.writer.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::io;
    use std::rc::Rc;

    type Vcd = VcdSink<Vec<u8>>;

    fn sample(ps: u64, values: Vec<LogicVec>) -> WaveformSample {
        WaveformSample {
            time: VirtualTime::from_ps(ps),
            snapshot: SignalSnapshot::new(values),
        }
    }

    fn output(sink: Vcd) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn id_codes() {
        assert_eq!(Vcd::id_code(0), "!");
        assert_eq!(Vcd::id_code(1), "\"");
        assert_eq!(Vcd::id_code(93), "~");
        assert_eq!(Vcd::id_code(94).len(), 2);
        assert_ne!(Vcd::id_code(94), Vcd::id_code(95));
    }

    #[test]
    fn header_declares_vars_and_timescale() {
        let mut sink = Vcd::new(Vec::new());
        sink.declare(&[SignalDecl::new("clk", 1), SignalDecl::new("data", 8)])
            .unwrap();
        let out = output(sink);
        assert!(out.contains("$timescale\n  1ps\n$end"));
        assert!(out.contains("$scope module TOP $end"));
        assert!(out.contains("$var wire 1 ! clk $end"));
        assert!(out.contains("$var wire 8 \" data $end"));
        assert!(out.ends_with("$enddefinitions $end\n"));
    }

    #[test]
    fn dotted_names_become_nested_scopes() {
        let mut sink = Vcd::new(Vec::new());
        sink.declare(&[
            SignalDecl::new("dut.alu.acc", 4),
            SignalDecl::new("dut.alu.carry", 1),
            SignalDecl::new("dut.pc", 8),
            SignalDecl::new("clk", 1),
        ])
        .unwrap();
        let out = output(sink);
        let expected = "\
$scope module TOP $end
$scope module dut $end
$scope module alu $end
$var wire 4 ! acc $end
$var wire 1 \" carry $end
$upscope $end
$var wire 8 # pc $end
$upscope $end
$var wire 1 $ clk $end
$upscope $end
$enddefinitions $end
";
        assert!(out.ends_with(expected), "got:\n{out}");
    }

    #[test]
    fn first_dump_writes_all_then_only_changes() {
        let mut sink = Vcd::new(Vec::new());
        sink.declare(&[SignalDecl::new("clk", 1), SignalDecl::new("data", 4)])
            .unwrap();
        sink.dump(&sample(5, vec![LogicVec::from_bool(true), LogicVec::from_u64(0b1010, 4)]))
            .unwrap();
        sink.dump(&sample(10, vec![LogicVec::from_bool(false), LogicVec::from_u64(0b1010, 4)]))
            .unwrap();
        sink.close().unwrap();

        let out = output(sink);
        let body = out.split("$enddefinitions $end\n").nth(1).unwrap();
        assert_eq!(body, "#5\n$dumpvars\n1!\nb1010 \"\n$end\n#10\n0!\n");
    }

    /// Accepts writes until its byte budget runs out.
    struct Budgeted {
        out: Rc<RefCell<Vec<u8>>>,
        budget: Rc<Cell<usize>>,
    }

    impl Write for Budgeted {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let left = self.budget.get();
            if buf.len() > left {
                return Err(io::Error::other("budget exhausted"));
            }
            self.budget.set(left - buf.len());
            self.out.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_dump_keeps_the_previous_baseline() {
        let out = Rc::new(RefCell::new(Vec::new()));
        let budget = Rc::new(Cell::new(usize::MAX));
        let mut sink = VcdSink::new(Budgeted {
            out: Rc::clone(&out),
            budget: Rc::clone(&budget),
        });
        sink.declare(&[SignalDecl::new("clk", 1), SignalDecl::new("data", 4)])
            .unwrap();
        sink.dump(&sample(5, vec![LogicVec::from_bool(true), LogicVec::from_u64(1, 4)]))
            .unwrap();

        // room for "#10\n" only; the value write fails
        budget.set(4);
        let next = vec![LogicVec::from_bool(false), LogicVec::from_u64(1, 4)];
        assert!(matches!(
            sink.dump(&sample(10, next.clone())),
            Err(SimError::WaveformIo(_))
        ));

        budget.set(usize::MAX);
        sink.dump(&sample(15, next)).unwrap();

        let text = String::from_utf8(out.borrow().clone()).unwrap();
        assert_eq!(text.matches("$dumpvars").count(), 1);
        assert!(text.ends_with("#10\n#15\n0!\n"), "got:\n{text}");
    }

    #[test]
    fn unknown_levels_are_written_lower_case() {
        let mut sink = Vcd::new(Vec::new());
        sink.declare(&[SignalDecl::new("q", 1), SignalDecl::new("bus", 2)])
            .unwrap();
        sink.dump(&sample(
            1,
            vec![LogicVec::all_x(1), LogicVec::from_binary_str("Z1").unwrap()],
        ))
        .unwrap();
        let out = output(sink);
        assert!(out.contains("x!\n"));
        assert!(out.contains("bz1 \"\n"));
    }

    #[test]
    fn snapshot_size_is_checked() {
        let mut sink = Vcd::new(Vec::new());
        sink.declare(&[SignalDecl::new("clk", 1)]).unwrap();
        let err = sink.dump(&sample(1, vec![])).unwrap_err();
        assert!(matches!(
            err,
            SimError::SnapshotMismatch {
                expected: 1,
                actual: 0
            }
        ));
    }

    #[test]
    fn dump_after_close_fails() {
        let mut sink = Vcd::new(Vec::new());
        sink.declare(&[]).unwrap();
        sink.close().unwrap();
        sink.close().unwrap();
        assert!(matches!(
            sink.dump(&sample(1, vec![])),
            Err(SimError::TraceClosed)
        ));
    }

    #[test]
    fn memory_trace_appends_in_order() {
        let mut trace = MemoryTrace::new();
        trace.declare(&[SignalDecl::new("clk", 1)]).unwrap();
        trace.dump(&sample(5, vec![LogicVec::from_bool(true)])).unwrap();
        trace.dump(&sample(10, vec![LogicVec::from_bool(false)])).unwrap();
        trace.close().unwrap();

        assert_eq!(trace.signals().len(), 1);
        let times: Vec<u64> = trace.samples().iter().map(|s| s.time.as_ps()).collect();
        assert_eq!(times, [5, 10]);
        assert!(trace.is_closed());
        assert_eq!(trace.close_count(), 1);
        assert!(trace.dump(&sample(15, vec![])).is_err());
    }

    #[test]
    fn boxed_sink_forwards() {
        let mut sink: Box<dyn TraceSink> = Box::new(NullSink);
        sink.declare(&[]).unwrap();
        sink.dump(&sample(1, vec![])).unwrap();
        sink.close().unwrap();
    }

    #[test]
    fn sample_serializes() {
        let s = sample(5, vec![LogicVec::from_bool(true)]);
        let json = serde_json::to_string(&s).unwrap();
        let back: WaveformSample = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
