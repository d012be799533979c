//! Verdicts, run reports and their textual rendering
//!
//! Every iteration produces one [`Verdict`], which is handed to a
//! [`Reporter`] in iteration order. Trace lines look like
//!
//! ```text
//! iteration=3 data=0xb shamt=1 golden=0x7 resultByShift=0x7 resultByBorders=0x7 verdict=PASS
//! ```
//!
//! with `shiftErrorFlag=<0|1> bordersErrorFlag=<0|1>` inserted before the
//! verdict when the device reports error flags. [`summarize`] renders the
//! final pass/fail line that automation keys off.

use crate::adapter::ObservedResult;
use crate::config::Parameters;
use crate::coverage::ShamtCoverage;
use crate::error::{AdapterFault, Mismatch};
use crate::stimulus::StimulusSample;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::io;

/// Failures listed individually in a summary before eliding the rest
pub const MAX_FAILURE_DETAILS: usize = 20;

/// Outcome of checking one sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub iteration: u64,
    pub sample: StimulusSample,
    pub golden: u64,
    pub observed: ObservedResult,
    pub mismatches: BTreeSet<Mismatch>,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Render the verdict as a single trace line
    pub fn trace_line(&self) -> String {
        let mut line = format!(
            "iteration={} data={:#x} shamt={} golden={:#x} resultByShift={:#x} resultByBorders={:#x}",
            self.iteration,
            self.sample.data,
            self.sample.shamt,
            self.golden,
            self.observed.result_by_shift,
            self.observed.result_by_borders,
        );

        if let Some(flags) = self.observed.error_flags {
            let _ = write!(
                line,
                " shiftErrorFlag={} bordersErrorFlag={}",
                u8::from(flags.shift),
                u8::from(flags.borders)
            );
        }

        if self.passed() {
            line.push_str(" verdict=PASS");
        } else {
            let tags: Vec<&str> = self.mismatches.iter().map(Mismatch::tag).collect();
            let _ = write!(line, " verdict=FAIL[{}]", tags.join(","));
        }

        line
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every sample was applied
    Completed,
    /// The device failed to produce a result
    Aborted { iteration: u64, fault: AdapterFault },
    /// Stopped at an iteration boundary on request
    Cancelled,
}

/// Accumulated result of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub params: Parameters,
    pub seed: u64,
    pub total_iterations: u64,
    /// Iterations actually checked
    pub completed: u64,
    /// Verdicts with at least one mismatch, in iteration order
    pub failures: Vec<Verdict>,
    pub outcome: RunOutcome,
    pub coverage: ShamtCoverage,
}

impl Report {
    pub fn new(params: Parameters, seed: u64) -> Self {
        Self {
            params,
            seed,
            total_iterations: params.iterations,
            completed: 0,
            failures: Vec::new(),
            outcome: RunOutcome::Completed,
            coverage: ShamtCoverage::new(&params),
        }
    }

    /// A run succeeds only if it completed with no failures
    pub fn is_success(&self) -> bool {
        self.outcome == RunOutcome::Completed && self.failures.is_empty()
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.outcome, RunOutcome::Aborted { .. })
    }

    /// Number of failing iterations carrying each tag
    pub fn count_by_tag(&self) -> BTreeMap<Mismatch, u64> {
        let mut counts = BTreeMap::new();
        for verdict in &self.failures {
            for &tag in &verdict.mismatches {
                *counts.entry(tag).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Status word used in the summary line
    pub fn status(&self) -> &'static str {
        match self.outcome {
            RunOutcome::Aborted { .. } => "RUN_ABORTED",
            RunOutcome::Cancelled => "CANCELLED",
            RunOutcome::Completed if self.failures.is_empty() => "PASS",
            RunOutcome::Completed => "FAIL",
        }
    }
}

/// Sink for per-iteration verdicts
pub trait Reporter {
    /// Called exactly once per iteration, in iteration order
    fn record(&mut self, verdict: &Verdict);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn record(&mut self, verdict: &Verdict) {
        (**self).record(verdict);
    }
}

/// Keeps the trace in memory
#[derive(Debug, Default)]
pub struct TraceReporter {
    lines: Vec<String>,
}

impl TraceReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl Reporter for TraceReporter {
    fn record(&mut self, verdict: &Verdict) {
        self.lines.push(verdict.trace_line());
    }
}

/// Streams trace lines to a writer
///
/// The first write error is kept and returned from [`WriterReporter::finish`];
/// later verdicts are dropped so the run itself is unaffected.
pub struct WriterReporter<W: io::Write> {
    writer: W,
    error: Option<io::Error>,
}

impl<W: io::Write> WriterReporter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
        }
    }

    /// Flush and hand back the writer, or the first error seen
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: io::Write> Reporter for WriterReporter<W> {
    fn record(&mut self, verdict: &Verdict) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = writeln!(self.writer, "{}", verdict.trace_line()) {
            tracing::error!("Failed to write trace line {}: {}", verdict.iteration, e);
            self.error = Some(e);
        }
    }
}

/// Render the final summary of a run
///
/// The first line is the single pass/fail verdict:
/// `<STATUS>: iterations=<done>/<total> failures=<n> seed=<seed>`.
pub fn summarize(report: &Report) -> String {
    let mut out = format!(
        "{}: iterations={}/{} failures={} seed={}\n",
        report.status(),
        report.completed,
        report.total_iterations,
        report.failures.len(),
        report.seed
    );

    let coverage = &report.coverage;
    let _ = writeln!(
        out,
        "  shamt coverage: {}/{} values ({:.1}%), {} samples with shamt >= width",
        coverage.distinct(),
        coverage.hits().len(),
        coverage.percent(),
        coverage.beyond_width()
    );

    if !report.failures.is_empty() {
        for (tag, count) in report.count_by_tag() {
            let _ = writeln!(out, "  {}: {}", tag, count);
        }
        for verdict in report.failures.iter().take(MAX_FAILURE_DETAILS) {
            let _ = writeln!(out, "  {}", verdict.trace_line());
        }
        if report.failures.len() > MAX_FAILURE_DETAILS {
            let _ = writeln!(
                out,
                "  ... and {} more failures",
                report.failures.len() - MAX_FAILURE_DETAILS
            );
        }
    }

    if let RunOutcome::Aborted { iteration, fault } = &report.outcome {
        let _ = writeln!(out, "  RUN_ABORTED at iteration {}: {}", iteration, fault);
    }

    out
}
