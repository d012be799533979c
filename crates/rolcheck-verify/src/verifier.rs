//! The verification loop
//!
//! For each sample the verifier computes the golden value, applies the sample
//! through the [`DeviceAdapter`] and cross-checks everything the device
//! reported. Mismatches are collected, never thrown: a run always visits
//! every sample unless the device itself fails (the run is then aborted) or
//! a stop is requested through a [`StopHandle`].

use crate::adapter::{DeviceAdapter, ObservedResult};
use crate::config::VerifyConfig;
use crate::error::{AdapterFault, Mismatch};
use crate::golden::rotate_left;
use crate::report::{Report, Reporter, RunOutcome, Verdict};
use crate::stimulus::StimulusGenerator;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Requests that a run stop at the next iteration boundary
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Compare one observed result against the golden value
///
/// All checks run regardless of earlier failures. The cross-implementation
/// check is kept even when both golden checks pass.
pub fn cross_check(golden: u64, observed: &ObservedResult) -> BTreeSet<Mismatch> {
    let mut mismatches = BTreeSet::new();

    if observed.result_by_shift != golden {
        mismatches.insert(Mismatch::GoldenShiftMismatch);
    }
    if observed.result_by_borders != golden {
        mismatches.insert(Mismatch::GoldenBordersMismatch);
    }
    if observed.result_by_shift != observed.result_by_borders {
        mismatches.insert(Mismatch::CrossImplementationMismatch);
    }

    // Every generated sample is a legal input, so any raised flag is a defect.
    if let Some(flags) = observed.error_flags {
        if flags.shift {
            mismatches.insert(Mismatch::ShiftErrorFlagSet);
        }
        if flags.borders {
            mismatches.insert(Mismatch::BordersErrorFlagSet);
        }
    }

    mismatches
}

/// Drives one verification run
pub struct Verifier {
    config: VerifyConfig,
    stop: StopHandle,
}

impl Verifier {
    pub fn new(config: VerifyConfig) -> Self {
        Self {
            config,
            stop: StopHandle::new(),
        }
    }

    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Handle that can stop a run from another task
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Run with a generator built from the configuration
    pub async fn run<A, R>(&self, adapter: &mut A, reporter: &mut R) -> Report
    where
        A: DeviceAdapter + ?Sized,
        R: Reporter + ?Sized,
    {
        self.run_with(self.config.stimulus(), adapter, reporter).await
    }

    /// Run over an explicit stimulus sequence
    pub async fn run_with<A, R>(
        &self,
        generator: StimulusGenerator,
        adapter: &mut A,
        reporter: &mut R,
    ) -> Report
    where
        A: DeviceAdapter + ?Sized,
        R: Reporter + ?Sized,
    {
        let params = *generator.params();
        let width = params.width;
        let mut report = Report::new(params, generator.seed());

        info!(
            "Starting run: width={} shift_width={} iterations={} mode={:?} seed={} error_flags={}",
            width,
            params.shift_width,
            params.iterations,
            generator.mode(),
            generator.seed(),
            self.config.error_flags
        );

        for (iteration, sample) in (0u64..).zip(generator) {
            if self.stop.is_stopped() {
                info!("Run cancelled after {} iterations", iteration);
                report.outcome = RunOutcome::Cancelled;
                break;
            }

            let golden = rotate_left(sample.data, sample.shamt, width);

            let observed = match adapter.apply(&sample).await {
                Ok(observed) => observed,
                Err(fault) => {
                    error!("Device failed at iteration {}: {}", iteration, fault);
                    report.outcome = RunOutcome::Aborted { iteration, fault };
                    break;
                }
            };

            if self.config.error_flags && observed.error_flags.is_none() {
                let fault = AdapterFault::MissingErrorFlags;
                error!("Device failed at iteration {}: {}", iteration, fault);
                report.outcome = RunOutcome::Aborted { iteration, fault };
                break;
            }

            let verdict = Verdict {
                iteration,
                sample,
                golden,
                observed,
                mismatches: cross_check(golden, &observed),
            };

            if verdict.passed() {
                debug!("{}", verdict.trace_line());
            } else {
                warn!("{}", verdict.trace_line());
            }

            reporter.record(&verdict);
            report.coverage.record(sample.shamt);
            report.completed += 1;
            if !verdict.passed() {
                report.failures.push(verdict);
            }
        }

        info!(
            "Run finished: {} after {}/{} iterations with {} failures",
            report.status(),
            report.completed,
            report.total_iterations,
            report.failures.len()
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_check_clean() {
        assert!(cross_check(0x7, &ObservedResult::new(0x7, 0x7)).is_empty());
        assert!(cross_check(0x7, &ObservedResult::new(0x7, 0x7).with_flags(false, false)).is_empty());
    }

    #[test]
    fn test_cross_check_one_side_wrong() {
        let mismatches = cross_check(0x7, &ObservedResult::new(0xE, 0x7));
        assert_eq!(
            mismatches.into_iter().collect::<Vec<_>>(),
            vec![
                Mismatch::GoldenShiftMismatch,
                Mismatch::CrossImplementationMismatch
            ]
        );
    }

    #[test]
    fn test_cross_check_shared_bug() {
        // Both sides agree on the wrong answer: no cross mismatch
        let mismatches = cross_check(0x7, &ObservedResult::new(0xE, 0xE));
        assert_eq!(
            mismatches.into_iter().collect::<Vec<_>>(),
            vec![
                Mismatch::GoldenShiftMismatch,
                Mismatch::GoldenBordersMismatch
            ]
        );
    }

    #[test]
    fn test_cross_check_flags() {
        let mismatches = cross_check(0x7, &ObservedResult::new(0x7, 0x7).with_flags(true, true));
        assert_eq!(
            mismatches.into_iter().collect::<Vec<_>>(),
            vec![Mismatch::ShiftErrorFlagSet, Mismatch::BordersErrorFlagSet]
        );
    }

    #[test]
    fn test_stop_handle_shared() {
        let handle = StopHandle::new();
        let clone = handle.clone();
        assert!(!handle.is_stopped());
        clone.stop();
        assert!(handle.is_stopped());
    }
}
