//! rolcheck verification engine
//!
//! Randomized differential verification of fixed-width rotate-left circuits.
//! Two independently built implementations (a barrel "shift" rotator and a
//! bit "borders" rearrangement) are driven with the same stimulus and checked
//! against a software golden model and against each other.
//!
//! This crate provides:
//! - The golden rotate-left model
//! - Seeded, replayable stimulus generation
//! - The device adapter boundary, including a generic signal-port adapter
//! - The collect-all-errors verification loop
//! - Trace and summary reporting

pub mod adapter;
pub mod config;
pub mod coverage;
pub mod error;
pub mod golden;
pub mod report;
pub mod stimulus;
pub mod verifier;

pub use adapter::{
    AdapterResult, DeviceAdapter, ErrorFlags, ObservedResult, SignalAdapter, SignalPort,
};
pub use config::{HarnessConfig, Parameters, SignalNames, StimulusMode, VerifyConfig};
pub use coverage::ShamtCoverage;
pub use error::{AdapterFault, ConfigError, ConfigResult, Mismatch};
pub use golden::{rotate_left, shift_width_for, word_mask};
pub use report::{summarize, Report, Reporter, RunOutcome, TraceReporter, Verdict, WriterReporter};
pub use stimulus::{StimulusGenerator, StimulusSample};
pub use verifier::{cross_check, StopHandle, Verifier};
