//! Error taxonomy for verification runs
//!
//! Three classes of problem exist and they never mix:
//! - [`ConfigError`] is raised before the first iteration and prevents the run.
//! - [`AdapterFault`] ends a run early; the partial report is still returned.
//! - [`Mismatch`] is a recorded discrepancy and never stops the run.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for configuration handling
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Errors detected while building or validating a run configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Width outside 1..=64
    #[error("Invalid data width {0}: must be between 1 and 64 bits")]
    InvalidWidth(i64),

    /// Negative iteration count
    #[error("Invalid iteration count {0}: must not be negative")]
    NegativeIterations(i64),

    /// Explicit shift width that disagrees with ceil(log2(width))
    #[error("Shift width {found} does not match width {width} (expected {expected})")]
    ShiftWidthMismatch { width: u32, expected: u32, found: i64 },

    /// Exhaustive enumeration requested over a space that is too large
    #[error("Exhaustive stimulus over {bits} input bits is too large (limit is {limit})")]
    ExhaustiveTooLarge { bits: u32, limit: u32 },

    /// Directed mode without any vectors
    #[error("Directed stimulus requires at least one vector")]
    NoVectors,

    /// Directed vector outside the input domain
    #[error("Vector {index} (data={data:#x}, shamt={shamt}) is outside the {width}-bit input domain")]
    VectorOutOfRange {
        index: usize,
        data: u64,
        shamt: u64,
        width: u32,
    },

    /// I/O error reading a configuration file
    #[error("I/O error: {0}")]
    Io(String),

    /// TOML parsing error
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Failure of the device under test to produce a result at all
///
/// Any fault is fatal to the run and is reported as `RUN_ABORTED`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum AdapterFault {
    /// The simulator or device crashed or refused the request
    #[error("Simulation failure: {0}")]
    Simulation(String),

    /// The device has no port with this name
    #[error("Unknown signal '{0}'")]
    UnknownSignal(String),

    /// Error flags were enabled but the device reported none
    #[error("Error flags are enabled but the device did not report them")]
    MissingErrorFlags,

    /// A result wider than the data word
    #[error("Signal '{signal}' returned {value:#x}, which does not fit in {width} bits")]
    ValueOutOfRange { signal: String, value: u64, width: u32 },
}

/// A named discrepancy found while cross-checking one iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mismatch {
    /// Shift implementation disagrees with the golden model
    GoldenShiftMismatch,
    /// Borders implementation disagrees with the golden model
    GoldenBordersMismatch,
    /// The two implementations disagree with each other
    CrossImplementationMismatch,
    /// Shift implementation raised its error flag on a legal input
    ShiftErrorFlagSet,
    /// Borders implementation raised its error flag on a legal input
    BordersErrorFlagSet,
}

impl Mismatch {
    /// All tags in reporting order
    pub const ALL: [Mismatch; 5] = [
        Mismatch::GoldenShiftMismatch,
        Mismatch::GoldenBordersMismatch,
        Mismatch::CrossImplementationMismatch,
        Mismatch::ShiftErrorFlagSet,
        Mismatch::BordersErrorFlagSet,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Mismatch::GoldenShiftMismatch => "GOLDEN_SHIFT_MISMATCH",
            Mismatch::GoldenBordersMismatch => "GOLDEN_BORDERS_MISMATCH",
            Mismatch::CrossImplementationMismatch => "CROSS_IMPLEMENTATION_MISMATCH",
            Mismatch::ShiftErrorFlagSet => "SHIFT_ERROR_FLAG_SET",
            Mismatch::BordersErrorFlagSet => "BORDERS_ERROR_FLAG_SET",
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_tags() {
        let tags: Vec<String> = Mismatch::ALL.iter().map(|m| m.to_string()).collect();
        assert_eq!(
            tags,
            vec![
                "GOLDEN_SHIFT_MISMATCH",
                "GOLDEN_BORDERS_MISMATCH",
                "CROSS_IMPLEMENTATION_MISMATCH",
                "SHIFT_ERROR_FLAG_SET",
                "BORDERS_ERROR_FLAG_SET",
            ]
        );
    }

    #[test]
    fn test_mismatch_serializes_as_tag() {
        let json = serde_json::to_string(&Mismatch::CrossImplementationMismatch).unwrap();
        assert_eq!(json, "\"CROSS_IMPLEMENTATION_MISMATCH\"");
    }

    #[test]
    fn test_fault_messages() {
        let fault = AdapterFault::ValueOutOfRange {
            signal: "result_by_shift_o".to_string(),
            value: 0x1_0000,
            width: 16,
        };
        assert_eq!(
            fault.to_string(),
            "Signal 'result_by_shift_o' returned 0x10000, which does not fit in 16 bits"
        );
    }
}
