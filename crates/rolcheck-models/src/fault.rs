//! Fault injection for the behavioral device
//!
//! Faults are written as short strings so they can be passed on the command
//! line: `shift-off-by-one`, `borders-off-by-one`, `shift-stuck-low:<bit>`,
//! `borders-stuck-low:<bit>`, `shift-error-flag`, `borders-error-flag` and
//! `crash-at:<evaluation>`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors parsing a fault description or applying it to a device
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FaultError {
    #[error("Unknown fault '{0}'")]
    Unknown(String),

    #[error("Fault '{0}' needs a numeric argument, e.g. '{1}:3'")]
    MissingArgument(String, String),

    #[error("Invalid argument in fault '{0}'")]
    InvalidArgument(String),

    #[error("Fault '{fault}' targets a bit outside a {width}-bit word")]
    BitOutOfRange { fault: String, width: u32 },
}

/// A defect deliberately injected into the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fault {
    /// Shift path rotates one position too far
    ShiftOffByOne,
    /// Borders path rotates one position too far
    BordersOffByOne,
    /// Shift output bit held at 0
    ShiftStuckLow(u32),
    /// Borders output bit held at 0
    BordersStuckLow(u32),
    /// Shift error flag asserted on every evaluation
    ShiftErrorFlag,
    /// Borders error flag asserted on every evaluation
    BordersErrorFlag,
    /// The simulator dies on this evaluation (0-based)
    CrashAt(u64),
}

impl Fault {
    /// Check that the fault can take effect on a `width`-bit device
    pub fn check_width(&self, width: u32) -> Result<(), FaultError> {
        match *self {
            Fault::ShiftStuckLow(bit) | Fault::BordersStuckLow(bit) if bit >= width => {
                Err(FaultError::BitOutOfRange {
                    fault: self.to_string(),
                    width,
                })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::ShiftOffByOne => write!(f, "shift-off-by-one"),
            Fault::BordersOffByOne => write!(f, "borders-off-by-one"),
            Fault::ShiftStuckLow(bit) => write!(f, "shift-stuck-low:{}", bit),
            Fault::BordersStuckLow(bit) => write!(f, "borders-stuck-low:{}", bit),
            Fault::ShiftErrorFlag => write!(f, "shift-error-flag"),
            Fault::BordersErrorFlag => write!(f, "borders-error-flag"),
            Fault::CrashAt(n) => write!(f, "crash-at:{}", n),
        }
    }
}

impl FromStr for Fault {
    type Err = FaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };

        let number = |arg: Option<&str>| -> Result<u64, FaultError> {
            let arg = arg.ok_or_else(|| {
                FaultError::MissingArgument(s.to_string(), name.to_string())
            })?;
            arg.trim()
                .parse::<u64>()
                .map_err(|_| FaultError::InvalidArgument(s.to_string()))
        };
        let bit = |arg: Option<&str>| -> Result<u32, FaultError> {
            u32::try_from(number(arg)?).map_err(|_| FaultError::InvalidArgument(s.to_string()))
        };

        let fault = match name {
            "shift-off-by-one" => Fault::ShiftOffByOne,
            "borders-off-by-one" => Fault::BordersOffByOne,
            "shift-stuck-low" => Fault::ShiftStuckLow(bit(arg)?),
            "borders-stuck-low" => Fault::BordersStuckLow(bit(arg)?),
            "shift-error-flag" => Fault::ShiftErrorFlag,
            "borders-error-flag" => Fault::BordersErrorFlag,
            "crash-at" => Fault::CrashAt(number(arg)?),
            _ => return Err(FaultError::Unknown(s.to_string())),
        };
        Ok(fault)
    }
}
