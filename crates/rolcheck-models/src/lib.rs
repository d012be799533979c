//! Behavioral devices for rolcheck
//!
//! Software stand-ins for the two rotate-left circuits, wired up the way an
//! HDL simulation would expose them (named input and output ports that only
//! update after settling). Faults can be injected to exercise every mismatch
//! class and the abort path of the verifier.

pub mod device;
pub mod fault;
pub mod rotator;

pub use device::RotatorDevice;
pub use fault::{Fault, FaultError};
pub use rotator::{borders_rotate, shift_rotate};

use rolcheck_verify::{SignalAdapter, SignalNames};

/// Wrap a fresh behavioral device in a signal-level adapter
///
/// Fails if a fault could never fire on a `width`-bit device.
pub fn behavioral_adapter(
    width: u32,
    signals: &SignalNames,
    error_flags: bool,
    settle_time_ns: u64,
    faults: &[Fault],
) -> Result<SignalAdapter<RotatorDevice>, FaultError> {
    for fault in faults {
        fault.check_width(width)?;
    }

    let device = RotatorDevice::new(width, signals.clone())
        .with_error_flags(error_flags)
        .with_settle_time(settle_time_ns)
        .with_faults(faults.iter().copied());
    Ok(SignalAdapter::new(device, signals.clone(), width, error_flags))
}
