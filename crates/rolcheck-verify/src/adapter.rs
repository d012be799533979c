//! Boundary between the verifier and the devices under test
//!
//! The verifier only ever talks to a [`DeviceAdapter`]: apply one sample, get
//! back a fully settled [`ObservedResult`]. How that happens is up to the
//! adapter. [`SignalAdapter`] covers the common case of a simulator that
//! exposes named ports through the [`SignalPort`] capability (set an input,
//! let time advance, read an output).

use crate::config::SignalNames;
use crate::error::AdapterFault;
use crate::golden::word_mask;
use crate::stimulus::StimulusSample;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result type for device interactions
pub type AdapterResult<T> = std::result::Result<T, AdapterFault>;

/// Self-reported error signals of the two implementations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorFlags {
    pub shift: bool,
    pub borders: bool,
}

/// Outputs of both implementations for one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedResult {
    pub result_by_shift: u64,
    pub result_by_borders: u64,
    /// Present only for devices built with error flags
    pub error_flags: Option<ErrorFlags>,
}

impl ObservedResult {
    pub fn new(result_by_shift: u64, result_by_borders: u64) -> Self {
        Self {
            result_by_shift,
            result_by_borders,
            error_flags: None,
        }
    }

    pub fn with_flags(mut self, shift: bool, borders: bool) -> Self {
        self.error_flags = Some(ErrorFlags { shift, borders });
        self
    }
}

/// Applies samples to the system under test
///
/// Exactly one `apply` call is made per sample, in generation order, and
/// never concurrently. On return the result must reflect a settled
/// evaluation of `sample`.
#[async_trait]
pub trait DeviceAdapter: Send {
    async fn apply(&mut self, sample: &StimulusSample) -> AdapterResult<ObservedResult>;
}

/// Named-port access to a simulated or physical device
#[async_trait]
pub trait SignalPort: Send + Sync {
    /// Drive an input port
    async fn set_input(&mut self, name: &str, value: u64) -> AdapterResult<()>;

    /// Advance time until outputs reflect the current inputs
    async fn settle(&mut self) -> AdapterResult<()>;

    /// Sample an output port
    async fn get_output(&self, name: &str) -> AdapterResult<u64>;
}

/// [`DeviceAdapter`] over any [`SignalPort`]
pub struct SignalAdapter<P> {
    port: P,
    signals: SignalNames,
    width: u32,
    error_flags: bool,
}

impl<P: SignalPort> SignalAdapter<P> {
    pub fn new(port: P, signals: SignalNames, width: u32, error_flags: bool) -> Self {
        Self {
            port,
            signals,
            width,
            error_flags,
        }
    }

    /// Access the wrapped port
    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn into_inner(self) -> P {
        self.port
    }

    async fn read_word(&self, name: &str) -> AdapterResult<u64> {
        let value = self.port.get_output(name).await?;
        if value & !word_mask(self.width) != 0 {
            return Err(AdapterFault::ValueOutOfRange {
                signal: name.to_string(),
                value,
                width: self.width,
            });
        }
        Ok(value)
    }
}

#[async_trait]
impl<P: SignalPort> DeviceAdapter for SignalAdapter<P> {
    async fn apply(&mut self, sample: &StimulusSample) -> AdapterResult<ObservedResult> {
        self.port.set_input(&self.signals.data, sample.data).await?;
        self.port.set_input(&self.signals.shamt, sample.shamt).await?;
        self.port.settle().await?;

        let mut observed = ObservedResult::new(
            self.read_word(&self.signals.result_by_shift).await?,
            self.read_word(&self.signals.result_by_borders).await?,
        );

        if self.error_flags {
            let shift = self.port.get_output(&self.signals.shift_error).await? != 0;
            let borders = self.port.get_output(&self.signals.borders_error).await? != 0;
            observed = observed.with_flags(shift, borders);
        }

        Ok(observed)
    }
}
