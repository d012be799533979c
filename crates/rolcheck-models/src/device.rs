//! Simulated rotate-left device with named ports
//!
//! [`RotatorDevice`] stands in for an HDL simulation of a module carrying
//! both rotators. Inputs are latched by `set_input`; outputs only change when
//! the device is allowed to settle, which also advances simulated time.

use crate::fault::Fault;
use crate::rotator::{borders_rotate, shift_rotate};
use async_trait::async_trait;
use indexmap::IndexMap;
use rolcheck_verify::{
    shift_width_for, word_mask, AdapterFault, AdapterResult, SignalNames, SignalPort,
};
use tracing::trace;

/// Behavioral device exposing the rotators through a port map
#[derive(Debug, Clone)]
pub struct RotatorDevice {
    width: u32,
    signals: SignalNames,
    error_flags: bool,
    settle_time_ns: u64,
    faults: Vec<Fault>,
    inputs: IndexMap<String, u64>,
    outputs: IndexMap<String, u64>,
    time_ns: u64,
    evaluations: u64,
}

impl RotatorDevice {
    /// Create a device with all ports reset to zero
    pub fn new(width: u32, signals: SignalNames) -> Self {
        let mut device = Self {
            width,
            signals,
            error_flags: false,
            settle_time_ns: 1,
            faults: Vec::new(),
            inputs: IndexMap::new(),
            outputs: IndexMap::new(),
            time_ns: 0,
            evaluations: 0,
        };
        device.reset_ports();
        device
    }

    /// Add the two error-flag output ports
    pub fn with_error_flags(mut self, enabled: bool) -> Self {
        self.error_flags = enabled;
        self.reset_ports();
        self
    }

    pub fn with_settle_time(mut self, ns: u64) -> Self {
        self.settle_time_ns = ns;
        self
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.faults.push(fault);
        self
    }

    pub fn with_faults(mut self, faults: impl IntoIterator<Item = Fault>) -> Self {
        self.faults.extend(faults);
        self
    }

    /// Simulated time in nanoseconds
    pub fn time_ns(&self) -> u64 {
        self.time_ns
    }

    /// Number of completed evaluations
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    fn reset_ports(&mut self) {
        self.inputs.clear();
        self.inputs.insert(self.signals.data.clone(), 0);
        self.inputs.insert(self.signals.shamt.clone(), 0);

        self.outputs.clear();
        self.outputs.insert(self.signals.result_by_shift.clone(), 0);
        self.outputs.insert(self.signals.result_by_borders.clone(), 0);
        if self.error_flags {
            self.outputs.insert(self.signals.shift_error.clone(), 0);
            self.outputs.insert(self.signals.borders_error.clone(), 0);
        }
    }

    fn input(&self, name: &str) -> u64 {
        self.inputs.get(name).copied().unwrap_or(0)
    }

    fn evaluate(&self, data: u64, shamt: u64) -> (u64, u64, bool, bool) {
        let width = self.width;
        let mut shift = shift_rotate(data, shamt, width);
        let mut borders = borders_rotate(data, shamt, width);

        // Inputs wider than their ports are the only illegal condition.
        let out_of_range =
            data & !word_mask(width) != 0 || shamt >> shift_width_for(width) != 0;
        let mut shift_error = out_of_range;
        let mut borders_error = out_of_range;

        for fault in &self.faults {
            match *fault {
                Fault::ShiftOffByOne => shift = shift_rotate(data, shamt.wrapping_add(1), width),
                Fault::BordersOffByOne => borders = borders_rotate(data, shamt.wrapping_add(1), width),
                Fault::ShiftStuckLow(bit) if bit < width => shift &= !(1u64 << bit),
                Fault::BordersStuckLow(bit) if bit < width => borders &= !(1u64 << bit),
                Fault::ShiftErrorFlag => shift_error = true,
                Fault::BordersErrorFlag => borders_error = true,
                _ => {}
            }
        }

        (shift, borders, shift_error, borders_error)
    }
}

#[async_trait]
impl SignalPort for RotatorDevice {
    async fn set_input(&mut self, name: &str, value: u64) -> AdapterResult<()> {
        match self.inputs.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(AdapterFault::UnknownSignal(name.to_string())),
        }
    }

    async fn settle(&mut self) -> AdapterResult<()> {
        if self.faults.contains(&Fault::CrashAt(self.evaluations)) {
            return Err(AdapterFault::Simulation(format!(
                "simulator crashed during evaluation {} at {} ns",
                self.evaluations, self.time_ns
            )));
        }

        let data = self.input(&self.signals.data);
        let shamt = self.input(&self.signals.shamt);
        let (shift, borders, shift_error, borders_error) = self.evaluate(data, shamt);

        self.outputs.insert(self.signals.result_by_shift.clone(), shift);
        self.outputs.insert(self.signals.result_by_borders.clone(), borders);
        if self.error_flags {
            self.outputs
                .insert(self.signals.shift_error.clone(), u64::from(shift_error));
            self.outputs
                .insert(self.signals.borders_error.clone(), u64::from(borders_error));
        }

        self.time_ns += self.settle_time_ns;
        self.evaluations += 1;
        trace!(
            "t={}ns data={:#x} shamt={} shift={:#x} borders={:#x}",
            self.time_ns,
            data,
            shamt,
            shift,
            borders
        );
        Ok(())
    }

    async fn get_output(&self, name: &str) -> AdapterResult<u64> {
        self.outputs
            .get(name)
            .copied()
            .ok_or_else(|| AdapterFault::UnknownSignal(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> RotatorDevice {
        RotatorDevice::new(4, SignalNames::default())
    }

    #[tokio::test]
    async fn test_outputs_change_only_on_settle() {
        let mut dut = device();
        dut.set_input("data_i", 0b1011).await.unwrap();
        dut.set_input("shamt_i", 1).await.unwrap();
        assert_eq!(dut.get_output("result_by_shift_o").await.unwrap(), 0);

        dut.settle().await.unwrap();
        assert_eq!(dut.get_output("result_by_shift_o").await.unwrap(), 0b0111);
        assert_eq!(dut.get_output("result_by_borders_o").await.unwrap(), 0b0111);
        assert_eq!(dut.time_ns(), 1);
        assert_eq!(dut.evaluations(), 1);
    }

    #[tokio::test]
    async fn test_unknown_ports() {
        let mut dut = device();
        assert_eq!(
            dut.set_input("clk", 1).await,
            Err(AdapterFault::UnknownSignal("clk".to_string()))
        );
        // Flag ports only exist when enabled
        assert!(dut.get_output("shift_error_o").await.is_err());
    }

    #[tokio::test]
    async fn test_error_flags_on_out_of_range_input() {
        let mut dut = device().with_error_flags(true);
        dut.set_input("data_i", 0x1F).await.unwrap();
        dut.settle().await.unwrap();
        assert_eq!(dut.get_output("shift_error_o").await.unwrap(), 1);
        assert_eq!(dut.get_output("borders_error_o").await.unwrap(), 1);

        dut.set_input("data_i", 0xF).await.unwrap();
        dut.settle().await.unwrap();
        assert_eq!(dut.get_output("shift_error_o").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_stuck_bit_fault() {
        let mut dut = device().with_fault(Fault::ShiftStuckLow(0));
        dut.set_input("data_i", 0b1000).await.unwrap();
        dut.set_input("shamt_i", 1).await.unwrap();
        dut.settle().await.unwrap();
        assert_eq!(dut.get_output("result_by_shift_o").await.unwrap(), 0);
        assert_eq!(dut.get_output("result_by_borders_o").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_crash_fault() {
        let mut dut = device().with_settle_time(5).with_fault(Fault::CrashAt(1));
        dut.settle().await.unwrap();
        let err = dut.settle().await.unwrap_err();
        assert_eq!(
            err,
            AdapterFault::Simulation("simulator crashed during evaluation 1 at 5 ns".to_string())
        );
    }
}
