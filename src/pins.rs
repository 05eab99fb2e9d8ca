//! Hardware I/O capability.
//!
//! The control core never touches GPIO/ADC/DAC registers directly; it calls
//! through [`IoPins`]. A firmware build implements this trait on top of the
//! platform HAL. [`SimPins`] is the simulation adapter used by the CLI and
//! the tests: inputs are plain fields a harness can poke, outputs are
//! recorded so they can be inspected.

use crate::channel::{AnalogMode, DigitalMode};
use crate::{ANALOG_CHANNELS, DIGITAL_CHANNELS};

/// Capability interface to the node's physical I/O.
///
/// Channel indices are 0-based. `unit_address` samples the address strap
/// pins; the core reads it exactly once, at construction.
pub trait IoPins {
    /// Samples the hardware address straps. Called once at start-up.
    fn unit_address(&self) -> u8;

    /// Configures a digital pin's direction and pull.
    fn set_digital_direction(&mut self, index: usize, mode: DigitalMode);

    /// Configures an analog pin as ADC input or DAC output.
    fn set_analog_direction(&mut self, index: usize, mode: AnalogMode);

    /// Drives a digital output pin.
    fn drive_digital(&mut self, index: usize, level: bool);

    /// Samples a digital input pin.
    fn sample_digital(&self, index: usize) -> bool;

    /// Drives an analog output pin with a normalized value in `[0.0, 1.0]`.
    fn drive_analog(&mut self, index: usize, value: f32);

    /// Samples an analog input pin as a normalized value in `[0.0, 1.0]`.
    fn sample_analog(&self, index: usize) -> f32;
}

/// Simulated pin bank.
///
/// Input levels are public so a test or the CLI can stand in for the outside
/// world. Configuring a digital pin with a pull-up floats its input high, as
/// an undriven real pin would; a harness may overwrite it afterwards.
#[derive(Debug, Clone)]
pub struct SimPins {
    address: u8,
    pub digital_in: [bool; DIGITAL_CHANNELS],
    pub analog_in: [f32; ANALOG_CHANNELS],
    pub digital_out: [bool; DIGITAL_CHANNELS],
    pub analog_out: [f32; ANALOG_CHANNELS],
}

impl SimPins {
    /// Creates a simulated pin bank whose address straps read `address`.
    pub fn with_address(address: u8) -> Self {
        Self {
            address,
            digital_in: [false; DIGITAL_CHANNELS],
            analog_in: [0.0; ANALOG_CHANNELS],
            digital_out: [false; DIGITAL_CHANNELS],
            analog_out: [0.0; ANALOG_CHANNELS],
        }
    }
}

impl IoPins for SimPins {
    fn unit_address(&self) -> u8 {
        self.address
    }

    fn set_digital_direction(&mut self, index: usize, mode: DigitalMode) {
        if mode == DigitalMode::InputWithPullUp {
            self.digital_in[index] = true;
        }
    }

    fn set_analog_direction(&mut self, _index: usize, _mode: AnalogMode) {}

    fn drive_digital(&mut self, index: usize, level: bool) {
        self.digital_out[index] = level;
    }

    fn sample_digital(&self, index: usize) -> bool {
        self.digital_in[index]
    }

    fn drive_analog(&mut self, index: usize, value: f32) {
        self.analog_out[index] = value;
    }

    fn sample_analog(&self, index: usize) -> f32 {
        self.analog_in[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_pins_report_strapped_address() {
        let pins = SimPins::with_address(0x0B);
        assert_eq!(pins.unit_address(), 0x0B);
    }

    #[test]
    fn pull_up_floats_input_high() {
        let mut pins = SimPins::with_address(1);
        assert!(!pins.sample_digital(3));
        pins.set_digital_direction(3, DigitalMode::InputWithPullUp);
        assert!(pins.sample_digital(3));
    }

    #[test]
    fn driven_outputs_are_recorded() {
        let mut pins = SimPins::with_address(1);
        pins.drive_digital(0, true);
        pins.drive_analog(2, 0.25);
        assert!(pins.digital_out[0]);
        assert_eq!(pins.analog_out[2], 0.25);
    }
}
