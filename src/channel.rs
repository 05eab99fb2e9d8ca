//! Per-channel mode and value state for the digital and analog channel sets.
//!
//! Channel state lives here as plain data; all gating decisions (who may
//! read or write a channel, and when) are made by [`crate::device::Node`],
//! which owns one [`ChannelBank`].

use crate::{ANALOG_CHANNELS, DIGITAL_CHANNELS};

/// Direction/pull configuration of a digital channel.
///
/// Deliberately a separate type from [`AnalogMode`]: the underlying
/// platform constants may coincide on real hardware, but the two value
/// spaces are unrelated and must not be conflated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DigitalMode {
    #[default]
    Input,
    InputWithPullUp,
    Output,
}

impl DigitalMode {
    /// Canonical keyword, as echoed in `DIO#:MODE?` replies and HELP text.
    pub fn keyword(self) -> &'static str {
        match self {
            DigitalMode::Input => "INPUT",
            DigitalMode::InputWithPullUp => "INPUT_PULLUP",
            DigitalMode::Output => "OUTPUT",
        }
    }

    pub(crate) fn to_byte(self) -> u8 {
        match self {
            DigitalMode::Input => 0,
            DigitalMode::InputWithPullUp => 1,
            DigitalMode::Output => 2,
        }
    }

    /// Decodes a persisted mode byte. Unknown bytes (uninitialized storage)
    /// fall back to `Input`, the safe direction.
    pub(crate) fn from_byte(byte: u8) -> Self {
        match byte {
            1 => DigitalMode::InputWithPullUp,
            2 => DigitalMode::Output,
            _ => DigitalMode::Input,
        }
    }
}

/// Direction of an analog channel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AnalogMode {
    #[default]
    Input,
    Output,
}

impl AnalogMode {
    /// Canonical keyword, as echoed in `AIO#:MODE?` replies and HELP text.
    pub fn keyword(self) -> &'static str {
        match self {
            AnalogMode::Input => "INPUT",
            AnalogMode::Output => "OUTPUT",
        }
    }

    pub(crate) fn to_byte(self) -> u8 {
        match self {
            AnalogMode::Input => 0,
            AnalogMode::Output => 1,
        }
    }

    pub(crate) fn from_byte(byte: u8) -> Self {
        match byte {
            1 => AnalogMode::Output,
            _ => AnalogMode::Input,
        }
    }
}

/// One digital I/O line. `value` is the driven level, meaningful only while
/// the mode is `Output`; it defaults to `false` and survives mode changes so
/// that snapshot/restore round-trips exactly.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct DigitalChannel {
    pub mode: DigitalMode,
    pub value: bool,
}

/// One analog I/O line. `value` is the driven level in `[0.0, 1.0]`,
/// meaningful only while the mode is `Output`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct AnalogChannel {
    pub mode: AnalogMode,
    pub value: f32,
}

/// The full channel complement of one node: eight digital lines and four
/// analog lines, indexed 0-based internally (1-based on the wire).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChannelBank {
    pub digital: [DigitalChannel; DIGITAL_CHANNELS],
    pub analog: [AnalogChannel; ANALOG_CHANNELS],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bank_is_all_inputs_at_zero() {
        let bank = ChannelBank::default();
        for ch in &bank.digital {
            assert_eq!(ch.mode, DigitalMode::Input);
            assert!(!ch.value);
        }
        for ch in &bank.analog {
            assert_eq!(ch.mode, AnalogMode::Input);
            assert_eq!(ch.value, 0.0);
        }
    }

    #[test]
    fn digital_mode_byte_round_trip() {
        for mode in [
            DigitalMode::Input,
            DigitalMode::InputWithPullUp,
            DigitalMode::Output,
        ] {
            assert_eq!(DigitalMode::from_byte(mode.to_byte()), mode);
        }
    }

    #[test]
    fn unknown_mode_bytes_fall_back_to_input() {
        assert_eq!(DigitalMode::from_byte(0xFF), DigitalMode::Input);
        assert_eq!(AnalogMode::from_byte(0xFF), AnalogMode::Input);
    }
}
