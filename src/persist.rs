//! Non-volatile state persistence.
//!
//! [`DeviceState`] is the unit of persistence: every channel's mode and
//! driven value plus the trigger mode, encoded as one fixed-size record at a
//! fixed offset. The layout carries no version tag and no checksum, matching
//! the storage format of the deployed nodes; decoding therefore bounds
//! whatever bytes it finds (unknown mode bytes become `Input`, out-of-range
//! analog values become 0.0) instead of rejecting them.

use crate::channel::{AnalogMode, DigitalMode};
use crate::device::TriggerMode;
use crate::{ANALOG_CHANNELS, DIGITAL_CHANNELS};

/// Byte offset of the state record inside the non-volatile store.
pub const NV_OFFSET: usize = 0;

/// Encoded record length: 8 digital modes, 8 digital values, 4 analog
/// modes, 4 little-endian `f32` analog values, 1 trigger-mode byte.
pub const RECORD_LEN: usize = DIGITAL_CHANNELS * 2 + ANALOG_CHANNELS * 5 + 1;

/// Byte-addressable non-volatile storage capability (EEPROM-style get/put,
/// infallible by contract).
pub trait NvStore {
    /// Copies `buf.len()` bytes starting at `offset` into `buf`.
    fn load(&self, offset: usize, buf: &mut [u8]);

    /// Writes `bytes` starting at `offset`.
    fn store(&mut self, offset: usize, bytes: &[u8]);
}

/// RAM-backed store for simulation and tests. Tracks how many `store`
/// calls it has absorbed so tests can assert that an inactive node never
/// touches persistence.
#[derive(Debug, Clone)]
pub struct RamNv {
    cells: Vec<u8>,
    writes: usize,
}

impl RamNv {
    /// Creates a zero-filled store of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            cells: vec![0; capacity],
            writes: 0,
        }
    }

    /// Number of `store` calls performed so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Raw cells, for byte-level assertions.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }
}

impl Default for RamNv {
    fn default() -> Self {
        // Sized like the smallest EEPROM part used on the backplane.
        Self::new(1024)
    }
}

impl NvStore for RamNv {
    fn load(&self, offset: usize, buf: &mut [u8]) {
        buf.copy_from_slice(&self.cells[offset..offset + buf.len()]);
    }

    fn store(&mut self, offset: usize, bytes: &[u8]) {
        self.cells[offset..offset + bytes.len()].copy_from_slice(bytes);
        self.writes += 1;
    }
}

/// Snapshot of everything a node persists across power cycles.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DeviceState {
    pub digital_modes: [DigitalMode; DIGITAL_CHANNELS],
    pub digital_values: [bool; DIGITAL_CHANNELS],
    pub analog_modes: [AnalogMode; ANALOG_CHANNELS],
    pub analog_values: [f32; ANALOG_CHANNELS],
    pub trigger: TriggerMode,
}

impl DeviceState {
    /// Encodes the state into the fixed wire layout.
    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut raw = [0u8; RECORD_LEN];
        let mut at = 0;
        for mode in self.digital_modes {
            raw[at] = mode.to_byte();
            at += 1;
        }
        for value in self.digital_values {
            raw[at] = value as u8;
            at += 1;
        }
        for mode in self.analog_modes {
            raw[at] = mode.to_byte();
            at += 1;
        }
        for value in self.analog_values {
            raw[at..at + 4].copy_from_slice(&value.to_le_bytes());
            at += 4;
        }
        raw[at] = self.trigger.to_byte();
        raw
    }

    /// Decodes a record, bounding every field to its legal range. Never
    /// fails: uninitialized or corrupted storage yields a usable (if
    /// arbitrary) state rather than a dead node.
    pub fn decode(raw: &[u8; RECORD_LEN]) -> Self {
        let mut state = DeviceState::default();
        let mut at = 0;
        for mode in state.digital_modes.iter_mut() {
            *mode = DigitalMode::from_byte(raw[at]);
            at += 1;
        }
        for value in state.digital_values.iter_mut() {
            *value = raw[at] != 0;
            at += 1;
        }
        for mode in state.analog_modes.iter_mut() {
            *mode = AnalogMode::from_byte(raw[at]);
            at += 1;
        }
        for value in state.analog_values.iter_mut() {
            let v = f32::from_le_bytes([raw[at], raw[at + 1], raw[at + 2], raw[at + 3]]);
            *value = if (0.0..=1.0).contains(&v) { v } else { 0.0 };
            at += 4;
        }
        state.trigger = TriggerMode::from_byte(raw[at]);
        state
    }
}
