//! # Backplane I/O Node
//!
//! This library contains the control core for one node of a multi-unit
//! instrumentation backplane. A node exposes eight digital and four analog
//! channels and is driven over a shared serial link by short SCPI-style text
//! commands. Every node on the link sees every command; a hardware-sampled
//! unit address decides which node is allowed to act and reply.
//!
//! The library is transport-agnostic: the binary (or a test) feeds complete
//! command lines into [`Node::dispatch`] and writes the returned reply, if
//! any, back to the link. Hardware access goes through the [`IoPins`]
//! capability and non-volatile storage through [`NvStore`], so the same core
//! runs against real drivers or the bundled simulation adapters.

pub mod channel;
pub mod command;
pub mod device;
pub mod persist;
pub mod pins;

pub use channel::{AnalogChannel, AnalogMode, ChannelBank, DigitalChannel, DigitalMode};
pub use command::{Action, CommandDef, MatchedCommand, COMMANDS};
pub use device::{Ignored, Node, TriggerMode};
pub use persist::{DeviceState, NvStore, RamNv, NV_OFFSET, RECORD_LEN};
pub use pins::{IoPins, SimPins};

/// Number of digital channels on a node (`DIO1`..`DIO8` on the wire).
pub const DIGITAL_CHANNELS: usize = 8;

/// Number of analog channels on a node (`AIO1`..`AIO4` on the wire).
pub const ANALOG_CHANNELS: usize = 4;

/// Fixed identification reply: vendor, model, serial, firmware revision.
pub const IDENTIFICATION: &str = "OpenBP Instruments,IO84,00000001,1.00";
