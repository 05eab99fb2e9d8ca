//! The node controller: addressing gate, command execution, and the
//! semantic actions behind save/recall/reset/trigger.
//!
//! [`Node`] owns the channel bank, the hardware pins capability, and the
//! non-volatile store. The binary feeds it complete command lines through
//! [`Node::dispatch`]; anything the node has to say comes back as the
//! returned reply string.
//!
//! The error policy is "fail silently, never stop servicing the link":
//! nothing in here can fail in a way the wire sees, so commands that are
//! absorbed without effect produce an [`Ignored`] outcome through
//! [`Node::try_dispatch`] for diagnostics and tests, while the plain
//! [`Node::dispatch`] path reduces them to "no reply".

use crate::channel::{AnalogMode, ChannelBank, DigitalMode};
use crate::command::{self, Action, MatchedCommand};
use crate::persist::{DeviceState, NvStore, NV_OFFSET, RECORD_LEN};
use crate::pins::IoPins;
use crate::{ANALOG_CHANNELS, DIGITAL_CHANNELS, IDENTIFICATION};

/// Trigger subsystem mode. Nothing schedules triggers yet; the mode is
/// stored, persisted, and handed to the trigger hook when one fires.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    #[default]
    Off,
    Rising,
    Falling,
}

impl TriggerMode {
    /// Canonical keyword, as echoed in `SYST:TRIG:MODE?` replies.
    pub fn keyword(self) -> &'static str {
        match self {
            TriggerMode::Off => "OFF",
            TriggerMode::Rising => "RISING",
            TriggerMode::Falling => "FALLING",
        }
    }

    pub(crate) fn to_byte(self) -> u8 {
        match self {
            TriggerMode::Off => 0,
            TriggerMode::Rising => 1,
            TriggerMode::Falling => 2,
        }
    }

    pub(crate) fn from_byte(byte: u8) -> Self {
        match byte {
            1 => TriggerMode::Rising,
            2 => TriggerMode::Falling,
            _ => TriggerMode::Off,
        }
    }
}

/// Why a command was absorbed without reply or effect. Wire-invisible by
/// design; surfaced only through [`Node::try_dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    /// No registry entry matched the line.
    Unrecognized,
    /// The node is not the addressed unit on the link.
    NotAddressed,
    /// Missing, malformed, or out-of-range argument.
    BadArgument,
    /// Channel number outside 1..=8 (digital) or 1..=4 (analog).
    ChannelRange,
    /// Write to a channel whose mode does not accept it.
    WrongMode,
}

type TriggerHook = Box<dyn FnMut(TriggerMode)>;

/// One backplane node: channel state plus addressing state, bound to a
/// pins capability and a non-volatile store.
pub struct Node<P: IoPins, S: NvStore> {
    unit_id: u8,
    active: bool,
    channels: ChannelBank,
    trigger_mode: TriggerMode,
    pins: P,
    nv: S,
    trigger_hook: Option<TriggerHook>,
}

impl<P: IoPins, S: NvStore> Node<P, S> {
    /// Builds a node, sampling the unit address from the hardware straps
    /// and bringing every channel up through the default state (the same
    /// initialization path `*RCL` and `*RST` use).
    pub fn new(pins: P, nv: S) -> Self {
        let mut node = Self {
            unit_id: pins.unit_address(),
            active: false,
            channels: ChannelBank::default(),
            trigger_mode: TriggerMode::Off,
            pins,
            nv,
            trigger_hook: None,
        };
        node.apply_state(&DeviceState::default());
        node
    }

    /// The hardware-strapped unit address, fixed for the process lifetime.
    pub fn unit_id(&self) -> u8 {
        self.unit_id
    }

    /// Whether this node is currently the addressed unit on the link.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn channels(&self) -> &ChannelBank {
        &self.channels
    }

    pub fn trigger_mode(&self) -> TriggerMode {
        self.trigger_mode
    }

    pub fn pins(&self) -> &P {
        &self.pins
    }

    /// Mutable pin access, for harnesses standing in for the outside world.
    pub fn pins_mut(&mut self) -> &mut P {
        &mut self.pins
    }

    pub fn nv(&self) -> &S {
        &self.nv
    }

    /// Installs the trigger extension hook. The hook receives the current
    /// trigger mode each time `*TRG` or `SYST:TRIG` fires.
    pub fn set_trigger_hook(&mut self, hook: impl FnMut(TriggerMode) + 'static) {
        self.trigger_hook = Some(Box::new(hook));
    }

    /// Processes one received line and returns the reply to put on the
    /// link, if any. Absorbed commands are logged and produce no reply.
    pub fn dispatch(&mut self, line: &str) -> Option<String> {
        match self.try_dispatch(line) {
            Ok(reply) => reply,
            Err(reason) => {
                log::debug!("line {:?} ignored: {:?}", line.trim(), reason);
                None
            }
        }
    }

    /// Diagnostic dispatch: like [`Node::dispatch`] but reports why a
    /// command was absorbed instead of collapsing it to silence.
    pub fn try_dispatch(&mut self, line: &str) -> Result<Option<String>, Ignored> {
        if line.trim().is_empty() {
            return Ok(None);
        }
        match command::resolve(line) {
            Some(cmd) => self.execute(cmd),
            None => Err(Ignored::Unrecognized),
        }
    }

    fn execute(&mut self, cmd: MatchedCommand) -> Result<Option<String>, Ignored> {
        match cmd.action {
            // Address selection and the short-form trigger act regardless
            // of the active gate. The hierarchical SYST:TRIG is gated; the
            // asymmetry is part of the deployed behavior and stays.
            Action::SelectAddress => self.select_address(cmd.arg),
            Action::ForceTrigger => {
                self.fire_trigger();
                Ok(None)
            }
            _ if !self.active => Err(Ignored::NotAddressed),
            Action::Identify => Ok(cmd.query.then(|| IDENTIFICATION.to_string())),
            Action::Save => {
                self.save();
                Ok(None)
            }
            Action::Recall => {
                self.recall();
                Ok(None)
            }
            Action::Reset => {
                self.reset();
                Ok(None)
            }
            Action::Help => Ok(cmd.query.then(command::render_help)),
            Action::ReportAddress => Ok(cmd.query.then(|| self.unit_id.to_string())),
            Action::SystemTrigger => {
                self.fire_trigger();
                Ok(None)
            }
            Action::TriggerModeCmd => self.trigger_mode_command(cmd.query, cmd.arg),
            Action::DigitalValue => self.digital_value_command(cmd.query, cmd.channel, cmd.arg),
            Action::DigitalModeCmd => self.digital_mode_command(cmd.query, cmd.channel, cmd.arg),
            Action::AnalogValue => self.analog_value_command(cmd.query, cmd.channel, cmd.arg),
            Action::AnalogModeCmd => self.analog_mode_command(cmd.query, cmd.channel, cmd.arg),
        }
    }

    /// `++ADDR n`: this node goes active iff `n` equals its strapped id.
    /// Going active chains the identification reply onto the address
    /// command; the source re-evaluates (and re-replies) on every address
    /// command, so re-selecting an active node identifies again.
    fn select_address(&mut self, arg: &str) -> Result<Option<String>, Ignored> {
        let id: u8 = arg.parse().map_err(|_| Ignored::BadArgument)?;
        self.active = id == self.unit_id;
        if self.active {
            Ok(Some(IDENTIFICATION.to_string()))
        } else {
            Ok(None)
        }
    }

    fn digital_value_command(
        &mut self,
        query: bool,
        channel: Option<u8>,
        arg: &str,
    ) -> Result<Option<String>, Ignored> {
        let index = digital_index(channel)?;
        if query {
            let level = self.read_digital(index);
            return Ok(Some(if level { "1" } else { "0" }.to_string()));
        }
        let level = command::parse_digital_value(arg).ok_or(Ignored::BadArgument)?;
        let ch = &mut self.channels.digital[index];
        if ch.mode != DigitalMode::Output {
            return Err(Ignored::WrongMode);
        }
        ch.value = level;
        self.pins.drive_digital(index, level);
        Ok(None)
    }

    fn digital_mode_command(
        &mut self,
        query: bool,
        channel: Option<u8>,
        arg: &str,
    ) -> Result<Option<String>, Ignored> {
        let index = digital_index(channel)?;
        if query {
            return Ok(Some(self.channels.digital[index].mode.keyword().to_string()));
        }
        let mode = command::parse_digital_mode(arg).ok_or(Ignored::BadArgument)?;
        self.channels.digital[index].mode = mode;
        self.pins.set_digital_direction(index, mode);
        Ok(None)
    }

    fn analog_value_command(
        &mut self,
        query: bool,
        channel: Option<u8>,
        arg: &str,
    ) -> Result<Option<String>, Ignored> {
        let index = analog_index(channel)?;
        if query {
            return Ok(Some(format!("{:.3}", self.read_analog(index))));
        }
        let value: f32 = arg.parse().map_err(|_| Ignored::BadArgument)?;
        if !(0.0..=1.0).contains(&value) {
            return Err(Ignored::BadArgument);
        }
        let ch = &mut self.channels.analog[index];
        if ch.mode != AnalogMode::Output {
            return Err(Ignored::WrongMode);
        }
        ch.value = value;
        self.pins.drive_analog(index, value);
        Ok(None)
    }

    fn analog_mode_command(
        &mut self,
        query: bool,
        channel: Option<u8>,
        arg: &str,
    ) -> Result<Option<String>, Ignored> {
        let index = analog_index(channel)?;
        if query {
            return Ok(Some(self.channels.analog[index].mode.keyword().to_string()));
        }
        let mode = command::parse_analog_mode(arg).ok_or(Ignored::BadArgument)?;
        self.channels.analog[index].mode = mode;
        self.pins.set_analog_direction(index, mode);
        Ok(None)
    }

    fn trigger_mode_command(&mut self, query: bool, arg: &str) -> Result<Option<String>, Ignored> {
        if query {
            return Ok(Some(self.trigger_mode.keyword().to_string()));
        }
        self.trigger_mode = command::parse_trigger_mode(arg).ok_or(Ignored::BadArgument)?;
        Ok(None)
    }

    /// Wire-level digital read: the driven value while the channel is an
    /// output, the hardware sample otherwise.
    pub fn read_digital(&self, index: usize) -> bool {
        let ch = &self.channels.digital[index];
        match ch.mode {
            DigitalMode::Output => ch.value,
            _ => self.pins.sample_digital(index),
        }
    }

    /// Wire-level analog read: the driven value while the channel is an
    /// output, the ADC sample otherwise.
    pub fn read_analog(&self, index: usize) -> f32 {
        let ch = &self.channels.analog[index];
        match ch.mode {
            AnalogMode::Output => ch.value,
            AnalogMode::Input => self.pins.sample_analog(index),
        }
    }

    /// Captures the full persistable state.
    pub fn snapshot(&self) -> DeviceState {
        let mut state = DeviceState {
            trigger: self.trigger_mode,
            ..DeviceState::default()
        };
        for (i, ch) in self.channels.digital.iter().enumerate() {
            state.digital_modes[i] = ch.mode;
            state.digital_values[i] = ch.value;
        }
        for (i, ch) in self.channels.analog.iter().enumerate() {
            state.analog_modes[i] = ch.mode;
            state.analog_values[i] = ch.value;
        }
        state
    }

    /// Applies a state through the one initialization path shared by cold
    /// start, `*RCL`, and `*RST`: per channel, mode first, then value,
    /// driving the pin when the channel comes up as an output.
    fn apply_state(&mut self, state: &DeviceState) {
        for i in 0..DIGITAL_CHANNELS {
            let mode = state.digital_modes[i];
            self.channels.digital[i].mode = mode;
            self.pins.set_digital_direction(i, mode);
            self.channels.digital[i].value = state.digital_values[i];
            if mode == DigitalMode::Output {
                self.pins.drive_digital(i, state.digital_values[i]);
            }
        }
        for i in 0..ANALOG_CHANNELS {
            let mode = state.analog_modes[i];
            self.channels.analog[i].mode = mode;
            self.pins.set_analog_direction(i, mode);
            self.channels.analog[i].value = state.analog_values[i];
            if mode == AnalogMode::Output {
                self.pins.drive_analog(i, state.analog_values[i]);
            }
        }
        self.trigger_mode = state.trigger;
    }

    /// `*SAV`: writes the encoded state record at the fixed NV offset.
    pub fn save(&mut self) {
        let record = self.snapshot().encode();
        self.nv.store(NV_OFFSET, &record);
    }

    /// `*RCL`: loads whatever record the NV store holds and applies it.
    /// Uninitialized storage decodes to a bounded (all-input) state.
    pub fn recall(&mut self) {
        let mut raw = [0u8; RECORD_LEN];
        self.nv.load(NV_OFFSET, &mut raw);
        let state = DeviceState::decode(&raw);
        self.apply_state(&state);
    }

    /// `*RST`: applies the compiled-in default state.
    pub fn reset(&mut self) {
        self.apply_state(&DeviceState::default());
    }

    /// Fires the trigger extension hook, if one is installed. Nothing else
    /// happens yet; real trigger scheduling would start from here.
    pub fn fire_trigger(&mut self) {
        if let Some(hook) = self.trigger_hook.as_mut() {
            hook(self.trigger_mode);
        }
    }

    /// Periodic update slot, called once per scheduler tick. Currently
    /// only the place a scheduled trigger subsystem would run from.
    pub fn tick(&mut self) {}
}

/// Maps a 1-based wire channel number to a 0-based digital index.
fn digital_index(channel: Option<u8>) -> Result<usize, Ignored> {
    match channel {
        Some(n) if (1..=DIGITAL_CHANNELS as u8).contains(&n) => Ok(n as usize - 1),
        _ => Err(Ignored::ChannelRange),
    }
}

/// Maps a 1-based wire channel number to a 0-based analog index.
fn analog_index(channel: Option<u8>) -> Result<usize, Ignored> {
    match channel {
        Some(n) if (1..=ANALOG_CHANNELS as u8).contains(&n) => Ok(n as usize - 1),
        _ => Err(Ignored::ChannelRange),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::RamNv;
    use crate::pins::SimPins;
    use std::cell::Cell;
    use std::rc::Rc;

    fn node_with_id(id: u8) -> Node<SimPins, RamNv> {
        Node::new(SimPins::with_address(id), RamNv::default())
    }

    fn active_node() -> Node<SimPins, RamNv> {
        let mut node = node_with_id(7);
        assert!(node.dispatch("++ADDR 7").is_some());
        node
    }

    // --- Addressing and activation ---

    #[test]
    fn address_match_activates_and_identifies_once() {
        let mut node = node_with_id(7);
        assert!(!node.is_active());
        let reply = node.dispatch("++ADDR 7");
        assert_eq!(reply.as_deref(), Some(IDENTIFICATION));
        assert!(node.is_active());
    }

    #[test]
    fn address_mismatch_deactivates_silently() {
        let mut node = active_node();
        assert_eq!(node.dispatch("++ADDR 2"), None);
        assert!(!node.is_active());
    }

    #[test]
    fn reselecting_an_active_node_identifies_again() {
        let mut node = active_node();
        assert_eq!(node.dispatch("++ADDR 7").as_deref(), Some(IDENTIFICATION));
    }

    #[test]
    fn malformed_address_argument_changes_nothing() {
        let mut node = active_node();
        assert_eq!(node.try_dispatch("++ADDR seven"), Err(Ignored::BadArgument));
        assert!(node.is_active());
    }

    #[test]
    fn inactive_node_ignores_everything_but_address_and_force_trigger() {
        let mut node = node_with_id(7);
        let before = node.snapshot();
        for line in [
            "*IDN?", "ID?", "*SAV", "*RCL", "*RST", "HELP?", "SYST:ADDR?", "SYST:TRIG",
            "SYST:TRIG:MODE?", "SYST:TRIG:MODE RISING", "DIO1?", "DIO1 1", "DIO1:MODE OUTPUT",
            "AIO1?", "AIO1 0.5", "AIO1:MODE OUTPUT",
        ] {
            assert_eq!(node.try_dispatch(line), Err(Ignored::NotAddressed), "{line}");
        }
        assert_eq!(node.snapshot(), before);
        assert_eq!(node.nv().writes(), 0);
    }

    #[test]
    fn identification_requires_the_query_marker() {
        let mut node = active_node();
        assert_eq!(node.dispatch("*IDN"), None);
        assert_eq!(node.dispatch("*IDN?").as_deref(), Some(IDENTIFICATION));
        assert_eq!(node.dispatch("ID?").as_deref(), Some(IDENTIFICATION));
    }

    #[test]
    fn system_address_reports_the_strapped_id() {
        let mut node = active_node();
        assert_eq!(node.dispatch("SYST:ADDR?").as_deref(), Some("7"));
    }

    // --- Digital channels ---

    #[test]
    fn digital_write_then_read_round_trips_only_as_output() {
        let mut node = active_node();
        node.dispatch("DIO3:MODE OUTPUT");
        assert_eq!(node.dispatch("DIO3 1"), None);
        assert_eq!(node.dispatch("DIO3?").as_deref(), Some("1"));
        assert!(node.pins().digital_out[2]);

        // Back to input: the stored value no longer answers reads.
        node.dispatch("DIO3:MODE INPUT");
        assert_eq!(node.dispatch("DIO3?").as_deref(), Some("0"));
    }

    #[test]
    fn digital_write_on_input_channel_is_absorbed() {
        let mut node = active_node();
        node.dispatch("DIO1:MODE IN");
        assert_eq!(node.try_dispatch("DIO1 ON"), Err(Ignored::WrongMode));
        assert!(!node.channels().digital[0].value);

        node.pins_mut().digital_in[0] = true;
        assert_eq!(node.dispatch("DIO1?").as_deref(), Some("1"));
    }

    #[test]
    fn pull_up_input_reads_the_floated_level() {
        let mut node = active_node();
        node.dispatch("DIO2:MODE PUL");
        assert_eq!(node.channels().digital[1].mode, DigitalMode::InputWithPullUp);
        assert_eq!(node.dispatch("DIO2?").as_deref(), Some("1"));
    }

    #[test]
    fn digital_mode_query_echoes_the_keyword() {
        let mut node = active_node();
        node.dispatch("DIO4:MODE INPUT_PULLUP");
        assert_eq!(node.dispatch("DIO4:MODE?").as_deref(), Some("INPUT_PULLUP"));
    }

    #[test]
    fn digital_channel_bounds_are_one_to_eight() {
        let mut node = active_node();
        assert_eq!(node.try_dispatch("DIO0?"), Err(Ignored::ChannelRange));
        assert_eq!(node.try_dispatch("DIO9 1"), Err(Ignored::ChannelRange));
        assert!(node.try_dispatch("DIO8?").is_ok());
    }

    #[test]
    fn bad_digital_keyword_is_absorbed() {
        let mut node = active_node();
        node.dispatch("DIO1:MODE OUTPUT");
        assert_eq!(node.try_dispatch("DIO1 MAYBE"), Err(Ignored::BadArgument));
        assert_eq!(node.try_dispatch("DIO1"), Err(Ignored::BadArgument));
        assert!(!node.channels().digital[0].value);
    }

    // --- Analog channels ---

    #[test]
    fn analog_output_set_then_query_replies_three_decimals() {
        let mut node = active_node();
        node.dispatch("AIO1:MODE OUTPUT");
        assert_eq!(node.dispatch("AIO1 0.5"), None);
        assert_eq!(node.dispatch("AIO1?").as_deref(), Some("0.500"));
        // Wire channel 1 is internal index 0.
        assert_eq!(node.channels().analog[0].value, 0.5);
        assert_eq!(node.pins().analog_out[0], 0.5);
    }

    #[test]
    fn analog_input_channel_reads_the_adc() {
        let mut node = active_node();
        node.pins_mut().analog_in[1] = 0.75;
        assert_eq!(node.dispatch("AIO2?").as_deref(), Some("0.750"));
        assert_eq!(node.try_dispatch("AIO2 0.2"), Err(Ignored::WrongMode));
    }

    #[test]
    fn out_of_range_analog_value_is_absorbed() {
        let mut node = active_node();
        node.dispatch("AIO1:MODE OUTPUT");
        node.dispatch("AIO1 0.25");
        assert_eq!(node.try_dispatch("AIO1 1.5"), Err(Ignored::BadArgument));
        assert_eq!(node.try_dispatch("AIO1 -0.1"), Err(Ignored::BadArgument));
        assert_eq!(node.try_dispatch("AIO1 NaN"), Err(Ignored::BadArgument));
        assert_eq!(node.dispatch("AIO1?").as_deref(), Some("0.250"));
    }

    #[test]
    fn analog_channel_bounds_are_one_to_four() {
        let mut node = active_node();
        assert_eq!(node.try_dispatch("AIO5?"), Err(Ignored::ChannelRange));
        assert!(node.try_dispatch("AIO4?").is_ok());
    }

    // --- Persistence ---

    #[test]
    fn save_then_mutate_then_recall_restores_the_saved_state() {
        let mut node = active_node();
        node.dispatch("DIO1:MODE OUTPUT");
        node.dispatch("DIO1 1");
        node.dispatch("AIO2:MODE OUTPUT");
        node.dispatch("AIO2 0.125");
        node.dispatch("SYST:TRIG:MODE FALLING");
        let saved = node.snapshot();
        node.dispatch("*SAV");

        node.dispatch("DIO1 0");
        node.dispatch("DIO5:MODE OUTPUT");
        node.dispatch("AIO2 0.9");
        node.dispatch("SYST:TRIG:MODE OFF");
        assert_ne!(node.snapshot(), saved);

        node.dispatch("*RCL");
        assert_eq!(node.snapshot(), saved);
        // Recall re-drives outputs through the init path.
        assert!(node.pins().digital_out[0]);
        assert_eq!(node.pins().analog_out[1], 0.125);
    }

    #[test]
    fn recall_then_save_leaves_the_persisted_bytes_unchanged() {
        let mut node = active_node();
        node.dispatch("DIO2:MODE OUTPUT");
        node.dispatch("DIO2 1");
        node.dispatch("*SAV");
        let bytes = node.nv().cells().to_vec();
        node.dispatch("*RCL");
        node.dispatch("*SAV");
        assert_eq!(node.nv().cells(), &bytes[..]);
    }

    #[test]
    fn recall_from_uninitialized_storage_yields_a_bounded_state() {
        let mut node = active_node();
        node.dispatch("DIO1:MODE OUTPUT");
        node.dispatch("*RCL");
        assert_eq!(node.snapshot(), DeviceState::default());
    }

    #[test]
    fn reset_restores_the_compiled_in_defaults() {
        let mut node = active_node();
        node.dispatch("DIO1:MODE OUTPUT");
        node.dispatch("DIO1 1");
        node.dispatch("AIO1:MODE OUTPUT");
        node.dispatch("AIO1 1.0");
        node.dispatch("SYST:TRIG:MODE RISING");
        node.dispatch("*RST");
        assert_eq!(node.snapshot(), DeviceState::default());
    }

    #[test]
    fn inactive_save_never_touches_the_store() {
        let mut node = node_with_id(7);
        assert_eq!(node.try_dispatch("*SAV"), Err(Ignored::NotAddressed));
        assert_eq!(node.nv().writes(), 0);
    }

    // --- Trigger ---

    #[test]
    fn force_trigger_fires_even_while_inactive() {
        let mut node = node_with_id(7);
        let fired = Rc::new(Cell::new(0u32));
        let seen = fired.clone();
        node.set_trigger_hook(move |_| seen.set(seen.get() + 1));

        assert_eq!(node.dispatch("*TRG"), None);
        assert_eq!(fired.get(), 1);

        // The hierarchical form stays behind the active gate.
        assert_eq!(node.try_dispatch("SYST:TRIG"), Err(Ignored::NotAddressed));
        assert_eq!(fired.get(), 1);

        node.dispatch("++ADDR 7");
        node.dispatch("SYST:TRIG");
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn trigger_hook_receives_the_current_mode() {
        let mut node = active_node();
        let last = Rc::new(Cell::new(TriggerMode::Off));
        let seen = last.clone();
        node.set_trigger_hook(move |mode| seen.set(mode));

        node.dispatch("SYST:TRIG:MODE RISING");
        node.dispatch("*TRG");
        assert_eq!(last.get(), TriggerMode::Rising);
    }

    #[test]
    fn trigger_mode_get_set_round_trips() {
        let mut node = active_node();
        assert_eq!(node.dispatch("SYST:TRIG:MODE?").as_deref(), Some("OFF"));
        node.dispatch("SYST:TRIG:MODE FALL");
        assert_eq!(node.dispatch("SYST:TRIG:MODE?").as_deref(), Some("FALLING"));
        assert_eq!(
            node.try_dispatch("SYST:TRIG:MODE SIDEWAYS"),
            Err(Ignored::BadArgument)
        );
        assert_eq!(node.dispatch("SYST:TRIG:MODE?").as_deref(), Some("FALLING"));
    }

    // --- Dispatch edges ---

    #[test]
    fn empty_and_unknown_lines_produce_nothing() {
        let mut node = active_node();
        assert_eq!(node.try_dispatch("   "), Ok(None));
        assert_eq!(node.try_dispatch("NOPE"), Err(Ignored::Unrecognized));
    }

    #[test]
    fn help_query_lists_the_registry() {
        let mut node = active_node();
        let help = node.dispatch("HELP?").unwrap();
        assert!(help.contains("++ADDR"));
        assert!(help.contains("AIO0:MODE"));
        assert_eq!(node.dispatch("HELP"), None);
    }
}
