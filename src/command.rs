//! Command registry and line resolution.
//!
//! The registry is an ordered, immutable table of [`CommandDef`] entries.
//! An incoming line is split into a mnemonic token and an argument, the
//! trailing `?` (query marker) is stripped, and the token is compared
//! against each pattern in order; the first match wins. Multi-channel
//! patterns carry a placeholder digit (`DIO0`, `AIO0:MODE`) that matches
//! any single decimal digit in the received token and is returned as the
//! 1-based channel number — a system with more than nine channels per kind
//! would need to widen this to a numeric span.
//!
//! Resolution never executes anything: it produces a [`MatchedCommand`]
//! that [`crate::device::Node`] acts on.

use crate::channel::{AnalogMode, DigitalMode};
use crate::device::TriggerMode;

/// Semantic action bound to a registry entry. The dispatch table maps
/// patterns to these tags; the node matches on the tag to run the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// `++ADDR n` — activate iff `n` equals the hardware-strapped unit id.
    SelectAddress,
    /// `*IDN?` / `ID?` — identification string.
    Identify,
    /// `*SAV` — persist the full device state.
    Save,
    /// `*RCL` — restore the persisted device state.
    Recall,
    /// `*RST` — restore the compiled-in default state.
    Reset,
    /// `*TRG` — fire the trigger, addressed or not.
    ForceTrigger,
    /// `HELP?` — list registered mnemonics with their argument hints.
    Help,
    /// `SYST:ADDR?` — report the hardware-strapped unit id.
    ReportAddress,
    /// `SYST:TRIG` — fire the trigger (active nodes only).
    SystemTrigger,
    /// `SYST:TRIG:MODE` — get/set the trigger mode.
    TriggerModeCmd,
    /// `DIO#` — get/set a digital channel value.
    DigitalValue,
    /// `DIO#:MODE` — get/set a digital channel mode.
    DigitalModeCmd,
    /// `AIO#` — get/set an analog channel value.
    AnalogValue,
    /// `AIO#:MODE` — get/set an analog channel mode.
    AnalogModeCmd,
}

/// One registry entry: mnemonic pattern, bound action, whether the pattern
/// carries a channel placeholder digit, and the HELP argument hint.
#[derive(Debug)]
pub struct CommandDef {
    pub pattern: &'static str,
    pub action: Action,
    pub multi_channel: bool,
    pub hint: &'static str,
}

impl CommandDef {
    const fn new(
        pattern: &'static str,
        action: Action,
        multi_channel: bool,
        hint: &'static str,
    ) -> Self {
        Self {
            pattern,
            action,
            multi_channel,
            hint,
        }
    }

    /// Compares `token` against this pattern, case-insensitively and
    /// length-exact. Returns `None` on mismatch; on a match, the captured
    /// channel digit for multi-channel patterns (`Some(Some(n))`) or
    /// `Some(None)` for plain ones.
    fn matches(&self, token: &str) -> Option<Option<u8>> {
        if token.len() != self.pattern.len() {
            return None;
        }
        let mut channel = None;
        for (p, t) in self.pattern.bytes().zip(token.bytes()) {
            if self.multi_channel && channel.is_none() && p.is_ascii_digit() {
                if !t.is_ascii_digit() {
                    return None;
                }
                channel = Some(t - b'0');
            } else if !p.eq_ignore_ascii_case(&t) {
                return None;
            }
        }
        Some(channel)
    }
}

/// The command registry, in match order. Ordering is part of the contract
/// (first match wins); the slice length replaces the sentinel entry the
/// equivalent C table would end with.
pub static COMMANDS: &[CommandDef] = &[
    CommandDef::new("++ADDR", Action::SelectAddress, false, "<unit id>"),
    CommandDef::new("*IDN", Action::Identify, false, ""),
    CommandDef::new("ID", Action::Identify, false, ""),
    CommandDef::new("*SAV", Action::Save, false, ""),
    CommandDef::new("*RCL", Action::Recall, false, ""),
    CommandDef::new("*RST", Action::Reset, false, ""),
    CommandDef::new("*TRG", Action::ForceTrigger, false, ""),
    CommandDef::new("HELP", Action::Help, false, ""),
    CommandDef::new("SYST:ADDR", Action::ReportAddress, false, ""),
    CommandDef::new("SYST:TRIG", Action::SystemTrigger, false, ""),
    CommandDef::new(
        "SYST:TRIG:MODE",
        Action::TriggerModeCmd,
        false,
        "{OFF|RISING|FALLING}",
    ),
    CommandDef::new("DIO0", Action::DigitalValue, true, "{0|1|OFF|ON|LO|HI}"),
    CommandDef::new(
        "DIO0:MODE",
        Action::DigitalModeCmd,
        true,
        "{INPUT|INPUT_PULLUP|OUTPUT}",
    ),
    CommandDef::new("AIO0", Action::AnalogValue, true, "0.0..1.0"),
    CommandDef::new("AIO0:MODE", Action::AnalogModeCmd, true, "{INPUT|OUTPUT}"),
];

/// A resolved command line, ready for execution.
#[derive(Debug, PartialEq)]
pub struct MatchedCommand<'a> {
    pub action: Action,
    /// True when the mnemonic carried a trailing `?`.
    pub query: bool,
    /// 1-based channel number captured from the placeholder digit, for
    /// multi-channel commands. Range checking is the handler's job.
    pub channel: Option<u8>,
    /// Argument text after the first whitespace run, trimmed.
    pub arg: &'a str,
}

/// Resolves one received line against [`COMMANDS`]. Returns `None` for
/// empty and unrecognized lines; per the link discipline those are
/// discarded without any reply.
pub fn resolve(line: &str) -> Option<MatchedCommand<'_>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (token, arg) = match line.find(char::is_whitespace) {
        Some(split) => (&line[..split], line[split..].trim()),
        None => (line, ""),
    };
    let (token, query) = match token.strip_suffix('?') {
        Some(stripped) => (stripped, true),
        None => (token, false),
    };
    for def in COMMANDS {
        if let Some(channel) = def.matches(token) {
            return Some(MatchedCommand {
                action: def.action,
                query,
                channel,
                arg,
            });
        }
    }
    None
}

/// Renders the HELP reply: one line per registry entry, mnemonic plus hint.
pub fn render_help() -> String {
    let mut lines = Vec::with_capacity(COMMANDS.len());
    for def in COMMANDS {
        if def.hint.is_empty() {
            lines.push(def.pattern.to_string());
        } else {
            lines.push(format!("{:<16}{}", def.pattern, def.hint));
        }
    }
    lines.join("\n")
}

/// Case-insensitive prefix match of a setter argument against a keyword:
/// `OUT` matches `OUTPUT`, `1` matches `1`. Empty arguments never match.
fn keyword_matches(arg: &str, keyword: &str) -> bool {
    !arg.is_empty()
        && arg.len() <= keyword.len()
        && keyword.as_bytes()[..arg.len()].eq_ignore_ascii_case(arg.as_bytes())
}

/// Parses a digital value keyword. `0`/`OFF`/`LO` are low, `1`/`ON`/`HI`
/// are high; `O` alone resolves to the first listed keyword (`OFF`).
pub(crate) fn parse_digital_value(arg: &str) -> Option<bool> {
    const KEYWORDS: [(&str, bool); 6] = [
        ("0", false),
        ("1", true),
        ("OFF", false),
        ("ON", true),
        ("LO", false),
        ("HI", true),
    ];
    for (keyword, level) in KEYWORDS {
        if keyword_matches(arg, keyword) {
            return Some(level);
        }
    }
    None
}

/// Parses a digital mode keyword. The pull-up forms (`INPUT_...`,
/// `PUL...`) are checked before plain `INPUT` so the longer mnemonic is
/// never shadowed by its own prefix.
pub(crate) fn parse_digital_mode(arg: &str) -> Option<DigitalMode> {
    let spells_pullup = arg.len() >= 6 && arg.as_bytes()[..6].eq_ignore_ascii_case(b"INPUT_");
    if spells_pullup || keyword_matches(arg, "PULLUP") {
        Some(DigitalMode::InputWithPullUp)
    } else if keyword_matches(arg, "INPUT") {
        Some(DigitalMode::Input)
    } else if keyword_matches(arg, "OUTPUT") {
        Some(DigitalMode::Output)
    } else {
        None
    }
}

pub(crate) fn parse_analog_mode(arg: &str) -> Option<AnalogMode> {
    if keyword_matches(arg, "INPUT") {
        Some(AnalogMode::Input)
    } else if keyword_matches(arg, "OUTPUT") {
        Some(AnalogMode::Output)
    } else {
        None
    }
}

pub(crate) fn parse_trigger_mode(arg: &str) -> Option<TriggerMode> {
    if keyword_matches(arg, "OFF") {
        Some(TriggerMode::Off)
    } else if keyword_matches(arg, "RISING") {
        Some(TriggerMode::Rising)
    } else if keyword_matches(arg, "FALLING") {
        Some(TriggerMode::Falling)
    } else {
        None
    }
}
