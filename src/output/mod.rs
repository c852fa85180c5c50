mod midi;
pub mod recorder;
pub use self::midi::MidirSink;
pub use self::recorder::{MidiEvent, RecordingSink};

use crate::error::MidiError;

/// Destination for the engine's MIDI stream. Fire-and-forget: no acknowledgment.
/// Shared by every voice, ramp and note emission thread.
pub trait MidiSink: Send + Sync {
    fn note_on(&self, channel: u8, note: u8, velocity: u8) -> Result<(), MidiError>;
    fn note_off(&self, channel: u8, note: u8) -> Result<(), MidiError>;
    fn control_change(&self, channel: u8, control: u8, value: u8) -> Result<(), MidiError>;
}

/// Raw status/data bytes for the three messages the engine emits.
pub fn note_on_bytes(channel: u8, note: u8, velocity: u8) -> [u8; 3] {
    [0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
}

pub fn note_off_bytes(channel: u8, note: u8) -> [u8; 3] {
    [0x80 | (channel & 0x0F), note & 0x7F, 0]
}

pub fn control_change_bytes(channel: u8, control: u8, value: u8) -> [u8; 3] {
    [0xB0 | (channel & 0x0F), control & 0x7F, value & 0x7F]
}
