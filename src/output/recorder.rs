use super::MidiSink;
use crate::error::MidiError;
use std::sync::Mutex;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    ControlChange { channel: u8, control: u8, value: u8 },
}

/// In-memory sink that timestamps every message. Used for dry runs and tests.
pub struct RecordingSink {
    started: Instant,
    events: Mutex<Vec<(f64, MidiEvent)>>, // (seconds since creation, event)
    fail_sends: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects every message, for exercising error paths.
    pub fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    fn record(&self, event: MidiEvent) -> Result<(), MidiError> {
        if self.fail_sends {
            return Err(MidiError::Send("recording sink set to fail".into()));
        }
        let at = self.started.elapsed().as_secs_f64();
        if let Ok(mut events) = self.events.lock() {
            events.push((at, event));
        }
        Ok(())
    }

    pub fn timed_events(&self) -> Vec<(f64, MidiEvent)> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn events(&self) -> Vec<MidiEvent> {
        self.timed_events().into_iter().map(|(_, e)| e).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self {
            started: Instant::now(),
            events: Mutex::new(Vec::new()),
            fail_sends: false,
        }
    }
}

impl MidiSink for RecordingSink {
    fn note_on(&self, channel: u8, note: u8, velocity: u8) -> Result<(), MidiError> {
        self.record(MidiEvent::NoteOn {
            channel,
            note,
            velocity,
        })
    }

    fn note_off(&self, channel: u8, note: u8) -> Result<(), MidiError> {
        self.record(MidiEvent::NoteOff { channel, note })
    }

    fn control_change(&self, channel: u8, control: u8, value: u8) -> Result<(), MidiError> {
        self.record(MidiEvent::ControlChange {
            channel,
            control,
            value,
        })
    }
}
