use crate::output::MidiSink;
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// In-flight emissions allowed per polyphonic voice before the oldest is awaited.
pub const DEFAULT_CAPACITY: usize = 64;

/// Emits timed note-on/note-off pairs on one channel, each on its own thread.
///
/// Handles are kept in a bounded queue so shutdown can wait for every pending
/// note-off. Finished emissions are reaped on each `emit`.
pub struct NotePlayer {
    sink: Arc<dyn MidiSink>,
    channel: u8,
    capacity: usize,
    in_flight: VecDeque<JoinHandle<()>>,
}

impl NotePlayer {
    pub fn new(sink: Arc<dyn MidiSink>, channel: u8, capacity: usize) -> Self {
        Self {
            sink,
            channel,
            capacity: capacity.max(1),
            in_flight: VecDeque::new(),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Starts a note and returns immediately. Only blocks when the set is full,
    /// in which case the oldest emission is joined first.
    pub fn emit(&mut self, pitch: u8, duration: Duration, velocity: u8) {
        self.reap();
        while self.in_flight.len() >= self.capacity {
            if let Some(oldest) = self.in_flight.pop_front() {
                Self::join_one(oldest);
            }
        }

        let sink = self.sink.clone();
        let channel = self.channel;
        self.in_flight.push_back(thread::spawn(move || {
            send_note(sink.as_ref(), channel, pitch, duration, velocity);
        }));
    }

    /// Waits for every outstanding emission.
    pub fn join_all(&mut self) {
        while let Some(handle) = self.in_flight.pop_front() {
            Self::join_one(handle);
        }
    }

    fn reap(&mut self) {
        self.in_flight.retain(|handle| !handle.is_finished());
    }

    fn join_one(handle: JoinHandle<()>) {
        if handle.join().is_err() {
            log::error!("Note emission thread panicked");
        }
    }
}

impl Drop for NotePlayer {
    fn drop(&mut self) {
        self.join_all();
    }
}

/// Note-on, hold, note-off. Send failures are logged and never escape.
pub fn send_note(sink: &dyn MidiSink, channel: u8, pitch: u8, duration: Duration, velocity: u8) {
    if let Err(e) = sink.note_on(channel, pitch, velocity) {
        log::warn!("Note on {} (channel {}): {}", pitch, channel + 1, e);
    }
    thread::sleep(duration);
    if let Err(e) = sink.note_off(channel, pitch) {
        log::warn!("Note off {} (channel {}): {}", pitch, channel + 1, e);
    }
}
