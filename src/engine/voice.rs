use super::conductor::Lane;
use super::image_model::VoiceImageModel;
use super::player::{NotePlayer, DEFAULT_CAPACITY};
use super::prelude::{jittered_ms, ms_to_duration};
use super::ramp::ControlRamp;
use super::voice_config::VoiceSettings;
use crate::error::ConfigError;
use crate::luminance::LuminanceGrid;
use crate::output::MidiSink;
use crate::state::PlaybackState;
use rand::rngs::SmallRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How long an inactive voice waits between two all-notes-off sweeps.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(500);

/// Notes covered by the inactive flush (0..=126).
const FLUSH_NOTES: u8 = 127;

/// One step of the playback loop, computed before anything is sent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedNote {
    pub pitch: u8,
    pub velocity: u8,
    pub sampled_velocity: u8,
    pub duration: Duration,
    pub separation: Duration,
}

/// An independent note-generating lane bound to one MIDI channel.
///
/// Starts inactive. While active it keeps sampling the image model and
/// handing notes to its `NotePlayer`; while inactive it periodically sends
/// note-offs on its channel so nothing is left hanging.
pub struct Voice {
    index: usize,
    settings: VoiceSettings,
    notes: Vec<u8>,
    model: VoiceImageModel,
    ramp: ControlRamp,
    rng: SmallRng,
    active: Arc<AtomicBool>,
    elapsed_ms: f64, // accumulated separation delays
    flush_interval: Duration,
}

impl Voice {
    pub fn new(
        index: usize,
        settings: VoiceSettings,
        image: &LuminanceGrid,
        rng: SmallRng,
    ) -> Result<Self, ConfigError> {
        settings.validate(index)?;
        let notes = settings.note_set(index)?;
        let model = VoiceImageModel::new(image, notes.len())
            .ok_or(ConfigError::EmptyNoteSet { voice: index })?;
        let ramp = ControlRamp::new(&settings.ramp, settings.channel);

        log::info!(
            "Voice {} ready: channel {}, {} {} note(s) from {}, {}",
            index,
            settings.channel + 1,
            notes.len(),
            settings.scale.name(),
            notes[0],
            if settings.is_polyphonic() {
                "polyphonic"
            } else {
                "monophonic"
            }
        );

        Ok(Self {
            index,
            settings,
            notes,
            model,
            ramp,
            rng,
            active: Arc::new(AtomicBool::new(false)),
            elapsed_ms: 0.0,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        })
    }

    pub fn with_flush_interval(mut self, flush_interval: Duration) -> Self {
        self.flush_interval = flush_interval;
        self
    }

    pub fn notes(&self) -> &[u8] {
        &self.notes
    }

    pub fn model(&self) -> &VoiceImageModel {
        &self.model
    }

    pub fn settings(&self) -> &VoiceSettings {
        &self.settings
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Samples the next note and the pause that follows it.
    /// Monophonic voices never pause; their player only holds one note.
    pub fn next_note(&mut self) -> PlannedNote {
        let (note_index, sampled_velocity) = self.model.sample(&mut self.rng);
        let pitch = self.notes[note_index];
        let velocity = self.settings.velocity_for(sampled_velocity);
        let duration = ms_to_duration(jittered_ms(&mut self.rng, self.settings.note_length_ms));

        let separation_ms = match self.settings.separation_ms {
            Some(separation) => jittered_ms(&mut self.rng, separation),
            None => 0.0,
        };
        self.elapsed_ms += separation_ms;

        PlannedNote {
            pitch,
            velocity,
            sampled_velocity,
            duration,
            separation: ms_to_duration(separation_ms),
        }
    }

    /// Moves the voice onto its own thread. The ramp starts with it.
    pub fn spawn(self, sink: Arc<dyn MidiSink>, state: Arc<PlaybackState>) -> VoiceHandle {
        let index = self.index;
        let active = self.active.clone();
        let thread = thread::spawn(move || self.run(sink, state));
        VoiceHandle {
            index,
            active,
            thread,
        }
    }

    fn run(mut self, sink: Arc<dyn MidiSink>, state: Arc<PlaybackState>) {
        let ramp = self.ramp.clone().spawn(sink.clone(), state.clone());
        let capacity = if self.settings.is_polyphonic() {
            DEFAULT_CAPACITY
        } else {
            1
        };
        let mut player = NotePlayer::new(sink.clone(), self.settings.channel, capacity);
        let mut was_active = false;

        while state.is_playing() {
            if self.is_active() {
                if !was_active {
                    log::info!("Voice {} playing", self.index);
                    was_active = true;
                }
                let note = self.next_note();
                log::trace!("Voice {} -> {:?}", self.index, note);
                player.emit(note.pitch, note.duration, note.velocity);
                if !note.separation.is_zero() {
                    thread::sleep(note.separation);
                }
            } else {
                if was_active {
                    log::info!("Voice {} silenced", self.index);
                    was_active = false;
                }
                self.flush(sink.as_ref());
                thread::sleep(self.flush_interval);
            }
        }

        player.join_all();
        if ramp.join().is_err() {
            log::error!("Ramp thread of voice {} panicked", self.index);
        }
        log::debug!(
            "Voice {} finished ({:.1}s of separations)",
            self.index,
            self.elapsed_ms / 1000.0
        );
    }

    fn flush(&self, sink: &dyn MidiSink) {
        let channel = self.settings.channel;
        let failures = (0..FLUSH_NOTES)
            .filter(|&note| sink.note_off(channel, note).is_err())
            .count();
        if failures > 0 {
            log::warn!(
                "Voice {}: {} note-off(s) failed during flush",
                self.index,
                failures
            );
        }
    }
}

/// Control side of a spawned voice.
pub struct VoiceHandle {
    index: usize,
    active: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl VoiceHandle {
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn resume(&self) {
        self.active.store(true, Ordering::Release);
    }

    pub fn stop(&self) {
        self.active.store(false, Ordering::Release);
    }
}

impl Lane for VoiceHandle {
    fn index(&self) -> usize {
        self.index
    }

    fn stop(&self) {
        VoiceHandle::stop(self);
    }

    fn resume(&self) {
        VoiceHandle::resume(self);
    }

    fn join(self) {
        if self.thread.join().is_err() {
            log::error!("Voice {} thread panicked", self.index);
        }
    }
}
