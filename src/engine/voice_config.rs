use super::ramp::RampDirection;
use super::scale::Scale;
use crate::error::ConfigError;

/// Velocity used for every note of a compressed voice.
pub const FULL_VELOCITY: u8 = 127;

/// More octaves than this cannot all fit in 0..=127.
pub const MAX_OCTAVES: usize = 11;

/// Shortest accepted mean note length. Monophonic voices restart as soon as
/// a note ends, so this also caps their note rate.
pub const MIN_NOTE_LENGTH_MS: f64 = 5.0;

/// Upper bound for note lengths and separations (one hour).
pub const MAX_TIMING_MS: f64 = 3_600_000.0;

/// Accepted ramp speeds, in ticks per second.
pub const RAMP_SPEED_RANGE: (f64, f64) = (0.01, 1000.0);

/// Fully resolved parameters for one voice.
/// Produced by `InstallationConfig::resolve`, or built directly in tests.
#[derive(Debug, Clone)]
pub struct VoiceSettings {
    pub channel: u8, // 0-based MIDI channel
    pub scale: Scale,
    pub root: i32,
    pub octaves: usize,
    pub note_length_ms: f64,
    pub separation_ms: Option<f64>, // Some(_) makes the voice polyphonic
    pub uncompressed: bool,
    pub ramp: RampSettings,
}

/// Control-change sweep attached to a voice.
#[derive(Debug, Clone)]
pub struct RampSettings {
    pub direction: RampDirection,
    pub low: u8,
    pub high: u8,
    pub control: u8,
    pub start: u8,
    pub step: u8,
    pub speed: f64, // ticks per second
}

impl VoiceSettings {
    pub fn is_polyphonic(&self) -> bool {
        self.separation_ms.is_some()
    }

    /// Velocity actually sent for a sampled grid row.
    pub fn velocity_for(&self, sampled: u8) -> u8 {
        if self.uncompressed {
            sampled.min(FULL_VELOCITY)
        } else {
            FULL_VELOCITY
        }
    }

    /// The voice's playable pitches, checked against the MIDI range.
    pub fn note_set(&self, voice: usize) -> Result<Vec<u8>, ConfigError> {
        if self.octaves > MAX_OCTAVES {
            return Err(ConfigError::TooManyOctaves {
                voice,
                octaves: self.octaves,
            });
        }
        let pitches = self.scale.note_set(self.root, self.octaves);
        if pitches.is_empty() {
            return Err(ConfigError::EmptyNoteSet { voice });
        }
        pitches
            .into_iter()
            .map(|pitch| {
                u8::try_from(pitch)
                    .ok()
                    .filter(|p| *p <= 127)
                    .ok_or(ConfigError::PitchOutOfRange { voice, pitch })
            })
            .collect()
    }

    pub fn validate(&self, voice: usize) -> Result<(), ConfigError> {
        if self.channel > 15 {
            return Err(ConfigError::InvalidChannel {
                voice,
                channel: self.channel.saturating_add(1),
            });
        }
        if self.ramp.low > self.ramp.high {
            return Err(ConfigError::InvalidRampBounds {
                voice,
                low: self.ramp.low,
                high: self.ramp.high,
            });
        }
        check_range(
            voice,
            "duration",
            self.note_length_ms,
            MIN_NOTE_LENGTH_MS,
            MAX_TIMING_MS,
        )?;
        if let Some(separation) = self.separation_ms {
            check_range(voice, "separation", separation, 0.0, MAX_TIMING_MS)?;
        }
        let (slowest, fastest) = RAMP_SPEED_RANGE;
        check_range(voice, "ramp speed", self.ramp.speed, slowest, fastest)?;
        self.note_set(voice).map(|_| ())
    }
}

// NaN fails the range test too.
fn check_range(
    voice: usize,
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidTiming {
            voice,
            field,
            value,
            min,
            max,
        })
    }
}

impl Default for RampSettings {
    fn default() -> Self {
        Self {
            direction: RampDirection::LeftToRight,
            low: 0,
            high: 127,
            control: 1,
            start: 0,
            step: 1,
            speed: 5.0,
        }
    }
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            channel: 0,
            scale: Scale::Major,
            root: 60,
            octaves: 1,
            note_length_ms: 2000.0,
            separation_ms: None,
            uncompressed: false,
            ramp: RampSettings::default(),
        }
    }
}
