use std::error::Error;
use std::fmt;

/// Problems found while resolving the installation configuration.
/// All of them are fatal: a voice that fails to resolve is never started.
#[derive(Debug)]
pub enum ConfigError {
    UnknownScale(String),
    InvalidIntervals(String),
    EmptyNoteSet { voice: usize },
    PitchOutOfRange { voice: usize, pitch: i64 },
    TooManyOctaves { voice: usize, octaves: usize },
    InvalidTiming {
        voice: usize,
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    InvalidChannel { voice: usize, channel: u8 },
    InvalidRampBounds { voice: usize, low: u8, high: u8 },
    UnknownDirection(String),
    TooManyChannels { requested: usize, available: usize },
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownScale(name) => {
                write!(f, "unknown scale '{}' (use a mode name or CUSTOM)", name)
            }
            ConfigError::InvalidIntervals(raw) => {
                write!(f, "invalid custom intervals '{}'", raw)
            }
            ConfigError::EmptyNoteSet { voice } => {
                write!(f, "voice {} has an empty note set", voice)
            }
            ConfigError::PitchOutOfRange { voice, pitch } => {
                write!(f, "voice {} produces pitch {} outside 0..=127", voice, pitch)
            }
            ConfigError::TooManyOctaves { voice, octaves } => write!(
                f,
                "voice {} spans {} octaves, more than the MIDI range holds",
                voice, octaves
            ),
            ConfigError::InvalidTiming {
                voice,
                field,
                value,
                min,
                max,
            } => write!(
                f,
                "voice {} {} is {} (expected {}..={})",
                voice, field, value, min, max
            ),
            ConfigError::InvalidChannel { voice, channel } => {
                write!(f, "voice {} uses channel {} (expected 1..=16)", voice, channel)
            }
            ConfigError::InvalidRampBounds { voice, low, high } => write!(
                f,
                "voice {} ramp bounds are inverted (min {} > max {})",
                voice, low, high
            ),
            ConfigError::UnknownDirection(direction) => {
                write!(f, "unknown ramp direction '{}'", direction)
            }
            ConfigError::TooManyChannels {
                requested,
                available,
            } => write!(
                f,
                "max_channels is {} but only {} voices are configured",
                requested, available
            ),
            ConfigError::Io(e) => write!(f, "cannot read configuration: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse configuration: {}", e),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Failures talking to the MIDI output.
#[derive(Debug)]
pub enum MidiError {
    Init(String),
    NoPorts,
    InvalidSelection(String),
    Connect(String),
    Send(String),
}

impl fmt::Display for MidiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiError::Init(e) => write!(f, "failed to initialize MIDI output: {}", e),
            MidiError::NoPorts => write!(f, "no MIDI output ports found"),
            MidiError::InvalidSelection(s) => write!(f, "invalid MIDI port selection '{}'", s),
            MidiError::Connect(e) => write!(f, "failed to connect MIDI output: {}", e),
            MidiError::Send(e) => write!(f, "failed to send MIDI message: {}", e),
        }
    }
}

impl Error for MidiError {}
