use crate::engine::ramp::RampDirection;
use crate::engine::scale::Scale;
use crate::engine::voice_config::{RampSettings, VoiceSettings};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Installation file as written by hand (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallationConfig {
    pub image: PathBuf,
    #[serde(default)]
    pub midi_port: Option<String>,
    #[serde(default)]
    pub max_channels: Option<usize>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
    #[serde(default)]
    pub seed: Option<u64>,
    pub voices: Vec<VoiceEntry>,
}

/// One voice as it appears in the file. Channels are 1-indexed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceEntry {
    pub channel: u8,
    pub scale: String,
    #[serde(default)]
    pub intervals: Option<String>,
    pub root: i32,
    pub octaves: usize,
    #[serde(default = "default_duration")]
    pub duration: f64,
    #[serde(default)]
    pub separation: Option<f64>,
    #[serde(default)]
    pub uncompressed: bool,
    #[serde(default)]
    pub ramp: RampEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RampEntry {
    #[serde(default = "default_direction")]
    pub direction: String,
    #[serde(default)]
    pub min: u8,
    #[serde(default = "default_max")]
    pub max: u8,
    #[serde(default = "default_cc")]
    pub cc: u8,
    #[serde(default)]
    pub start: u8,
    #[serde(default = "default_step")]
    pub step: u8,
    #[serde(default = "default_speed")]
    pub speed: f64,
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_flush_interval_ms() -> u64 {
    500
}

fn default_duration() -> f64 {
    2000.0
}

fn default_direction() -> String {
    "left to right".to_string()
}

fn default_max() -> u8 {
    127
}

fn default_cc() -> u8 {
    1
}

fn default_step() -> u8 {
    1
}

fn default_speed() -> f64 {
    5.0
}

impl Default for RampEntry {
    fn default() -> Self {
        Self {
            direction: default_direction(),
            min: 0,
            max: default_max(),
            cc: default_cc(),
            start: 0,
            step: default_step(),
            speed: default_speed(),
        }
    }
}

impl InstallationConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Number of voices the conductor may enable at once.
    pub fn max_channels(&self) -> Result<usize, ConfigError> {
        match self.max_channels {
            Some(requested) if requested > self.voices.len() => Err(ConfigError::TooManyChannels {
                requested,
                available: self.voices.len(),
            }),
            Some(requested) => Ok(requested),
            None => Ok(self.voices.len()),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    /// Validates every voice and converts it to engine settings.
    pub fn resolve(&self) -> Result<Vec<VoiceSettings>, ConfigError> {
        self.max_channels()?;
        self.voices
            .iter()
            .enumerate()
            .map(|(index, entry)| entry.resolve(index))
            .collect()
    }
}

impl VoiceEntry {
    pub fn resolve(&self, index: usize) -> Result<VoiceSettings, ConfigError> {
        if !(1..=16).contains(&self.channel) {
            return Err(ConfigError::InvalidChannel {
                voice: index,
                channel: self.channel,
            });
        }
        let scale = Scale::resolve(&self.scale, self.intervals.as_deref())?;
        let settings = VoiceSettings {
            channel: self.channel - 1,
            scale,
            root: self.root,
            octaves: self.octaves,
            note_length_ms: self.duration,
            // zero separation means "not polyphonic"
            separation_ms: self.separation.filter(|s| *s != 0.0),
            uncompressed: self.uncompressed,
            ramp: RampSettings {
                direction: RampDirection::parse(&self.ramp.direction)?,
                low: self.ramp.min,
                high: self.ramp.max,
                control: self.ramp.cc,
                start: self.ramp.start,
                step: self.ramp.step,
                speed: self.ramp.speed,
            },
        };
        settings.validate(index)?;
        Ok(settings)
    }
}
