use super::voice_config::RampSettings;
use crate::error::ConfigError;
use crate::output::MidiSink;
use crate::state::PlaybackState;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How a ramp moves through `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampDirection {
    /// Rises, then jumps back to `low`.
    LeftToRight,
    /// Falls, then jumps back to `high`.
    RightToLeft,
    /// Rises first and bounces at both bounds.
    LeftToRightToLeft,
    /// Falls first and bounces at both bounds.
    RightToLeftToRight,
}

impl RampDirection {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let normalized = raw
            .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
            .filter(|w| !w.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        match normalized.as_str() {
            "left to right" => Ok(RampDirection::LeftToRight),
            "right to left" => Ok(RampDirection::RightToLeft),
            "left to right to left" => Ok(RampDirection::LeftToRightToLeft),
            "right to left to right" => Ok(RampDirection::RightToLeftToRight),
            _ => Err(ConfigError::UnknownDirection(raw.to_string())),
        }
    }

    fn starts_rising(self) -> bool {
        matches!(
            self,
            RampDirection::LeftToRight | RampDirection::LeftToRightToLeft
        )
    }
}

/// Continuous controller sweep bound to one channel/control number.
#[derive(Debug, Clone)]
pub struct ControlRamp {
    value: i32,
    low: i32,
    high: i32,
    step: i32,
    speed: f64,
    direction: RampDirection,
    rising: bool,
    channel: u8,
    control: u8,
}

impl ControlRamp {
    pub fn new(settings: &RampSettings, channel: u8) -> Self {
        let low = settings.low as i32;
        let high = (settings.high as i32).max(low);
        Self {
            value: (settings.start as i32).clamp(low, high),
            low,
            high,
            step: settings.step.max(1) as i32,
            speed: settings.speed,
            direction: settings.direction,
            rising: settings.direction.starts_rising(),
            channel,
            control: settings.control,
        }
    }

    pub fn value(&self) -> u8 {
        self.value.clamp(0, 127) as u8
    }

    /// Time between two control messages.
    pub fn tick(&self) -> Duration {
        if self.speed > 0.0 && self.speed.is_finite() {
            Duration::try_from_secs_f64(1.0 / self.speed).unwrap_or(Duration::MAX)
        } else {
            Duration::from_secs(1)
        }
    }

    /// Moves one step and returns the new value.
    pub fn advance(&mut self) -> u8 {
        let next = if self.rising {
            self.value + self.step
        } else {
            self.value - self.step
        };

        self.value = match self.direction {
            RampDirection::LeftToRight if next > self.high => self.low,
            RampDirection::RightToLeft if next < self.low => self.high,
            RampDirection::LeftToRightToLeft | RampDirection::RightToLeftToRight => {
                if next > self.high {
                    self.rising = false;
                    (2 * self.high - next).max(self.low)
                } else if next < self.low {
                    self.rising = true;
                    (2 * self.low - next).min(self.high)
                } else {
                    next
                }
            }
            _ => next,
        };
        self.value()
    }

    /// Runs the sweep on its own thread until playback stops.
    pub fn spawn(mut self, sink: Arc<dyn MidiSink>, state: Arc<PlaybackState>) -> JoinHandle<()> {
        thread::spawn(move || {
            log::debug!(
                "Ramp started on channel {} cc {}",
                self.channel + 1,
                self.control
            );
            while state.is_playing() {
                if let Err(e) = sink.control_change(self.channel, self.control, self.value()) {
                    log::warn!("Ramp on channel {}: {}", self.channel + 1, e);
                }
                self.advance();
                thread::sleep(self.tick());
            }
        })
    }
}
