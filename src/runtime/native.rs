use crate::config::InstallationConfig;
use crate::engine::prelude::voice_rng;
use crate::engine::{Conductor, Voice, VoiceSettings};
use crate::error::ConfigError;
use crate::input::PeopleFeed;
use crate::luminance::{self, LuminanceGrid};
use crate::output::{MidiSink, MidirSink};
use crate::state::PlaybackState;
use anyhow::Context as _;
use std::io::{stdin, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Every configured voice, built and ready to be spawned.
pub struct Installation {
    voices: Vec<Voice>,
    max_channels: usize,
    poll_interval: Duration,
}

impl Installation {
    pub fn new(config: &InstallationConfig, image: &LuminanceGrid) -> Result<Self, ConfigError> {
        let settings = config.resolve()?;
        let installation = Self::from_settings(settings, image, config.seed)?
            .with_max_channels(config.max_channels()?)
            .with_poll_interval(config.poll_interval());
        let flush_interval = config.flush_interval();
        Ok(installation.map_voices(|voice| voice.with_flush_interval(flush_interval)))
    }

    /// Builds one voice per settings entry. Fails on the first bad voice.
    pub fn from_settings(
        settings: Vec<VoiceSettings>,
        image: &LuminanceGrid,
        seed: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let voices = settings
            .into_iter()
            .enumerate()
            .map(|(index, settings)| Voice::new(index, settings, image, voice_rng(seed, index)))
            .collect::<Result<Vec<_>, _>>()?;
        let max_channels = voices.len();
        Ok(Self {
            voices,
            max_channels,
            poll_interval: crate::engine::conductor::DEFAULT_POLL_INTERVAL,
        })
    }

    pub fn with_max_channels(mut self, max_channels: usize) -> Self {
        self.max_channels = max_channels.min(self.voices.len());
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn map_voices(mut self, f: impl Fn(Voice) -> Voice) -> Self {
        self.voices = self.voices.into_iter().map(f).collect();
        self
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Spawns every voice and conducts them on the calling thread until
    /// `state` stops playing. Returns once all voices have been joined.
    pub fn run(self, sink: Arc<dyn MidiSink>, state: Arc<PlaybackState>) {
        log::info!(
            "Starting {} voice(s), at most {} active",
            self.voices.len(),
            self.max_channels
        );
        let handles: Vec<_> = self
            .voices
            .into_iter()
            .map(|voice| voice.spawn(sink.clone(), state.clone()))
            .collect();
        Conductor::new(handles, state, self.max_channels)
            .with_poll_interval(self.poll_interval)
            .run();
        log::info!("All voices stopped");
    }
}

/// Loads the configuration and image, opens the MIDI port and plays until
/// the people feed on stdin says `q` or closes.
pub fn start(config_path: impl AsRef<Path>) -> anyhow::Result<()> {
    let config_path = config_path.as_ref();
    let config = InstallationConfig::from_path(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    // relative image paths are resolved against the config file
    let image_path = match config_path.parent() {
        Some(dir) if config.image.is_relative() => dir.join(&config.image),
        _ => config.image.clone(),
    };
    let image = luminance::load(&image_path)
        .with_context(|| format!("loading image {}", image_path.display()))?;

    let installation = Installation::new(&config, &image).context("building voices")?;

    let port = MidirSink::open(config.midi_port.as_deref()).context("opening MIDI output")?;
    log::info!("Playing {} on {}", image_path.display(), port.port_name());
    let sink: Arc<dyn MidiSink> = Arc::new(port);

    let state = Arc::new(PlaybackState::new());
    println!("Type the number of people present, or q to quit.");
    let feed = PeopleFeed::new(BufReader::new(stdin()), state.clone()).spawn();

    installation.run(sink, state);

    if feed.join().is_err() {
        log::error!("People feed thread panicked");
    }
    Ok(())
}
