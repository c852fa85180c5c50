pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod luminance;
pub mod output;
pub mod runtime;
pub mod state;

pub use config::InstallationConfig;
pub use error::{ConfigError, MidiError};
pub use luminance::LuminanceGrid;
pub use state::PlaybackState;
