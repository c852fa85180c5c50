pub mod conductor;
pub mod image_model;
pub mod player;
pub mod prelude;
pub mod ramp;
pub mod scale;
pub mod voice;
pub mod voice_config;

pub use conductor::{Conductor, Lane};
pub use image_model::{VoiceImageModel, MAX_VELOCITY};
pub use player::NotePlayer;
pub use ramp::{ControlRamp, RampDirection};
pub use scale::Scale;
pub use voice::{PlannedNote, Voice, VoiceHandle};
pub use voice_config::{RampSettings, VoiceSettings};
