use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Process-wide playback signal shared by every voice, ramp and the conductor.
///
/// `keep_playing` is the cooperative cancellation flag: every loop checks it at
/// the top of each iteration. `people` is written by the sensor feed and only
/// read by the engine.
#[derive(Debug)]
pub struct PlaybackState {
    keep_playing: AtomicBool,
    people: AtomicUsize,
}

impl PlaybackState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.keep_playing.load(Ordering::Acquire)
    }

    /// Asks every thread to finish its current blocking call and exit.
    pub fn shutdown(&self) {
        if self.keep_playing.swap(false, Ordering::AcqRel) {
            log::info!("Shutdown requested");
        }
    }

    pub fn people(&self) -> usize {
        self.people.load(Ordering::Acquire)
    }

    pub fn set_people(&self, count: usize) {
        let previous = self.people.swap(count, Ordering::AcqRel);
        if previous != count {
            log::debug!("People counter {} -> {}", previous, count);
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            keep_playing: AtomicBool::new(true),
            people: AtomicUsize::new(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_playing_with_nobody_present() {
        let state = PlaybackState::new();
        assert!(state.is_playing());
        assert_eq!(state.people(), 0);
    }

    #[test]
    fn shutdown_is_sticky() {
        let state = PlaybackState::new();
        state.set_people(3);
        state.shutdown();
        state.shutdown();
        assert!(!state.is_playing());
        assert_eq!(state.people(), 3);
    }
}
