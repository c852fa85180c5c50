use crate::state::PlaybackState;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Sampling interval of the population signal (and the debounce window).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Something the conductor can switch on and off and finally wait for.
pub trait Lane {
    fn index(&self) -> usize;
    fn stop(&self);
    fn resume(&self);
    fn join(self)
    where
        Self: Sized;
}

/// Debounce rule: a change is applied only when two readings taken one
/// interval apart agree and differ from what is currently active.
pub fn settle(first: usize, second: usize, current: usize) -> Option<usize> {
    if first == second && second != current {
        Some(second)
    } else {
        None
    }
}

/// Keeps the first `n` lanes playing, where `n` follows the people counter.
pub struct Conductor<L: Lane> {
    lanes: Vec<L>,
    state: Arc<PlaybackState>,
    max_voices: usize,
    poll_interval: Duration,
    active_count: usize,
}

impl<L: Lane> Conductor<L> {
    pub fn new(lanes: Vec<L>, state: Arc<PlaybackState>, max_voices: usize) -> Self {
        let max_voices = max_voices.min(lanes.len());
        Self {
            lanes,
            state,
            max_voices,
            poll_interval: DEFAULT_POLL_INTERVAL,
            active_count: 0,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn lanes(&self) -> &[L] {
        &self.lanes
    }

    fn reading(&self) -> usize {
        self.state.people().min(self.max_voices)
    }

    /// Takes two readings one interval apart and applies a stable change.
    /// Returns the new active count if it changed.
    pub fn poll_once(&mut self) -> Option<usize> {
        let first = self.reading();
        thread::sleep(self.poll_interval);
        let second = self.reading();

        let count = settle(first, second, self.active_count)?;
        self.apply(count);
        Some(count)
    }

    /// Silences every lane at or above `count`, then enables the ones below it.
    pub fn apply(&mut self, count: usize) {
        let count = count.min(self.max_voices);
        log::info!("Active voices {} -> {}", self.active_count, count);
        for lane in self.lanes.iter().skip(count) {
            log::debug!("Stopping voice {}", lane.index());
            lane.stop();
        }
        for lane in self.lanes.iter().take(count) {
            log::debug!("Resuming voice {}", lane.index());
            lane.resume();
        }
        self.active_count = count;
    }

    /// Polls until playback stops, then waits for every lane to finish.
    pub fn run(mut self) {
        while self.state.is_playing() {
            self.poll_once();
        }
        log::info!("Conductor stopping, joining {} voice(s)", self.lanes.len());
        for lane in self.lanes.drain(..) {
            lane.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Switch {
        Stop(usize),
        Resume(usize),
        Join(usize),
    }

    struct FakeLane {
        index: usize,
        log: SwitchLog,
    }

    impl Lane for FakeLane {
        fn index(&self) -> usize {
            self.index
        }
        fn stop(&self) {
            self.log.lock().unwrap().push(Switch::Stop(self.index));
        }
        fn resume(&self) {
            self.log.lock().unwrap().push(Switch::Resume(self.index));
        }
        fn join(self) {
            self.log.lock().unwrap().push(Switch::Join(self.index));
        }
    }

    type SwitchLog = Arc<Mutex<Vec<Switch>>>;

    fn conductor(n: usize, max: usize) -> (Conductor<FakeLane>, SwitchLog, Arc<PlaybackState>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let lanes = (0..n)
            .map(|index| FakeLane {
                index,
                log: log.clone(),
            })
            .collect();
        let state = Arc::new(PlaybackState::new());
        let conductor = Conductor::new(lanes, state.clone(), max)
            .with_poll_interval(Duration::from_millis(5));
        (conductor, log, state)
    }

    #[test]
    fn settle_requires_agreement_and_change() {
        assert_eq!(settle(2, 2, 0), Some(2));
        assert_eq!(settle(2, 3, 0), None);
        assert_eq!(settle(2, 2, 2), None);
        assert_eq!(settle(0, 0, 4), Some(0));
    }

    #[test]
    fn shrinking_stops_losers_before_resuming_survivors() {
        let (mut conductor, log, _) = conductor(5, 5);
        conductor.apply(5);
        log.lock().unwrap().clear();

        conductor.apply(2);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                Switch::Stop(2),
                Switch::Stop(3),
                Switch::Stop(4),
                Switch::Resume(0),
                Switch::Resume(1),
            ]
        );
        assert_eq!(conductor.active_count(), 2);
    }

    #[test]
    fn population_is_clamped_to_max_voices() {
        let (mut conductor, log, state) = conductor(4, 3);
        state.set_people(10);
        assert_eq!(conductor.poll_once(), Some(3));
        let resumed: Vec<_> = log
            .lock()
            .unwrap()
            .iter()
            .filter_map(|s| match s {
                Switch::Resume(i) => Some(*i),
                _ => None,
            })
            .collect();
        assert_eq!(resumed, vec![0, 1, 2]);
    }

    #[test]
    fn stable_reading_is_applied_and_repeat_is_ignored() {
        let (mut conductor, _, state) = conductor(3, 3);
        state.set_people(2);
        assert_eq!(conductor.poll_once(), Some(2));
        assert_eq!(conductor.poll_once(), None);
        assert_eq!(conductor.active_count(), 2);
    }

    #[test]
    fn run_joins_every_lane_after_shutdown() {
        let (conductor, log, state) = conductor(3, 3);
        state.shutdown();
        conductor.run();
        let joins: Vec<_> = log
            .lock()
            .unwrap()
            .iter()
            .copied()
            .filter(|s| matches!(s, Switch::Join(_)))
            .collect();
        assert_eq!(joins, vec![Switch::Join(0), Switch::Join(1), Switch::Join(2)]);
    }
}
