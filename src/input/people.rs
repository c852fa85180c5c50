use crate::state::PlaybackState;
use std::io::BufRead;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// One line of the sensor feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedCommand {
    People(usize),
    Quit,
    Ignored,
}

pub fn parse_line(line: &str) -> FeedCommand {
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
        return FeedCommand::Quit;
    }
    match line.parse::<usize>() {
        Ok(count) => FeedCommand::People(count),
        Err(_) => FeedCommand::Ignored,
    }
}

/// Line-oriented people counter: each integer line replaces the current
/// count, `q` or end of input shuts the installation down.
pub struct PeopleFeed<R: BufRead> {
    reader: R,
    state: Arc<PlaybackState>,
}

impl<R: BufRead> PeopleFeed<R> {
    pub fn new(reader: R, state: Arc<PlaybackState>) -> Self {
        Self { reader, state }
    }

    pub fn run(mut self) {
        let mut line = String::new();
        while self.state.is_playing() {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => {
                    log::info!("People feed closed");
                    break;
                }
                Ok(_) => match parse_line(&line) {
                    FeedCommand::People(count) => self.state.set_people(count),
                    FeedCommand::Quit => break,
                    FeedCommand::Ignored => {
                        log::warn!("Ignoring people feed line {:?}", line.trim())
                    }
                },
                Err(e) => {
                    log::error!("People feed read failed: {}", e);
                    break;
                }
            }
        }
        self.state.shutdown();
    }
}

impl<R: BufRead + Send + 'static> PeopleFeed<R> {
    pub fn spawn(self) -> JoinHandle<()> {
        thread::spawn(move || self.run())
    }
}
