pub mod people;
pub use self::people::{FeedCommand, PeopleFeed};
