pub mod native;
pub use native::{start, Installation};
