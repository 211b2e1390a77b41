mod error;
mod queue;
pub mod test;

// region:    --- Exports
pub use error::{Error, Result};
pub use queue::{Element, PriorityQueue, PriorityValuePair};
// endregion: --- Exports
