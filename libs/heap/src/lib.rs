//! A thread-safe priority queue backed by a binary min-heap in a growable array.

mod heap;
mod test;

// region:    --- Exports
pub use heap::{ConcurrentBinaryMinHeap, DEFAULT_CAPACITY, Snapshot};
// endregion: --- Exports
