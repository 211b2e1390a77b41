//! Error conditions reported by priority queue operations.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A caller supplied argument can never be satisfied, e.g. a negative initial capacity or a
    /// destination buffer that is too small.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A priority or value was requested from a queue without elements.
    #[error("the queue is empty")]
    EmptyCollection,

    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),

    #[error("index {index} is out of range for {count} elements")]
    IndexOutOfRange { index: usize, count: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
