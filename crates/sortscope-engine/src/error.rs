//! Error types for sortscope-engine.

use thiserror::Error;

/// Result type for sortscope-engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving a sort animation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The run is no longer active. Raised by every suspension point once
    /// the run has been stopped or superseded.
    #[error("run interrupted")]
    Interrupted,

    /// A primitive addressed a slot outside the sequence.
    #[error("index {index} out of bounds for sequence of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// The sequence cannot be replaced while a run is active.
    #[error("a run is in progress")]
    Busy,

    /// Requested array size is outside the configured bounds.
    #[error("invalid array size {size}: expected {min}..={max}")]
    InvalidSize { size: usize, min: usize, max: usize },

    /// Requested tempo is outside the configured bounds.
    #[error("invalid tempo {rate}: expected {min}..={max}")]
    InvalidTempo { rate: u32, min: u32, max: u32 },

    /// Algorithm id not recognised.
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),
}

impl Error {
    /// Whether this error is the silent cancellation signal rather than a
    /// real failure.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Error::Interrupted)
    }
}
