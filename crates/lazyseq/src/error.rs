use thiserror::Error;

/// Errors raised by sequence operations.
///
/// Every variant other than [`SeqError::Backend`] and [`SeqError::Worker`] is a
/// contract violation by the caller: the operation is aborted and nothing is
/// retried or substituted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeqError {
    /// A range request with `start > end`
    #[error("invalid range [{start}, {end})")]
    InvalidRange { start: usize, end: usize },

    /// A range request reaching past the available steps
    #[error("range end {end} out of bounds for sequence of length {len}")]
    RangeOutOfBounds { end: usize, len: usize },

    /// The upstream gradient stream closed before every step received a gradient
    #[error("not enough upstream batches: expected {expected}, got {actual}")]
    TooFewUpstream { expected: usize, actual: usize },

    /// The upstream gradient stream kept going after every step received a gradient
    #[error("too many upstream batches: expected {expected}")]
    TooManyUpstream { expected: usize },

    /// A packed upstream stream disagreed with the number of steps the pack produced
    #[error("upstream delivered {actual} batches for a pack of {expected} steps")]
    UpstreamLength { expected: usize, actual: usize },

    /// Lane counts handed to a split do not cover the batch
    #[error("lane counts sum to {expected} but batch has {actual} lanes")]
    LaneMismatch { expected: usize, actual: usize },

    /// A pack was queried before its forward pass completed
    #[error("pack forward pass has not completed")]
    NotFinalized,

    /// A sequence's forward stream was already read
    #[error("sequence forward stream was already consumed")]
    AlreadyConsumed,

    /// The numeric backend failed
    #[error("backend error: {0}")]
    Backend(String),

    /// A propagation worker failed or panicked
    #[error("propagation worker failed: {0}")]
    Worker(String),
}

impl SeqError {
    /// Create a new backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a new worker error
    pub fn worker(msg: impl Into<String>) -> Self {
        Self::Worker(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SeqError>;
