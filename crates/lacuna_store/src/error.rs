//! Error types for store operations.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A segment, slot array or block could not be allocated.
    ///
    /// Fatal for the in-progress call; bytes already committed by the same
    /// call remain in place. Distinct from [`StoreError::Busy`] so callers
    /// can tell exhaustion apart from contention.
    #[error("allocation failed while writing {len} bytes at offset {offset}")]
    AllocationFailed {
        /// Offset of the operation that needed the allocation.
        offset: u64,
        /// Length of the operation that needed the allocation.
        len: usize,
    },

    /// An argument was rejected before any mutation took place.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected argument.
        message: String,
    },

    /// The access guard is held by a concurrent mutator.
    ///
    /// Returned by the `try_` surface when the guard cannot be acquired
    /// immediately, and by bounded waits that were abandoned. Nothing was
    /// mutated; always safe to retry.
    #[error("store busy: access guard held by a concurrent operation")]
    Busy,

    /// A seek resolved to a position outside the representable range.
    #[error("seek out of range: resolved position {position}")]
    SeekOutOfRange {
        /// The out-of-range position the seek resolved to.
        position: i64,
    },
}

impl StoreError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
