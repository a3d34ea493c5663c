//! Store error types.

use tablekv_common::types::{Key, Value};
use thiserror::Error;

/// Errors returned by store primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A conditional put found a different value than expected.
    #[error("unexpected value for key \"{key}\": found {actual:?}")]
    ConditionFailed {
        /// Key the condition was checked on.
        key: Key,
        /// Value actually present.
        actual: Option<Value>,
    },

    /// An increment targeted a key holding bytes.
    #[error("key \"{0}\" does not hold an integer value")]
    NotAnInteger(Key),

    /// An increment overflowed the integer range.
    #[error("increment of key \"{0}\" overflows")]
    IncrementOverflow(Key),

    /// Key exceeds the configured maximum size.
    #[error("key too large: {size} bytes (max {max})")]
    KeyTooLarge {
        /// Actual size.
        size: usize,
        /// Configured limit.
        max: usize,
    },

    /// Value exceeds the configured maximum size.
    #[error("value too large: {size} bytes (max {max})")]
    ValueTooLarge {
        /// Actual size.
        size: usize,
        /// Configured limit.
        max: usize,
    },

    /// The store could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
