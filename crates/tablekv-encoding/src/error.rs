//! Encoding error types.

use tablekv_common::types::Kind;
use thiserror::Error;

/// Errors produced while encoding or decoding keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// The value cannot be part of a key.
    #[error("unable to encode key: {kind} value {value}")]
    UnsupportedKey {
        /// Kind of the offending field.
        kind: Kind,
        /// Rendering of the offending value.
        value: String,
    },

    /// The kind has no key decoding.
    #[error("unable to decode key: unsupported kind {0}")]
    UnsupportedDecode(Kind),

    /// The input ended before the value did.
    #[error("insufficient bytes to decode {0}")]
    Truncated(&'static str),

    /// The leading byte is not a valid marker for the expected encoding.
    #[error("invalid {what} marker byte 0x{byte:02x}")]
    InvalidMarker {
        /// Encoding being decoded.
        what: &'static str,
        /// Offending byte.
        byte: u8,
    },

    /// A decoded unsigned integer does not fit the signed range.
    #[error("varint {0} overflows i64")]
    Overflow(u64),

    /// Decoded text is not valid UTF-8.
    #[error("invalid utf-8 in encoded text")]
    InvalidUtf8,
}

/// Result type for encoding operations.
pub type EncodingResult<T> = Result<T, EncodingError>;
