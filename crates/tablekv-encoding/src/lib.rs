//! # tablekv-encoding
//!
//! Order-preserving encodings for table keys.
//!
//! Every encoding in this crate has two properties the key layout relies on:
//!
//! 1. **Byte-comparable**: for two values of the same kind,
//!    `a < b` if and only if `encode(a) < encode(b)` lexicographically.
//! 2. **Self-delimiting**: a decoder always knows where an encoded value
//!    ends, so encodings can be concatenated into composite keys and read
//!    back one element at a time.
//!
//! ```text
//! primary key = bytes(table) ++ key(field_1) ++ ... ++ key(field_n)
//! column key  = primary key ++ raw column name
//! ```
//!
//! Decoders return the decoded value together with the unconsumed remainder
//! of the input.
//!
//! ## Example
//!
//! ```rust
//! use tablekv_encoding::{decode_varint, encode_varint};
//!
//! let mut a = Vec::new();
//! let mut b = Vec::new();
//! encode_varint(&mut a, -5);
//! encode_varint(&mut b, 3);
//! assert!(a < b);
//!
//! let (value, rest) = decode_varint(&a).unwrap();
//! assert_eq!(value, -5);
//! assert!(rest.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod escaped;
mod float;
mod key;
mod varint;

pub use error::{EncodingError, EncodingResult};
pub use escaped::{decode_bytes, encode_bytes};
pub use float::{decode_float, encode_float};
pub use key::{decode_key, encode_key};
pub use varint::{decode_uvarint, decode_varint, encode_uvarint, encode_varint};
