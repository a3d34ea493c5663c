//! # tablekv-common
//!
//! Common types shared by every tablekv crate.
//!
//! - **Types**: ordered byte-string keys, the generic stored `Value`, and the
//!   closed set of primitive `Datum` kinds a record field can hold
//! - **Constants**: system key prefixes and size limits
//!
//! ## Example
//!
//! ```rust
//! use tablekv_common::types::{Key, Value};
//!
//! let key = Key::from_bytes(b"hello");
//! let value = Value::Integer(42);
//! assert_eq!(value.as_integer(), Some(42));
//! assert!(key < key.prefix_end());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod constants;
pub mod types;

pub use constants::*;
pub use types::{Datum, Key, KeyValue, Kind, Value};
