//! Type definitions shared across tablekv.

mod datum;
mod keys;

pub use datum::{Datum, Kind};
pub use keys::{Key, KeyValue, Value};
