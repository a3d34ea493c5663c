//! Primitive field values.
//!
//! A `Datum` is the in-memory value of one record field, reduced to the
//! closed set of primitive kinds the codec and the value marshaler know how
//! to handle. `Kind` names those kinds without carrying a value and drives
//! every decode path.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Boolean.
    Bool,
    /// Signed integer of any width.
    Int,
    /// Unsigned integer of any width.
    Uint,
    /// Floating point of any width.
    Float,
    /// Raw byte sequence.
    Bytes,
    /// UTF-8 text.
    Text,
    /// A serializable message stored as its serialized bytes.
    Message,
    /// A value with its own binary marshaling, stored as those bytes.
    Binary,
}

impl Kind {
    /// Returns true if values of this kind can be part of a primary key.
    ///
    /// Message and binary values have no order-preserving encoding.
    #[inline]
    #[must_use]
    pub const fn is_key_encodable(self) -> bool {
        !matches!(self, Self::Message | Self::Binary)
    }

    /// Returns the zero value of this kind.
    #[must_use]
    pub fn zero(self) -> Datum {
        match self {
            Self::Bool => Datum::Bool(false),
            Self::Int => Datum::Int(0),
            Self::Uint => Datum::Uint(0),
            Self::Float => Datum::Float(0.0),
            Self::Text => Datum::Text(String::new()),
            Self::Bytes | Self::Message | Self::Binary => Datum::Bytes(Vec::new()),
        }
    }

    /// Returns the kind name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::Bytes => "bytes",
            Self::Text => "text",
            Self::Message => "message",
            Self::Binary => "binary",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A primitive field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    /// Boolean value.
    Bool(bool),
    /// Signed integer, widened to 64 bits.
    Int(i64),
    /// Unsigned integer, widened to 64 bits.
    Uint(u64),
    /// Floating point, widened to 64 bits.
    Float(f64),
    /// Raw bytes. Also carries marshaled message and binary values.
    Bytes(Vec<u8>),
    /// UTF-8 text.
    Text(String),
}

impl Datum {
    /// Returns the kind this datum naturally has.
    ///
    /// Message and binary fields produce `Bytes` datums; the field's own
    /// kind is authoritative for those.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::Uint(_) => Kind::Uint,
            Self::Float(_) => Kind::Float,
            Self::Bytes(_) => Kind::Bytes,
            Self::Text(_) => Kind::Text,
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Uint(u) => write!(f, "{u}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_values() {
        assert_eq!(Kind::Bool.zero(), Datum::Bool(false));
        assert_eq!(Kind::Int.zero(), Datum::Int(0));
        assert_eq!(Kind::Text.zero(), Datum::Text(String::new()));
        assert_eq!(Kind::Binary.zero(), Datum::Bytes(Vec::new()));
    }

    #[test]
    fn test_key_encodable() {
        assert!(Kind::Int.is_key_encodable());
        assert!(Kind::Text.is_key_encodable());
        assert!(!Kind::Message.is_key_encodable());
        assert!(!Kind::Binary.is_key_encodable());
    }

    #[test]
    fn test_datum_kind_and_display() {
        assert_eq!(Datum::Uint(3).kind(), Kind::Uint);
        assert_eq!(Datum::Text("a".into()).to_string(), "\"a\"");
        assert_eq!(Datum::Bytes(vec![1, 2]).to_string(), "<2 bytes>");
    }

    #[test]
    fn test_kind_serde_names() {
        assert_eq!(serde_json::to_string(&Kind::Uint).unwrap(), "\"uint\"");
        let kind: Kind = serde_json::from_str("\"message\"").unwrap();
        assert_eq!(kind, Kind::Message);
    }
}
