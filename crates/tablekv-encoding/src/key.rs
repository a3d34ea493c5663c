//! Key element encoding dispatched by field kind.
//!
//! | Kind    | Encoding                      |
//! |---------|-------------------------------|
//! | `Bool`  | uvarint `0` / `1`             |
//! | `Int`   | ordered varint                |
//! | `Uint`  | ordered uvarint               |
//! | `Float` | ordered 8-byte float          |
//! | `Bytes` | escaped bytes                 |
//! | `Text`  | escaped bytes of the UTF-8    |
//!
//! Message and binary kinds have no key encoding.

use tablekv_common::types::{Datum, Kind};

use crate::error::{EncodingError, EncodingResult};
use crate::escaped::{decode_bytes, encode_bytes};
use crate::float::{decode_float, encode_float};
use crate::varint::{decode_uvarint, decode_varint, encode_uvarint, encode_varint};

/// Appends the key encoding of a field of kind `kind` holding `datum`.
///
/// Fails if the kind cannot be part of a key or the datum does not match
/// the kind.
pub fn encode_key(buf: &mut Vec<u8>, kind: Kind, datum: &Datum) -> EncodingResult<()> {
    match (kind, datum) {
        (Kind::Bool, Datum::Bool(b)) => encode_uvarint(buf, u64::from(*b)),
        (Kind::Int, Datum::Int(i)) => encode_varint(buf, *i),
        (Kind::Uint, Datum::Uint(u)) => encode_uvarint(buf, *u),
        (Kind::Float, Datum::Float(f)) => encode_float(buf, *f),
        (Kind::Bytes, Datum::Bytes(b)) => encode_bytes(buf, b),
        (Kind::Text, Datum::Text(s)) => encode_bytes(buf, s.as_bytes()),
        _ => {
            return Err(EncodingError::UnsupportedKey {
                kind,
                value: datum.to_string(),
            })
        }
    }
    Ok(())
}

/// Decodes one key element of kind `kind`, returning it and the remaining
/// bytes.
pub fn decode_key(b: &[u8], kind: Kind) -> EncodingResult<(Datum, &[u8])> {
    match kind {
        Kind::Bool => {
            let (v, rest) = decode_uvarint(b)?;
            Ok((Datum::Bool(v != 0), rest))
        }
        Kind::Int => {
            let (v, rest) = decode_varint(b)?;
            Ok((Datum::Int(v), rest))
        }
        Kind::Uint => {
            let (v, rest) = decode_uvarint(b)?;
            Ok((Datum::Uint(v), rest))
        }
        Kind::Float => {
            let (v, rest) = decode_float(b)?;
            Ok((Datum::Float(v), rest))
        }
        Kind::Bytes => {
            let (v, rest) = decode_bytes(b)?;
            Ok((Datum::Bytes(v), rest))
        }
        Kind::Text => {
            let (v, rest) = decode_bytes(b)?;
            let s = String::from_utf8(v).map_err(|_| EncodingError::InvalidUtf8)?;
            Ok((Datum::Text(s), rest))
        }
        Kind::Message | Kind::Binary => Err(EncodingError::UnsupportedDecode(kind)),
    }
}
