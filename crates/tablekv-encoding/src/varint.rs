//! Order-preserving variable-length integers.
//!
//! The first byte is a marker that determines both the sign and the number
//! of payload bytes, so markers alone order values of different widths:
//!
//! ```text
//! 0x80..=0x87  negative, 8..=1 payload bytes (two's complement, big-endian)
//! 0x88..=0xF5  small non-negative value v in 0..=109, stored as 0x88 + v
//! 0xF6..=0xFD  non-negative, 1..=8 payload bytes (big-endian)
//! ```
//!
//! Negative values closer to zero use fewer bytes and a larger marker, so
//! every negative value sorts before zero. A negative payload of `n` bytes
//! is sign-extended on decode and covers `-256^n..=-1`; each value uses the
//! smallest width that holds it, so every encoding is unique.

use crate::error::{EncodingError, EncodingResult};

const INT_MIN: u8 = 0x80;
const INT_MAX_WIDTH: u8 = 8;
const INT_ZERO: u8 = INT_MIN + INT_MAX_WIDTH;
const INT_MAX: u8 = 0xFD;
const INT_SMALL: u64 = (INT_MAX - INT_ZERO - INT_MAX_WIDTH) as u64;

/// Number of big-endian bytes needed to hold `v` (at least one).
#[inline]
fn width(v: u64) -> u8 {
    let bits = 64 - v.leading_zeros();
    (bits.div_ceil(8).max(1)) as u8
}

fn push_be(buf: &mut Vec<u8>, v: u64, n: u8) {
    let bytes = v.to_be_bytes();
    buf.extend_from_slice(&bytes[8 - n as usize..]);
}

fn read_be(b: &[u8], n: usize) -> EncodingResult<(u64, &[u8])> {
    if b.len() < n {
        return Err(EncodingError::Truncated("varint"));
    }
    let mut v = 0u64;
    for &byte in &b[..n] {
        v = (v << 8) | u64::from(byte);
    }
    Ok((v, &b[n..]))
}

/// Appends the order-preserving encoding of an unsigned integer.
pub fn encode_uvarint(buf: &mut Vec<u8>, v: u64) {
    if v <= INT_SMALL {
        buf.push(INT_ZERO + v as u8);
        return;
    }
    let n = width(v);
    buf.push(INT_MAX - INT_MAX_WIDTH + n);
    push_be(buf, v, n);
}

/// Decodes an unsigned integer, returning it and the remaining bytes.
pub fn decode_uvarint(b: &[u8]) -> EncodingResult<(u64, &[u8])> {
    let (&marker, rest) = b.split_first().ok_or(EncodingError::Truncated("uvarint"))?;
    if marker < INT_ZERO || marker > INT_MAX {
        return Err(EncodingError::InvalidMarker {
            what: "uvarint",
            byte: marker,
        });
    }
    if u64::from(marker - INT_ZERO) <= INT_SMALL {
        return Ok((u64::from(marker - INT_ZERO), rest));
    }
    let n = marker - (INT_MAX - INT_MAX_WIDTH);
    read_be(rest, n as usize)
}

/// Appends the order-preserving encoding of a signed integer.
pub fn encode_varint(buf: &mut Vec<u8>, v: i64) {
    if v >= 0 {
        encode_uvarint(buf, v as u64);
        return;
    }
    // n payload bytes, sign-extended on decode, cover -256^n..=-1.
    let n = width(!(v as u64));
    buf.push(INT_ZERO - n);
    push_be(buf, v as u64, n);
}

/// Decodes a signed integer, returning it and the remaining bytes.
pub fn decode_varint(b: &[u8]) -> EncodingResult<(i64, &[u8])> {
    let (&marker, rest) = b.split_first().ok_or(EncodingError::Truncated("varint"))?;
    if marker >= INT_ZERO {
        let (v, rest) = decode_uvarint(b)?;
        let v = i64::try_from(v).map_err(|_| EncodingError::Overflow(v))?;
        return Ok((v, rest));
    }
    if marker < INT_MIN {
        return Err(EncodingError::InvalidMarker {
            what: "varint",
            byte: marker,
        });
    }
    let n = INT_ZERO - marker;
    let (raw, rest) = read_be(rest, n as usize)?;
    let v = if n == INT_MAX_WIDTH {
        raw as i64
    } else {
        // Sign-extend the n-byte two's complement payload.
        (raw | (u64::MAX << (8 * u32::from(n)))) as i64
    };
    Ok((v, rest))
}
