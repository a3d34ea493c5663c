//! Order-preserving floating point.
//!
//! The IEEE-754 bit pattern is transformed so that unsigned big-endian
//! comparison matches numeric comparison:
//!
//! - non-negative values: flip the sign bit
//! - negative values: invert every bit
//!
//! `-0.0` is written as `+0.0` and every NaN as the canonical NaN, so equal
//! values always produce equal keys. NaN sorts after `+inf`. This transform
//! is only used in keys; stored column values keep the raw bit pattern.

use crate::error::{EncodingError, EncodingResult};

const SIGN_BIT: u64 = 1 << 63;

/// Appends the order-preserving encoding of `value` (8 bytes).
pub fn encode_float(buf: &mut Vec<u8>, value: f64) {
    let value = if value.is_nan() {
        f64::NAN
    } else if value == 0.0 {
        0.0
    } else {
        value
    };
    let bits = value.to_bits();
    let ordered = if bits & SIGN_BIT != 0 {
        !bits
    } else {
        bits ^ SIGN_BIT
    };
    buf.extend_from_slice(&ordered.to_be_bytes());
}

/// Decodes a float, returning it and the remaining bytes.
pub fn decode_float(b: &[u8]) -> EncodingResult<(f64, &[u8])> {
    if b.len() < 8 {
        return Err(EncodingError::Truncated("float"));
    }
    let (head, rest) = b.split_at(8);
    let mut raw = [0u8; 8];
    raw.copy_from_slice(head);
    let ordered = u64::from_be_bytes(raw);
    let bits = if ordered & SIGN_BIT != 0 {
        ordered ^ SIGN_BIT
    } else {
        !ordered
    };
    Ok((f64::from_bits(bits), rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(v: f64) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_float(&mut buf, v);
        buf
    }

    #[test]
    fn test_ordering() {
        let values = [
            f64::NEG_INFINITY,
            f64::MIN,
            -1.5e10,
            -1.0,
            -f64::MIN_POSITIVE,
            0.0,
            f64::MIN_POSITIVE,
            1.0,
            2.5,
            1.5e10,
            f64::MAX,
            f64::INFINITY,
            f64::NAN,
        ];
        for pair in values.windows(2) {
            assert!(enc(pair[0]) < enc(pair[1]), "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_roundtrip() {
        for v in [f64::NEG_INFINITY, -3.25, -1e-300, 0.0, 1e-300, 42.0, f64::MAX] {
            let encoded = enc(v);
            let (decoded, rest) = decode_float(&encoded).unwrap();
            assert_eq!(decoded.to_bits(), v.to_bits());
            assert!(rest.is_empty());
        }
        let (nan, _) = decode_float(&enc(f64::NAN)).unwrap();
        assert!(nan.is_nan());
    }

    #[test]
    fn test_negative_zero_normalized() {
        assert_eq!(enc(-0.0), enc(0.0));
        let (decoded, _) = decode_float(&enc(-0.0)).unwrap();
        assert!(decoded.is_sign_positive());
    }

    #[test]
    fn test_truncated() {
        assert_eq!(decode_float(&[0x80; 7]), Err(EncodingError::Truncated("float")));
    }
}
