//! Escaped, terminated byte strings.
//!
//! ```text
//! 0x00 -> 0x00 0xFF   (escaped null byte)
//! end  -> 0x00 0x01   (terminator)
//! ```
//!
//! The terminator sorts below every escaped byte, so a string sorts before
//! any longer string it prefixes, and an encoding is never a byte prefix of
//! a different value's encoding.

use crate::error::{EncodingError, EncodingResult};

const ESCAPE: u8 = 0x00;
const ESCAPED_TERM: u8 = 0x01;
const ESCAPED_00: u8 = 0xFF;

/// Appends the escaped encoding of `value`.
pub fn encode_bytes(buf: &mut Vec<u8>, value: &[u8]) {
    buf.reserve(value.len() + 2);
    let mut rest = value;
    while let Some(pos) = rest.iter().position(|&b| b == ESCAPE) {
        buf.extend_from_slice(&rest[..pos]);
        buf.push(ESCAPE);
        buf.push(ESCAPED_00);
        rest = &rest[pos + 1..];
    }
    buf.extend_from_slice(rest);
    buf.push(ESCAPE);
    buf.push(ESCAPED_TERM);
}

/// Decodes an escaped byte string, returning it and the remaining bytes.
pub fn decode_bytes(b: &[u8]) -> EncodingResult<(Vec<u8>, &[u8])> {
    let mut out = Vec::new();
    let mut rest = b;
    loop {
        let pos = rest
            .iter()
            .position(|&b| b == ESCAPE)
            .ok_or(EncodingError::Truncated("bytes"))?;
        out.extend_from_slice(&rest[..pos]);
        match rest.get(pos + 1) {
            Some(&ESCAPED_TERM) => return Ok((out, &rest[pos + 2..])),
            Some(&ESCAPED_00) => {
                out.push(0x00);
                rest = &rest[pos + 2..];
            }
            Some(&other) => {
                return Err(EncodingError::InvalidMarker {
                    what: "bytes escape",
                    byte: other,
                })
            }
            None => return Err(EncodingError::Truncated("bytes")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(v: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_bytes(&mut buf, v);
        buf
    }

    #[test]
    fn test_layout() {
        assert_eq!(enc(b""), vec![0x00, 0x01]);
        assert_eq!(enc(b"ab"), vec![b'a', b'b', 0x00, 0x01]);
        assert_eq!(enc(b"a\x00b"), vec![b'a', 0x00, 0xFF, b'b', 0x00, 0x01]);
    }

    #[test]
    fn test_roundtrip_with_remainder() {
        for value in [&b""[..], b"a", b"\x00", b"\x00\x00\xff", b"hello\x00world"] {
            let mut buf = enc(value);
            buf.extend_from_slice(b"col");
            let (decoded, rest) = decode_bytes(&buf).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(rest, b"col");
        }
    }

    #[test]
    fn test_ordering() {
        let mut values: Vec<&[u8]> = vec![
            &b""[..], b"\x00", b"\x00\x00", b"\x00\x01", b"\x01", b"a", b"a\x00", b"a\x00b", b"ab",
            b"b", b"\xff", b"\xff\x00",
        ];
        values.sort();
        for pair in values.windows(2) {
            assert!(enc(pair[0]) < enc(pair[1]), "{:?} < {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_no_prefix_between_distinct_values() {
        let a = enc(b"a");
        let ab = enc(b"ab");
        assert!(!ab.starts_with(&a));
        assert!(!a.starts_with(&ab));
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(decode_bytes(b"abc"), Err(EncodingError::Truncated("bytes")));
        assert_eq!(decode_bytes(b"abc\x00"), Err(EncodingError::Truncated("bytes")));
        assert!(matches!(
            decode_bytes(b"abc\x00\x02"),
            Err(EncodingError::InvalidMarker { byte: 0x02, .. })
        ));
    }
}
