//! Conversion between field values and stored column values.
//!
//! Unlike key encoding, the stored form does not preserve order: integers
//! of every width, booleans and the bit pattern of floats are all stored as
//! the integer variant, and everything else as bytes.

use tablekv_common::types::{Datum, Kind, Value};

use crate::error::{ClientError, ClientResult};

/// Converts a field of kind `kind` holding `datum` to its stored value.
pub fn marshal(kind: Kind, datum: &Datum) -> ClientResult<Value> {
    let value = match (kind, datum) {
        (Kind::Bytes | Kind::Message | Kind::Binary, Datum::Bytes(b)) => Value::from(b.as_slice()),
        (Kind::Text, Datum::Text(s)) => Value::from(s.as_str()),
        (Kind::Bool, Datum::Bool(b)) => Value::Integer(i64::from(*b)),
        (Kind::Int, Datum::Int(i)) => Value::Integer(*i),
        // Unsigned values keep their bit pattern.
        (Kind::Uint, Datum::Uint(u)) => Value::Integer(*u as i64),
        (Kind::Float, Datum::Float(f)) => Value::Integer(f.to_bits() as i64),
        _ => return Err(ClientError::Marshal(format!("{datum} as {kind}"))),
    };
    Ok(value)
}

/// Converts a stored value to a datum for a field of kind `kind`.
///
/// An absent value yields the zero value of the kind.
pub fn unmarshal(kind: Kind, value: Option<&Value>) -> ClientResult<Datum> {
    let Some(value) = value else {
        return Ok(kind.zero());
    };

    match (kind, value) {
        (Kind::Text, Value::Bytes(b)) => String::from_utf8(b.to_vec())
            .map(Datum::Text)
            .map_err(|e| ClientError::UnmarshalValue(format!("text: {e}"))),
        (Kind::Bytes | Kind::Message | Kind::Binary, Value::Bytes(b)) => Ok(Datum::Bytes(b.to_vec())),
        (Kind::Bool, Value::Integer(i)) => Ok(Datum::Bool(*i != 0)),
        (Kind::Int, Value::Integer(i)) => Ok(Datum::Int(*i)),
        (Kind::Uint, Value::Integer(i)) => Ok(Datum::Uint(*i as u64)),
        (Kind::Float, Value::Integer(i)) => Ok(Datum::Float(f64::from_bits(*i as u64))),
        (kind, value) => Err(ClientError::Unmarshal {
            found: value.type_name(),
            target: kind.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marshal_integers() {
        assert_eq!(marshal(Kind::Bool, &Datum::Bool(true)).unwrap(), Value::Integer(1));
        assert_eq!(marshal(Kind::Int, &Datum::Int(-5)).unwrap(), Value::Integer(-5));
        assert_eq!(
            marshal(Kind::Uint, &Datum::Uint(u64::MAX)).unwrap(),
            Value::Integer(-1)
        );
        assert_eq!(
            unmarshal(Kind::Uint, Some(&Value::Integer(-1))).unwrap(),
            Datum::Uint(u64::MAX)
        );
    }

    #[test]
    fn test_float_uses_bit_pattern() {
        let value = marshal(Kind::Float, &Datum::Float(-1.5)).unwrap();
        assert_eq!(value, Value::Integer((-1.5f64).to_bits() as i64));
        assert_eq!(unmarshal(Kind::Float, Some(&value)).unwrap(), Datum::Float(-1.5));
    }

    #[test]
    fn test_bytes_and_text() {
        let value = marshal(Kind::Text, &Datum::Text("hi".into())).unwrap();
        assert_eq!(value, Value::from("hi"));
        assert_eq!(
            unmarshal(Kind::Text, Some(&value)).unwrap(),
            Datum::Text("hi".into())
        );
        assert_eq!(
            unmarshal(Kind::Message, Some(&value)).unwrap(),
            Datum::Bytes(b"hi".to_vec())
        );
    }

    #[test]
    fn test_absent_is_zero() {
        assert_eq!(unmarshal(Kind::Text, None).unwrap(), Datum::Text(String::new()));
        assert_eq!(unmarshal(Kind::Int, None).unwrap(), Datum::Int(0));
        assert_eq!(unmarshal(Kind::Bool, None).unwrap(), Datum::Bool(false));
    }

    #[test]
    fn test_type_mismatch() {
        let err = unmarshal(Kind::Text, Some(&Value::Integer(1))).unwrap_err();
        assert_eq!(err.to_string(), "unable to unmarshal integer value: text");

        let err = unmarshal(Kind::Int, Some(&Value::from("1"))).unwrap_err();
        assert_eq!(err.to_string(), "unable to unmarshal bytes value: int");

        let err = marshal(Kind::Int, &Datum::Text("1".into())).unwrap_err();
        assert!(err.to_string().starts_with("unable to marshal value"));
    }

    #[test]
    fn test_invalid_utf8_text() {
        let err = unmarshal(Kind::Text, Some(&Value::from(vec![0xFFu8]))).unwrap_err();
        assert!(matches!(err, ClientError::UnmarshalValue(_)));
    }
}
