//! Field types a record can store.

use std::fmt;
use std::ops::{Deref, DerefMut};

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tablekv_common::types::{Datum, Kind};

use crate::error::{ClientError, ClientResult};

/// A Rust type that can be stored as a record field.
pub trait FieldType: Sized + 'static {
    /// Kind of the field.
    const KIND: Kind;

    /// Converts the field value to a datum of kind [`KIND`](Self::KIND).
    fn to_datum(&self) -> ClientResult<Datum>;

    /// Converts a datum of kind [`KIND`](Self::KIND) back to the field value.
    fn from_datum(datum: Datum) -> ClientResult<Self>;
}

fn mismatch(datum: &Datum, kind: Kind) -> ClientError {
    ClientError::Unmarshal {
        found: datum.kind().name(),
        target: kind.to_string(),
    }
}

fn out_of_range(value: impl fmt::Display, target: &str) -> ClientError {
    ClientError::Unmarshal {
        found: "integer",
        target: format!("{value} out of range for {target}"),
    }
}

macro_rules! signed_field {
    ($($ty:ty),*) => {$(
        impl FieldType for $ty {
            const KIND: Kind = Kind::Int;

            fn to_datum(&self) -> ClientResult<Datum> {
                Ok(Datum::Int(i64::from(*self)))
            }

            fn from_datum(datum: Datum) -> ClientResult<Self> {
                match datum {
                    Datum::Int(i) => {
                        <$ty>::try_from(i).map_err(|_| out_of_range(i, stringify!($ty)))
                    }
                    other => Err(mismatch(&other, Self::KIND)),
                }
            }
        }
    )*};
}

macro_rules! unsigned_field {
    ($($ty:ty),*) => {$(
        impl FieldType for $ty {
            const KIND: Kind = Kind::Uint;

            fn to_datum(&self) -> ClientResult<Datum> {
                Ok(Datum::Uint(u64::from(*self)))
            }

            fn from_datum(datum: Datum) -> ClientResult<Self> {
                match datum {
                    Datum::Uint(u) => {
                        <$ty>::try_from(u).map_err(|_| out_of_range(u, stringify!($ty)))
                    }
                    other => Err(mismatch(&other, Self::KIND)),
                }
            }
        }
    )*};
}

signed_field!(i8, i16, i32, i64);
unsigned_field!(u8, u16, u32, u64);

impl FieldType for bool {
    const KIND: Kind = Kind::Bool;

    fn to_datum(&self) -> ClientResult<Datum> {
        Ok(Datum::Bool(*self))
    }

    fn from_datum(datum: Datum) -> ClientResult<Self> {
        match datum {
            Datum::Bool(b) => Ok(b),
            other => Err(mismatch(&other, Self::KIND)),
        }
    }
}

impl FieldType for f64 {
    const KIND: Kind = Kind::Float;

    fn to_datum(&self) -> ClientResult<Datum> {
        Ok(Datum::Float(*self))
    }

    fn from_datum(datum: Datum) -> ClientResult<Self> {
        match datum {
            Datum::Float(f) => Ok(f),
            other => Err(mismatch(&other, Self::KIND)),
        }
    }
}

impl FieldType for f32 {
    const KIND: Kind = Kind::Float;

    fn to_datum(&self) -> ClientResult<Datum> {
        Ok(Datum::Float(f64::from(*self)))
    }

    fn from_datum(datum: Datum) -> ClientResult<Self> {
        match datum {
            Datum::Float(f) => Ok(f as f32),
            other => Err(mismatch(&other, Self::KIND)),
        }
    }
}

impl FieldType for String {
    const KIND: Kind = Kind::Text;

    fn to_datum(&self) -> ClientResult<Datum> {
        Ok(Datum::Text(self.clone()))
    }

    fn from_datum(datum: Datum) -> ClientResult<Self> {
        match datum {
            Datum::Text(s) => Ok(s),
            other => Err(mismatch(&other, Self::KIND)),
        }
    }
}

impl FieldType for Vec<u8> {
    const KIND: Kind = Kind::Bytes;

    fn to_datum(&self) -> ClientResult<Datum> {
        Ok(Datum::Bytes(self.clone()))
    }

    fn from_datum(datum: Datum) -> ClientResult<Self> {
        match datum {
            Datum::Bytes(b) => Ok(b),
            other => Err(mismatch(&other, Self::KIND)),
        }
    }
}

impl FieldType for Bytes {
    const KIND: Kind = Kind::Bytes;

    fn to_datum(&self) -> ClientResult<Datum> {
        Ok(Datum::Bytes(self.to_vec()))
    }

    fn from_datum(datum: Datum) -> ClientResult<Self> {
        match datum {
            Datum::Bytes(b) => Ok(Bytes::from(b)),
            other => Err(mismatch(&other, Self::KIND)),
        }
    }
}

/// A field stored as its JSON serialization.
///
/// An absent or empty stored value reads back as `T::default()`. JSON
/// fields cannot be part of a primary key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> FieldType for Json<T>
where
    T: Serialize + DeserializeOwned + Default + 'static,
{
    const KIND: Kind = Kind::Message;

    fn to_datum(&self) -> ClientResult<Datum> {
        serde_json::to_vec(&self.0)
            .map(Datum::Bytes)
            .map_err(|e| ClientError::Marshal(e.to_string()))
    }

    fn from_datum(datum: Datum) -> ClientResult<Self> {
        match datum {
            Datum::Bytes(b) if b.is_empty() => Ok(Json(T::default())),
            Datum::Bytes(b) => serde_json::from_slice(&b)
                .map(Json)
                .map_err(|e| ClientError::UnmarshalValue(e.to_string())),
            other => Err(mismatch(&other, Self::KIND)),
        }
    }
}

/// A type with its own binary serialization.
pub trait BinaryMarshal: Sized {
    /// Error produced by either direction.
    type Error: fmt::Display;

    /// Serializes the value.
    fn marshal_binary(&self) -> Result<Vec<u8>, Self::Error>;

    /// Deserializes a value.
    fn unmarshal_binary(data: &[u8]) -> Result<Self, Self::Error>;
}

/// A field stored through its [`BinaryMarshal`] implementation.
///
/// An absent or empty stored value reads back as `T::default()`. Binary
/// fields cannot be part of a primary key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binary<T>(pub T);

impl<T> Deref for Binary<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Binary<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> FieldType for Binary<T>
where
    T: BinaryMarshal + Default + 'static,
{
    const KIND: Kind = Kind::Binary;

    fn to_datum(&self) -> ClientResult<Datum> {
        self.0
            .marshal_binary()
            .map(Datum::Bytes)
            .map_err(|e| ClientError::Marshal(e.to_string()))
    }

    fn from_datum(datum: Datum) -> ClientResult<Self> {
        match datum {
            Datum::Bytes(b) if b.is_empty() => Ok(Binary(T::default())),
            Datum::Bytes(b) => T::unmarshal_binary(&b)
                .map(Binary)
                .map_err(|e| ClientError::UnmarshalValue(e.to_string())),
            other => Err(mismatch(&other, Self::KIND)),
        }
    }
}
