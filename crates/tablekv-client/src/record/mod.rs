//! Record types and their field descriptors.
//!
//! A record type is bound to a table through the [`Record`] trait, which
//! lists one [`FieldDescriptor`] per stored column. Descriptors are built
//! once at bind time and erase the concrete field type behind read and write
//! closures, so operations never inspect the record type again.
//!
//! The [`record!`](crate::record) macro generates the implementation:
//!
//! ```rust
//! use tablekv_client::record;
//!
//! #[derive(Debug, Default)]
//! struct User {
//!     id: u64,
//!     name: String,
//!     cache: Vec<u8>,
//! }
//!
//! // `cache` is not listed and so is never stored.
//! record!(User { id, name => "display_name" });
//! ```

mod field;

pub use field::{Binary, BinaryMarshal, FieldType, Json};

use std::fmt;

use tablekv_common::types::{Datum, Kind, Value};
use tablekv_encoding::{decode_key, encode_key};

use crate::error::ClientResult;
use crate::marshal::{marshal, unmarshal};

/// A type that can be bound to a table.
pub trait Record: Default + 'static {
    /// Returns the stored fields, in declaration order.
    fn fields() -> Vec<FieldDescriptor<Self>>;
}

type Reader<R> = Box<dyn Fn(&R) -> ClientResult<Datum> + Send + Sync>;
type Writer<R> = Box<dyn Fn(&mut R, Datum) -> ClientResult<()> + Send + Sync>;

/// A column name plus accessors for the field it is stored from.
pub struct FieldDescriptor<R> {
    name: String,
    kind: Kind,
    read: Reader<R>,
    write: Writer<R>,
}

impl<R: 'static> FieldDescriptor<R> {
    /// Creates a descriptor for the field reached through `get`/`get_mut`.
    pub fn new<T: FieldType>(
        name: impl Into<String>,
        get: fn(&R) -> &T,
        get_mut: fn(&mut R) -> &mut T,
    ) -> Self {
        Self {
            name: name.into(),
            kind: T::KIND,
            read: Box::new(move |record| get(record).to_datum()),
            write: Box::new(move |record, datum| {
                *get_mut(record) = T::from_datum(datum)?;
                Ok(())
            }),
        }
    }

    /// Returns the column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the field kind.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Reads the field from `record`.
    pub fn read(&self, record: &R) -> ClientResult<Datum> {
        (self.read)(record)
    }

    /// Writes `datum` into the field of `record`.
    pub fn write(&self, record: &mut R, datum: Datum) -> ClientResult<()> {
        (self.write)(record, datum)
    }

    /// Returns the stored value of the field.
    pub(crate) fn get_value(&self, record: &R) -> ClientResult<Value> {
        marshal(self.kind, &self.read(record)?)
    }

    /// Sets the field from a stored value; `None` resets it to zero.
    pub(crate) fn set_value(&self, record: &mut R, value: Option<&Value>) -> ClientResult<()> {
        let datum = unmarshal(self.kind, value)?;
        self.write(record, datum)
    }

    /// Appends the key encoding of the field.
    pub(crate) fn encode_key(&self, buf: &mut Vec<u8>, record: &R) -> ClientResult<()> {
        encode_key(buf, self.kind, &self.read(record)?)?;
        Ok(())
    }

    /// Decodes the field from the front of `key`, returning the rest.
    pub(crate) fn decode_key<'k>(&self, key: &'k [u8], record: &mut R) -> ClientResult<&'k [u8]> {
        let (datum, rest) = decode_key(key, self.kind)?;
        self.write(record, datum)?;
        Ok(rest)
    }
}

impl<R> fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Implements [`Record`] for a struct.
///
/// Each listed field becomes a column named after the field, or after the
/// string given with `=>`. Fields that are not listed are not stored.
///
/// ```rust
/// use tablekv_client::{record, Record};
///
/// #[derive(Default)]
/// struct Kv {
///     k: String,
///     v: String,
/// }
///
/// record!(Kv { k, v => "value" });
///
/// let names: Vec<_> = Kv::fields().iter().map(|f| f.name().to_string()).collect();
/// assert_eq!(names, ["k", "value"]);
/// ```
#[macro_export]
macro_rules! record {
    (@column $field:ident => $column:expr) => {
        $column
    };
    (@column $field:ident) => {
        ::core::stringify!($field)
    };
    ($ty:ty { $($field:ident $(=> $column:expr)?),* $(,)? }) => {
        impl $crate::Record for $ty {
            fn fields() -> ::std::vec::Vec<$crate::FieldDescriptor<Self>> {
                ::std::vec![
                    $(
                        $crate::FieldDescriptor::<$ty>::new(
                            $crate::record!(@column $field $(=> $column)?),
                            |r: &$ty| &r.$field,
                            |r: &mut $ty| &mut r.$field,
                        ),
                    )*
                ]
            }
        }
    };
}
