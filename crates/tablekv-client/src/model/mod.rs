//! Bound models and the key layout of their rows.
//!
//! A row of table `t` with primary key fields `f1..fn` is stored as one key
//! per column:
//!
//! ```text
//! encode_bytes(t) ++ encode_key(f1) ++ ... ++ encode_key(fn) ++ column
//! ```
//!
//! Every primary key element is self-delimiting, so the raw column name can
//! follow the primary key without escaping, and the keys of one row are
//! contiguous in key order.

mod registry;

pub use registry::ModelRegistry;

use std::collections::HashMap;

use tablekv_common::types::Key;
use tablekv_encoding::{decode_bytes, encode_bytes};

use crate::error::{ClientError, ClientResult};
use crate::record::{FieldDescriptor, Record};

/// Returns the key prefix shared by every row of `table`.
pub fn table_prefix(table: &str) -> Key {
    let mut buf = Vec::with_capacity(table.len() + 2);
    encode_bytes(&mut buf, table.as_bytes());
    Key::from_vec(buf)
}

/// Returns the key of `column` in the row with the given primary key.
pub fn encode_column_key(primary_key: &[u8], column: &str) -> Key {
    let mut buf = Vec::with_capacity(primary_key.len() + column.len());
    buf.extend_from_slice(primary_key);
    buf.extend_from_slice(column.as_bytes());
    Key::from_vec(buf)
}

/// A record type bound to a table.
pub struct Model<R> {
    name: String,
    fields: Vec<FieldDescriptor<R>>,
    index: HashMap<String, usize>,
    primary_key: Vec<usize>,
    other_columns: Vec<usize>,
}

impl<R: Record> Model<R> {
    /// Builds the model of `R` for `table`.
    pub(crate) fn new(table: &str, primary_key: &[&str]) -> ClientResult<Self> {
        let fields = R::fields();
        let mut index = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            if index.insert(field.name().to_string(), i).is_some() {
                return Err(ClientError::DuplicateField {
                    table: table.to_string(),
                    field: field.name().to_string(),
                });
            }
        }

        if primary_key.is_empty() {
            return Err(ClientError::MissingPrimaryKey(table.to_string()));
        }

        let mut key_fields = Vec::with_capacity(primary_key.len());
        for column in primary_key {
            let i = *index.get(*column).ok_or_else(|| ClientError::UnknownField {
                table: table.to_string(),
                field: column.to_string(),
            })?;
            let kind = fields[i].kind();
            if !kind.is_key_encodable() {
                return Err(ClientError::InvalidPrimaryKey {
                    table: table.to_string(),
                    column: column.to_string(),
                    kind,
                });
            }
            key_fields.push(i);
        }

        let other_columns = (0..fields.len())
            .filter(|i| !key_fields.contains(i))
            .collect();

        Ok(Self {
            name: table.to_string(),
            fields,
            index,
            primary_key: key_fields,
            other_columns,
        })
    }
}

impl<R: 'static> Model<R> {
    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the primary key columns in key order.
    pub fn primary_key(&self) -> Vec<&str> {
        self.primary_key.iter().map(|&i| self.fields[i].name()).collect()
    }

    /// Returns every column that is not part of the primary key.
    pub fn other_columns(&self) -> Vec<&str> {
        self.other_columns
            .iter()
            .map(|&i| self.fields[i].name())
            .collect()
    }

    /// Returns the descriptor of `column`.
    pub fn field(&self, column: &str) -> ClientResult<&FieldDescriptor<R>> {
        self.index
            .get(column)
            .map(|&i| &self.fields[i])
            .ok_or_else(|| self.unknown_field(column))
    }

    /// Returns every field descriptor, in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor<R>] {
        &self.fields
    }

    pub(crate) fn field_at(&self, i: usize) -> &FieldDescriptor<R> {
        &self.fields[i]
    }

    /// Resolves `columns` to field positions; an empty list selects the
    /// non-primary-key columns.
    pub(crate) fn resolve(&self, columns: &[&str]) -> ClientResult<Vec<usize>> {
        if columns.is_empty() {
            return Ok(self.other_columns.clone());
        }
        columns
            .iter()
            .map(|column| {
                self.index
                    .get(*column)
                    .copied()
                    .ok_or_else(|| self.unknown_field(column))
            })
            .collect()
    }

    fn unknown_field(&self, column: &str) -> ClientError {
        ClientError::UnknownField {
            table: self.name.clone(),
            field: column.to_string(),
        }
    }
}

impl<R: 'static> Model<R> {
    /// Encodes the primary key of `record`.
    pub fn encode_primary_key(&self, record: &R) -> ClientResult<Key> {
        let mut buf = table_prefix(&self.name).as_bytes().to_vec();
        for &i in &self.primary_key {
            self.fields[i].encode_key(&mut buf, record)?;
        }
        Ok(Key::from_vec(buf))
    }

    /// Decodes a primary key from the front of `key` into `record`,
    /// returning the bytes that follow it.
    ///
    /// Fails if the key belongs to another table.
    pub fn decode_primary_key<'k>(&self, key: &'k [u8], record: &mut R) -> ClientResult<&'k [u8]> {
        let (name, mut rest) = decode_bytes(key)?;
        if name != self.name.as_bytes() {
            return Err(ClientError::UnexpectedTableName {
                table: self.name.clone(),
                found: String::from_utf8_lossy(&name).into_owned(),
            });
        }
        for &i in &self.primary_key {
            rest = self.fields[i].decode_key(rest, record)?;
        }
        Ok(rest)
    }
}

impl<R: 'static> std::fmt::Debug for Model<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("primary_key", &self.primary_key())
            .field("other_columns", &self.other_columns())
            .finish()
    }
}
