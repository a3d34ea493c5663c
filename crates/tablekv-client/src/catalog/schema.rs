//! Table schemas and their stored descriptors.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tablekv_common::types::Kind;
use tablekv_common::SYSTEM_PREFIX;

use crate::error::{ClientError, ClientResult};
use crate::record::Record;

/// A column of a table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,
    /// Kind of the values stored in the column.
    pub kind: Kind,
}

impl ColumnSchema {
    /// Creates a column.
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// The user-facing description of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnSchema>,
    /// Primary key columns in key order.
    pub primary_key: Vec<String>,
}

impl TableSchema {
    /// Creates a schema with no columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
        }
    }

    /// Builds the schema of the record type `R` stored as `name`.
    pub fn for_record<R: Record>(name: impl Into<String>, primary_key: &[&str]) -> Self {
        let columns = R::fields()
            .iter()
            .map(|f| ColumnSchema::new(f.name(), f.kind()))
            .collect();
        Self {
            name: name.into(),
            columns,
            primary_key: primary_key.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Adds a column.
    pub fn column(mut self, name: impl Into<String>, kind: Kind) -> Self {
        self.columns.push(ColumnSchema::new(name, kind));
        self
    }

    /// Sets the primary key columns.
    pub fn with_primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_key = columns.iter().map(|c| c.to_string()).collect();
        self
    }
}

/// The stored form of a table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Descriptor ID, allocated when the table is created.
    pub id: u32,
    /// Lower-cased table name.
    pub name: String,
    /// Name the row keys are prefixed with. Set on create and kept across
    /// renames.
    pub storage_name: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnSchema>,
    /// Primary key columns in key order.
    pub primary_key: Vec<String>,
}

impl TableDescriptor {
    /// Creates a descriptor from a schema. The ID is left at zero.
    pub fn from_schema(schema: TableSchema) -> Self {
        let name = schema.name.to_lowercase();
        Self {
            id: 0,
            storage_name: name.clone(),
            name,
            columns: schema.columns,
            primary_key: schema.primary_key,
        }
    }

    /// Returns the schema this descriptor stores.
    pub fn to_schema(&self) -> TableSchema {
        TableSchema {
            name: self.name.clone(),
            columns: self.columns.clone(),
            primary_key: self.primary_key.clone(),
        }
    }

    /// Checks the descriptor is well formed.
    pub fn validate(&self) -> ClientResult<()> {
        let invalid = |msg: String| Err(ClientError::InvalidDescriptor(msg));

        if self.name.is_empty() {
            return invalid("empty table name".to_string());
        }
        if self.name.as_bytes()[0] == SYSTEM_PREFIX {
            return invalid(format!("reserved table name {:?}", self.name));
        }
        if self.storage_name.is_empty() {
            return invalid(format!("table \"{}\" has no storage name", self.name));
        }
        if self.columns.is_empty() {
            return invalid(format!("table \"{}\" must contain at least one column", self.name));
        }

        let mut names = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            if column.name.is_empty() {
                return invalid("empty column name".to_string());
            }
            if !names.insert(column.name.as_str()) {
                return invalid(format!("duplicate column name: \"{}\"", column.name));
            }
        }

        if self.primary_key.is_empty() {
            return invalid(format!("table \"{}\" must have a primary key", self.name));
        }
        for key in &self.primary_key {
            let Some(column) = self.columns.iter().find(|c| &c.name == key) else {
                return invalid(format!("primary key column \"{key}\" not found"));
            };
            if !column.kind.is_key_encodable() {
                return invalid(format!(
                    "primary key column \"{key}\" has kind {} with no key encoding",
                    column.kind
                ));
            }
        }
        Ok(())
    }

    /// Serializes the descriptor for storage.
    pub fn encode(&self) -> ClientResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ClientError::Marshal(e.to_string()))
    }

    /// Deserializes a stored descriptor.
    pub fn decode(data: &[u8]) -> ClientResult<Self> {
        serde_json::from_slice(data).map_err(|e| ClientError::InvalidDescriptor(e.to_string()))
    }
}
