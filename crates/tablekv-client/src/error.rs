//! Error types for the client library.

use tablekv_common::types::Kind;
use tablekv_encoding::EncodingError;
use tablekv_store::StoreError;
use thiserror::Error;

/// Client error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// A column is not a field of the bound model.
    #[error("{table}: unable to find field {field}")]
    UnknownField {
        /// Table name.
        table: String,
        /// Column name.
        field: String,
    },

    /// A record type declares the same column twice.
    #[error("{table}: duplicate field {field}")]
    DuplicateField {
        /// Table name.
        table: String,
        /// Column name.
        field: String,
    },

    /// The record type is already bound.
    #[error("{table}: model '{model}' already defined")]
    ModelAlreadyDefined {
        /// Table the bind was attempted for.
        table: String,
        /// Record type name.
        model: String,
    },

    /// The table is already bound to another record type.
    #[error("{table}: table already bound to model '{model}'")]
    TableAlreadyBound {
        /// Table name.
        table: String,
        /// Record type already bound to it.
        model: String,
    },

    /// No binding exists for the record type.
    #[error("unable to find model for '{0}'")]
    ModelNotFound(String),

    /// A binding was attempted without primary key columns.
    #[error("{0}: primary key required")]
    MissingPrimaryKey(String),

    /// A primary key column has a kind with no key encoding.
    #[error("{table}: column {column} of kind {kind} cannot be part of a primary key")]
    InvalidPrimaryKey {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// Kind of the column.
        kind: Kind,
    },

    /// An increment targets a column that does not store an integer.
    #[error("{table}: unable to increment column {column} of kind {kind}")]
    NotIncrementable {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// Kind of the column.
        kind: Kind,
    },

    /// A table name is empty or collides with the system keyspace.
    #[error("invalid table name {0:?}")]
    InvalidTableName(String),

    /// A key belongs to a different table than the model.
    #[error("{table}: unexpected table name: {found}")]
    UnexpectedTableName {
        /// Table of the model.
        table: String,
        /// Table name decoded from the key.
        found: String,
    },

    /// Key encoding or decoding failed.
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// A stored value does not fit the destination field.
    #[error("unable to unmarshal {found} value: {target}")]
    Unmarshal {
        /// Stored value type: `integer` or `bytes`.
        found: &'static str,
        /// Destination description.
        target: String,
    },

    /// A field value could not be decoded from its stored bytes.
    #[error("unable to unmarshal value: {0}")]
    UnmarshalValue(String),

    /// A field value could not be converted to a stored value.
    #[error("unable to marshal value: {0}")]
    Marshal(String),

    /// A table with the name already exists.
    #[error("table \"{0}\" already exists")]
    TableExists(String),

    /// No table with the name exists.
    #[error("unable to find table \"{0}\"")]
    TableNotFound(String),

    /// A table descriptor failed validation or could not be decoded.
    #[error("invalid table descriptor: {0}")]
    InvalidDescriptor(String),

    /// The batch was already run.
    #[error("batch already submitted")]
    BatchSubmitted,

    /// The batch holds more calls than the configured limit.
    #[error("batch too large: {calls} calls (max {max})")]
    BatchTooLarge {
        /// Calls in the batch.
        calls: usize,
        /// Configured limit.
        max: usize,
    },

    /// The store replied with something that does not match the request.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Error reported by the store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
