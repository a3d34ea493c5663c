//! # tablekv-client
//!
//! Structured records over a sorted key-value store.
//!
//! This crate maps plain Rust structs onto the flat keyspace of a
//! [`tablekv_store::Store`]. It includes:
//!
//! - **Records**: the [`record!`] macro lists the stored fields of a struct
//! - **Models**: a record type bound to a table and its primary key columns
//! - **Batches**: structured and raw operations sent in one round trip, with
//!   replies written back into caller memory
//! - **Transactions**: closures that commit on success and abort on error
//! - **Catalog**: create, describe, rename, list and delete table schemas
//!
//! ## Quick Start
//!
//! ```rust
//! use tablekv_client::{record, Db, TableExt};
//! use tablekv_store::MemStore;
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Kv {
//!     k: String,
//!     v: String,
//! }
//!
//! record!(Kv { k, v });
//!
//! let db = Db::new(MemStore::new());
//! db.bind_model::<Kv>("kv", &["k"]).unwrap();
//!
//! let a = Kv { k: "a".into(), v: "b".into() };
//! db.put_struct(&a, &[]).unwrap();
//!
//! let mut read = Kv { k: "a".into(), ..Kv::default() };
//! db.get_struct(&mut read, &[]).unwrap();
//! assert_eq!(read, a);
//! ```
//!
//! ## Batches and Transactions
//!
//! ```rust
//! use tablekv_client::{Db, Runner};
//! use tablekv_store::MemStore;
//!
//! let db = Db::new(MemStore::new());
//! let total = db
//!     .txn(|txn| {
//!         let mut batch = txn.new_batch();
//!         batch.put("greeting", "hello")?;
//!         batch.inc("visits", 3)?;
//!         txn.run(&mut batch)?;
//!         Ok(batch.results().len())
//!     })
//!     .unwrap();
//! assert_eq!(total, 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Batches of store calls.
pub mod batch;

/// Table catalog.
pub mod catalog;

/// Client configuration.
pub mod config;

/// Database and transaction handles.
pub mod db;

/// Error types.
pub mod error;

/// Stored value conversion.
pub mod marshal;

/// Bound models.
pub mod model;

/// Record types.
pub mod record;

// Re-exports
pub use batch::{Batch, OpResult};
pub use catalog::{ColumnSchema, TableDescriptor, TableSchema};
pub use config::ClientConfig;
pub use db::{Db, Runner, TableExt, Txn};
pub use error::{ClientError, ClientResult};
pub use model::{encode_column_key, table_prefix, Model, ModelRegistry};
pub use record::{Binary, BinaryMarshal, FieldDescriptor, FieldType, Json, Record};
pub use tablekv_common::types::{Datum, Key, KeyValue, Kind, Value};
