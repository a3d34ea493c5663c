//! Database handles.
//!
//! [`Db`] owns the store connection and the model registry. [`Txn`] runs
//! batches inside a store transaction. Both implement [`Runner`], and every
//! `Runner` gets the one-shot helpers of [`TableExt`].

mod txn;

pub use txn::Txn;

use std::sync::Arc;

use tablekv_common::types::{Key, KeyValue, Value};
use tablekv_store::Store;
use tracing::debug;

use crate::batch::{Batch, OpResult};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::model::ModelRegistry;
use crate::record::Record;

/// Something batches can be run against.
pub trait Runner {
    /// Returns the registry batches resolve models in.
    fn registry(&self) -> &ModelRegistry;

    /// Runs `batch`.
    fn run(&self, batch: &mut Batch<'_>) -> ClientResult<()>;

    /// Creates an empty batch.
    fn new_batch(&self) -> Batch<'_> {
        Batch::new(self.registry())
    }
}

/// One-shot operations, each building and running a single batch.
pub trait TableExt: Runner {
    /// Reads `columns` of the row identified by `record` into `record`.
    fn get_struct<R: Record>(&self, record: &mut R, columns: &[&str]) -> ClientResult<()> {
        let mut batch = self.new_batch();
        batch.get_struct(record, columns)?;
        self.run(&mut batch)
    }

    /// Writes `columns` of `record` to its row.
    fn put_struct<R: Record>(&self, record: &R, columns: &[&str]) -> ClientResult<()> {
        let mut batch = self.new_batch();
        batch.put_struct(record, columns)?;
        self.run(&mut batch)
    }

    /// Adds `delta` to `column` and stores the new value in `record`.
    fn inc_struct<R: Record>(&self, record: &mut R, delta: i64, column: &str) -> ClientResult<()> {
        let mut batch = self.new_batch();
        batch.inc_struct(record, delta, column)?;
        self.run(&mut batch)
    }

    /// Appends the rows with primary keys in `[start, end)` to `dest`.
    fn scan_struct<R: Record>(
        &self,
        dest: &mut Vec<R>,
        start: &R,
        end: &R,
        max_rows: usize,
        columns: &[&str],
    ) -> ClientResult<()> {
        let mut batch = self.new_batch();
        batch.scan_struct(dest, start, end, max_rows, columns)?;
        self.run(&mut batch)
    }

    /// Deletes `columns` of the row identified by `record`.
    fn del_struct<R: Record>(&self, record: &R, columns: &[&str]) -> ClientResult<()> {
        let mut batch = self.new_batch();
        batch.del_struct(record, columns)?;
        self.run(&mut batch)
    }

    /// Reads the value at `key`.
    fn get(&self, key: impl Into<Key>) -> ClientResult<Option<Value>> {
        let mut batch = self.new_batch();
        batch.get(key)?;
        self.run(&mut batch)?;
        Ok(single_row(batch)?.value)
    }

    /// Writes `value` at `key`.
    fn put(&self, key: impl Into<Key>, value: impl Into<Value>) -> ClientResult<()> {
        let mut batch = self.new_batch();
        batch.put(key, value)?;
        self.run(&mut batch)
    }

    /// Writes `value` at `key` if the current value equals `expected`.
    fn cput(
        &self,
        key: impl Into<Key>,
        value: impl Into<Value>,
        expected: Option<Value>,
    ) -> ClientResult<()> {
        let mut batch = self.new_batch();
        batch.cput(key, value, expected)?;
        self.run(&mut batch)
    }

    /// Adds `delta` to the integer at `key`, returning the new value.
    fn inc(&self, key: impl Into<Key>, delta: i64) -> ClientResult<i64> {
        let mut batch = self.new_batch();
        batch.inc(key, delta)?;
        self.run(&mut batch)?;
        single_row(batch)?
            .value
            .and_then(|v| v.as_integer())
            .ok_or_else(|| ClientError::UnexpectedResponse("increment without integer".into()))
    }

    /// Reads the pairs in `[start, end)`, at most `max_rows` (`0` is
    /// unlimited).
    fn scan(&self, start: impl Into<Key>, end: impl Into<Key>, max_rows: usize) -> ClientResult<Vec<KeyValue>> {
        let mut batch = self.new_batch();
        batch.scan(start, end, max_rows)?;
        self.run(&mut batch)?;
        Ok(single_result(batch)?.rows)
    }

    /// Deletes `key`.
    fn del(&self, key: impl Into<Key>) -> ClientResult<()> {
        let mut batch = self.new_batch();
        batch.del(key)?;
        self.run(&mut batch)
    }
}

impl<T: Runner + ?Sized> TableExt for T {}

fn single_result(batch: Batch<'_>) -> ClientResult<OpResult> {
    batch
        .into_results()
        .into_iter()
        .next()
        .ok_or_else(|| ClientError::UnexpectedResponse("missing result".into()))
}

fn single_row(batch: Batch<'_>) -> ClientResult<KeyValue> {
    single_result(batch)?
        .rows
        .into_iter()
        .next()
        .ok_or_else(|| ClientError::UnexpectedResponse("missing row".into()))
}

/// A handle to a table-structured view of a store.
///
/// # Example
///
/// ```rust
/// use tablekv_client::{record, Db, TableExt};
/// use tablekv_store::MemStore;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Kv {
///     k: String,
///     v: String,
/// }
///
/// record!(Kv { k, v });
///
/// let db = Db::new(MemStore::new());
/// db.bind_model::<Kv>("kv", &["k"]).unwrap();
///
/// db.put_struct(&Kv { k: "a".into(), v: "b".into() }, &[]).unwrap();
///
/// let mut kv = Kv { k: "a".into(), ..Kv::default() };
/// db.get_struct(&mut kv, &[]).unwrap();
/// assert_eq!(kv.v, "b");
/// ```
pub struct Db {
    store: Arc<dyn Store>,
    registry: ModelRegistry,
    config: ClientConfig,
}

impl Db {
    /// Creates a handle with the default configuration.
    pub fn new<S: Store + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(store),
            registry: ModelRegistry::new(),
            config: ClientConfig::default(),
        }
    }

    /// Creates a handle with a custom configuration.
    pub fn with_config<S: Store + 'static>(store: S, config: ClientConfig) -> ClientResult<Self> {
        config.validate().map_err(ClientError::InvalidConfig)?;
        Ok(Self {
            store: Arc::new(store),
            registry: ModelRegistry::new(),
            config,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// Binds the record type `R` to `table`. `primary_key` lists the columns
    /// that make up the primary key, in key order.
    ///
    /// A record type can be bound once, and a table to one record type.
    pub fn bind_model<R: Record>(&self, table: &str, primary_key: &[&str]) -> ClientResult<()> {
        self.registry.bind::<R>(table, primary_key)
    }

    /// Runs `body` in a transaction.
    ///
    /// The transaction commits if `body` returns `Ok` and is aborted
    /// otherwise, including when `body` panics.
    pub fn txn<T, F>(&self, body: F) -> ClientResult<T>
    where
        F: FnOnce(&Txn<'_>) -> ClientResult<T>,
    {
        let txn = Txn::new(self, self.store.begin()?);
        match body(&txn) {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(err) => {
                debug!(txn_id = txn.id(), error = %err, "transaction body failed");
                txn.abort();
                Err(err)
            }
        }
    }
}

impl Runner for Db {
    fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    fn run(&self, batch: &mut Batch<'_>) -> ClientResult<()> {
        batch.submit(self.store.as_ref(), self.config.max_batch_calls)
    }
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}
