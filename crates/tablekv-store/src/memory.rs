//! In-memory store.
//!
//! `MemStore` keeps every pair in one sorted map behind a read-write lock.
//! A batch runs against a private write overlay and is applied only if every
//! request in it succeeded. Transactions keep the same kind of overlay for
//! their whole lifetime and apply it on commit.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tablekv_common::types::{Key, KeyValue, Value};
use tracing::{debug, trace};

use crate::config::MemStoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::request::{Request, Response};
use crate::sender::{Sender, Store, Transaction};

/// Pending writes; `None` marks a deletion.
type Writes = BTreeMap<Key, Option<Value>>;

/// Statistics about store usage.
#[derive(Debug, Default)]
pub struct StoreStats {
    /// Batches sent, including those sent through transactions.
    pub batches: AtomicU64,
    /// Requests executed.
    pub requests: AtomicU64,
    /// Batches that failed.
    pub failures: AtomicU64,
    /// Transactions committed.
    pub commits: AtomicU64,
    /// Transactions aborted or dropped without commit.
    pub aborts: AtomicU64,
}

struct Shared {
    config: MemStoreConfig,
    data: RwLock<BTreeMap<Key, Value>>,
    stats: StoreStats,
    next_txn_id: AtomicU64,
}

/// A sorted in-memory key-value store.
///
/// Cloning the handle shares the underlying data.
#[derive(Clone)]
pub struct MemStore {
    shared: Arc<Shared>,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStore {
    /// Creates an empty store with default limits.
    pub fn new() -> Self {
        Self::with_config(MemStoreConfig::default())
    }

    /// Creates an empty store with custom limits.
    pub fn with_config(config: MemStoreConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                data: RwLock::new(BTreeMap::new()),
                stats: StoreStats::default(),
                next_txn_id: AtomicU64::new(1),
            }),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &MemStoreConfig {
        &self.shared.config
    }

    /// Returns the store statistics.
    pub fn stats(&self) -> &StoreStats {
        &self.shared.stats
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.shared.data.read().len()
    }

    /// Returns true if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.shared.data.read().is_empty()
    }

    /// Returns every stored pair in key order.
    pub fn dump(&self) -> Vec<KeyValue> {
        self.shared
            .data
            .read()
            .iter()
            .map(|(k, v)| KeyValue::new(k.clone(), Some(v.clone())))
            .collect()
    }
}

impl Sender for MemStore {
    fn send(&self, requests: &[Request]) -> StoreResult<Vec<Response>> {
        let shared = &self.shared;
        trace!(requests = requests.len(), "mem store batch");

        let result = if requests.iter().any(Request::is_write) {
            let mut data = shared.data.write();
            let mut writes = Writes::new();
            run_batch(&shared.config, &data, &mut writes, requests).map(|responses| {
                apply(&mut data, writes);
                responses
            })
        } else {
            let data = shared.data.read();
            run_batch(&shared.config, &data, &mut Writes::new(), requests)
        };

        shared.record_batch(requests.len(), result.is_ok());
        result
    }
}

impl Store for MemStore {
    fn begin(&self) -> StoreResult<Box<dyn Transaction>> {
        let id = self.shared.next_txn_id.fetch_add(1, AtomicOrdering::SeqCst);
        debug!(txn_id = id, "begin transaction");
        Ok(Box::new(MemTxn {
            id,
            shared: Arc::clone(&self.shared),
            writes: Mutex::new(Writes::new()),
            finished: false,
        }))
    }
}

impl Shared {
    fn record_batch(&self, requests: usize, ok: bool) {
        self.stats.batches.fetch_add(1, AtomicOrdering::Relaxed);
        self.stats
            .requests
            .fetch_add(requests as u64, AtomicOrdering::Relaxed);
        if !ok {
            self.stats.failures.fetch_add(1, AtomicOrdering::Relaxed);
        }
    }
}

/// A transaction over a [`MemStore`].
///
/// Reads see the committed data as of each batch plus the transaction's own
/// buffered writes. Concurrent transactions are not checked for conflicts;
/// the last one to commit wins.
pub struct MemTxn {
    id: u64,
    shared: Arc<Shared>,
    writes: Mutex<Writes>,
    finished: bool,
}

impl MemTxn {
    /// Returns the number of buffered writes.
    pub fn pending_writes(&self) -> usize {
        self.writes.lock().len()
    }
}

impl Sender for MemTxn {
    fn send(&self, requests: &[Request]) -> StoreResult<Vec<Response>> {
        trace!(txn_id = self.id, requests = requests.len(), "transaction batch");

        let data = self.shared.data.read();
        let mut writes = self.writes.lock();
        // A failed batch must leave earlier buffered writes untouched.
        let mut staged = writes.clone();
        let result = run_batch(&self.shared.config, &data, &mut staged, requests);
        if result.is_ok() {
            *writes = staged;
        }

        self.shared.record_batch(requests.len(), result.is_ok());
        result
    }
}

impl Transaction for MemTxn {
    fn id(&self) -> u64 {
        self.id
    }

    fn commit(mut self: Box<Self>) -> StoreResult<()> {
        let writes = std::mem::take(&mut *self.writes.lock());
        let count = writes.len();
        apply(&mut self.shared.data.write(), writes);

        self.finished = true;
        self.shared
            .stats
            .commits
            .fetch_add(1, AtomicOrdering::Relaxed);
        debug!(txn_id = self.id, writes = count, "commit transaction");
        Ok(())
    }

    fn abort(mut self: Box<Self>) {
        self.finished = true;
        self.shared.stats.aborts.fetch_add(1, AtomicOrdering::Relaxed);
        debug!(txn_id = self.id, "abort transaction");
    }
}

impl Drop for MemTxn {
    fn drop(&mut self) {
        if !self.finished {
            self.shared.stats.aborts.fetch_add(1, AtomicOrdering::Relaxed);
            debug!(txn_id = self.id, "transaction dropped without commit");
        }
    }
}

/// Executes `requests` in order against `base` overlaid with `writes`.
fn run_batch(
    config: &MemStoreConfig,
    base: &BTreeMap<Key, Value>,
    writes: &mut Writes,
    requests: &[Request],
) -> StoreResult<Vec<Response>> {
    requests
        .iter()
        .map(|request| execute(config, base, writes, request))
        .collect()
}

fn execute(
    config: &MemStoreConfig,
    base: &BTreeMap<Key, Value>,
    writes: &mut Writes,
    request: &Request,
) -> StoreResult<Response> {
    match request {
        Request::Get { key } => Ok(Response::Get(read(base, writes, key))),
        Request::Put { key, value } => {
            check_size(config, key, value)?;
            writes.insert(key.clone(), Some(value.clone()));
            Ok(Response::Put)
        }
        Request::ConditionalPut {
            key,
            value,
            expected,
        } => {
            check_size(config, key, value)?;
            let actual = read(base, writes, key);
            if actual != *expected {
                return Err(StoreError::ConditionFailed {
                    key: key.clone(),
                    actual,
                });
            }
            writes.insert(key.clone(), Some(value.clone()));
            Ok(Response::ConditionalPut)
        }
        Request::Increment { key, delta } => {
            check_key(config, key)?;
            let current = match read(base, writes, key) {
                None => 0,
                Some(Value::Integer(i)) => i,
                Some(Value::Bytes(_)) => return Err(StoreError::NotAnInteger(key.clone())),
            };
            let next = current
                .checked_add(*delta)
                .ok_or_else(|| StoreError::IncrementOverflow(key.clone()))?;
            writes.insert(key.clone(), Some(Value::Integer(next)));
            Ok(Response::Increment(next))
        }
        Request::Scan {
            start,
            end,
            max_rows,
        } => Ok(Response::Scan(scan(base, writes, start, end, *max_rows))),
        Request::Delete { key } => {
            writes.insert(key.clone(), None);
            Ok(Response::Delete)
        }
    }
}

fn read(base: &BTreeMap<Key, Value>, writes: &Writes, key: &Key) -> Option<Value> {
    match writes.get(key) {
        Some(pending) => pending.clone(),
        None => base.get(key).cloned(),
    }
}

#[derive(Clone, Copy)]
enum Step {
    Base,
    Write,
    Both,
}

/// Merges the committed pairs and the overlay over `[start, end)`.
fn scan(
    base: &BTreeMap<Key, Value>,
    writes: &Writes,
    start: &Key,
    end: &Key,
    max_rows: usize,
) -> Vec<KeyValue> {
    if start >= end {
        return Vec::new();
    }
    let range = (Bound::Included(start), Bound::Excluded(end));
    let mut base_iter = base.range::<Key, _>(range).peekable();
    let mut write_iter = writes.range::<Key, _>(range).peekable();
    let mut out = Vec::new();

    while max_rows == 0 || out.len() < max_rows {
        let step = match (base_iter.peek(), write_iter.peek()) {
            (None, None) => break,
            (Some(_), None) => Step::Base,
            (None, Some(_)) => Step::Write,
            (Some((bk, _)), Some((wk, _))) => match bk.cmp(wk) {
                std::cmp::Ordering::Less => Step::Base,
                std::cmp::Ordering::Greater => Step::Write,
                std::cmp::Ordering::Equal => Step::Both,
            },
        };

        if matches!(step, Step::Base) {
            if let Some((k, v)) = base_iter.next() {
                out.push(KeyValue::new(k.clone(), Some(v.clone())));
            }
            continue;
        }
        if matches!(step, Step::Both) {
            base_iter.next();
        }
        if let Some((k, Some(v))) = write_iter.next() {
            out.push(KeyValue::new(k.clone(), Some(v.clone())));
        }
    }
    out
}

fn apply(data: &mut BTreeMap<Key, Value>, writes: Writes) {
    for (key, write) in writes {
        match write {
            Some(value) => {
                data.insert(key, value);
            }
            None => {
                data.remove(&key);
            }
        }
    }
}

fn check_key(config: &MemStoreConfig, key: &Key) -> StoreResult<()> {
    if key.len() > config.max_key_size {
        return Err(StoreError::KeyTooLarge {
            size: key.len(),
            max: config.max_key_size,
        });
    }
    Ok(())
}

fn check_size(config: &MemStoreConfig, key: &Key, value: &Value) -> StoreResult<()> {
    check_key(config, key)?;
    if let Some(bytes) = value.as_bytes() {
        if bytes.len() > config.max_value_size {
            return Err(StoreError::ValueTooLarge {
                size: bytes.len(),
                max: config.max_value_size,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(pairs: &[KeyValue]) -> Vec<String> {
        pairs.iter().map(|kv| kv.key.to_string()).collect()
    }

    fn scan_all<S: Sender + ?Sized>(
        sender: &S,
        start: &str,
        end: &str,
        max_rows: usize,
    ) -> Vec<KeyValue> {
        match sender
            .send(&[Request::scan(start, end, max_rows)])
            .unwrap()
            .remove(0)
        {
            Response::Scan(pairs) => pairs,
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[test]
    fn test_put_get_delete() {
        let store = MemStore::new();
        let responses = store
            .send(&[
                Request::put("a", "1"),
                Request::get("a"),
                Request::get("missing"),
            ])
            .unwrap();
        assert_eq!(
            responses,
            vec![
                Response::Put,
                Response::Get(Some(Value::from("1"))),
                Response::Get(None),
            ]
        );

        store.send(&[Request::delete("a")]).unwrap();
        assert_eq!(store.send(&[Request::get("a")]).unwrap(), vec![Response::Get(None)]);
        assert!(store.is_empty());
    }

    #[test]
    fn test_batch_is_atomic() {
        let store = MemStore::new();
        let err = store
            .send(&[
                Request::put("a", "1"),
                Request::conditional_put("b", "2", Some(Value::from("x"))),
            ])
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::ConditionFailed {
                key: Key::from("b"),
                actual: None
            }
        );
        assert!(store.is_empty());
        assert_eq!(store.stats().failures.load(AtomicOrdering::Relaxed), 1);
    }

    #[test]
    fn test_conditional_put() {
        let store = MemStore::new();
        store
            .send(&[Request::conditional_put("a", "1", None)])
            .unwrap();
        let err = store
            .send(&[Request::conditional_put("a", "2", None)])
            .unwrap_err();
        assert!(matches!(err, StoreError::ConditionFailed { actual: Some(_), .. }));

        store
            .send(&[Request::conditional_put("a", "2", Some(Value::from("1")))])
            .unwrap();
        assert_eq!(
            store.send(&[Request::get("a")]).unwrap(),
            vec![Response::Get(Some(Value::from("2")))]
        );
    }

    #[test]
    fn test_increment() {
        let store = MemStore::new();
        let responses = store
            .send(&[Request::increment("n", 5), Request::increment("n", -2)])
            .unwrap();
        assert_eq!(responses, vec![Response::Increment(5), Response::Increment(3)]);

        store.send(&[Request::put("s", "text")]).unwrap();
        assert_eq!(
            store.send(&[Request::increment("s", 1)]),
            Err(StoreError::NotAnInteger(Key::from("s")))
        );

        store.send(&[Request::put("max", i64::MAX)]).unwrap();
        assert_eq!(
            store.send(&[Request::increment("max", 1)]),
            Err(StoreError::IncrementOverflow(Key::from("max")))
        );
    }

    #[test]
    fn test_scan_range_and_limit() {
        let store = MemStore::new();
        let puts: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|k| Request::put(*k, *k))
            .collect();
        store.send(&puts).unwrap();

        assert_eq!(keys(&scan_all(&store, "b", "d", 0)), vec!["b", "c"]);
        assert_eq!(keys(&scan_all(&store, "a", "z", 3)), vec!["a", "b", "c"]);
        assert!(scan_all(&store, "d", "a", 0).is_empty());
        assert!(scan_all(&store, "c", "c", 0).is_empty());
    }

    #[test]
    fn test_scan_sees_batch_writes() {
        let store = MemStore::new();
        store.send(&[Request::put("a", "1"), Request::put("b", "2")]).unwrap();

        let responses = store
            .send(&[
                Request::delete("a"),
                Request::put("c", "3"),
                Request::scan("a", "z", 0),
            ])
            .unwrap();
        match &responses[2] {
            Response::Scan(pairs) => assert_eq!(keys(pairs), vec!["b", "c"]),
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[test]
    fn test_size_limits() {
        let store = MemStore::with_config(MemStoreConfig::new().max_key_size(4).max_value_size(2));
        assert_eq!(
            store.send(&[Request::put("toolong", "1")]),
            Err(StoreError::KeyTooLarge { size: 7, max: 4 })
        );
        assert_eq!(
            store.send(&[Request::put("k", "abc")]),
            Err(StoreError::ValueTooLarge { size: 3, max: 2 })
        );
        // Integers carry no byte payload.
        store.send(&[Request::put("k", 1_000_000i64)]).unwrap();
    }

    #[test]
    fn test_transaction_read_your_writes() {
        let store = MemStore::new();
        store.send(&[Request::put("a", "1")]).unwrap();

        let txn = store.begin().unwrap();
        txn.send(&[Request::put("b", "2"), Request::delete("a")]).unwrap();

        assert_eq!(
            txn.send(&[Request::get("a"), Request::get("b")]).unwrap(),
            vec![Response::Get(None), Response::Get(Some(Value::from("2")))]
        );
        assert_eq!(keys(&scan_all(txn.as_ref(), "a", "z", 0)), vec!["b"]);

        // Nothing is visible outside until commit.
        assert_eq!(keys(&store.dump()), vec!["a"]);
        txn.commit().unwrap();
        assert_eq!(keys(&store.dump()), vec!["b"]);
        assert_eq!(store.stats().commits.load(AtomicOrdering::Relaxed), 1);
    }

    #[test]
    fn test_transaction_failed_batch_keeps_earlier_writes() {
        let store = MemStore::new();
        let txn = store.begin().unwrap();
        txn.send(&[Request::put("a", "1")]).unwrap();
        txn.send(&[
            Request::put("b", "2"),
            Request::conditional_put("a", "x", None),
        ])
        .unwrap_err();
        txn.commit().unwrap();
        assert_eq!(keys(&store.dump()), vec!["a"]);
    }

    #[test]
    fn test_transaction_abort_and_drop() {
        let store = MemStore::new();

        let txn = store.begin().unwrap();
        txn.send(&[Request::put("a", "1")]).unwrap();
        txn.abort();

        {
            let txn = store.begin().unwrap();
            txn.send(&[Request::put("b", "1")]).unwrap();
        }

        assert!(store.is_empty());
        assert_eq!(store.stats().aborts.load(AtomicOrdering::Relaxed), 2);
    }

    #[test]
    fn test_transaction_ids_increase() {
        let store = MemStore::new();
        let a = store.begin().unwrap();
        let b = store.begin().unwrap();
        assert!(b.id() > a.id());
    }
}
