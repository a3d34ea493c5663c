//! Shared helpers for the tablekv-client integration tests.

#![allow(dead_code)]

use tablekv_client::{record, Db};
use tablekv_store::MemStore;
use tracing_subscriber::EnvFilter;

/// Installs a test subscriber honoring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A plain key/value row.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Kv {
    pub k: String,
    pub v: String,
}

record!(Kv { k, v });

impl Kv {
    pub fn new(k: &str, v: &str) -> Self {
        Self {
            k: k.to_string(),
            v: v.to_string(),
        }
    }

    pub fn key(k: &str) -> Self {
        Self::new(k, "")
    }
}

/// A row with a composite primary key.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Account {
    pub region: String,
    pub id: i64,
    pub owner: String,
    pub balance: i64,
    pub frozen: bool,
}

record!(Account { region, id, owner, balance, frozen });

impl Account {
    pub fn new(region: &str, id: i64, owner: &str, balance: i64) -> Self {
        Self {
            region: region.to_string(),
            id,
            owner: owner.to_string(),
            balance,
            frozen: false,
        }
    }

    pub fn key(region: &str, id: i64) -> Self {
        Self {
            region: region.to_string(),
            id,
            ..Self::default()
        }
    }
}

/// Returns a database over a fresh store with `Kv` bound to `kv` and
/// `Account` bound to `accounts`.
pub fn setup() -> Db {
    init_tracing();
    let db = Db::new(MemStore::new());
    db.bind_model::<Kv>("kv", &["k"]).unwrap();
    db.bind_model::<Account>("accounts", &["region", "id"]).unwrap();
    db
}
