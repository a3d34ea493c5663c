//! # tablekv-store
//!
//! The key-value primitives tablekv is built on, and an in-memory store
//! that implements them.
//!
//! - **Requests**: `Get`, `Put`, `ConditionalPut`, `Increment`, `Scan` and
//!   `Delete`, each with a matching `Response`
//! - **Senders**: a [`Sender`] executes a slice of requests in one round trip;
//!   a [`Store`] can also begin a [`Transaction`]
//! - **MemStore**: a sorted in-memory store with atomic batches and buffered
//!   transactions
//!
//! ## Example
//!
//! ```rust
//! use tablekv_common::types::{Key, Value};
//! use tablekv_store::{MemStore, Request, Response, Sender};
//!
//! let store = MemStore::new();
//! let key = Key::from("a");
//! let responses = store
//!     .send(&[
//!         Request::put(key.clone(), Value::Integer(1)),
//!         Request::get(key),
//!     ])
//!     .unwrap();
//! assert_eq!(responses[1], Response::Get(Some(Value::Integer(1))));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
mod memory;
mod request;
mod sender;

pub use config::MemStoreConfig;
pub use error::{StoreError, StoreResult};
pub use memory::{MemStore, MemTxn, StoreStats};
pub use request::{Request, Response};
pub use sender::{Sender, Store, Transaction};
