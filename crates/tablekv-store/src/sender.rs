//! Traits through which requests reach a store.

use crate::error::StoreResult;
use crate::request::{Request, Response};

/// Executes batches of requests in one round trip.
///
/// A batch is atomic: if any request fails, none of its writes apply and
/// the first error is returned. On success there is exactly one response
/// per request, in request order.
pub trait Sender {
    /// Sends a batch of requests.
    fn send(&self, requests: &[Request]) -> StoreResult<Vec<Response>>;
}

/// A store that can also run transactions.
pub trait Store: Sender + Send + Sync {
    /// Begins a transaction.
    fn begin(&self) -> StoreResult<Box<dyn Transaction>>;
}

/// A transaction handle.
///
/// Writes sent through the transaction are buffered and visible to its own
/// later reads. They apply atomically on [`commit`](Transaction::commit);
/// dropping the handle without committing discards them.
pub trait Transaction: Sender + Send {
    /// Returns the transaction ID.
    fn id(&self) -> u64;

    /// Applies the buffered writes.
    fn commit(self: Box<Self>) -> StoreResult<()>;

    /// Discards the buffered writes.
    fn abort(self: Box<Self>);
}
