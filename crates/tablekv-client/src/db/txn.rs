//! Transaction handle.

use tablekv_store::Transaction;

use super::{Db, Runner};
use crate::batch::Batch;
use crate::error::ClientResult;
use crate::model::ModelRegistry;

/// A transaction, handed to the body passed to [`Db::txn`].
///
/// Batches run through the handle see each other's writes; nothing is
/// visible outside the transaction until it commits.
pub struct Txn<'db> {
    db: &'db Db,
    handle: Box<dyn Transaction>,
}

impl<'db> Txn<'db> {
    pub(super) fn new(db: &'db Db, handle: Box<dyn Transaction>) -> Self {
        Self { db, handle }
    }

    /// Returns the transaction ID.
    pub fn id(&self) -> u64 {
        self.handle.id()
    }

    /// Returns the database this transaction belongs to.
    pub fn db(&self) -> &'db Db {
        self.db
    }

    pub(super) fn commit(self) -> ClientResult<()> {
        self.handle.commit()?;
        Ok(())
    }

    pub(super) fn abort(self) {
        self.handle.abort();
    }
}

impl Runner for Txn<'_> {
    fn registry(&self) -> &ModelRegistry {
        &self.db.registry
    }

    fn run(&self, batch: &mut Batch<'_>) -> ClientResult<()> {
        batch.submit(self.handle.as_ref(), self.db.config.max_batch_calls)
    }
}
