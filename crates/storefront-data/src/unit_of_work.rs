//! Transaction control and repository scope for one logical operation.

use crate::session::Session;
use crate::store::MemoryStore;
use crate::{Entity, Repository, StoreError};
use std::sync::Arc;
use tracing::debug;

/// Coordinates one set of repositories and at most one transaction for
/// a single logical operation (typically one inbound request).
///
/// Not for sharing across concurrent operations: create one per
/// operation and drop it when the operation ends. Dropping discards
/// any staged work that was never published.
pub struct UnitOfWork {
    session: Arc<Session>,
}

impl UnitOfWork {
    /// Open a unit of work over the given store.
    pub fn new(store: MemoryStore) -> Self {
        Self {
            session: Arc::new(Session::new(store)),
        }
    }

    /// The repository for entity type `T`. Handles are memoized by
    /// construction: every handle for the same type shares this unit
    /// of work's staged-change set, so services composing several
    /// repositories all see one another's pending writes.
    pub fn repository<T: Entity>(&self) -> Repository<T> {
        Repository::new(self.session.clone())
    }

    /// Start an explicit transaction. Staged changes flushed while the
    /// transaction is open publish only on [`Transaction::commit`].
    ///
    /// Nesting is not supported: a second call while a transaction is
    /// open fails fast with [`StoreError::TransactionActive`].
    pub async fn begin_transaction(&self) -> Result<Transaction, StoreError> {
        self.session.begin_transaction()?;
        debug!("transaction opened");
        Ok(Transaction {
            session: self.session.clone(),
            finished: false,
        })
    }

    /// Flush all staged changes across all repositories. Returns the
    /// number of rows flushed by this call.
    pub async fn complete(&self) -> Result<usize, StoreError> {
        self.session.save()
    }
}

/// Handle to an open transaction.
///
/// Dropping the handle without committing rolls the transaction back,
/// which is what keeps `?`-propagation honest: any error path that
/// unwinds past the handle leaves no partial writes behind.
#[must_use = "an uncommitted transaction rolls back on drop"]
pub struct Transaction {
    session: Arc<Session>,
    finished: bool,
}

impl Transaction {
    /// Publish everything flushed since the transaction opened.
    pub async fn commit(mut self) -> Result<(), StoreError> {
        self.finished = true;
        self.session.commit()?;
        debug!("transaction committed");
        Ok(())
    }

    /// Discard everything staged since the transaction opened.
    pub async fn rollback(mut self) {
        self.finished = true;
        self.session.rollback();
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if !self.finished {
            self.session.rollback();
            debug!("transaction dropped without commit, rolled back");
        }
    }
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
