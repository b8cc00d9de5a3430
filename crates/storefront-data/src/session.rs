//! Per-unit-of-work staging state.
//!
//! Repository handles stage inserts, updates and deletes here. `save`
//! marks staged rows as flushed; outside a transaction the flushed set
//! publishes to the shared store immediately, inside one it publishes
//! on commit. A session always reads its own staged rows merged over
//! the committed state; other sessions never see them before publish.

use crate::store::{typed_table, typed_table_mut, MemoryStore, Tables};
use crate::{Entity, StoreError};
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// One staged change. `row: None` stages a delete. `base` is the
/// committed version the change was staged against (`None` = insert).
pub(crate) struct StagedRow<T> {
    pub(crate) row: Option<T>,
    pub(crate) base: Option<u64>,
    pub(crate) flushed: bool,
}

pub(crate) struct TypedOps<T: Entity> {
    pub(crate) staged: HashMap<String, StagedRow<T>>,
}

impl<T: Entity> TypedOps<T> {
    fn new() -> Self {
        Self {
            staged: HashMap::new(),
        }
    }
}

pub(crate) trait ErasedOps: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Mark all staged rows flushed; returns how many newly flushed.
    fn flush(&mut self) -> usize;
    fn has_flushed(&self) -> bool;
    /// Check every flushed row against the committed tables.
    fn validate(&self, tables: &Tables) -> Result<(), StoreError>;
    /// Publish flushed rows into the committed tables. Infallible once
    /// `validate` passed; returns the number of rows affected.
    fn apply(&mut self, tables: &mut Tables) -> usize;
    /// Drop flushed rows without publishing (rejected batch).
    fn discard_flushed(&mut self);
    /// Drop everything staged.
    fn clear(&mut self);
}

impl<T: Entity> ErasedOps for TypedOps<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn flush(&mut self) -> usize {
        let mut count = 0;
        for staged in self.staged.values_mut() {
            if !staged.flushed {
                staged.flushed = true;
                count += 1;
            }
        }
        count
    }

    fn has_flushed(&self) -> bool {
        self.staged.values().any(|s| s.flushed)
    }

    fn validate(&self, tables: &Tables) -> Result<(), StoreError> {
        let table = typed_table::<T>(tables);
        // Unique keys claimed by earlier rows of this same batch.
        let mut claimed: HashSet<String> = HashSet::new();
        for (key, staged) in &self.staged {
            if !staged.flushed {
                continue;
            }
            let Some(row) = &staged.row else {
                // Deletes tolerate a row that is already gone.
                continue;
            };
            match staged.base {
                None => {
                    if table.is_some_and(|t| t.rows.contains_key(key)) {
                        return Err(StoreError::DuplicateKey {
                            kind: T::KIND,
                            key: key.clone(),
                        });
                    }
                }
                Some(base) => {
                    let current = table.and_then(|t| t.rows.get(key));
                    if current.map(Entity::version) != Some(base) {
                        return Err(StoreError::VersionConflict {
                            kind: T::KIND,
                            key: key.clone(),
                        });
                    }
                }
            }
            if let Some(constraint) = row.unique_key() {
                let held_by_other = table
                    .and_then(|t| t.unique.get(&constraint))
                    .is_some_and(|owner| owner != key);
                if held_by_other || !claimed.insert(constraint.clone()) {
                    return Err(StoreError::UniqueViolation {
                        kind: T::KIND,
                        constraint,
                    });
                }
            }
        }
        Ok(())
    }

    fn apply(&mut self, tables: &mut Tables) -> usize {
        let table = typed_table_mut::<T>(tables);
        let keys: Vec<String> = self
            .staged
            .iter()
            .filter(|(_, s)| s.flushed)
            .map(|(k, _)| k.clone())
            .collect();
        let mut affected = 0;
        for key in keys {
            let Some(staged) = self.staged.remove(&key) else {
                continue;
            };
            match staged.row {
                Some(mut row) => {
                    if let Some(previous) = table.rows.get(&key).and_then(Entity::unique_key) {
                        table.unique.remove(&previous);
                    }
                    row.set_version(staged.base.map_or(1, |base| base + 1));
                    if let Some(constraint) = row.unique_key() {
                        table.unique.insert(constraint, key.clone());
                    }
                    table.rows.insert(key, row);
                    affected += 1;
                }
                None => {
                    if let Some(removed) = table.rows.remove(&key) {
                        if let Some(constraint) = removed.unique_key() {
                            table.unique.remove(&constraint);
                        }
                        affected += 1;
                    }
                }
            }
        }
        affected
    }

    fn discard_flushed(&mut self) {
        self.staged.retain(|_, s| !s.flushed);
    }

    fn clear(&mut self) {
        self.staged.clear();
    }
}

#[derive(Default)]
pub(crate) struct SessionState {
    ops: HashMap<TypeId, Box<dyn ErasedOps>>,
    tracked: HashMap<TypeId, HashSet<String>>,
    txn_open: bool,
}

impl SessionState {
    pub(crate) fn ops_mut<T: Entity>(&mut self) -> &mut TypedOps<T> {
        self.ops
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(TypedOps::<T>::new()))
            .as_any_mut()
            .downcast_mut()
            .expect("ops type matches its TypeId key")
    }

    pub(crate) fn ops_ref<T: Entity>(&self) -> Option<&TypedOps<T>> {
        self.ops
            .get(&TypeId::of::<T>())
            .and_then(|ops| ops.as_any().downcast_ref())
    }

    pub(crate) fn track<T: Entity>(&mut self, key: &str) {
        self.tracked
            .entry(TypeId::of::<T>())
            .or_default()
            .insert(key.to_string());
    }

    pub(crate) fn untrack<T: Entity>(&mut self, key: &str) {
        if let Some(set) = self.tracked.get_mut(&TypeId::of::<T>()) {
            set.remove(key);
        }
    }

    pub(crate) fn is_tracked<T: Entity>(&self, key: &str) -> bool {
        self.tracked
            .get(&TypeId::of::<T>())
            .is_some_and(|set| set.contains(key))
    }
}

/// One logical operation's private view over the shared store.
pub(crate) struct Session {
    store: MemoryStore,
    state: Mutex<SessionState>,
}

impl Session {
    pub(crate) fn new(store: MemoryStore) -> Self {
        Self {
            store,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub(crate) fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Flush everything staged; publish immediately unless a
    /// transaction is open. Returns the number of rows flushed.
    pub(crate) fn save(&self) -> Result<usize, StoreError> {
        let mut state = self.lock();
        let mut flushed = 0;
        for ops in state.ops.values_mut() {
            flushed += ops.flush();
        }
        if !state.txn_open {
            self.publish(&mut state)?;
        }
        Ok(flushed)
    }

    /// Publish all flushed rows atomically. Lock order is always
    /// session state first, then store tables.
    fn publish(&self, state: &mut SessionState) -> Result<usize, StoreError> {
        if !state.ops.values().any(|ops| ops.has_flushed()) {
            return Ok(0);
        }
        let mut tables = self.store.write_tables();
        let failure = state
            .ops
            .values()
            .find_map(|ops| ops.validate(&tables).err());
        if let Some(err) = failure {
            drop(tables);
            for ops in state.ops.values_mut() {
                ops.discard_flushed();
            }
            debug!(error = %err, "publish rejected, staged batch discarded");
            return Err(err);
        }
        let mut affected = 0;
        for ops in state.ops.values_mut() {
            affected += ops.apply(&mut tables);
        }
        debug!(affected, "published staged changes");
        Ok(affected)
    }

    pub(crate) fn begin_transaction(&self) -> Result<(), StoreError> {
        let mut state = self.lock();
        if state.txn_open {
            return Err(StoreError::TransactionActive);
        }
        state.txn_open = true;
        Ok(())
    }

    pub(crate) fn commit(&self) -> Result<(), StoreError> {
        let mut state = self.lock();
        let result = self.publish(&mut state);
        state.txn_open = false;
        if result.is_err() {
            for ops in state.ops.values_mut() {
                ops.clear();
            }
        }
        result.map(|_| ())
    }

    pub(crate) fn rollback(&self) {
        let mut state = self.lock();
        for ops in state.ops.values_mut() {
            ops.clear();
        }
        state.txn_open = false;
        debug!("transaction rolled back");
    }
}
