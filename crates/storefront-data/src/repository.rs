//! Generic entity repository.

use crate::session::{Session, SessionState, StagedRow};
use crate::store::typed_table;
use crate::{Entity, Page, Query, StoreError};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// CRUD and query surface for one entity type, bound to the unit of
/// work that minted it. Handles are cheap to clone; every handle for
/// the same entity type shares the same staged-change set.
pub struct Repository<T: Entity> {
    session: Arc<Session>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Entity> Repository<T> {
    pub(crate) fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            _marker: PhantomData,
        }
    }

    /// One row as this session sees it: its own staged copy if any,
    /// the committed copy otherwise.
    fn lookup(&self, state: &SessionState, key: &str) -> Option<T> {
        if let Some(staged) = state.ops_ref::<T>().and_then(|ops| ops.staged.get(key)) {
            return staged.row.clone();
        }
        let tables = self.session.store().read_tables();
        typed_table::<T>(&tables).and_then(|table| table.rows.get(key).cloned())
    }

    /// Committed rows overlaid with this session's staged changes,
    /// ordered by primary key.
    fn merged_rows(&self, state: &SessionState) -> Vec<T> {
        let mut map: HashMap<String, T> = {
            let tables = self.session.store().read_tables();
            typed_table::<T>(&tables)
                .map(|table| table.rows.clone())
                .unwrap_or_default()
        };
        if let Some(ops) = state.ops_ref::<T>() {
            for (key, staged) in &ops.staged {
                match &staged.row {
                    Some(row) => {
                        map.insert(key.clone(), row.clone());
                    }
                    None => {
                        map.remove(key);
                    }
                }
            }
        }
        let mut rows: Vec<T> = map.into_values().collect();
        rows.sort_by(|a, b| a.key().cmp(b.key()));
        rows
    }

    /// Fetch a page of rows. Never mutates state.
    pub async fn get_all(&self, query: Query<T>) -> Result<Page<T>, StoreError> {
        query.validate()?;
        let mut state = self.session.lock();
        let mut rows = self.merged_rows(&state);
        if let Some(filter) = query.filter_ref() {
            rows.retain(|row| filter(row));
        }
        if let Some(cmp) = query.order_ref() {
            rows.sort_by(|a, b| cmp(a, b));
        }
        let start = (query.page_index() - 1) * query.page_size();
        let items: Vec<T> = rows.into_iter().skip(start).take(query.page_size()).collect();
        for item in &items {
            state.track::<T>(item.key());
        }
        Ok(Page {
            items,
            page_index: query.page_index(),
            page_size: query.page_size(),
        })
    }

    /// First row matching the filter, tracked for later mutation.
    pub async fn get_one(&self, filter: impl Fn(&T) -> bool) -> Result<Option<T>, StoreError> {
        let mut state = self.session.lock();
        let found = self.merged_rows(&state).into_iter().find(|row| filter(row));
        if let Some(row) = &found {
            state.track::<T>(row.key());
        }
        Ok(found)
    }

    /// First row matching the filter, as a read-only snapshot. Passing
    /// a snapshot to [`Repository::update`] fails with
    /// [`StoreError::Detached`].
    pub async fn snapshot_one(&self, filter: impl Fn(&T) -> bool) -> Result<Option<T>, StoreError> {
        let state = self.session.lock();
        Ok(self.merged_rows(&state).into_iter().find(|row| filter(row)))
    }

    /// Count rows matching the filter.
    pub async fn count(&self, filter: impl Fn(&T) -> bool) -> Result<usize, StoreError> {
        let state = self.session.lock();
        Ok(self
            .merged_rows(&state)
            .into_iter()
            .filter(|row| filter(row))
            .count())
    }

    /// Stage an insert and flush. The row becomes visible to other
    /// units of work only once published (immediately outside a
    /// transaction, on commit inside one).
    pub async fn create(&self, entity: T) -> Result<T, StoreError> {
        {
            let mut state = self.session.lock();
            let key = entity.key().to_string();
            state.track::<T>(&key);
            state.ops_mut::<T>().staged.insert(
                key,
                StagedRow {
                    row: Some(entity.clone()),
                    base: None,
                    flushed: false,
                },
            );
        }
        self.session.save()?;
        debug!(kind = T::KIND, key = entity.key(), "created row");
        // Return the post-save view so the caller's copy carries the
        // version the store assigned (published rows start at 1).
        let state = self.session.lock();
        Ok(self.lookup(&state, entity.key()).unwrap_or(entity))
    }

    /// Stage an update of a tracked row and flush. The row must have
    /// been read through [`Repository::get_one`] / [`Repository::get_all`]
    /// (or created) by this unit of work.
    pub async fn update(&self, entity: T) -> Result<T, StoreError> {
        {
            let mut state = self.session.lock();
            let key = entity.key().to_string();
            if !state.is_tracked::<T>(&key) {
                return Err(StoreError::Detached { kind: T::KIND, key });
            }
            let ops = state.ops_mut::<T>();
            // An update of a staged insert stays an insert.
            let base = match ops.staged.get(&key) {
                Some(staged) => staged.base,
                None => Some(entity.version()),
            };
            ops.staged.insert(
                key,
                StagedRow {
                    row: Some(entity.clone()),
                    base,
                    flushed: false,
                },
            );
        }
        self.session.save()?;
        let state = self.session.lock();
        Ok(self.lookup(&state, entity.key()).unwrap_or(entity))
    }

    /// Stage a delete and flush. Returns `false` when the row is
    /// already gone (lost-update race), `true` otherwise.
    pub async fn delete(&self, entity: &T) -> Result<bool, StoreError> {
        let key = entity.key().to_string();
        {
            let mut state = self.session.lock();
            let committed = {
                let tables = self.session.store().read_tables();
                typed_table::<T>(&tables).is_some_and(|t| t.rows.contains_key(&key))
            };
            let exists = match state.ops_ref::<T>().and_then(|ops| ops.staged.get(&key)) {
                Some(staged) => staged.row.is_some(),
                None => committed,
            };
            if !exists {
                return Ok(false);
            }
            state.ops_mut::<T>().staged.insert(
                key.clone(),
                StagedRow {
                    row: None,
                    base: None,
                    flushed: false,
                },
            );
            state.untrack::<T>(&key);
        }
        self.session.save()?;
        debug!(kind = T::KIND, key = %key, "deleted row");
        Ok(true)
    }

    /// Bulk insert, followed by an implicit flush.
    pub async fn add_range(&self, entities: Vec<T>) -> Result<(), StoreError> {
        {
            let mut state = self.session.lock();
            for entity in entities {
                let key = entity.key().to_string();
                state.track::<T>(&key);
                state.ops_mut::<T>().staged.insert(
                    key,
                    StagedRow {
                        row: Some(entity),
                        base: None,
                        flushed: false,
                    },
                );
            }
        }
        self.session.save()?;
        Ok(())
    }

    /// Bulk delete, followed by an implicit flush. Rows already gone
    /// are skipped silently.
    pub async fn remove_range(&self, entities: Vec<T>) -> Result<(), StoreError> {
        {
            let mut state = self.session.lock();
            for entity in &entities {
                let key = entity.key().to_string();
                state.ops_mut::<T>().staged.insert(
                    key.clone(),
                    StagedRow {
                        row: None,
                        base: None,
                        flushed: false,
                    },
                );
                state.untrack::<T>(&key);
            }
        }
        self.session.save()?;
        Ok(())
    }

    /// Drop mutation tracking for a row, along with any staged change
    /// for it that has not been flushed yet.
    pub async fn detach(&self, entity: &T) {
        let mut state = self.session.lock();
        let key = entity.key();
        let ops = state.ops_mut::<T>();
        if ops.staged.get(key).is_some_and(|staged| !staged.flushed) {
            ops.staged.remove(key);
        }
        state.untrack::<T>(key);
    }

    /// Flush staged changes for the whole unit of work (flushing is
    /// global, exactly like completing the unit of work).
    pub async fn save(&self) -> Result<usize, StoreError> {
        self.session.save()
    }
}
