//! The shared in-memory backend.
//!
//! Committed rows live in one type-erased table per entity type, all
//! behind a single `RwLock`. Sessions stage changes privately and
//! publish them here; publishing is validate-then-apply under the write
//! lock, so a rejected batch leaves the committed state untouched.

use crate::Entity;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub(crate) trait ErasedTable: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Committed rows of one entity type plus its unique-key index.
pub(crate) struct TypedTable<T: Entity> {
    pub(crate) rows: HashMap<String, T>,
    /// unique key -> primary key of the row holding it.
    pub(crate) unique: HashMap<String, String>,
}

impl<T: Entity> TypedTable<T> {
    fn new() -> Self {
        Self {
            rows: HashMap::new(),
            unique: HashMap::new(),
        }
    }
}

impl<T: Entity> ErasedTable for TypedTable<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub(crate) type Tables = HashMap<TypeId, Box<dyn ErasedTable>>;

pub(crate) fn typed_table<T: Entity>(tables: &Tables) -> Option<&TypedTable<T>> {
    tables
        .get(&TypeId::of::<T>())
        .and_then(|table| table.as_any().downcast_ref())
}

pub(crate) fn typed_table_mut<T: Entity>(tables: &mut Tables) -> &mut TypedTable<T> {
    tables
        .entry(TypeId::of::<T>())
        .or_insert_with(|| Box::new(TypedTable::<T>::new()))
        .as_any_mut()
        .downcast_mut()
        .expect("table type matches its TypeId key")
}

/// Handle to the shared committed state. Cheap to clone; every clone
/// sees the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // Lock poisoning only means another thread panicked mid-read;
    // publish is validate-then-apply, so the tables are still coherent.
    pub(crate) fn read_tables(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write_tables(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.read_tables();
        f.debug_struct("MemoryStore")
            .field("entity_types", &tables.len())
            .finish()
    }
}
