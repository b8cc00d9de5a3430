//! Storage-agnostic repository and unit-of-work layer for the storefront.
//!
//! Services never talk to a storage engine directly. They open a
//! [`UnitOfWork`] per logical operation, mint one [`Repository`] handle
//! per entity type, and stage reads and writes through it. Multi-step
//! mutations wrap the whole sequence in an explicit [`Transaction`]:
//! nothing staged inside the transaction is observable by any other
//! unit of work until commit.
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_data::{MemoryStore, Query, UnitOfWork};
//!
//! let store = MemoryStore::new();
//! let uow = UnitOfWork::new(store.clone());
//!
//! let tx = uow.begin_transaction().await?;
//! let carts = uow.repository::<Cart>();
//! let cart = carts.get_one(|c| c.user_id == user_id).await?;
//! // ... stage changes ...
//! uow.complete().await?;
//! tx.commit().await?;
//! ```
//!
//! The bundled backend is [`MemoryStore`]: committed tables behind one
//! lock, validate-then-apply publishing, per-row version tokens and
//! unique constraints. A SQL engine would slot in behind the same
//! contract.

mod entity;
mod error;
mod query;
mod repository;
mod session;
mod store;
mod unit_of_work;

pub use entity::Entity;
pub use error::StoreError;
pub use query::{Page, Query, DEFAULT_PAGE_INDEX, DEFAULT_PAGE_SIZE};
pub use repository::Repository;
pub use store::MemoryStore;
pub use unit_of_work::{Transaction, UnitOfWork};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Entity, MemoryStore, Page, Query, Repository, StoreError, UnitOfWork};
}
