//! Storage error types.

use thiserror::Error;

/// Errors surfaced by the repository and unit-of-work layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Page bounds were out of range (index is 1-based, size must be >= 1).
    #[error("invalid page bounds: index {index}, size {size}")]
    InvalidPage { index: usize, size: usize },

    /// An insert collided with an existing primary key.
    #[error("{kind} already exists: {key}")]
    DuplicateKey { kind: &'static str, key: String },

    /// A staged row violated a unique constraint.
    #[error("{kind} unique constraint violated: {constraint}")]
    UniqueViolation {
        kind: &'static str,
        constraint: String,
    },

    /// The row changed (or disappeared) since this unit of work read it.
    #[error("{kind} was modified concurrently: {key}")]
    VersionConflict { kind: &'static str, key: String },

    /// An update was staged for a row this unit of work never tracked.
    #[error("{kind} is not tracked by this unit of work: {key}")]
    Detached { kind: &'static str, key: String },

    /// `begin_transaction` was called while a transaction was open.
    #[error("a transaction is already open on this unit of work")]
    TransactionActive,
}
