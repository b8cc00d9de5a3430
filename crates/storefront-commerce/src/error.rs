//! Commerce error types.

use storefront_data::StoreError;
use thiserror::Error;

/// Errors surfaced by the aggregate services.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// A referenced aggregate or child record does not exist.
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// A uniqueness rule was violated (duplicate name, duplicate
    /// wishlist entry, second per-user singleton).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Malformed input: empty required field, non-positive quantity or
    /// price, empty identifier.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A batch operation failed for every item. Batches with at least
    /// one success report their failures instead of raising this.
    #[error("batch failed: all {failed} item(s) failed")]
    PartialFailure { failed: usize },

    /// The storage layer failed; the enclosing transaction was rolled
    /// back. Never retried by the services.
    #[error("storage failure: {0}")]
    Store(StoreError),
}

impl CommerceError {
    /// Shorthand for a not-found error.
    pub fn not_found(kind: &'static str, key: impl std::fmt::Display) -> Self {
        CommerceError::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    /// Shorthand for a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        CommerceError::Validation(message.into())
    }
}

impl From<StoreError> for CommerceError {
    fn from(err: StoreError) -> Self {
        match err {
            // Storage-level constraint hits surface as conflicts so
            // callers see one taxonomy.
            StoreError::UniqueViolation { .. }
            | StoreError::DuplicateKey { .. }
            | StoreError::VersionConflict { .. } => CommerceError::Conflict(err.to_string()),
            other => CommerceError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        let err = CommerceError::from(StoreError::UniqueViolation {
            kind: "cart",
            constraint: "user:u1".to_string(),
        });
        assert!(matches!(err, CommerceError::Conflict(_)));
    }

    #[test]
    fn test_invalid_page_stays_transient() {
        let err = CommerceError::from(StoreError::InvalidPage { index: 0, size: 10 });
        assert!(matches!(err, CommerceError::Store(_)));
    }
}
