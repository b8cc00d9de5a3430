//! Newtype IDs for type-safe identifiers.
//!
//! Using newtypes prevents accidentally mixing up different ID types,
//! e.g., passing a `ProductId` where a `CategoryId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Create an ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh random ID.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the ID carries no value.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(CategoryId);
define_id!(PropertyId);
define_id!(BundleId);
define_id!(BundleItemId);
define_id!(CartId);
define_id!(CartItemId);
define_id!(WishlistId);
define_id!(WishlistItemId);
define_id!(OrderId);
define_id!(OrderItemId);
define_id!(UserId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = ProductId::new("prod-123");
        assert_eq!(id.as_str(), "prod-123");
    }

    #[test]
    fn test_id_generation_is_unique() {
        let id1 = CartId::generate();
        let id2 = CartId::generate();
        assert_ne!(id1, id2);
        assert!(!id1.is_empty());
    }

    #[test]
    fn test_id_display() {
        let id = OrderId::new("ord-7");
        assert_eq!(format!("{}", id), "ord-7");
    }

    #[test]
    fn test_id_from_str() {
        let id: UserId = "user-1".into();
        assert_eq!(id.as_str(), "user-1");
    }
}
