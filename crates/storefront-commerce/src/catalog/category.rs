//! Category types.

use crate::error::CommerceError;
use crate::ids::CategoryId;
use serde::{Deserialize, Serialize};
use storefront_data::Entity;

/// Shortest allowed category name.
pub const CATEGORY_NAME_MIN: usize = 3;
/// Longest allowed category name.
pub const CATEGORY_NAME_MAX: usize = 20;

/// A product category. Names are unique, case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// Category name (3–20 characters).
    pub name: String,
    /// Concurrency token maintained by the store.
    #[serde(default)]
    pub version: u64,
}

impl Category {
    /// Create a new category.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CategoryId::generate(),
            name: name.into(),
            version: 0,
        }
    }
}

impl Entity for Category {
    const KIND: &'static str = "category";

    fn key(&self) -> &str {
        self.id.as_str()
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.name.to_lowercase())
    }
}

fn validate_name(name: &str) -> Result<(), CommerceError> {
    let length = name.chars().count();
    if !(CATEGORY_NAME_MIN..=CATEGORY_NAME_MAX).contains(&length) {
        return Err(CommerceError::validation(format!(
            "category name must be {CATEGORY_NAME_MIN}-{CATEGORY_NAME_MAX} characters, got {length}"
        )));
    }
    Ok(())
}

/// Request to create a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryAddRequest {
    pub name: String,
}

impl CategoryAddRequest {
    pub fn validate(&self) -> Result<(), CommerceError> {
        validate_name(&self.name)
    }
}

/// Request to rename a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryUpdateRequest {
    pub id: CategoryId,
    pub name: String,
}

impl CategoryUpdateRequest {
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.id.is_empty() {
            return Err(CommerceError::validation("category id must not be empty"));
        }
        validate_name(&self.name)
    }
}

/// Category as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub name: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_length_bounds() {
        let too_short = CategoryAddRequest { name: "ab".into() };
        assert!(too_short.validate().is_err());

        let too_long = CategoryAddRequest {
            name: "a".repeat(21),
        };
        assert!(too_long.validate().is_err());

        let ok = CategoryAddRequest { name: "Laptops".into() };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_unique_key_is_case_insensitive() {
        let a = Category::new("Laptops");
        let b = Category::new("laptops");
        assert_eq!(a.unique_key(), b.unique_key());
    }
}
