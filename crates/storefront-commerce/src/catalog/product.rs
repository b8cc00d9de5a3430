//! Product types.

use crate::error::CommerceError;
use crate::ids::{CategoryId, ProductId, PropertyId};
use crate::money::Money;
use serde::{Deserialize, Serialize};
use storefront_data::Entity;

/// A key/value attribute attached to a product (e.g. "RAM" / "32" GB),
/// kept in display order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpecialProperty {
    /// Unique property identifier.
    pub id: PropertyId,
    /// Attribute name.
    pub key: String,
    /// Attribute value.
    pub value: String,
    /// Optional numeric magnitude (e.g. 32 for "32 GB").
    pub size: Option<i64>,
    /// Optional unit for `size` (e.g. "GB").
    pub unit: Option<String>,
    /// Position in the product's property list.
    pub display_order: i32,
}

/// A product in the catalog.
///
/// Referenced, never owned, by cart, order, bundle and wishlist
/// entries; those keep their own price snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product name, unique case-insensitively.
    pub name: String,
    /// Full description.
    pub description: String,
    /// Manufacturer brand.
    pub brand: String,
    /// Current price. Always positive.
    pub price: Money,
    /// Units in stock. Never negative.
    pub stock_quantity: i64,
    /// Image reference.
    pub image_url: String,
    /// Owning category.
    pub category_id: CategoryId,
    /// Ordered special properties.
    pub special_properties: Vec<SpecialProperty>,
    /// Concurrency token maintained by the store.
    #[serde(default)]
    pub version: u64,
}

impl Entity for Product {
    const KIND: &'static str = "product";

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

/// Incoming special property on a create request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialPropertyAddRequest {
    pub key: String,
    pub value: String,
    pub size: Option<i64>,
    pub unit: Option<String>,
    pub display_order: i32,
}

impl SpecialPropertyAddRequest {
    fn validate(&self) -> Result<(), CommerceError> {
        if self.key.trim().is_empty() {
            return Err(CommerceError::validation("special property key must not be empty"));
        }
        Ok(())
    }

    pub(crate) fn into_property(self) -> SpecialProperty {
        SpecialProperty {
            id: PropertyId::generate(),
            key: self.key,
            value: self.value,
            size: self.size,
            unit: self.unit,
            display_order: self.display_order,
        }
    }
}

/// Request to create a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductAddRequest {
    pub name: String,
    pub description: String,
    pub brand: String,
    pub price: Money,
    pub stock_quantity: i64,
    pub image_url: String,
    pub category_id: CategoryId,
    #[serde(default)]
    pub special_properties: Vec<SpecialPropertyAddRequest>,
}

impl ProductAddRequest {
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.name.trim().is_empty() {
            return Err(CommerceError::validation("product name must not be empty"));
        }
        if !self.price.is_positive() {
            return Err(CommerceError::validation("product price must be positive"));
        }
        if self.stock_quantity < 0 {
            return Err(CommerceError::validation("stock quantity must not be negative"));
        }
        if self.category_id.is_empty() {
            return Err(CommerceError::validation("category id must not be empty"));
        }
        for property in &self.special_properties {
            property.validate()?;
        }
        Ok(())
    }
}

/// Incoming special property on an update request. Records without an
/// id (or with an unknown id) are inserted as new properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialPropertyUpdateRequest {
    pub id: Option<PropertyId>,
    pub key: String,
    pub value: String,
    pub size: Option<i64>,
    pub unit: Option<String>,
    pub display_order: i32,
}

/// Request to update a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdateRequest {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub brand: String,
    pub price: Money,
    pub stock_quantity: i64,
    pub image_url: String,
    pub category_id: CategoryId,
    #[serde(default)]
    pub special_properties: Vec<SpecialPropertyUpdateRequest>,
}

impl ProductUpdateRequest {
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.id.is_empty() {
            return Err(CommerceError::validation("product id must not be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(CommerceError::validation("product name must not be empty"));
        }
        if !self.price.is_positive() {
            return Err(CommerceError::validation("product price must be positive"));
        }
        if self.stock_quantity < 0 {
            return Err(CommerceError::validation("stock quantity must not be negative"));
        }
        for property in &self.special_properties {
            if property.key.trim().is_empty() {
                return Err(CommerceError::validation("special property key must not be empty"));
            }
        }
        Ok(())
    }
}

/// Special property as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpecialPropertyResponse {
    pub id: PropertyId,
    pub key: String,
    pub value: String,
    pub size: Option<i64>,
    pub unit: Option<String>,
    pub display_order: i32,
}

impl From<SpecialProperty> for SpecialPropertyResponse {
    fn from(property: SpecialProperty) -> Self {
        Self {
            id: property.id,
            key: property.key,
            value: property.value,
            size: property.size,
            unit: property.unit,
            display_order: property.display_order,
        }
    }
}

/// Product as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub brand: String,
    pub price: Money,
    pub stock_quantity: i64,
    pub image_url: String,
    pub category_id: CategoryId,
    /// Resolved category name, when the category still exists.
    pub category_name: Option<String>,
    pub special_properties: Vec<SpecialPropertyResponse>,
}

impl ProductResponse {
    pub(crate) fn from_product(product: Product, category_name: Option<String>) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            brand: product.brand,
            price: product.price,
            stock_quantity: product.stock_quantity,
            image_url: product.image_url,
            category_id: product.category_id,
            category_name,
            special_properties: product
                .special_properties
                .into_iter()
                .map(SpecialPropertyResponse::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn request() -> ProductAddRequest {
        ProductAddRequest {
            name: "DDR5 RAM".into(),
            description: "32 GB kit".into(),
            brand: "Acme".into(),
            price: Money::new(12999, Currency::USD),
            stock_quantity: 40,
            image_url: "ram.png".into(),
            category_id: CategoryId::new("cat-1"),
            special_properties: vec![SpecialPropertyAddRequest {
                key: "Capacity".into(),
                value: "32".into(),
                size: Some(32),
                unit: Some("GB".into()),
                display_order: 0,
            }],
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let mut bad = request();
        bad.price = Money::new(0, Currency::USD);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_negative_stock_rejected() {
        let mut bad = request();
        bad.stock_quantity = -1;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_empty_property_key_rejected() {
        let mut bad = request();
        bad.special_properties[0].key = " ".into();
        assert!(bad.validate().is_err());
    }
}
