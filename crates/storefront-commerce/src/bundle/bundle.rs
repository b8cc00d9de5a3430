//! Bundle types.

use crate::error::CommerceError;
use crate::ids::{BundleId, BundleItemId, ProductId};
use crate::money::Money;
use serde::{Deserialize, Serialize};
use storefront_data::Entity;

/// One product in a bundle, with its own quantity and unit price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BundleItem {
    /// Unique item identifier.
    pub id: BundleItemId,
    /// The product this line refers to (not owned by the bundle).
    pub product_id: ProductId,
    /// How many units of the product the bundle contains. At least 1.
    pub quantity: i64,
    /// Per-unit price inside the bundle. Always positive.
    pub unit_price: Money,
}

/// A curated set of products sold together. Names are unique,
/// case-insensitively, and a bundle always holds at least one item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bundle {
    /// Unique bundle identifier.
    pub id: BundleId,
    /// Bundle name.
    pub name: String,
    /// Marketing description.
    pub description: String,
    /// Price of the whole bundle.
    pub price: Money,
    /// Image reference.
    pub image_url: String,
    /// Items in the bundle.
    pub items: Vec<BundleItem>,
    /// Concurrency token maintained by the store.
    #[serde(default)]
    pub version: u64,
}

impl Bundle {
    /// Find the item for a product.
    pub fn find_item(&self, product_id: &ProductId) -> Option<&BundleItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }
}

impl Entity for Bundle {
    const KIND: &'static str = "bundle";

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

/// Incoming bundle item. Used by create and update; update matches
/// against stored items by product id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleItemRequest {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
}

impl BundleItemRequest {
    fn validate(&self) -> Result<(), CommerceError> {
        if self.product_id.is_empty() {
            return Err(CommerceError::validation("bundle item product id must not be empty"));
        }
        if self.quantity < 1 {
            return Err(CommerceError::validation("bundle item quantity must be at least 1"));
        }
        if !self.unit_price.is_positive() {
            return Err(CommerceError::validation("bundle item unit price must be positive"));
        }
        Ok(())
    }
}

/// Request to create a bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleAddRequest {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub image_url: String,
    pub items: Vec<BundleItemRequest>,
}

impl BundleAddRequest {
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.name.trim().is_empty() {
            return Err(CommerceError::validation("bundle name must not be empty"));
        }
        if self.items.is_empty() {
            return Err(CommerceError::validation("bundle must contain at least one item"));
        }
        for item in &self.items {
            item.validate()?;
        }
        Ok(())
    }
}

/// Request to update a bundle. Items match stored items by product id;
/// stored items omitted from the request are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleUpdateRequest {
    pub id: BundleId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub image_url: String,
    pub items: Vec<BundleItemRequest>,
}

impl BundleUpdateRequest {
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.id.is_empty() {
            return Err(CommerceError::validation("bundle id must not be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(CommerceError::validation("bundle name must not be empty"));
        }
        for item in &self.items {
            item.validate()?;
        }
        Ok(())
    }
}

/// Bundle item as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BundleItemResponse {
    pub id: BundleItemId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
}

impl From<BundleItem> for BundleItemResponse {
    fn from(item: BundleItem) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

/// Bundle as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BundleResponse {
    pub id: BundleId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub image_url: String,
    pub items: Vec<BundleItemResponse>,
}

impl From<Bundle> for BundleResponse {
    fn from(bundle: Bundle) -> Self {
        Self {
            id: bundle.id,
            name: bundle.name,
            description: bundle.description,
            price: bundle.price,
            image_url: bundle.image_url,
            items: bundle.items.into_iter().map(BundleItemResponse::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn request() -> BundleAddRequest {
        BundleAddRequest {
            name: "Starter kit".into(),
            description: "Everything to get going".into(),
            price: Money::new(19999, Currency::USD),
            image_url: "kit.png".into(),
            items: vec![BundleItemRequest {
                product_id: ProductId::new("p1"),
                quantity: 2,
                unit_price: Money::new(4999, Currency::USD),
            }],
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_empty_item_list_rejected() {
        let mut bad = request();
        bad.items.clear();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut bad = request();
        bad.items[0].quantity = 0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_non_positive_unit_price_rejected() {
        let mut bad = request();
        bad.items[0].unit_price = Money::new(0, Currency::USD);
        assert!(bad.validate().is_err());
    }
}
