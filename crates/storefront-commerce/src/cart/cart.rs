//! Cart and cart item types.

use crate::error::CommerceError;
use crate::ids::{CartId, CartItemId, ProductId, UserId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use storefront_data::Entity;

/// One product in a cart, with the price snapshotted when it was first
/// added.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// Unique item identifier.
    pub id: CartItemId,
    /// The product this line refers to (not owned by the cart).
    pub product_id: ProductId,
    /// Quantity. Always at least 1 while the item exists.
    pub quantity: i64,
    /// Price snapshot taken at insertion time.
    pub unit_price: Money,
}

impl CartItem {
    /// quantity × unit price, `None` on overflow.
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.try_multiply(self.quantity)
    }
}

/// A user's shopping cart. One per user; items hold at most one entry
/// per product; repeated adds accumulate quantity instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    /// Unique cart identifier.
    pub id: CartId,
    /// Owning user.
    pub user_id: UserId,
    /// Items in the cart.
    pub items: Vec<CartItem>,
    /// Concurrency token maintained by the store.
    #[serde(default)]
    pub version: u64,
}

impl Cart {
    /// Create an empty cart for a user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            id: CartId::generate(),
            user_id,
            items: Vec::new(),
            version: 0,
        }
    }

    /// Find the item for a product.
    pub fn find_item(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }

    /// Whether the cart holds the product.
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.find_item(product_id).is_some()
    }

    /// Add a quantity of a product. An existing item accumulates; a
    /// new item snapshots the given unit price.
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        quantity: i64,
        unit_price: Money,
    ) -> Result<(), CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::validation("quantity must be greater than zero"));
        }
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            existing.quantity = existing
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| CommerceError::validation("quantity overflow"))?;
            return Ok(());
        }
        self.items.push(CartItem {
            id: CartItemId::generate(),
            product_id,
            quantity,
            unit_price,
        });
        Ok(())
    }

    /// Set an item's quantity exactly. Zero or negative removes the
    /// item. Returns `false` when the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_item(product_id);
        }
        match self.items.iter_mut().find(|i| &i.product_id == product_id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove an item. Returns `false` when the product is not in the
    /// cart.
    pub fn remove_item(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.product_id != product_id);
        self.items.len() < before
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of quantities across all items.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Whether the cart holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantity × unit price over all items. Computed on read,
    /// never stored.
    pub fn subtotal(&self) -> Result<Money, CommerceError> {
        let currency = self
            .items
            .first()
            .map(|item| item.unit_price.currency)
            .unwrap_or(Currency::USD);
        let mut total = Money::zero(currency);
        for item in &self.items {
            let line = item
                .line_total()
                .ok_or_else(|| CommerceError::validation("cart subtotal overflow"))?;
            total = total
                .try_add(&line)
                .ok_or_else(|| CommerceError::validation("cart subtotal overflow"))?;
        }
        Ok(total)
    }
}

impl Entity for Cart {
    const KIND: &'static str = "cart";

    fn key(&self) -> &str {
        self.id.as_str()
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    // One cart per user, enforced by the store.
    fn unique_key(&self) -> Option<String> {
        Some(format!("user:{}", self.user_id))
    }
}

/// Cart item as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItemResponse {
    pub id: CartItemId,
    pub product_id: ProductId,
    /// Resolved product name, when the product still exists.
    pub product_name: Option<String>,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Cart as returned to callers, with totals computed on read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartResponse {
    pub id: CartId,
    pub user_id: UserId,
    pub items: Vec<CartItemResponse>,
    pub item_count: i64,
    pub subtotal: Money,
}
