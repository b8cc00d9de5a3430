//! Wishlist types.

use crate::ids::{ProductId, UserId, WishlistId, WishlistItemId};
use serde::{Deserialize, Serialize};
use storefront_data::Entity;

/// One product on a wishlist. Membership is binary: no quantity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WishlistItem {
    /// Unique item identifier.
    pub id: WishlistItemId,
    /// The product this entry refers to (not owned by the wishlist).
    pub product_id: ProductId,
}

/// A user's wishlist. One per user; a product appears at most once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Wishlist {
    /// Unique wishlist identifier.
    pub id: WishlistId,
    /// Owning user.
    pub user_id: UserId,
    /// Entries on the wishlist.
    pub items: Vec<WishlistItem>,
    /// Concurrency token maintained by the store.
    #[serde(default)]
    pub version: u64,
}

impl Wishlist {
    /// Create an empty wishlist for a user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            id: WishlistId::generate(),
            user_id,
            items: Vec::new(),
            version: 0,
        }
    }

    /// Whether the wishlist holds the product.
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|item| &item.product_id == product_id)
    }

    /// Find an entry by its item id.
    pub fn find_item(&self, item_id: &WishlistItemId) -> Option<&WishlistItem> {
        self.items.iter().find(|item| &item.id == item_id)
    }

    /// Add a product. Returns `false` when it is already present.
    pub fn add_product(&mut self, product_id: ProductId) -> bool {
        if self.contains(&product_id) {
            return false;
        }
        self.items.push(WishlistItem {
            id: WishlistItemId::generate(),
            product_id,
        });
        true
    }

    /// Remove the entry for a product. Returns `false` when absent.
    pub fn remove_product(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.product_id != product_id);
        self.items.len() < before
    }

    /// Remove an entry by its item id. Returns `false` when absent.
    pub fn remove_item(&mut self, item_id: &WishlistItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.id != item_id);
        self.items.len() < before
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Whether the wishlist holds no entries.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Entity for Wishlist {
    const KIND: &'static str = "wishlist";

    fn key(&self) -> &str {
        self.id.as_str()
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    // One wishlist per user, enforced by the store.
    fn unique_key(&self) -> Option<String> {
        Some(format!("user:{}", self.user_id))
    }
}

/// Wishlist entry as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WishlistItemResponse {
    pub id: WishlistItemId,
    pub product_id: ProductId,
    /// Resolved product name, when the product still exists.
    pub product_name: Option<String>,
}

/// Wishlist as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WishlistResponse {
    pub id: WishlistId,
    pub user_id: UserId,
    pub items: Vec<WishlistItemResponse>,
}

/// One successfully moved entry in a batch move.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovedEntry {
    pub wishlist_item_id: WishlistItemId,
    pub product_id: ProductId,
    pub quantity: i64,
}

/// One failed entry in a batch move. The wishlist entry stays in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoveFailure {
    pub wishlist_item_id: WishlistItemId,
    pub product_id: ProductId,
    pub reason: String,
}

/// Outcome of `move_all_to_cart`: which entries moved and which were
/// skipped. Reported, not raised: the batch only errors when nothing
/// moved at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MoveToCartReport {
    pub moved: Vec<MovedEntry>,
    pub failed: Vec<MoveFailure>,
}

impl MoveToCartReport {
    /// Number of entries that moved.
    pub fn moved_count(&self) -> usize {
        self.moved.len()
    }

    /// Number of entries that were skipped.
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_is_binary() {
        let mut wishlist = Wishlist::new(UserId::new("u1"));
        let product = ProductId::new("p1");
        assert!(wishlist.add_product(product.clone()));
        assert!(!wishlist.add_product(product.clone()));
        assert_eq!(wishlist.items.len(), 1);
    }

    #[test]
    fn test_remove_by_item_id() {
        let mut wishlist = Wishlist::new(UserId::new("u1"));
        wishlist.add_product(ProductId::new("p1"));
        let item_id = wishlist.items[0].id.clone();
        assert!(wishlist.remove_item(&item_id));
        assert!(wishlist.is_empty());
        assert!(!wishlist.remove_item(&item_id));
    }

    #[test]
    fn test_remove_by_product() {
        let mut wishlist = Wishlist::new(UserId::new("u1"));
        let product = ProductId::new("p1");
        wishlist.add_product(product.clone());
        assert!(wishlist.remove_product(&product));
        assert!(!wishlist.contains(&product));
    }
}
