//! Wishlist aggregate service, including the cross-aggregate moves
//! into the cart.

use crate::cart::CartService;
use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::{ProductId, UserId, WishlistItemId};
use crate::wishlist::{
    MoveFailure, MoveToCartReport, MovedEntry, Wishlist, WishlistItemResponse, WishlistResponse,
};
use storefront_data::{MemoryStore, StoreError, UnitOfWork};
use tracing::{info, warn};

/// Quantity a moved wishlist entry lands in the cart with. Wishlist
/// membership is binary, so there is nothing else to carry over.
const MOVED_QUANTITY: i64 = 1;

/// Wishlist operations. One unit of work per call; the moves share
/// that unit of work with the cart mutation so both sides commit or
/// roll back together.
pub struct WishlistService {
    store: MemoryStore,
}

impl WishlistService {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    fn uow(&self) -> UnitOfWork {
        UnitOfWork::new(self.store.clone())
    }

    /// Fetch the user's wishlist, creating it on first use. Same
    /// race recovery as the cart: a lost first insert refetches the
    /// winner's row.
    async fn get_or_create_in(uow: &UnitOfWork, user_id: &UserId) -> Result<Wishlist, CommerceError> {
        let wishlists = uow.repository::<Wishlist>();
        if let Some(wishlist) = wishlists.get_one(|w| &w.user_id == user_id).await? {
            return Ok(wishlist);
        }
        match wishlists.create(Wishlist::new(user_id.clone())).await {
            Ok(wishlist) => Ok(wishlist),
            Err(StoreError::UniqueViolation { .. }) => wishlists
                .get_one(|w| &w.user_id == user_id)
                .await?
                .ok_or_else(|| CommerceError::not_found("wishlist", user_id)),
            Err(err) => Err(err.into()),
        }
    }

    async fn to_response(uow: &UnitOfWork, wishlist: Wishlist) -> Result<WishlistResponse, CommerceError> {
        let products = uow.repository::<Product>();
        let mut items = Vec::with_capacity(wishlist.items.len());
        for item in &wishlist.items {
            let wanted = item.product_id.clone();
            let product_name = products
                .snapshot_one(move |p: &Product| p.id == wanted)
                .await?
                .map(|p| p.name);
            items.push(WishlistItemResponse {
                id: item.id.clone(),
                product_id: item.product_id.clone(),
                product_name,
            });
        }
        Ok(WishlistResponse {
            id: wishlist.id,
            user_id: wishlist.user_id,
            items,
        })
    }

    /// Fetch (or create) the user's wishlist.
    pub async fn get_or_create(&self, user_id: &UserId) -> Result<WishlistResponse, CommerceError> {
        let uow = self.uow();
        let wishlist = Self::get_or_create_in(&uow, user_id).await?;
        Self::to_response(&uow, wishlist).await
    }

    /// Fetch the user's wishlist without creating one.
    pub async fn get_by_user(&self, user_id: &UserId) -> Result<WishlistResponse, CommerceError> {
        let uow = self.uow();
        let wishlist = uow
            .repository::<Wishlist>()
            .snapshot_one(|w| &w.user_id == user_id)
            .await?
            .ok_or_else(|| CommerceError::not_found("wishlist", user_id))?;
        Self::to_response(&uow, wishlist).await
    }

    /// Add a product. Fails with a conflict when already present.
    pub async fn add_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<WishlistResponse, CommerceError> {
        info!(user_id = %user_id, product_id = %product_id, "adding wishlist item");
        let uow = self.uow();
        uow.repository::<Product>()
            .snapshot_one(|p| &p.id == product_id)
            .await?
            .ok_or_else(|| CommerceError::not_found("product", product_id))?;

        let mut wishlist = Self::get_or_create_in(&uow, user_id).await?;
        if !wishlist.add_product(product_id.clone()) {
            return Err(CommerceError::Conflict(format!(
                "product already in wishlist: {product_id}"
            )));
        }
        let wishlist = uow.repository::<Wishlist>().update(wishlist).await?;
        uow.complete().await?;
        Self::to_response(&uow, wishlist).await
    }

    /// Remove the entry for a product. `false` when absent.
    pub async fn remove_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<bool, CommerceError> {
        let uow = self.uow();
        let wishlists = uow.repository::<Wishlist>();
        let mut wishlist = wishlists
            .get_one(|w| &w.user_id == user_id)
            .await?
            .ok_or_else(|| CommerceError::not_found("wishlist", user_id))?;

        if !wishlist.remove_product(product_id) {
            return Ok(false);
        }
        wishlists.update(wishlist).await?;
        uow.complete().await?;
        Ok(true)
    }

    /// Remove every entry.
    pub async fn clear(&self, user_id: &UserId) -> Result<bool, CommerceError> {
        let uow = self.uow();
        let wishlists = uow.repository::<Wishlist>();
        let mut wishlist = wishlists
            .get_one(|w| &w.user_id == user_id)
            .await?
            .ok_or_else(|| CommerceError::not_found("wishlist", user_id))?;

        if wishlist.is_empty() {
            return Ok(true);
        }
        wishlist.clear();
        wishlists.update(wishlist).await?;
        uow.complete().await?;
        Ok(true)
    }

    /// Whether the user's wishlist holds the product. Missing wishlist
    /// reads as `false`.
    pub async fn is_in_wishlist(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<bool, CommerceError> {
        let uow = self.uow();
        let wishlist = uow
            .repository::<Wishlist>()
            .snapshot_one(|w| &w.user_id == user_id)
            .await?;
        Ok(wishlist.is_some_and(|w| w.contains(product_id)))
    }

    /// Move one wishlist entry into the cart.
    ///
    /// Atomic: the cart gains the quantity AND the wishlist entry
    /// disappears, or, on any failure, neither side effect is
    /// observable.
    pub async fn move_item_to_cart(
        &self,
        user_id: &UserId,
        item_id: &WishlistItemId,
        quantity: i64,
    ) -> Result<bool, CommerceError> {
        info!(user_id = %user_id, wishlist_item_id = %item_id, quantity, "moving wishlist item to cart");
        let uow = self.uow();
        let tx = uow.begin_transaction().await?;

        let wishlists = uow.repository::<Wishlist>();
        let mut wishlist = wishlists
            .get_one(|w| &w.user_id == user_id)
            .await?
            .ok_or_else(|| CommerceError::not_found("wishlist", user_id))?;
        let product_id = wishlist
            .find_item(item_id)
            .map(|item| item.product_id.clone())
            .ok_or_else(|| CommerceError::not_found("wishlist item", item_id))?;

        // Any failure from here unwinds past `tx` and rolls back.
        CartService::add_item_in(&uow, user_id, &product_id, quantity).await?;
        wishlist.remove_item(item_id);
        wishlists.update(wishlist).await?;

        uow.complete().await?;
        tx.commit().await?;
        Ok(true)
    }

    /// Move every wishlist entry into the cart.
    ///
    /// Deliberately NOT all-or-nothing: an entry that cannot move
    /// (e.g. its product was deleted) is reported and left in place
    /// while the rest proceed. The batch fails (and rolls back)
    /// only when not a single entry moved.
    pub async fn move_all_to_cart(&self, user_id: &UserId) -> Result<MoveToCartReport, CommerceError> {
        info!(user_id = %user_id, "moving all wishlist items to cart");
        let uow = self.uow();
        let tx = uow.begin_transaction().await?;

        let wishlists = uow.repository::<Wishlist>();
        let mut wishlist = wishlists
            .get_one(|w| &w.user_id == user_id)
            .await?
            .ok_or_else(|| CommerceError::not_found("wishlist", user_id))?;

        let mut report = MoveToCartReport::default();
        for entry in wishlist.items.clone() {
            match CartService::add_item_in(&uow, user_id, &entry.product_id, MOVED_QUANTITY).await {
                Ok(_) => {
                    wishlist.remove_item(&entry.id);
                    report.moved.push(MovedEntry {
                        wishlist_item_id: entry.id,
                        product_id: entry.product_id,
                        quantity: MOVED_QUANTITY,
                    });
                }
                Err(CommerceError::NotFound { .. }) => {
                    warn!(
                        product_id = %entry.product_id,
                        "skipping wishlist entry, product no longer exists"
                    );
                    report.failed.push(MoveFailure {
                        wishlist_item_id: entry.id,
                        product_id: entry.product_id,
                        reason: "product not found".to_string(),
                    });
                }
                // Anything else is a storage failure: abort the batch.
                Err(err) => return Err(err),
            }
        }

        if report.moved.is_empty() && !report.failed.is_empty() {
            return Err(CommerceError::PartialFailure {
                failed: report.failed.len(),
            });
        }

        wishlists.update(wishlist).await?;
        uow.complete().await?;
        tx.commit().await?;

        info!(
            moved = report.moved_count(),
            failed = report.failed_count(),
            "wishlist batch move finished"
        );
        Ok(report)
    }
}
