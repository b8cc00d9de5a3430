//! Cart aggregate service.

use crate::cart::{Cart, CartItemResponse, CartResponse};
use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::{ProductId, UserId};
use crate::money::Money;
use storefront_data::{MemoryStore, StoreError, UnitOfWork};
use tracing::{debug, info};

/// Cart operations. One unit of work per public call; the `*_in`
/// functions run inside a caller-provided unit of work so that
/// cross-aggregate flows (wishlist moves) share one transaction.
pub struct CartService {
    store: MemoryStore,
}

impl CartService {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    fn uow(&self) -> UnitOfWork {
        UnitOfWork::new(self.store.clone())
    }

    /// Fetch the user's cart, creating it on first use. Losing the
    /// concurrent first-insert race is recovered by refetching the
    /// winner's row, so two racing calls converge on one cart.
    pub(crate) async fn get_or_create_in(
        uow: &UnitOfWork,
        user_id: &UserId,
    ) -> Result<Cart, CommerceError> {
        let carts = uow.repository::<Cart>();
        if let Some(cart) = carts.get_one(|c| &c.user_id == user_id).await? {
            return Ok(cart);
        }
        debug!(user_id = %user_id, "creating cart");
        match carts.create(Cart::new(user_id.clone())).await {
            Ok(cart) => Ok(cart),
            Err(StoreError::UniqueViolation { .. }) => carts
                .get_one(|c| &c.user_id == user_id)
                .await?
                .ok_or_else(|| CommerceError::not_found("cart", user_id)),
            Err(err) => Err(err.into()),
        }
    }

    /// Add a quantity of a product to the user's cart, inside the
    /// caller's unit of work. Verifies the product exists, snapshots
    /// its current price for new items, accumulates for existing ones.
    pub(crate) async fn add_item_in(
        uow: &UnitOfWork,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<Cart, CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::validation("quantity must be greater than zero"));
        }
        let product = uow
            .repository::<Product>()
            .snapshot_one(|p| &p.id == product_id)
            .await?
            .ok_or_else(|| CommerceError::not_found("product", product_id))?;

        let mut cart = Self::get_or_create_in(uow, user_id).await?;
        cart.add_item(product_id.clone(), quantity, product.price)?;
        Ok(uow.repository::<Cart>().update(cart).await?)
    }

    async fn to_response(uow: &UnitOfWork, cart: Cart) -> Result<CartResponse, CommerceError> {
        let products = uow.repository::<Product>();
        let item_count = cart.item_count();
        let subtotal = cart.subtotal()?;
        let mut items = Vec::with_capacity(cart.items.len());
        for item in &cart.items {
            let wanted = item.product_id.clone();
            let product_name = products
                .snapshot_one(move |p: &Product| p.id == wanted)
                .await?
                .map(|p| p.name);
            let line_total = item
                .line_total()
                .ok_or_else(|| CommerceError::validation("cart subtotal overflow"))?;
            items.push(CartItemResponse {
                id: item.id.clone(),
                product_id: item.product_id.clone(),
                product_name,
                quantity: item.quantity,
                unit_price: item.unit_price,
                line_total,
            });
        }
        Ok(CartResponse {
            id: cart.id,
            user_id: cart.user_id,
            items,
            item_count,
            subtotal,
        })
    }

    /// Fetch (or create) the user's cart with computed totals.
    pub async fn get_cart(&self, user_id: &UserId) -> Result<CartResponse, CommerceError> {
        let uow = self.uow();
        let cart = Self::get_or_create_in(&uow, user_id).await?;
        Self::to_response(&uow, cart).await
    }

    /// Add a quantity of a product. Creates the cart on first use.
    pub async fn add_or_update_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<CartResponse, CommerceError> {
        info!(user_id = %user_id, product_id = %product_id, quantity, "adding item to cart");
        let uow = self.uow();
        let cart = Self::add_item_in(&uow, user_id, product_id, quantity).await?;
        uow.complete().await?;
        Self::to_response(&uow, cart).await
    }

    /// Set an item's quantity exactly; zero or negative removes it.
    pub async fn update_item_quantity(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<CartResponse, CommerceError> {
        let uow = self.uow();
        let carts = uow.repository::<Cart>();
        let mut cart = carts
            .get_one(|c| &c.user_id == user_id)
            .await?
            .ok_or_else(|| CommerceError::not_found("cart", user_id))?;

        if !cart.set_quantity(product_id, quantity) {
            return Err(CommerceError::not_found("cart item", product_id));
        }
        let cart = carts.update(cart).await?;
        uow.complete().await?;
        Self::to_response(&uow, cart).await
    }

    /// Remove one product from the cart.
    pub async fn remove_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<bool, CommerceError> {
        let uow = self.uow();
        let carts = uow.repository::<Cart>();
        let mut cart = carts
            .get_one(|c| &c.user_id == user_id)
            .await?
            .ok_or_else(|| CommerceError::not_found("cart", user_id))?;

        if !cart.remove_item(product_id) {
            return Err(CommerceError::not_found("cart item", product_id));
        }
        carts.update(cart).await?;
        uow.complete().await?;
        Ok(true)
    }

    /// Remove every item from the cart.
    pub async fn clear(&self, user_id: &UserId) -> Result<bool, CommerceError> {
        info!(user_id = %user_id, "clearing cart");
        let uow = self.uow();
        let carts = uow.repository::<Cart>();
        let mut cart = carts
            .get_one(|c| &c.user_id == user_id)
            .await?
            .ok_or_else(|| CommerceError::not_found("cart", user_id))?;

        cart.clear();
        carts.update(cart).await?;
        uow.complete().await?;
        Ok(true)
    }

    /// Whether the user's cart holds the product. Missing cart reads
    /// as `false`.
    pub async fn is_product_in_cart(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<bool, CommerceError> {
        let uow = self.uow();
        let cart = uow
            .repository::<Cart>()
            .snapshot_one(|c| &c.user_id == user_id)
            .await?;
        Ok(cart.is_some_and(|c| c.contains(product_id)))
    }

    /// Sum of quantities in the user's cart. Missing cart reads as 0.
    pub async fn item_count(&self, user_id: &UserId) -> Result<i64, CommerceError> {
        let uow = self.uow();
        let cart = uow
            .repository::<Cart>()
            .snapshot_one(|c| &c.user_id == user_id)
            .await?;
        Ok(cart.map_or(0, |c| c.item_count()))
    }

    /// Sum of quantity × snapshot price. Missing cart reads as zero.
    pub async fn subtotal(&self, user_id: &UserId) -> Result<Money, CommerceError> {
        let uow = self.uow();
        let cart = uow
            .repository::<Cart>()
            .snapshot_one(|c| &c.user_id == user_id)
            .await?;
        match cart {
            Some(cart) => cart.subtotal(),
            None => Ok(Money::default()),
        }
    }
}
