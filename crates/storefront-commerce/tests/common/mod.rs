//! Shared fixture: a fresh store with every service wired against it.

#![allow(dead_code)]

use std::sync::Arc;
use storefront_commerce::prelude::*;
use storefront_data::MemoryStore;

pub struct TestContext {
    pub store: MemoryStore,
    pub categories: CategoryService,
    pub products: ProductService,
    pub carts: CartService,
    pub wishlists: WishlistService,
    pub bundles: BundleService,
    pub orders: OrderService,
    pub mailer: Arc<MemoryMailer>,
    pub identity: Arc<StaticIdentityGateway>,
}

impl TestContext {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let mailer = Arc::new(MemoryMailer::new());
        let identity = Arc::new(StaticIdentityGateway::new());
        Self {
            categories: CategoryService::new(store.clone()),
            products: ProductService::new(store.clone()),
            carts: CartService::new(store.clone()),
            wishlists: WishlistService::new(store.clone()),
            bundles: BundleService::new(store.clone()),
            orders: OrderService::new(store.clone(), mailer.clone(), identity.clone()),
            store,
            mailer,
            identity,
        }
    }

    pub async fn seed_category(&self, name: &str) -> anyhow::Result<CategoryResponse> {
        Ok(self
            .categories
            .create(CategoryAddRequest { name: name.into() })
            .await?)
    }

    pub async fn seed_product(
        &self,
        name: &str,
        price_cents: i64,
        category_id: &CategoryId,
    ) -> anyhow::Result<ProductResponse> {
        Ok(self
            .products
            .create(ProductAddRequest {
                name: name.into(),
                description: format!("{name} description"),
                brand: "Acme".into(),
                price: Money::new(price_cents, Currency::USD),
                stock_quantity: 100,
                image_url: format!("{name}.png"),
                category_id: category_id.clone(),
                special_properties: Vec::new(),
            })
            .await?)
    }
}

pub fn usd(cents: i64) -> Money {
    Money::new(cents, Currency::USD)
}
