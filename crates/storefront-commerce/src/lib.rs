//! E-commerce domain types and transactional aggregate services for
//! the storefront.
//!
//! Everything mutating more than one row runs through the unit-of-work
//! layer in `storefront-data`: services open one unit of work per
//! call, wrap multi-step mutations in an explicit transaction, and
//! roll back on any error path.
//!
//! - **Catalog**: categories and products with special properties
//! - **Cart**: one cart per user, quantity accumulation, price snapshots
//! - **Wishlist**: binary membership, moves into the cart
//! - **Bundle**: curated product sets with child-item reconciliation
//! - **Order**: placed orders with date and price snapshots
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_commerce::prelude::*;
//! use storefront_data::MemoryStore;
//!
//! let store = MemoryStore::new();
//! let carts = CartService::new(store.clone());
//!
//! let cart = carts
//!     .add_or_update_item(&user_id, &product_id, 2)
//!     .await?;
//! println!("{} item(s), {}", cart.item_count, cart.subtotal.display());
//! ```

pub mod bundle;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod external;
pub mod ids;
pub mod money;
pub mod order;
pub mod reconcile;
pub mod wishlist;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{
        Category, CategoryAddRequest, CategoryResponse, CategoryService, CategoryUpdateRequest,
        Product, ProductAddRequest, ProductResponse, ProductService, ProductUpdateRequest,
        SpecialProperty, SpecialPropertyAddRequest, SpecialPropertyUpdateRequest,
    };

    // Cart
    pub use crate::cart::{Cart, CartItem, CartItemResponse, CartResponse, CartService};

    // Wishlist
    pub use crate::wishlist::{
        MoveToCartReport, Wishlist, WishlistItem, WishlistItemResponse, WishlistResponse,
        WishlistService,
    };

    // Bundle
    pub use crate::bundle::{
        Bundle, BundleAddRequest, BundleItem, BundleItemRequest, BundleResponse, BundleService,
        BundleUpdateRequest,
    };

    // Order
    pub use crate::order::{
        Order, OrderAddRequest, OrderItem, OrderItemAddRequest, OrderItemUpdateRequest,
        OrderResponse, OrderService, OrderUpdateRequest,
    };

    // External collaborators
    pub use crate::external::{
        IdentityGateway, LogMailer, Mailer, MemoryMailer, StaticIdentityGateway, UserRef,
    };

    // Reconciliation
    pub use crate::reconcile::{reconcile, ReconcileMode, ReconcileOutcome};
}
