//! Wishlist aggregate.

mod service;
mod wishlist;

pub use service::WishlistService;
pub use wishlist::{
    MoveFailure, MoveToCartReport, MovedEntry, Wishlist, WishlistItem, WishlistItemResponse,
    WishlistResponse,
};
