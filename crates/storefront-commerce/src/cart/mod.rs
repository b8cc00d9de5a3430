//! Shopping cart aggregate.

mod cart;
mod service;

pub use cart::{Cart, CartItem, CartItemResponse, CartResponse};
pub use service::CartService;
