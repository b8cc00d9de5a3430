//! Order aggregate.

mod order;
mod service;

pub use order::{
    Order, OrderAddRequest, OrderItem, OrderItemAddRequest, OrderItemResponse,
    OrderItemUpdateRequest, OrderResponse, OrderUpdateRequest,
};
pub use service::OrderService;
