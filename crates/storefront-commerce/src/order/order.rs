//! Order types.

use crate::error::CommerceError;
use crate::ids::{OrderId, OrderItemId, ProductId, UserId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use storefront_data::Entity;

/// One product on an order. The unit price is the price at order time
/// and is never re-derived from the current product row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Unique item identifier.
    pub id: OrderItemId,
    /// The product this line refers to (not owned by the order).
    pub product_id: ProductId,
    /// Quantity ordered. At least 1.
    pub quantity: i64,
    /// Unit price snapshot taken at order time.
    pub unit_price: Money,
}

impl OrderItem {
    /// quantity × unit price, `None` on overflow. Exact integer cents.
    pub fn subtotal(&self) -> Option<Money> {
        self.unit_price.try_multiply(self.quantity)
    }
}

/// A placed order: immutable history apart from admin item
/// corrections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// The user who placed the order.
    pub user_id: UserId,
    /// Unix timestamp snapshotted at creation.
    pub order_date: i64,
    /// Order total. Always recomputed from the items.
    pub total: Money,
    /// Shipping city.
    pub city: String,
    /// Shipping country.
    pub country: String,
    /// Contact phone.
    pub phone: String,
    /// Items on the order.
    pub items: Vec<OrderItem>,
    /// Concurrency token maintained by the store.
    #[serde(default)]
    pub version: u64,
}

impl Order {
    /// Sum of item subtotals. This is the only source of the stored
    /// total: callers never set it directly.
    pub fn compute_total(&self) -> Result<Money, CommerceError> {
        let currency = self
            .items
            .first()
            .map(|item| item.unit_price.currency)
            .unwrap_or(Currency::USD);
        let mut total = Money::zero(currency);
        for item in &self.items {
            let line = item
                .subtotal()
                .ok_or_else(|| CommerceError::validation("order total overflow"))?;
            total = total
                .try_add(&line)
                .ok_or_else(|| CommerceError::validation("order total overflow"))?;
        }
        Ok(total)
    }

    /// Total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

impl Entity for Order {
    const KIND: &'static str = "order";

    fn key(&self) -> &str {
        self.id.as_str()
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

/// Incoming order item on a create request. The unit price is the
/// price being charged, captured by the checkout flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemAddRequest {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
}

/// Request to place an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAddRequest {
    pub user_id: UserId,
    pub city: String,
    pub country: String,
    pub phone: String,
    pub items: Vec<OrderItemAddRequest>,
}

impl OrderAddRequest {
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.user_id.is_empty() {
            return Err(CommerceError::validation("user id must not be empty"));
        }
        for item in &self.items {
            if item.product_id.is_empty() {
                return Err(CommerceError::validation("order item product id must not be empty"));
            }
            if item.quantity < 1 {
                return Err(CommerceError::validation("order item quantity must be at least 1"));
            }
            if !item.unit_price.is_positive() {
                return Err(CommerceError::validation("order item unit price must be positive"));
            }
        }
        Ok(())
    }
}

/// Incoming order item on an update request. Records match stored
/// items by item id; records without one (or with an unknown id) are
/// inserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemUpdateRequest {
    pub id: Option<OrderItemId>,
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
}

/// Request to correct an order (admin operation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUpdateRequest {
    pub id: OrderId,
    pub city: String,
    pub country: String,
    pub phone: String,
    pub items: Vec<OrderItemUpdateRequest>,
}

impl OrderUpdateRequest {
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.id.is_empty() {
            return Err(CommerceError::validation("order id must not be empty"));
        }
        for item in &self.items {
            if item.product_id.is_empty() {
                return Err(CommerceError::validation("order item product id must not be empty"));
            }
            if item.quantity < 1 {
                return Err(CommerceError::validation("order item quantity must be at least 1"));
            }
            if !item.unit_price.is_positive() {
                return Err(CommerceError::validation("order item unit price must be positive"));
            }
        }
        Ok(())
    }
}

/// Order item as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItemResponse {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
}

/// Order as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderResponse {
    pub id: OrderId,
    pub user_id: UserId,
    pub order_date: i64,
    pub total: Money,
    pub city: String,
    pub country: String,
    pub phone: String,
    pub items: Vec<OrderItemResponse>,
}

impl TryFrom<Order> for OrderResponse {
    type Error = CommerceError;

    fn try_from(order: Order) -> Result<Self, Self::Error> {
        let mut items = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let subtotal = item
                .subtotal()
                .ok_or_else(|| CommerceError::validation("order total overflow"))?;
            items.push(OrderItemResponse {
                id: item.id.clone(),
                product_id: item.product_id.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                subtotal,
            });
        }
        Ok(Self {
            id: order.id,
            user_id: order.user_id,
            order_date: order.order_date,
            total: order.total,
            city: order.city,
            country: order.country,
            phone: order.phone,
            items,
        })
    }
}

/// Current Unix timestamp in seconds.
pub(crate) fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(cents: i64) -> Money {
        Money::new(cents, Currency::USD)
    }

    #[test]
    fn test_subtotal_is_exact() {
        let item = OrderItem {
            id: OrderItemId::generate(),
            product_id: ProductId::new("p1"),
            quantity: 3,
            unit_price: usd(2500),
        };
        assert_eq!(item.subtotal(), Some(usd(7500)));
    }

    #[test]
    fn test_total_is_sum_of_subtotals() {
        let order = Order {
            id: OrderId::generate(),
            user_id: UserId::new("u1"),
            order_date: 0,
            total: Money::zero(Currency::USD),
            city: "Cairo".into(),
            country: "Egypt".into(),
            phone: "+20100000000".into(),
            items: vec![
                OrderItem {
                    id: OrderItemId::generate(),
                    product_id: ProductId::new("p1"),
                    quantity: 2,
                    unit_price: usd(1000),
                },
                OrderItem {
                    id: OrderItemId::generate(),
                    product_id: ProductId::new("p2"),
                    quantity: 1,
                    unit_price: usd(2599),
                },
            ],
            version: 0,
        };
        assert_eq!(order.compute_total().unwrap(), usd(4599));
        assert_eq!(order.item_count(), 3);
    }

    #[test]
    fn test_add_request_validation() {
        let mut request = OrderAddRequest {
            user_id: UserId::new("u1"),
            city: "Cairo".into(),
            country: "Egypt".into(),
            phone: "+20100000000".into(),
            items: vec![OrderItemAddRequest {
                product_id: ProductId::new("p1"),
                quantity: 1,
                unit_price: usd(100),
            }],
        };
        assert!(request.validate().is_ok());

        request.items[0].quantity = 0;
        assert!(request.validate().is_err());
    }
}
