//! Order aggregate service.

use crate::error::CommerceError;
use crate::external::{IdentityGateway, MailMessage, Mailer};
use crate::ids::{OrderId, OrderItemId, UserId};
use crate::order::order::current_timestamp;
use crate::order::{
    Order, OrderAddRequest, OrderItem, OrderResponse, OrderUpdateRequest,
};
use crate::reconcile::{reconcile, ReconcileMode};
use std::sync::Arc;
use storefront_data::{MemoryStore, Query, UnitOfWork};
use tracing::{debug, info, warn};

/// Order management. One unit of work per call. Order confirmations go
/// out through the mail collaborator after commit, fire-and-forget.
pub struct OrderService {
    store: MemoryStore,
    mailer: Arc<dyn Mailer>,
    identity: Arc<dyn IdentityGateway>,
}

impl OrderService {
    pub fn new(store: MemoryStore, mailer: Arc<dyn Mailer>, identity: Arc<dyn IdentityGateway>) -> Self {
        Self {
            store,
            mailer,
            identity,
        }
    }

    fn uow(&self) -> UnitOfWork {
        UnitOfWork::new(self.store.clone())
    }

    /// Place an order. The order date and item unit prices are
    /// snapshots of order time; the total is computed from the items.
    pub async fn create(&self, request: OrderAddRequest) -> Result<OrderResponse, CommerceError> {
        request.validate()?;
        info!(user_id = %request.user_id, items = request.items.len(), "creating order");

        let uow = self.uow();
        let tx = uow.begin_transaction().await?;

        let mut order = Order {
            id: OrderId::generate(),
            user_id: request.user_id,
            order_date: current_timestamp(),
            total: Default::default(),
            city: request.city,
            country: request.country,
            phone: request.phone,
            items: request
                .items
                .into_iter()
                .map(|item| OrderItem {
                    id: OrderItemId::generate(),
                    product_id: item.product_id,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                })
                .collect(),
            version: 0,
        };
        order.total = order.compute_total()?;

        let order = uow.repository::<Order>().create(order).await?;
        uow.complete().await?;
        tx.commit().await?;

        info!(order_id = %order.id, total = %order.total.display(), "order created");
        self.send_confirmation(&order).await;
        order.try_into()
    }

    /// Fetch an order by id.
    pub async fn get_by_id(&self, order_id: &OrderId) -> Result<Option<OrderResponse>, CommerceError> {
        if order_id.is_empty() {
            return Err(CommerceError::validation("order id must not be empty"));
        }
        let uow = self.uow();
        let order = uow
            .repository::<Order>()
            .snapshot_one(|o| &o.id == order_id)
            .await?;
        order.map(OrderResponse::try_from).transpose()
    }

    /// All orders, newest first.
    pub async fn get_all(&self) -> Result<Vec<OrderResponse>, CommerceError> {
        let uow = self.uow();
        let page = uow
            .repository::<Order>()
            .get_all(
                Query::new()
                    .order_by(|a: &Order, b: &Order| b.order_date.cmp(&a.order_date))
                    .page(1, usize::MAX),
            )
            .await?;
        page.into_items().into_iter().map(OrderResponse::try_from).collect()
    }

    /// All orders placed by one user, newest first.
    pub async fn get_by_user(&self, user_id: &UserId) -> Result<Vec<OrderResponse>, CommerceError> {
        if user_id.is_empty() {
            return Err(CommerceError::validation("user id must not be empty"));
        }
        let uow = self.uow();
        let owner = user_id.clone();
        let page = uow
            .repository::<Order>()
            .get_all(
                Query::new()
                    .filter(move |o: &Order| o.user_id == owner)
                    .order_by(|a: &Order, b: &Order| b.order_date.cmp(&a.order_date))
                    .page(1, usize::MAX),
            )
            .await?;
        page.into_items().into_iter().map(OrderResponse::try_from).collect()
    }

    /// Correct an order (admin operation). Items reconcile by item id:
    /// matches are updated, records without a known id are inserted,
    /// and stored items omitted from the request are kept. The total
    /// is recomputed after every item change.
    pub async fn update(&self, request: OrderUpdateRequest) -> Result<OrderResponse, CommerceError> {
        request.validate()?;

        let uow = self.uow();
        let orders = uow.repository::<Order>();
        let mut order = orders
            .get_one(|o| o.id == request.id)
            .await?
            .ok_or_else(|| CommerceError::not_found("order", &request.id))?;

        let tx = uow.begin_transaction().await?;
        order.city = request.city;
        order.country = request.country;
        order.phone = request.phone;

        reconcile(
            &mut order.items,
            request.items,
            ReconcileMode::Merge,
            |item| item.id.clone(),
            |record| record.id.clone(),
            |item, record| {
                item.product_id = record.product_id.clone();
                item.quantity = record.quantity;
                item.unit_price = record.unit_price;
            },
            |record| OrderItem {
                id: record.id.unwrap_or_else(OrderItemId::generate),
                product_id: record.product_id,
                quantity: record.quantity,
                unit_price: record.unit_price,
            },
        );
        order.total = order.compute_total()?;

        let order = orders.update(order).await?;
        uow.complete().await?;
        tx.commit().await?;

        info!(order_id = %order.id, "order updated");
        order.try_into()
    }

    /// Delete an order and its items in one transaction.
    pub async fn delete(&self, order_id: &OrderId) -> Result<bool, CommerceError> {
        if order_id.is_empty() {
            return Err(CommerceError::validation("order id must not be empty"));
        }
        let uow = self.uow();
        let orders = uow.repository::<Order>();
        let order = orders
            .get_one(|o| o.id == *order_id)
            .await?
            .ok_or_else(|| CommerceError::not_found("order", order_id))?;

        let tx = uow.begin_transaction().await?;
        // The order owns its items: removing the row removes them too.
        let deleted = orders.delete(&order).await?;
        uow.complete().await?;
        tx.commit().await?;

        info!(order_id = %order_id, deleted, "order delete finished");
        Ok(deleted)
    }

    /// Post-commit confirmation mail. Failures are warnings, never
    /// errors: the order is already durable.
    async fn send_confirmation(&self, order: &Order) {
        let Some(user) = self.identity.find_user(&order.user_id).await else {
            debug!(user_id = %order.user_id, "no contact details, skipping confirmation mail");
            return;
        };
        let message = MailMessage {
            to: user.email,
            subject: format!("Order confirmation {}", order.id),
            html_body: format!(
                "<p>Thanks {}! We received your order of {} item(s), totalling {}.</p>",
                user.display_name,
                order.item_count(),
                order.total.display(),
            ),
            attachments: Vec::new(),
        };
        if let Err(err) = self.mailer.send(message).await {
            warn!(order_id = %order.id, error = %err, "order confirmation mail failed");
        }
    }
}
