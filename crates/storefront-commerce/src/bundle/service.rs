//! Bundle aggregate service.

use crate::bundle::{
    Bundle, BundleAddRequest, BundleItem, BundleItemRequest, BundleResponse, BundleUpdateRequest,
};
use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::{BundleId, BundleItemId};
use crate::reconcile::{reconcile, ReconcileMode};
use storefront_data::{MemoryStore, Query, UnitOfWork};
use tracing::{info, warn};

/// Bundle management. One unit of work per call.
pub struct BundleService {
    store: MemoryStore,
}

impl BundleService {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    fn uow(&self) -> UnitOfWork {
        UnitOfWork::new(self.store.clone())
    }

    /// Every item's product reference must resolve before anything is
    /// written, so a bad reference cannot surface as a commit-time
    /// failure after partial work.
    async fn validate_product_refs(
        uow: &UnitOfWork,
        items: &[BundleItemRequest],
    ) -> Result<(), CommerceError> {
        let products = uow.repository::<Product>();
        for item in items {
            let wanted = item.product_id.clone();
            let exists = products
                .snapshot_one(move |p: &Product| p.id == wanted)
                .await?
                .is_some();
            if !exists {
                return Err(CommerceError::not_found("product", &item.product_id));
            }
        }
        Ok(())
    }

    /// Create a bundle with its items.
    pub async fn create(&self, request: BundleAddRequest) -> Result<BundleResponse, CommerceError> {
        request.validate()?;
        info!(name = %request.name, items = request.items.len(), "creating bundle");

        let uow = self.uow();
        let bundles = uow.repository::<Bundle>();
        let lowered = request.name.to_lowercase();
        if bundles
            .snapshot_one(|b| b.name.to_lowercase() == lowered)
            .await?
            .is_some()
        {
            return Err(CommerceError::Conflict(format!(
                "bundle name already in use: {}",
                request.name
            )));
        }
        Self::validate_product_refs(&uow, &request.items).await?;

        let tx = uow.begin_transaction().await?;
        let bundle = Bundle {
            id: BundleId::generate(),
            name: request.name,
            description: request.description,
            price: request.price,
            image_url: request.image_url,
            items: request
                .items
                .into_iter()
                .map(|item| BundleItem {
                    id: BundleItemId::generate(),
                    product_id: item.product_id,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                })
                .collect(),
            version: 0,
        };
        let bundle = bundles.create(bundle).await?;
        uow.complete().await?;
        tx.commit().await?;

        info!(bundle_id = %bundle.id, "bundle created");
        Ok(bundle.into())
    }

    /// Update a bundle, reconciling items by product id: matches are
    /// updated in place, new products inserted, and stored items
    /// omitted from the request are kept.
    pub async fn update(&self, request: BundleUpdateRequest) -> Result<BundleResponse, CommerceError> {
        request.validate()?;

        let uow = self.uow();
        let bundles = uow.repository::<Bundle>();
        let mut bundle = bundles
            .get_one(|b| b.id == request.id)
            .await?
            .ok_or_else(|| CommerceError::not_found("bundle", &request.id))?;

        let lowered = request.name.to_lowercase();
        let taken = bundles
            .snapshot_one(|b| b.name.to_lowercase() == lowered && b.id != request.id)
            .await?
            .is_some();
        if taken {
            return Err(CommerceError::Conflict(format!(
                "bundle name already in use: {}",
                request.name
            )));
        }
        Self::validate_product_refs(&uow, &request.items).await?;

        let tx = uow.begin_transaction().await?;
        bundle.name = request.name;
        bundle.description = request.description;
        bundle.price = request.price;
        bundle.image_url = request.image_url;

        reconcile(
            &mut bundle.items,
            request.items,
            ReconcileMode::Merge,
            |item| item.product_id.clone(),
            |record| Some(record.product_id.clone()),
            |item, record| {
                item.quantity = record.quantity;
                item.unit_price = record.unit_price;
            },
            |record| BundleItem {
                id: BundleItemId::generate(),
                product_id: record.product_id,
                quantity: record.quantity,
                unit_price: record.unit_price,
            },
        );

        let bundle = bundles.update(bundle).await?;
        uow.complete().await?;
        tx.commit().await?;

        info!(bundle_id = %bundle.id, "bundle updated");
        Ok(bundle.into())
    }

    /// Delete a bundle. Returns `false`, not an error, when the
    /// bundle does not exist, so the caller decides between a 404 and
    /// a failure response.
    pub async fn delete(&self, id: &BundleId) -> Result<bool, CommerceError> {
        let uow = self.uow();
        let bundles = uow.repository::<Bundle>();
        let Some(bundle) = bundles.get_one(|b| &b.id == id).await? else {
            warn!(bundle_id = %id, "bundle not found for delete");
            return Ok(false);
        };
        let deleted = bundles.delete(&bundle).await?;
        if deleted {
            info!(bundle_id = %id, "bundle deleted");
        }
        Ok(deleted)
    }

    /// Fetch a bundle by id.
    pub async fn get(&self, id: &BundleId) -> Result<Option<BundleResponse>, CommerceError> {
        let uow = self.uow();
        let bundle = uow
            .repository::<Bundle>()
            .snapshot_one(|b| &b.id == id)
            .await?;
        Ok(bundle.map(BundleResponse::from))
    }

    /// Page through all bundles, ordered by name.
    pub async fn get_all(
        &self,
        page_index: usize,
        page_size: usize,
    ) -> Result<Vec<BundleResponse>, CommerceError> {
        let uow = self.uow();
        let page = uow
            .repository::<Bundle>()
            .get_all(
                Query::new()
                    .order_by(|a: &Bundle, b: &Bundle| a.name.cmp(&b.name))
                    .page(page_index, page_size),
            )
            .await?;
        Ok(page.into_items().into_iter().map(BundleResponse::from).collect())
    }
}
