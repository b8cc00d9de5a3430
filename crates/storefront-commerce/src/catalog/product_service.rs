//! Product CRUD, search and stock control.

use crate::catalog::{
    Category, Product, ProductAddRequest, ProductResponse, ProductUpdateRequest, SpecialProperty,
};
use crate::error::CommerceError;
use crate::ids::{CategoryId, ProductId, PropertyId};
use crate::reconcile::{reconcile, ReconcileMode};
use storefront_data::{MemoryStore, Query, UnitOfWork};
use tracing::{info, warn};

/// Product management. One unit of work per call.
pub struct ProductService {
    store: MemoryStore,
}

impl ProductService {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    fn uow(&self) -> UnitOfWork {
        UnitOfWork::new(self.store.clone())
    }

    async fn resolve_category_name(
        uow: &UnitOfWork,
        category_id: &CategoryId,
    ) -> Result<Option<String>, CommerceError> {
        Ok(uow
            .repository::<Category>()
            .snapshot_one(|c| &c.id == category_id)
            .await?
            .map(|c| c.name))
    }

    async fn to_response(uow: &UnitOfWork, product: Product) -> Result<ProductResponse, CommerceError> {
        let category_name = Self::resolve_category_name(uow, &product.category_id).await?;
        Ok(ProductResponse::from_product(product, category_name))
    }

    /// Create a product with its special properties.
    pub async fn create(&self, request: ProductAddRequest) -> Result<ProductResponse, CommerceError> {
        request.validate()?;
        info!(name = %request.name, "creating product");

        let uow = self.uow();
        let products = uow.repository::<Product>();
        let lowered = request.name.to_lowercase();
        if products
            .snapshot_one(|p| p.name.to_lowercase() == lowered)
            .await?
            .is_some()
        {
            return Err(CommerceError::Conflict(format!(
                "product name already in use: {}",
                request.name
            )));
        }
        // The category reference is validated eagerly; the in-memory
        // store has no foreign keys to catch a dangling id later.
        if Self::resolve_category_name(&uow, &request.category_id).await?.is_none() {
            return Err(CommerceError::not_found("category", &request.category_id));
        }

        let tx = uow.begin_transaction().await?;
        let product = Product {
            id: ProductId::generate(),
            name: request.name,
            description: request.description,
            brand: request.brand,
            price: request.price,
            stock_quantity: request.stock_quantity,
            image_url: request.image_url,
            category_id: request.category_id,
            special_properties: request
                .special_properties
                .into_iter()
                .map(|property| property.into_property())
                .collect(),
            version: 0,
        };
        let product = products.create(product).await?;
        uow.complete().await?;
        tx.commit().await?;

        info!(product_id = %product.id, "product created");
        Self::to_response(&uow, product).await
    }

    /// Update a product, reconciling special properties by property id:
    /// matches are updated, new records inserted, omitted rows kept.
    pub async fn update(&self, request: ProductUpdateRequest) -> Result<ProductResponse, CommerceError> {
        request.validate()?;

        let uow = self.uow();
        let products = uow.repository::<Product>();
        let mut product = products
            .get_one(|p| p.id == request.id)
            .await?
            .ok_or_else(|| CommerceError::not_found("product", &request.id))?;

        let lowered = request.name.to_lowercase();
        let taken = products
            .snapshot_one(|p| p.name.to_lowercase() == lowered && p.id != request.id)
            .await?
            .is_some();
        if taken {
            return Err(CommerceError::Conflict(format!(
                "product name already in use: {}",
                request.name
            )));
        }

        let tx = uow.begin_transaction().await?;
        product.name = request.name;
        product.description = request.description;
        product.brand = request.brand;
        product.price = request.price;
        product.stock_quantity = request.stock_quantity;
        product.image_url = request.image_url;
        product.category_id = request.category_id;

        reconcile(
            &mut product.special_properties,
            request.special_properties,
            ReconcileMode::Merge,
            |property| property.id.clone(),
            |record| record.id.clone(),
            |property, record| {
                property.key = record.key.clone();
                property.value = record.value.clone();
                property.size = record.size;
                property.unit = record.unit.clone();
                property.display_order = record.display_order;
            },
            |record| SpecialProperty {
                id: record.id.unwrap_or_else(PropertyId::generate),
                key: record.key,
                value: record.value,
                size: record.size,
                unit: record.unit,
                display_order: record.display_order,
            },
        );

        let product = products.update(product).await?;
        uow.complete().await?;
        tx.commit().await?;

        Self::to_response(&uow, product).await
    }

    /// Delete a product. `false` when the row vanished under us.
    pub async fn delete(&self, id: &ProductId) -> Result<bool, CommerceError> {
        let uow = self.uow();
        let products = uow.repository::<Product>();
        let product = products
            .get_one(|p| &p.id == id)
            .await?
            .ok_or_else(|| CommerceError::not_found("product", id))?;

        let deleted = products.delete(&product).await?;
        if deleted {
            info!(product_id = %id, "product deleted");
        } else {
            warn!(product_id = %id, "product disappeared before delete");
        }
        Ok(deleted)
    }

    /// Fetch a product by id.
    pub async fn get(&self, id: &ProductId) -> Result<ProductResponse, CommerceError> {
        let uow = self.uow();
        let product = uow
            .repository::<Product>()
            .snapshot_one(|p| &p.id == id)
            .await?
            .ok_or_else(|| CommerceError::not_found("product", id))?;
        Self::to_response(&uow, product).await
    }

    /// Page through all products, ordered by name.
    pub async fn get_all(
        &self,
        page_index: usize,
        page_size: usize,
    ) -> Result<Vec<ProductResponse>, CommerceError> {
        let uow = self.uow();
        let page = uow
            .repository::<Product>()
            .get_all(
                Query::new()
                    .order_by(|a: &Product, b: &Product| a.name.cmp(&b.name))
                    .page(page_index, page_size),
            )
            .await?;
        let mut responses = Vec::with_capacity(page.len());
        for product in page.into_items() {
            responses.push(Self::to_response(&uow, product).await?);
        }
        Ok(responses)
    }

    /// All products in one category.
    pub async fn get_by_category(&self, category_id: &CategoryId) -> Result<Vec<ProductResponse>, CommerceError> {
        let uow = self.uow();
        let owner = category_id.clone();
        let page = uow
            .repository::<Product>()
            .get_all(
                Query::new()
                    .filter(move |p: &Product| p.category_id == owner)
                    .page(1, usize::MAX),
            )
            .await?;
        let mut responses = Vec::with_capacity(page.len());
        for product in page.into_items() {
            responses.push(Self::to_response(&uow, product).await?);
        }
        Ok(responses)
    }

    /// Case-insensitive substring search over name and description.
    pub async fn search(&self, term: &str) -> Result<Vec<ProductResponse>, CommerceError> {
        let uow = self.uow();
        let needle = term.to_lowercase();
        let page = uow
            .repository::<Product>()
            .get_all(
                Query::new()
                    .filter(move |p: &Product| {
                        p.name.to_lowercase().contains(&needle)
                            || p.description.to_lowercase().contains(&needle)
                    })
                    .page(1, usize::MAX),
            )
            .await?;
        let mut responses = Vec::with_capacity(page.len());
        for product in page.into_items() {
            responses.push(Self::to_response(&uow, product).await?);
        }
        Ok(responses)
    }

    /// Set a product's stock level exactly.
    pub async fn update_stock(&self, id: &ProductId, quantity: i64) -> Result<bool, CommerceError> {
        if quantity < 0 {
            return Err(CommerceError::validation("stock quantity must not be negative"));
        }
        info!(product_id = %id, quantity, "updating stock");

        let uow = self.uow();
        let products = uow.repository::<Product>();
        let mut product = products
            .get_one(|p| &p.id == id)
            .await?
            .ok_or_else(|| CommerceError::not_found("product", id))?;

        let tx = uow.begin_transaction().await?;
        product.stock_quantity = quantity;
        products.update(product).await?;
        uow.complete().await?;
        tx.commit().await?;
        Ok(true)
    }
}
