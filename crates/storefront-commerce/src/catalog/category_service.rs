//! Category CRUD.

use crate::catalog::{Category, CategoryAddRequest, CategoryResponse, CategoryUpdateRequest};
use crate::error::CommerceError;
use crate::ids::CategoryId;
use storefront_data::{MemoryStore, Query, UnitOfWork};
use tracing::{info, warn};

/// Category management. One unit of work per call.
pub struct CategoryService {
    store: MemoryStore,
}

impl CategoryService {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    fn uow(&self) -> UnitOfWork {
        UnitOfWork::new(self.store.clone())
    }

    /// Create a category. Names collide case-insensitively.
    pub async fn create(&self, request: CategoryAddRequest) -> Result<CategoryResponse, CommerceError> {
        request.validate()?;
        info!(name = %request.name, "creating category");

        let uow = self.uow();
        let categories = uow.repository::<Category>();
        let lowered = request.name.to_lowercase();
        if categories
            .snapshot_one(|c| c.name.to_lowercase() == lowered)
            .await?
            .is_some()
        {
            return Err(CommerceError::Conflict(format!(
                "category name already in use: {}",
                request.name
            )));
        }

        let tx = uow.begin_transaction().await?;
        let category = categories.create(Category::new(request.name)).await?;
        uow.complete().await?;
        tx.commit().await?;

        info!(category_id = %category.id, "category created");
        Ok(category.into())
    }

    /// Rename a category.
    pub async fn update(&self, request: CategoryUpdateRequest) -> Result<CategoryResponse, CommerceError> {
        request.validate()?;

        let uow = self.uow();
        let categories = uow.repository::<Category>();
        let mut category = categories
            .get_one(|c| c.id == request.id)
            .await?
            .ok_or_else(|| CommerceError::not_found("category", &request.id))?;

        let lowered = request.name.to_lowercase();
        let taken = categories
            .snapshot_one(|c| c.name.to_lowercase() == lowered && c.id != request.id)
            .await?
            .is_some();
        if taken {
            return Err(CommerceError::Conflict(format!(
                "category name already in use: {}",
                request.name
            )));
        }

        let tx = uow.begin_transaction().await?;
        category.name = request.name;
        let category = categories.update(category).await?;
        uow.complete().await?;
        tx.commit().await?;

        Ok(category.into())
    }

    /// Delete a category. `false` when the row vanished under us.
    pub async fn delete(&self, id: &CategoryId) -> Result<bool, CommerceError> {
        let uow = self.uow();
        let categories = uow.repository::<Category>();
        let category = categories
            .get_one(|c| &c.id == id)
            .await?
            .ok_or_else(|| CommerceError::not_found("category", id))?;

        let deleted = categories.delete(&category).await?;
        if !deleted {
            warn!(category_id = %id, "category disappeared before delete");
        }
        Ok(deleted)
    }

    /// Fetch a category by id.
    pub async fn get(&self, id: &CategoryId) -> Result<CategoryResponse, CommerceError> {
        let uow = self.uow();
        let category = uow
            .repository::<Category>()
            .snapshot_one(|c| &c.id == id)
            .await?
            .ok_or_else(|| CommerceError::not_found("category", id))?;
        Ok(category.into())
    }

    /// Page through all categories, ordered by name.
    pub async fn get_all(
        &self,
        page_index: usize,
        page_size: usize,
    ) -> Result<Vec<CategoryResponse>, CommerceError> {
        let uow = self.uow();
        let page = uow
            .repository::<Category>()
            .get_all(
                Query::new()
                    .order_by(|a: &Category, b: &Category| a.name.cmp(&b.name))
                    .page(page_index, page_size),
            )
            .await?;
        Ok(page.into_items().into_iter().map(CategoryResponse::from).collect())
    }
}
