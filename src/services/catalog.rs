//! Item catalog service

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult, LendingViolation},
    models::item::{CreateItem, Item, ItemDetails, ItemQuery, UpdateItem},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List items with optional search, category and owner filters
    pub async fn list_items(&self, query: &ItemQuery) -> AppResult<(Vec<ItemDetails>, i64)> {
        let search = query
            .search
            .as_deref()
            .map(|s| s.nfc().collect::<String>())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        self.repository.items.search(query, search.as_deref()).await
    }

    /// Get one item with owner and derived status
    pub async fn get_item(&self, id: Uuid) -> AppResult<ItemDetails> {
        self.repository.items.get_by_id(id).await
    }

    /// Create a new listing owned by the caller
    pub async fn create_item(&self, owner_id: Uuid, item: CreateItem) -> AppResult<Item> {
        item.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let created = self.repository.items.create(owner_id, &item).await?;
        tracing::info!(item_id = %created.id, owner_id = %owner_id, "item listed");
        Ok(created)
    }

    /// Update a listing. Owner only.
    pub async fn update_item(
        &self,
        id: Uuid,
        caller_id: Uuid,
        update: UpdateItem,
    ) -> AppResult<Item> {
        update
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.require_owner(id, caller_id).await?;
        self.repository.items.update(id, &update).await
    }

    /// Delete a listing. Owner only.
    ///
    /// Refused while active requests exist unless `force` is set, in which
    /// case the requests are removed with the item in one transaction.
    pub async fn delete_item(&self, id: Uuid, caller_id: Uuid, force: bool) -> AppResult<()> {
        self.require_owner(id, caller_id).await?;

        if !force && self.repository.requests.has_active_for_item(id).await? {
            return Err(LendingViolation::ItemHasActiveRequests.into());
        }

        self.repository.items.delete_cascade(id).await?;
        tracing::info!(item_id = %id, "item deleted");
        Ok(())
    }

    /// Attach an uploaded photo to a listing. Owner only.
    pub async fn set_item_image(
        &self,
        id: Uuid,
        caller_id: Uuid,
        image_url: &str,
    ) -> AppResult<Item> {
        self.require_owner(id, caller_id).await?;
        self.repository.items.set_image(id, image_url).await
    }

    async fn require_owner(&self, item_id: Uuid, caller_id: Uuid) -> AppResult<()> {
        let item = self.repository.items.get_by_id(item_id).await?;
        if item.item.owner_id != caller_id {
            return Err(AppError::Authorization(
                "Only the item's owner can modify it".to_string(),
            ));
        }
        Ok(())
    }
}
