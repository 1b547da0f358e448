//! Catalog operations over a [`CatalogStore`].
//!
//! Validation happens here, before the store is touched. Atomicity of stock
//! changes is the store's job; the engine only translates outcomes.

use chrono::Utc;

use sweetshop_core::{DomainError, DomainResult, ItemId};

use crate::{
    AdjustOutcome, CatalogItem, CatalogStore, ItemPatch, NewItem, SearchFilter, StockAdjustment,
};

pub struct InventoryEngine<S> {
    store: S,
}

impl<S> InventoryEngine<S>
where
    S: CatalogStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> DomainResult<Vec<CatalogItem>> {
        Ok(self.store.list().await?)
    }

    pub async fn search(&self, filter: SearchFilter) -> DomainResult<Vec<CatalogItem>> {
        let filter = filter.normalized();
        if let (Some(min), Some(max)) = (filter.min_price, filter.max_price) {
            if min > max {
                return Ok(Vec::new());
            }
        }
        Ok(self.store.search(&filter).await?)
    }

    pub async fn get_by_id(&self, id: ItemId) -> DomainResult<CatalogItem> {
        self.store
            .get(id)
            .await?
            .ok_or(DomainError::not_found("catalog item"))
    }

    #[tracing::instrument(skip_all, fields(name = %input.name))]
    pub async fn create(&self, input: NewItem) -> DomainResult<CatalogItem> {
        let item = input.into_item(Utc::now())?;
        let item = self.store.insert(item).await?;
        tracing::info!(item_id = %item.id, quantity = item.quantity, "catalog item created");
        Ok(item)
    }

    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, id: ItemId, patch: ItemPatch) -> DomainResult<CatalogItem> {
        let patch = patch.validate()?;
        if patch.is_empty() {
            // Nothing to write; leave `updated_at` alone.
            return self.get_by_id(id).await;
        }
        let item = self
            .store
            .update_details(id, &patch, Utc::now())
            .await?
            .ok_or(DomainError::not_found("catalog item"))?;
        tracing::info!(item_id = %item.id, "catalog item updated");
        Ok(item)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: ItemId) -> DomainResult<()> {
        if !self.store.delete(id).await? {
            return Err(DomainError::not_found("catalog item"));
        }
        tracing::info!(item_id = %id, "catalog item deleted");
        Ok(())
    }

    /// Withdraw `amount` units. All or nothing: stock is never partially taken.
    #[tracing::instrument(skip(self))]
    pub async fn purchase(&self, id: ItemId, amount: i64) -> DomainResult<CatalogItem> {
        let adjustment = StockAdjustment::withdraw(amount)?;
        match self.store.adjust_quantity(id, adjustment).await? {
            AdjustOutcome::Applied(item) => {
                tracing::info!(item_id = %id, amount, remaining = item.quantity, "purchase applied");
                Ok(item)
            }
            AdjustOutcome::Insufficient { available } => {
                tracing::warn!(item_id = %id, amount, available, "insufficient stock");
                Err(DomainError::InsufficientStock {
                    requested: amount,
                    available,
                })
            }
            AdjustOutcome::NotFound => Err(DomainError::not_found("catalog item")),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn restock(&self, id: ItemId, amount: i64) -> DomainResult<CatalogItem> {
        let adjustment = StockAdjustment::deposit(amount)?;
        match self.store.adjust_quantity(id, adjustment).await? {
            AdjustOutcome::Applied(item) => {
                tracing::info!(item_id = %id, amount, quantity = item.quantity, "restock applied");
                Ok(item)
            }
            AdjustOutcome::NotFound => Err(DomainError::not_found("catalog item")),
            // Deposits cannot run short; a store reporting so is broken.
            AdjustOutcome::Insufficient { .. } => {
                Err(DomainError::internal("store reported insufficient stock on restock"))
            }
        }
    }
}
