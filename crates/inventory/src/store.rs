use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use sweetshop_core::{DomainError, DomainResult, ItemId, StoreError};

use crate::{CatalogItem, DetailsPatch, SearchFilter};

/// A signed, validated change to an item's quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StockAdjustment {
    Withdraw(i64),
    Deposit(i64),
}

impl StockAdjustment {
    pub fn withdraw(amount: i64) -> DomainResult<Self> {
        positive(amount).map(Self::Withdraw)
    }

    pub fn deposit(amount: i64) -> DomainResult<Self> {
        positive(amount).map(Self::Deposit)
    }

    pub fn amount(&self) -> i64 {
        match *self {
            Self::Withdraw(n) | Self::Deposit(n) => n,
        }
    }

    pub fn delta(&self) -> i64 {
        match *self {
            Self::Withdraw(n) => -n,
            Self::Deposit(n) => n,
        }
    }

    /// Quantity after applying to `current`.
    ///
    /// `Ok(None)` when a withdrawal exceeds stock. Overflow on deposit is a
    /// backend error rather than a wrap.
    pub fn apply(&self, current: i64) -> Result<Option<i64>, StoreError> {
        match *self {
            Self::Withdraw(n) if n > current => Ok(None),
            Self::Withdraw(n) => Ok(Some(current - n)),
            Self::Deposit(n) => current
                .checked_add(n)
                .map(Some)
                .ok_or_else(|| StoreError::backend("quantity overflow")),
        }
    }
}

fn positive(amount: i64) -> DomainResult<i64> {
    if amount <= 0 {
        return Err(DomainError::validation("quantity must be a positive integer"));
    }
    Ok(amount)
}

/// Result of an atomic stock adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdjustOutcome {
    Applied(CatalogItem),
    Insufficient { available: i64 },
    NotFound,
}

/// Persistence port for catalog items.
///
/// `adjust_quantity` is the only path that changes `quantity` after creation,
/// and it must check and write as one indivisible step: two concurrent
/// withdrawals can never both observe the same starting stock.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert(&self, item: CatalogItem) -> Result<CatalogItem, StoreError>;

    async fn get(&self, id: ItemId) -> Result<Option<CatalogItem>, StoreError>;

    /// All items, newest first.
    async fn list(&self) -> Result<Vec<CatalogItem>, StoreError>;

    /// Matching items, newest first.
    async fn search(&self, filter: &SearchFilter) -> Result<Vec<CatalogItem>, StoreError>;

    async fn update_details(
        &self,
        id: ItemId,
        patch: &DetailsPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<CatalogItem>, StoreError>;

    /// `false` when nothing was deleted.
    async fn delete(&self, id: ItemId) -> Result<bool, StoreError>;

    async fn adjust_quantity(
        &self,
        id: ItemId,
        adjustment: StockAdjustment,
    ) -> Result<AdjustOutcome, StoreError>;
}

#[async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn insert(&self, item: CatalogItem) -> Result<CatalogItem, StoreError> {
        (**self).insert(item).await
    }

    async fn get(&self, id: ItemId) -> Result<Option<CatalogItem>, StoreError> {
        (**self).get(id).await
    }

    async fn list(&self) -> Result<Vec<CatalogItem>, StoreError> {
        (**self).list().await
    }

    async fn search(&self, filter: &SearchFilter) -> Result<Vec<CatalogItem>, StoreError> {
        (**self).search(filter).await
    }

    async fn update_details(
        &self,
        id: ItemId,
        patch: &DetailsPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<CatalogItem>, StoreError> {
        (**self).update_details(id, patch, now).await
    }

    async fn delete(&self, id: ItemId) -> Result<bool, StoreError> {
        (**self).delete(id).await
    }

    async fn adjust_quantity(
        &self,
        id: ItemId,
        adjustment: StockAdjustment,
    ) -> Result<AdjustOutcome, StoreError> {
        (**self).adjust_quantity(id, adjustment).await
    }
}
