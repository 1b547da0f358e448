//! Lock-guarded in-process stores, for tests and single-process dev runs.
//!
//! Each mutating method takes the write lock once and does its check and its
//! write under that same guard, so no other caller can interleave between them.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use sweetshop_auth::{CredentialStore, NewUser, User};
use sweetshop_core::{Email, ItemId, StoreError, UserId, creation_order};
use sweetshop_inventory::{
    AdjustOutcome, CatalogItem, CatalogStore, DetailsPatch, SearchFilter, StockAdjustment,
    sort_newest_first,
};

fn poisoned<T>(_: T) -> StoreError {
    StoreError::backend("lock poisoned")
}

#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    items: RwLock<HashMap<ItemId, CatalogItem>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect<F>(&self, keep: F) -> Result<Vec<CatalogItem>, StoreError>
    where
        F: Fn(&CatalogItem) -> bool,
    {
        let items = self.items.read().map_err(poisoned)?;
        let mut out: Vec<CatalogItem> = items.values().filter(|i| keep(i)).cloned().collect();
        sort_newest_first(&mut out);
        Ok(out)
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn insert(&self, item: CatalogItem) -> Result<CatalogItem, StoreError> {
        let mut items = self.items.write().map_err(poisoned)?;
        if items.contains_key(&item.id) {
            return Err(StoreError::Conflict(format!("item {} already exists", item.id)));
        }
        items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn get(&self, id: ItemId) -> Result<Option<CatalogItem>, StoreError> {
        Ok(self.items.read().map_err(poisoned)?.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<CatalogItem>, StoreError> {
        self.collect(|_| true)
    }

    async fn search(&self, filter: &SearchFilter) -> Result<Vec<CatalogItem>, StoreError> {
        self.collect(|item| filter.matches(item))
    }

    async fn update_details(
        &self,
        id: ItemId,
        patch: &DetailsPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<CatalogItem>, StoreError> {
        let mut items = self.items.write().map_err(poisoned)?;
        Ok(items.get_mut(&id).map(|item| {
            patch.apply_to(item, now);
            item.clone()
        }))
    }

    async fn delete(&self, id: ItemId) -> Result<bool, StoreError> {
        Ok(self.items.write().map_err(poisoned)?.remove(&id).is_some())
    }

    async fn adjust_quantity(
        &self,
        id: ItemId,
        adjustment: StockAdjustment,
    ) -> Result<AdjustOutcome, StoreError> {
        let mut items = self.items.write().map_err(poisoned)?;
        let Some(item) = items.get_mut(&id) else {
            return Ok(AdjustOutcome::NotFound);
        };

        match adjustment.apply(item.quantity)? {
            Some(next) => {
                item.quantity = next;
                item.updated_at = Utc::now();
                Ok(AdjustOutcome::Applied(item.clone()))
            }
            None => Ok(AdjustOutcome::Insufficient {
                available: item.quantity,
            }),
        }
    }
}

#[derive(Debug, Default)]
struct UserTable {
    by_id: HashMap<UserId, User>,
    by_email: HashMap<Email, UserId>,
}

/// Users keyed by id with a unique email index, both under one lock.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    table: RwLock<UserTable>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let table = self.table.read().map_err(poisoned)?;
        Ok(table
            .by_email
            .get(email)
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.table.read().map_err(poisoned)?.by_id.get(&id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut table = self.table.write().map_err(poisoned)?;
        if table.by_email.contains_key(&user.email) {
            return Err(StoreError::Conflict(format!("email {} already registered", user.email)));
        }

        let user = user.into_user(Utc::now());
        table.by_email.insert(user.email.clone(), user.id);
        table.by_id.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let table = self.table.read().map_err(poisoned)?;
        let mut users: Vec<User> = table.by_id.values().cloned().collect();
        users.sort_by(creation_order);
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use sweetshop_auth::Role;
    use sweetshop_inventory::NewItem;

    fn item(quantity: i64) -> CatalogItem {
        NewItem {
            name: "Toffee".to_string(),
            category: "Chewy".to_string(),
            description: None,
            price: Decimal::from(2),
            quantity,
            image_url: None,
        }
        .into_item(Utc::now())
        .unwrap()
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: Email::parse(email).unwrap(),
            password_hash: "digest".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn withdraw_reports_fresh_availability() {
        let store = InMemoryCatalogStore::new();
        let it = store.insert(item(3)).await.unwrap();

        let outcome = store
            .adjust_quantity(it.id, StockAdjustment::withdraw(5).unwrap())
            .await
            .unwrap();
        assert_eq!(outcome, AdjustOutcome::Insufficient { available: 3 });

        let outcome = store
            .adjust_quantity(it.id, StockAdjustment::withdraw(3).unwrap())
            .await
            .unwrap();
        let after = match outcome {
            AdjustOutcome::Applied(item) => item,
            other => panic!("expected applied, got {other:?}"),
        };
        assert_eq!(after.quantity, 0);
    }

    #[tokio::test]
    async fn adjust_missing_item() {
        let store = InMemoryCatalogStore::new();
        let outcome = store
            .adjust_quantity(ItemId::new(), StockAdjustment::deposit(1).unwrap())
            .await
            .unwrap();
        assert_eq!(outcome, AdjustOutcome::NotFound);
    }

    #[tokio::test]
    async fn delete_is_reported_once() {
        let store = InMemoryCatalogStore::new();
        let it = store.insert(item(1)).await.unwrap();
        assert!(store.delete(it.id).await.unwrap());
        assert!(!store.delete(it.id).await.unwrap());
        assert!(store.get(it.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_case_insensitively() {
        let store = InMemoryCredentialStore::new();
        store.create(new_user("sam@example.com")).await.unwrap();

        let err = store.create(new_user("SAM@Example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn lookups_agree() {
        let store = InMemoryCredentialStore::new();
        let created = store.create(new_user("kim@example.com")).await.unwrap();

        let by_email = store
            .find_by_email(&Email::parse("kim@example.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        let by_id = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);
        assert_eq!(by_id.email, created.email);
    }
}
