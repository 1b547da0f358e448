use std::sync::Arc;

use async_trait::async_trait;

use sweetshop_core::{Email, StoreError, UserId};

use crate::{NewUser, User};

/// Persistence port for user records.
///
/// Email uniqueness is the store's responsibility: `create` must reject a
/// duplicate with [`StoreError::Conflict`] atomically, never via a separate
/// read followed by a write.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    /// All users, oldest first.
    async fn list(&self) -> Result<Vec<User>, StoreError>;
}

#[async_trait]
impl<S> CredentialStore for Arc<S>
where
    S: CredentialStore + ?Sized,
{
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        (**self).find_by_email(email).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        (**self).create(user).await
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        (**self).list().await
    }
}
