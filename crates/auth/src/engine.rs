//! Registration and login orchestration.
//!
//! ```text
//! register: parse email → pre-check → hash (blocking pool) → store.create → issue token
//! login:    parse email → store lookup → verify (blocking pool) → issue token
//! ```
//!
//! The engine holds no state of its own beyond handles to its collaborators.

use std::sync::Arc;

use sweetshop_core::{DomainError, DomainResult, Email, StoreError, UserId};

use crate::{CredentialStore, NewUser, PasswordHasher, Role, TokenService, User};

/// Input to [`AuthEngine::register`]. Shape checks (lengths, formats) belong
/// to the calling boundary.
#[derive(Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl core::fmt::Debug for Registration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

/// A user together with a freshly issued token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

pub struct AuthEngine<S> {
    store: S,
    hasher: Arc<PasswordHasher>,
    tokens: Arc<TokenService>,
}

impl<S> AuthEngine<S>
where
    S: CredentialStore,
{
    pub fn new(store: S, hasher: Arc<PasswordHasher>, tokens: Arc<TokenService>) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    /// Register a new USER account and sign a token for it.
    #[tracing::instrument(skip_all, fields(email = %registration.email))]
    pub async fn register(&self, registration: Registration) -> DomainResult<AuthSession> {
        let email = Email::parse(&registration.email)?;
        if registration.password.is_empty() {
            return Err(DomainError::validation("password is required"));
        }

        // Fast path for a friendly error; the store's uniqueness check is what
        // actually closes the race.
        if self.store.find_by_email(&email).await?.is_some() {
            return Err(DomainError::conflict("user with this email already exists"));
        }

        let password_hash = self.hash_password(registration.password).await?;

        let user = self
            .store
            .create(NewUser {
                email,
                password_hash,
                first_name: registration.first_name.trim().to_string(),
                last_name: registration.last_name.trim().to_string(),
                role: Role::User,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => DomainError::conflict("user with this email already exists"),
                other => other.into(),
            })?;

        let token = self.tokens.issue(&user)?;
        tracing::info!(user_id = %user.id, "user registered");

        Ok(AuthSession { user, token })
    }

    /// Authenticate with email + password.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller,
    /// in the error returned and in the hashing work done.
    #[tracing::instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthSession> {
        let user = match Email::parse(email) {
            Ok(email) => self.store.find_by_email(&email).await?,
            Err(_) => None,
        };

        let Some(user) = user else {
            tracing::debug!("login for unknown email");
            // Same hashing cost as a wrong password.
            self.verify_decoy(password.to_string()).await?;
            return Err(DomainError::InvalidCredentials);
        };

        if !self.verify_password(password.to_string(), user.password_hash.clone()).await? {
            tracing::debug!(user_id = %user.id, "login with wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;
        tracing::info!(user_id = %user.id, "user logged in");

        Ok(AuthSession { user, token })
    }

    /// Resolve the user behind a verified token.
    ///
    /// A token outlives its user if the account was removed; such a caller is
    /// unauthenticated rather than looking at a missing resource.
    pub async fn verify_user(&self, id: UserId) -> DomainResult<User> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::unauthenticated("user no longer exists"))
    }

    pub async fn list_users(&self) -> DomainResult<Vec<User>> {
        Ok(self.store.list().await?)
    }

    /// Ensure an ADMIN account exists for `email`.
    ///
    /// Idempotent. An existing account under that email is returned untouched,
    /// whatever its role.
    #[tracing::instrument(skip_all, fields(email = %registration.email))]
    pub async fn bootstrap_admin(&self, registration: Registration) -> DomainResult<User> {
        let email = Email::parse(&registration.email)?;

        if let Some(existing) = self.store.find_by_email(&email).await? {
            if !existing.role.is_admin() {
                tracing::warn!(user_id = %existing.id, "bootstrap email belongs to a non-admin account");
            }
            return Ok(existing);
        }

        let password_hash = self.hash_password(registration.password).await?;
        let created = self
            .store
            .create(NewUser {
                email: email.clone(),
                password_hash,
                first_name: registration.first_name,
                last_name: registration.last_name,
                role: Role::Admin,
            })
            .await;

        match created {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "admin account created");
                Ok(user)
            }
            // Another instance bootstrapped concurrently.
            Err(StoreError::Conflict(_)) => self
                .store
                .find_by_email(&email)
                .await?
                .ok_or_else(|| DomainError::internal("admin vanished after conflict")),
            Err(e) => Err(e.into()),
        }
    }

    async fn hash_password(&self, password: String) -> DomainResult<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::internal(format!("hashing task failed: {e}")))?
            .map_err(Into::into)
    }

    async fn verify_decoy(&self, password: String) -> DomainResult<()> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify_decoy(&password))
            .await
            .map_err(|e| DomainError::internal(format!("verify task failed: {e}")))
    }

    async fn verify_password(&self, password: String, digest: String) -> DomainResult<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| DomainError::internal(format!("verify task failed: {e}")))
    }
}
