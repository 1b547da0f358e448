//! Engine and store wiring for the HTTP layer.

use std::sync::Arc;

use sweetshop_auth::{
    AccessGuard, AuthEngine, CredentialStore, PasswordHasher, Registration, TokenService,
};
use sweetshop_infra::config::AppConfig;
use sweetshop_infra::db;
use sweetshop_infra::store::{
    InMemoryCatalogStore, InMemoryCredentialStore, PgCatalogStore, PgCredentialStore,
};
use sweetshop_inventory::{CatalogStore, InventoryEngine};

pub type DynCredentialStore = Arc<dyn CredentialStore>;
pub type DynCatalogStore = Arc<dyn CatalogStore>;

/// Everything a handler needs, shared behind one `Arc`.
pub struct AppServices {
    pub auth: AuthEngine<DynCredentialStore>,
    pub inventory: InventoryEngine<DynCatalogStore>,
    pub guard: AccessGuard,
}

impl AppServices {
    /// Pick stores from config (Postgres when `DATABASE_URL` is set) and
    /// assemble the engines.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let (credentials, catalog): (DynCredentialStore, DynCatalogStore) =
            match &config.database_url {
                Some(url) => {
                    let pool = db::connect(url, config.db_max_connections).await?;
                    tracing::info!("using postgres stores");
                    (
                        Arc::new(PgCredentialStore::new(pool.clone())),
                        Arc::new(PgCatalogStore::new(pool)),
                    )
                }
                None => (
                    Arc::new(InMemoryCredentialStore::new()),
                    Arc::new(InMemoryCatalogStore::new()),
                ),
            };

        let hasher = Arc::new(PasswordHasher::new(config.hash)?);
        let tokens = Arc::new(TokenService::new(
            config.jwt_secret.as_bytes(),
            chrono::Duration::seconds(config.jwt_ttl_secs),
        ));

        Ok(Self {
            auth: AuthEngine::new(credentials, hasher, tokens.clone()),
            inventory: InventoryEngine::new(catalog),
            guard: AccessGuard::new(tokens),
        })
    }

    /// Create the configured admin account if it does not exist yet.
    pub async fn bootstrap_admin(&self, config: &AppConfig) -> anyhow::Result<()> {
        let Some(admin) = &config.admin else {
            return Ok(());
        };

        let user = self
            .auth
            .bootstrap_admin(Registration {
                email: admin.email.clone(),
                password: admin.password.clone(),
                first_name: "Admin".to_string(),
                last_name: "User".to_string(),
            })
            .await?;
        tracing::info!(user_id = %user.id, role = %user.role, "admin account ready");
        Ok(())
    }
}
