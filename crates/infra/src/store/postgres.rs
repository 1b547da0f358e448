//! Postgres-backed stores.
//!
//! ## Stock atomicity
//!
//! A withdrawal is one conditional statement:
//!
//! ```sql
//! UPDATE catalog_items SET quantity = quantity - $2
//! WHERE id = $1 AND quantity >= $2 RETURNING ...
//! ```
//!
//! Postgres row locking serializes concurrent updates of the same row, and the
//! `WHERE` guard is re-evaluated against the committed value, so two
//! withdrawals can never both succeed off the same starting stock. The
//! `CHECK (quantity >= 0)` constraint backs this up at the schema level.
//!
//! When the update matches nothing, one point read tells a missing item apart
//! from a short one.
//!
//! ## Error mapping
//!
//! | SQLx error | Code | StoreError |
//! |---|---|---|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | anything else | | `Backend` |

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use async_trait::async_trait;
use sweetshop_auth::{CredentialStore, NewUser, Role, User};
use sweetshop_core::{Email, ItemId, Price, StoreError, UserId};
use sweetshop_inventory::{
    AdjustOutcome, CatalogItem, CatalogStore, DetailsPatch, SearchFilter, StockAdjustment,
};

const ITEM_COLUMNS: &str =
    "id, name, category, description, price, quantity, image_url, created_at, updated_at";

const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, role, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_quantity(&self, id: ItemId) -> Result<Option<i64>, StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT quantity FROM catalog_items WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("current_quantity", e))
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    #[instrument(skip_all, fields(item_id = %item.id), err)]
    async fn insert(&self, item: CatalogItem) -> Result<CatalogItem, StoreError> {
        let sql = format!(
            "INSERT INTO catalog_items ({ITEM_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {ITEM_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(item.id.as_uuid())
            .bind(&item.name)
            .bind(&item.category)
            .bind(&item.description)
            .bind(item.price.as_decimal())
            .bind(item.quantity)
            .bind(&item.image_url)
            .bind(item.created_at)
            .bind(item.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_item", e))?;
        item_from_row(&row)
    }

    async fn get(&self, id: ItemId) -> Result<Option<CatalogItem>, StoreError> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM catalog_items WHERE id = $1");
        sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_item", e))?
            .as_ref()
            .map(item_from_row)
            .transpose()
    }

    async fn list(&self) -> Result<Vec<CatalogItem>, StoreError> {
        self.search(&SearchFilter::default()).await
    }

    #[instrument(skip(self), err)]
    async fn search(&self, filter: &SearchFilter) -> Result<Vec<CatalogItem>, StoreError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {ITEM_COLUMNS} FROM catalog_items WHERE TRUE"));

        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", escape_like(search));
            qb.push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(category) = &filter.category {
            qb.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(min) = filter.min_price {
            qb.push(" AND price >= ").push_bind(min);
        }
        if let Some(max) = filter.max_price {
            qb.push(" AND price <= ").push_bind(max);
        }
        qb.push(" ORDER BY created_at DESC, id DESC");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("search_items", e))?;
        rows.iter().map(item_from_row).collect()
    }

    #[instrument(skip(self, patch), err)]
    async fn update_details(
        &self,
        id: ItemId,
        patch: &DetailsPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<CatalogItem>, StoreError> {
        let sql = format!(
            "UPDATE catalog_items SET \
                name = COALESCE($2, name), \
                category = COALESCE($3, category), \
                description = COALESCE($4, description), \
                price = COALESCE($5, price), \
                image_url = COALESCE($6, image_url), \
                updated_at = $7 \
             WHERE id = $1 RETURNING {ITEM_COLUMNS}"
        );
        sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(&patch.name)
            .bind(&patch.category)
            .bind(&patch.description)
            .bind(patch.price.map(|p| p.as_decimal()))
            .bind(&patch.image_url)
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_item", e))?
            .as_ref()
            .map(item_from_row)
            .transpose()
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: ItemId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM catalog_items WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_item", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn adjust_quantity(
        &self,
        id: ItemId,
        adjustment: StockAdjustment,
    ) -> Result<AdjustOutcome, StoreError> {
        let sql = match adjustment {
            StockAdjustment::Withdraw(_) => format!(
                "UPDATE catalog_items SET quantity = quantity - $2, updated_at = now() \
                 WHERE id = $1 AND quantity >= $2 RETURNING {ITEM_COLUMNS}"
            ),
            StockAdjustment::Deposit(_) => format!(
                "UPDATE catalog_items SET quantity = quantity + $2, updated_at = now() \
                 WHERE id = $1 RETURNING {ITEM_COLUMNS}"
            ),
        };

        let updated = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(adjustment.amount())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("adjust_quantity", e))?;

        if let Some(row) = updated {
            return item_from_row(&row).map(AdjustOutcome::Applied);
        }

        Ok(match self.current_quantity(id).await? {
            None => AdjustOutcome::NotFound,
            Some(available) => AdjustOutcome::Insufficient { available },
        })
    }
}

#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)");
        sqlx::query(&sql)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_id", e))?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    #[instrument(skip_all, fields(email = %user.email), err)]
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let user = user.into_user(Utc::now());
        let sql = format!(
            "INSERT INTO users ({USER_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(user.id.as_uuid())
            .bind(user.email.as_str())
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.role.as_str())
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_user", e))?;
        user_from_row(&row)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, id ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;
        rows.iter().map(user_from_row).collect()
    }
}

fn item_from_row(row: &PgRow) -> Result<CatalogItem, StoreError> {
    let decode = |e: sqlx::Error| StoreError::backend(format!("failed to decode item row: {e}"));
    let price = Price::new(row.try_get("price").map_err(decode)?)
        .map_err(|e| StoreError::backend(format!("stored price is invalid: {e}")))?;

    Ok(CatalogItem {
        id: ItemId::from_uuid(row.try_get("id").map_err(decode)?),
        name: row.try_get("name").map_err(decode)?,
        category: row.try_get("category").map_err(decode)?,
        description: row.try_get("description").map_err(decode)?,
        price,
        quantity: row.try_get("quantity").map_err(decode)?,
        image_url: row.try_get("image_url").map_err(decode)?,
        created_at: row.try_get("created_at").map_err(decode)?,
        updated_at: row.try_get("updated_at").map_err(decode)?,
    })
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let decode = |e: sqlx::Error| StoreError::backend(format!("failed to decode user row: {e}"));
    let email: String = row.try_get("email").map_err(decode)?;
    let role: String = row.try_get("role").map_err(decode)?;

    Ok(User {
        id: UserId::from_uuid(row.try_get("id").map_err(decode)?),
        email: Email::parse(&email)
            .map_err(|e| StoreError::backend(format!("stored email is invalid: {e}")))?,
        password_hash: row.try_get("password_hash").map_err(decode)?,
        first_name: row.try_get("first_name").map_err(decode)?,
        last_name: row.try_get("last_name").map_err(decode)?,
        role: role
            .parse::<Role>()
            .map_err(|e| StoreError::backend(format!("stored role is invalid: {e}")))?,
        created_at: row.try_get("created_at").map_err(decode)?,
        updated_at: row.try_get("updated_at").map_err(decode)?,
    })
}

/// Escape `LIKE` metacharacters so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    if is_unique_violation(&err) {
        return StoreError::Conflict(format!("unique violation in {operation}"));
    }
    match err {
        sqlx::Error::Database(db_err) => {
            StoreError::backend(format!("database error in {operation}: {}", db_err.message()))
        }
        sqlx::Error::PoolClosed => {
            StoreError::backend(format!("connection pool closed in {operation}"))
        }
        other => StoreError::backend(format!("sqlx error in {operation}: {other}")),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}
