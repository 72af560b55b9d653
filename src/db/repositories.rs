//! User repository: the store abstraction and its PostgreSQL implementation.

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, UserRecord};

pub(crate) const DUPLICATE_EMAIL: &str = "User already exists";

/// Persistence for [`UserRecord`]s. Emails are expected already normalized.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user unless the email is taken. Check and insert are atomic;
    /// a taken email yields [`AppError::Conflict`].
    async fn insert(&self, user: NewUser) -> AppResult<UserRecord>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserRecord>>;

    /// Remove a user. Only used to undo a registration that failed half-way.
    async fn remove(&self, id: Uuid) -> AppResult<bool>;

    /// Release held resources on shutdown.
    async fn close(&self) {}
}

// ---- PostgreSQL ----

#[derive(Clone)]
pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: NewUser) -> AppResult<UserRecord> {
        let row = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (id, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| {
            debug!(email = %user.email, "insert skipped: email taken");
            AppError::Conflict(DUPLICATE_EMAIL.to_string())
        })
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn remove(&self, id: Uuid) -> AppResult<bool> {
        let r = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(r.rows_affected() > 0)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
