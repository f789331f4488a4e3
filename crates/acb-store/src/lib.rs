//! Postgres adapter for the `acb-core` store port.
//!
//! `Db` is an explicit lifecycle object: connect once at startup, inject as
//! `Arc<dyn UserRecordStore>`, close at shutdown. Any call against a closed
//! pool fails fast with `StoreError::NotInitialized` rather than silently
//! doing nothing.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;

use acb_core::{
    domain::{UserId, UserRecord},
    store::{StoreError, UserRecordStore},
};

#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(map_sqlx_err)?;
        Ok(Self { pool })
    }

    /// Apply embedded migrations. Safe to run on every startup.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Other(e.to_string()))?;
        tracing::info!("database migrations applied");
        Ok(())
    }

    /// Drain the pool. Store calls after this fail with `NotInitialized`.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl UserRecordStore for Db {
    async fn fetch(&self, user: UserId) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query("SELECT last_comment_at, blocked FROM users WHERE id = $1")
            .bind(user.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        row.map(|r| {
            Ok(UserRecord {
                last_comment_at: r.try_get("last_comment_at").map_err(map_sqlx_err)?,
                blocked: r.try_get("blocked").map_err(map_sqlx_err)?,
            })
        })
        .transpose()
    }

    async fn save_comment(
        &self,
        target: &str,
        text: &str,
        user: UserId,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        // Upsert the user first so the comment's foreign key always has a
        // row to point at; both writes commit together or not at all. The
        // timestamp is the server clock, so it never moves backwards.
        sqlx::query(
            "INSERT INTO users (id, last_comment_at) VALUES ($1, now())
             ON CONFLICT (id) DO UPDATE SET last_comment_at = now()",
        )
        .bind(user.0)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        sqlx::query("INSERT INTO comments (target, comment_text, from_user_id) VALUES ($1, $2, $3)")
            .bind(target)
            .bind(text)
            .bind(user.0)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(())
    }
}

fn map_sqlx_err(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolClosed => StoreError::NotInitialized,
        sqlx::Error::Io(e) => StoreError::Connectivity(e.to_string()),
        sqlx::Error::Tls(e) => StoreError::Connectivity(e.to_string()),
        sqlx::Error::PoolTimedOut => {
            StoreError::Connectivity("connection pool timed out".to_string())
        }
        sqlx::Error::Database(db) if db.constraint().is_some() => {
            StoreError::Constraint(db.to_string())
        }
        other => StoreError::Other(other.to_string()),
    }
}
