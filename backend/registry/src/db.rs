//! SQLite-backed [`OpaqueStore`] — pool setup, migrations and the two
//! key/value queries.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::store::OpaqueStore;

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    let options = SqliteConnectOptions::from_str(&url)?.create_if_missing(true);

    // Each connection to an in-memory database sees its own empty database.
    let max_connections = if url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        Ok(Self::from_pool(init_pool(database_url).await?))
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OpaqueStore for SqliteStore {
    async fn is_available(&self) -> Result<bool> {
        if self.pool.is_closed() {
            return Ok(false);
        }
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!("SQLite liveness probe failed: {e}");
                Ok(false)
            }
        }
    }

    async fn get_data(&self, key: &str) -> Result<Vec<u8>> {
        let row: Option<(Vec<u8>,)> = sqlx::query_as("SELECT value FROM kv_entries WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        debug!("get_data {key}: {}", if row.is_some() { "hit" } else { "miss" });
        Ok(row.map(|(v,)| v).unwrap_or_default())
    }

    async fn set_data(&self, key: &str, value: &[u8]) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_entries (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value      = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await?;
        debug!("set_data {key}: {} bytes", value.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn unset_key_reads_empty() {
        let store = memory_store().await;
        assert!(store.get_data("forum_keys").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_then_get_round_trips_bytes() {
        let store = memory_store().await;
        store.set_data("project_keys", br#"["a"]"#).await.unwrap();
        assert_eq!(store.get_data("project_keys").await.unwrap(), br#"["a"]"#);
    }

    #[tokio::test]
    async fn set_overwrites_existing_key() {
        let store = memory_store().await;
        store.set_data("k", b"first").await.unwrap();
        store.set_data("k", b"second").await.unwrap();
        assert_eq!(store.get_data("k").await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn open_pool_is_available() {
        let store = memory_store().await;
        assert!(store.is_available().await.unwrap());
    }

    #[tokio::test]
    async fn closed_pool_is_unavailable() {
        let store = memory_store().await;
        store.pool.close().await;
        assert!(!store.is_available().await.unwrap());
    }
}
