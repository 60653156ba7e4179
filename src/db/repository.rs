//! SQLite-backed key-value store.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::storage::KeyValueStore;

/// Persistent [`KeyValueStore`]; `keys()` follows rowid, i.e. first-insertion order.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT value FROM kv_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get("value")))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();

        // Upsert in place so the rowid, and with it the key order, is kept
        sqlx::query(
            "INSERT INTO kv_entries (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM kv_entries WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query("SELECT key FROM kv_entries ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|row| row.get("key")).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    async fn open_store(dir: &TempDir) -> SqliteStore {
        let pool = init_database(&dir.path().join("state.sqlite"))
            .await
            .expect("Failed to init DB");
        SqliteStore::new(pool)
    }

    #[tokio::test]
    async fn test_upsert_and_remove() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        assert!(store.get("missing").await.unwrap().is_none());

        store.set("u1_userStats", r#"{"totalXP":0}"#).await.unwrap();
        store.set("u1_userStats", r#"{"totalXP":100}"#).await.unwrap();
        assert_eq!(
            store.get("u1_userStats").await.unwrap().as_deref(),
            Some(r#"{"totalXP":100}"#)
        );

        store.remove("u1_userStats").await.unwrap();
        assert!(store.get("u1_userStats").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_keys_in_insertion_order() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        for key in ["b_userStats", "a_userStats", "flowhivee_language"] {
            store.set(key, "1").await.unwrap();
        }
        store.set("b_userStats", "2").await.unwrap();

        assert_eq!(
            store.keys().await.unwrap(),
            vec!["b_userStats", "a_userStats", "flowhivee_language"]
        );
    }

    #[tokio::test]
    async fn test_values_persist_across_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = open_store(&dir).await;
            store.set("flowhivee_language", "\"sw\"").await.unwrap();
        }

        let store = open_store(&dir).await;
        assert_eq!(
            store.get("flowhivee_language").await.unwrap().as_deref(),
            Some("\"sw\"")
        );
    }
}
