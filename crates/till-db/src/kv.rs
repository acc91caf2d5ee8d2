//! # Local Storage
//!
//! A string-keyed, string-valued table with browser local-storage
//! semantics: every key holds one complete JSON document, and writing a key
//! replaces whatever was there.
//!
//! ```text
//! ┌──────────────────────┬──────────────────────────────────┬─────────────┐
//! │ key                  │ value                            │ updated_at  │
//! ├──────────────────────┼──────────────────────────────────┼─────────────┤
//! │ products             │ [{"id":"…","name":"Cola",…},…]   │ 2024-03-04… │
//! │ storeSettings        │ {"storeName":"My POS Store",…}   │ 2024-03-04… │
//! │ selectedLocationId   │ "loc-001"                        │ 2024-03-04… │
//! └──────────────────────┴──────────────────────────────────┴─────────────┘
//! ```
//!
//! ## Reads Never Fail on Bad Data
//! [`LocalStorage::get_json_or`] returns the fallback for a missing key and
//! also for a value that does not parse; the second case is logged at
//! `warn` so corrupted data is visible without taking the back office down.

use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::DbResult;

/// Handle to the `local_storage` table. Cheap to clone.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    pool: SqlitePool,
}

impl LocalStorage {
    pub fn new(pool: SqlitePool) -> Self {
        LocalStorage { pool }
    }

    /// Raw stored text for `key`, if any.
    pub async fn get_raw(&self, key: &str) -> DbResult<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM local_storage WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    /// Writes `value` under `key`, replacing any previous value.
    pub async fn set_raw(&self, key: &str, value: &str) -> DbResult<()> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = value.len(), "Stored value");
        Ok(())
    }

    /// Deletes `key`. Removing a missing key is not an error.
    pub async fn remove(&self, key: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM local_storage WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Every stored key, sorted.
    pub async fn keys(&self) -> DbResult<Vec<String>> {
        let keys = sqlx::query_scalar::<_, String>("SELECT key FROM local_storage ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(keys)
    }

    /// Removes each of `keys` in one database transaction.
    pub async fn clear(&self, keys: &[&str]) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        for key in keys {
            sqlx::query("DELETE FROM local_storage WHERE key = ?1")
                .bind(*key)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Parsed value of `key`, or `fallback` when the key is missing or its
    /// value is not valid JSON for `T`.
    pub async fn get_json_or<T: DeserializeOwned>(&self, key: &str, fallback: T) -> DbResult<T> {
        let Some(raw) = self.get_raw(key).await? else {
            return Ok(fallback);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(key = %key, error = %e, "Stored value is not valid, using default");
                Ok(fallback)
            }
        }
    }

    /// Serializes `value` and writes it under `key`.
    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> DbResult<()> {
        let text = serde_json::to_string(value)?;
        self.set_raw(key, &text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    async fn storage() -> LocalStorage {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        LocalStorage::new(db.pool().clone())
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let kv = storage().await;
        kv.set_raw("scratch", "1").await.unwrap();
        kv.set_raw("scratch", "2").await.unwrap();
        assert_eq!(kv.get_raw("scratch").await.unwrap().as_deref(), Some("2"));

        kv.remove("scratch").await.unwrap();
        assert_eq!(kv.get_raw("scratch").await.unwrap(), None);
        kv.remove("scratch").await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_json_falls_back() {
        let kv = storage().await;
        kv.set_raw("scratch", "{not json").await.unwrap();

        let value: Vec<u32> = kv.get_json_or("scratch", vec![7]).await.unwrap();
        assert_eq!(value, vec![7]);

        let missing: Vec<u32> = kv.get_json_or("missing", Vec::new()).await.unwrap();
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_json_round_trip_and_clear() {
        let kv = storage().await;
        kv.set_json("a", &vec!["x", "y"]).await.unwrap();
        kv.set_json("b", &42).await.unwrap();

        let a: Vec<String> = kv.get_json_or("a", Vec::new()).await.unwrap();
        assert_eq!(a, vec!["x", "y"]);

        kv.clear(&["a", "b"]).await.unwrap();
        assert_eq!(kv.get_raw("a").await.unwrap(), None);
        assert_eq!(kv.get_raw("b").await.unwrap(), None);
    }
}
