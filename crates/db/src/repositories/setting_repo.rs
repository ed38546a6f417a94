//! Repository for the `settings` key/value table.

use std::collections::HashMap;

use sqlx::SqlitePool;

use super::NOW;

pub struct SettingRepo;

impl SettingRepo {
    /// All settings as a map.
    pub async fn get_all(pool: &SqlitePool) -> Result<HashMap<String, String>, sqlx::Error> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM settings")
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().collect())
    }

    pub async fn get(pool: &SqlitePool, key: &str) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Insert or overwrite several keys in one transaction.
    pub async fn upsert_many(
        pool: &SqlitePool,
        values: &HashMap<String, String>,
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "INSERT INTO settings (key, value) VALUES (?1, ?2) \
             ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = {NOW}"
        );
        for (key, value) in values {
            sqlx::query(&query)
                .bind(key.trim())
                .bind(value.trim())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await
    }
}
