//! Repository for the `ollama_instances` table.

use genimage_core::types::DbId;
use sqlx::SqlitePool;

use super::NOW;
use crate::models::ollama_instance::{CreateOllamaInstance, OllamaInstance, UpdateOllamaInstance};

/// Column list for `ollama_instances` queries.
const COLUMNS: &str = "id, name, base_url, is_active, created_at, updated_at";

pub struct OllamaInstanceRepo;

impl OllamaInstanceRepo {
    pub async fn list(pool: &SqlitePool) -> Result<Vec<OllamaInstance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ollama_instances ORDER BY id ASC");
        sqlx::query_as::<_, OllamaInstance>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<OllamaInstance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ollama_instances WHERE id = ?1");
        sqlx::query_as::<_, OllamaInstance>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an instance only if it is active.
    pub async fn find_active(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<OllamaInstance>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM ollama_instances WHERE id = ?1 AND is_active = 1");
        sqlx::query_as::<_, OllamaInstance>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        input: &CreateOllamaInstance,
    ) -> Result<OllamaInstance, sqlx::Error> {
        let query = format!(
            "INSERT INTO ollama_instances (name, base_url, is_active) \
             VALUES (?1, ?2, COALESCE(?3, 1)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OllamaInstance>(&query)
            .bind(&input.name)
            .bind(input.base_url.trim_end_matches('/'))
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateOllamaInstance,
    ) -> Result<Option<OllamaInstance>, sqlx::Error> {
        let query = format!(
            "UPDATE ollama_instances SET \
                 name = COALESCE(?2, name), \
                 base_url = COALESCE(?3, base_url), \
                 is_active = COALESCE(?4, is_active), \
                 updated_at = {NOW} \
             WHERE id = ?1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OllamaInstance>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.base_url.as_deref().map(|u| u.trim_end_matches('/')))
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn toggle_active(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<OllamaInstance>, sqlx::Error> {
        let query = format!(
            "UPDATE ollama_instances SET is_active = NOT is_active, updated_at = {NOW} \
             WHERE id = ?1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OllamaInstance>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete an instance. Description settings pointing at it are cleared.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ollama_instances WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
