//! Repository for the `comfyui_instances` and
//! `comfyui_instance_render_types` tables.

use genimage_core::types::DbId;
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::NOW;
use crate::models::comfyui_instance::{
    ComfyUIInstance, CreateComfyUIInstance, UpdateComfyUIInstance,
};

/// Column list for `comfyui_instances` queries.
const COLUMNS: &str = "id, name, base_url, is_active, created_at, updated_at";

/// Provides query operations for ComfyUI instances.
pub struct ComfyUIInstanceRepo;

impl ComfyUIInstanceRepo {
    // ── Queries ──────────────────────────────────────────────────────

    /// List all instances ordered by ID (including inactive).
    pub async fn list(pool: &SqlitePool) -> Result<Vec<ComfyUIInstance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comfyui_instances ORDER BY id ASC");
        sqlx::query_as::<_, ComfyUIInstance>(&query)
            .fetch_all(pool)
            .await
    }

    /// Active instances that may run a render type, ordered by ID.
    ///
    /// With no render type, every active instance is a candidate. With one,
    /// only instances explicitly linked to it are.
    pub async fn list_active_for_render_type(
        pool: &SqlitePool,
        render_type_id: Option<DbId>,
    ) -> Result<Vec<ComfyUIInstance>, sqlx::Error> {
        match render_type_id {
            None => {
                let query = format!(
                    "SELECT {COLUMNS} FROM comfyui_instances WHERE is_active = 1 ORDER BY id ASC"
                );
                sqlx::query_as::<_, ComfyUIInstance>(&query)
                    .fetch_all(pool)
                    .await
            }
            Some(render_type_id) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM comfyui_instances \
                     WHERE is_active = 1 AND id IN ( \
                         SELECT instance_id FROM comfyui_instance_render_types \
                         WHERE render_type_id = ?1) \
                     ORDER BY id ASC"
                );
                sqlx::query_as::<_, ComfyUIInstance>(&query)
                    .bind(render_type_id)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<ComfyUIInstance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comfyui_instances WHERE id = ?1");
        sqlx::query_as::<_, ComfyUIInstance>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// IDs of the render types an instance can run.
    pub async fn render_type_ids(
        pool: &SqlitePool,
        instance_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT render_type_id FROM comfyui_instance_render_types \
             WHERE instance_id = ?1 ORDER BY render_type_id ASC",
        )
        .bind(instance_id)
        .fetch_all(pool)
        .await
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub async fn create(
        pool: &SqlitePool,
        input: &CreateComfyUIInstance,
    ) -> Result<ComfyUIInstance, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO comfyui_instances (name, base_url, is_active) \
             VALUES (?1, ?2, COALESCE(?3, 1)) \
             RETURNING {COLUMNS}"
        );
        let instance = sqlx::query_as::<_, ComfyUIInstance>(&query)
            .bind(&input.name)
            .bind(input.base_url.trim_end_matches('/'))
            .bind(input.is_active)
            .fetch_one(&mut *tx)
            .await?;

        Self::set_render_types_inner(&mut tx, instance.id, &input.compatible_render_type_ids)
            .await?;

        tx.commit().await?;
        Ok(instance)
    }

    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateComfyUIInstance,
    ) -> Result<Option<ComfyUIInstance>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE comfyui_instances SET \
                 name = COALESCE(?2, name), \
                 base_url = COALESCE(?3, base_url), \
                 is_active = COALESCE(?4, is_active), \
                 updated_at = {NOW} \
             WHERE id = ?1 \
             RETURNING {COLUMNS}"
        );
        let Some(instance) = sqlx::query_as::<_, ComfyUIInstance>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.base_url.as_deref().map(|u| u.trim_end_matches('/')))
            .bind(input.is_active)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if let Some(ids) = &input.compatible_render_type_ids {
            Self::set_render_types_inner(&mut tx, id, ids).await?;
        }

        tx.commit().await?;
        Ok(Some(instance))
    }

    /// Flip the `is_active` flag.
    pub async fn toggle_active(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<ComfyUIInstance>, sqlx::Error> {
        let query = format!(
            "UPDATE comfyui_instances SET is_active = NOT is_active, updated_at = {NOW} \
             WHERE id = ?1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ComfyUIInstance>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comfyui_instances WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_render_types_inner(
        tx: &mut Transaction<'_, Sqlite>,
        instance_id: DbId,
        render_type_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM comfyui_instance_render_types WHERE instance_id = ?1")
            .bind(instance_id)
            .execute(&mut **tx)
            .await?;

        for &render_type_id in render_type_ids {
            sqlx::query(
                "INSERT INTO comfyui_instance_render_types (instance_id, render_type_id) \
                 VALUES (?1, ?2) ON CONFLICT DO NOTHING",
            )
            .bind(instance_id)
            .bind(render_type_id)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}
