//! Repository for the `render_types` table.

use genimage_core::generation::GenerationMode;
use genimage_core::types::DbId;
use sqlx::SqlitePool;

use super::NOW;
use crate::models::render_type::{CreateRenderType, RenderType, UpdateRenderType};

/// Column list for `render_types` queries.
const COLUMNS: &str = "\
    id, name, workflow_filename, prompt_examples, is_visible, generation_mode, \
    is_default_for_generation, is_default_for_upscale, created_at, updated_at";

/// Default-flag column for a mode.
fn default_column(mode: GenerationMode) -> &'static str {
    match mode {
        GenerationMode::ImageGeneration => "is_default_for_generation",
        GenerationMode::Upscale => "is_default_for_upscale",
    }
}

/// Provides CRUD operations for render types.
pub struct RenderTypeRepo;

impl RenderTypeRepo {
    /// List all render types ordered by name.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<RenderType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM render_types ORDER BY name ASC");
        sqlx::query_as::<_, RenderType>(&query).fetch_all(pool).await
    }

    /// List visible render types for one mode, ordered by name.
    pub async fn list_visible(
        pool: &SqlitePool,
        mode: GenerationMode,
    ) -> Result<Vec<RenderType>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM render_types \
             WHERE is_visible = 1 AND generation_mode = ?1 \
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, RenderType>(&query)
            .bind(mode.as_str())
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<RenderType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM render_types WHERE id = ?1");
        sqlx::query_as::<_, RenderType>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_name(
        pool: &SqlitePool,
        name: &str,
    ) -> Result<Option<RenderType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM render_types WHERE name = ?1");
        sqlx::query_as::<_, RenderType>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// The default render type for a mode, if one is set.
    pub async fn find_default(
        pool: &SqlitePool,
        mode: GenerationMode,
    ) -> Result<Option<RenderType>, sqlx::Error> {
        let column = default_column(mode);
        let query = format!(
            "SELECT {COLUMNS} FROM render_types \
             WHERE {column} = 1 AND generation_mode = ?1"
        );
        sqlx::query_as::<_, RenderType>(&query)
            .bind(mode.as_str())
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        input: &CreateRenderType,
    ) -> Result<RenderType, sqlx::Error> {
        let query = format!(
            "INSERT INTO render_types \
                (name, workflow_filename, prompt_examples, is_visible, generation_mode) \
             VALUES (?1, ?2, ?3, COALESCE(?4, 1), ?5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RenderType>(&query)
            .bind(&input.name)
            .bind(&input.workflow_filename)
            .bind(&input.prompt_examples)
            .bind(input.is_visible)
            .bind(input.generation_mode.as_str())
            .fetch_one(pool)
            .await
    }

    /// Partially update a render type.
    ///
    /// A default flag that no longer matches the (possibly new) mode is
    /// cleared in the same statement.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateRenderType,
    ) -> Result<Option<RenderType>, sqlx::Error> {
        let query = format!(
            "UPDATE render_types SET \
                 name = COALESCE(?2, name), \
                 workflow_filename = COALESCE(?3, workflow_filename), \
                 prompt_examples = COALESCE(?4, prompt_examples), \
                 is_visible = COALESCE(?5, is_visible), \
                 generation_mode = COALESCE(?6, generation_mode), \
                 is_default_for_generation = CASE \
                     WHEN COALESCE(?6, generation_mode) = 'image_generation' \
                     THEN is_default_for_generation ELSE 0 END, \
                 is_default_for_upscale = CASE \
                     WHEN COALESCE(?6, generation_mode) = 'upscale' \
                     THEN is_default_for_upscale ELSE 0 END, \
                 updated_at = {NOW} \
             WHERE id = ?1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RenderType>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.workflow_filename)
            .bind(&input.prompt_examples)
            .bind(input.is_visible)
            .bind(input.generation_mode.map(GenerationMode::as_str))
            .fetch_optional(pool)
            .await
    }

    /// Make a render type the default for its own mode, clearing the
    /// previous default of that mode.
    ///
    /// Returns `None` if the render type does not exist.
    pub async fn set_default(pool: &SqlitePool, id: DbId) -> Result<Option<RenderType>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let select = format!("SELECT {COLUMNS} FROM render_types WHERE id = ?1");
        let Some(current) = sqlx::query_as::<_, RenderType>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let mode = current
            .mode()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let column = default_column(mode);

        let clear = format!(
            "UPDATE render_types SET {column} = 0, updated_at = {NOW} \
             WHERE {column} = 1 AND id <> ?1"
        );
        sqlx::query(&clear).bind(id).execute(&mut *tx).await?;

        let set = format!(
            "UPDATE render_types SET {column} = 1, updated_at = {NOW} \
             WHERE id = ?1 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, RenderType>(&set)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    /// Count the styles and instances that still point at a render type.
    pub async fn count_references(pool: &SqlitePool, id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT \
                 (SELECT COUNT(*) FROM styles WHERE default_render_type_id = ?1) \
               + (SELECT COUNT(*) FROM style_render_types WHERE render_type_id = ?1) \
               + (SELECT COUNT(*) FROM comfyui_instance_render_types WHERE render_type_id = ?1)",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Delete a render type. Returns `true` if a row was removed.
    ///
    /// Referenced render types are protected by `ON DELETE RESTRICT`; the
    /// caller should check [`Self::count_references`] first for a friendly
    /// error.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM render_types WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
