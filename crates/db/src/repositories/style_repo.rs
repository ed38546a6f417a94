//! Repository for the `styles` and `style_render_types` tables.

use genimage_core::types::DbId;
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::NOW;
use crate::models::style::{CreateStyle, Style, UpdateStyle};

/// Column list for `styles` queries.
const COLUMNS: &str = "\
    id, name, category, prompt_template, negative_prompt_template, \
    is_active, is_default, default_render_type_id, created_at, updated_at";

/// Provides CRUD operations for styles and their render type compatibility.
pub struct StyleRepo;

impl StyleRepo {
    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// List all styles ordered by name.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Style>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM styles ORDER BY name ASC");
        sqlx::query_as::<_, Style>(&query).fetch_all(pool).await
    }

    /// List active styles ordered by name.
    pub async fn list_active(pool: &SqlitePool) -> Result<Vec<Style>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM styles WHERE is_active = 1 ORDER BY name ASC");
        sqlx::query_as::<_, Style>(&query).fetch_all(pool).await
    }

    /// Active styles flagged as default, ordered by name.
    pub async fn list_defaults(pool: &SqlitePool) -> Result<Vec<Style>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM styles \
             WHERE is_active = 1 AND is_default = 1 \
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, Style>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Style>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM styles WHERE id = ?1");
        sqlx::query_as::<_, Style>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Style>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM styles WHERE name = ?1");
        sqlx::query_as::<_, Style>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// IDs of the render types a style is compatible with.
    pub async fn compatible_render_type_ids(
        pool: &SqlitePool,
        style_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT render_type_id FROM style_render_types \
             WHERE style_id = ?1 ORDER BY render_type_id ASC",
        )
        .bind(style_id)
        .fetch_all(pool)
        .await
    }

    /// Names of the render types a style is compatible with.
    pub async fn compatible_render_type_names(
        pool: &SqlitePool,
        style_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT rt.name FROM style_render_types srt \
             JOIN render_types rt ON rt.id = srt.render_type_id \
             WHERE srt.style_id = ?1 \
             ORDER BY rt.name ASC",
        )
        .bind(style_id)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Insert a style and its compatibility rows in one transaction.
    pub async fn create(pool: &SqlitePool, input: &CreateStyle) -> Result<Style, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO styles \
                (name, category, prompt_template, negative_prompt_template, \
                 is_active, is_default, default_render_type_id) \
             VALUES (?1, COALESCE(?2, ''), COALESCE(?3, ''), COALESCE(?4, ''), \
                     COALESCE(?5, 1), COALESCE(?6, 0), ?7) \
             RETURNING {COLUMNS}"
        );
        let style = sqlx::query_as::<_, Style>(&query)
            .bind(&input.name)
            .bind(&input.category)
            .bind(&input.prompt_template)
            .bind(&input.negative_prompt_template)
            .bind(input.is_active)
            .bind(input.is_default)
            .bind(input.default_render_type_id)
            .fetch_one(&mut *tx)
            .await?;

        Self::set_render_types_inner(&mut tx, style.id, &input.compatible_render_type_ids).await?;

        tx.commit().await?;
        Ok(style)
    }

    /// Partially update a style. Replaces the compatibility set when
    /// `compatible_render_type_ids` is given.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateStyle,
    ) -> Result<Option<Style>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE styles SET \
                 name = COALESCE(?2, name), \
                 category = COALESCE(?3, category), \
                 prompt_template = COALESCE(?4, prompt_template), \
                 negative_prompt_template = COALESCE(?5, negative_prompt_template), \
                 is_active = COALESCE(?6, is_active), \
                 is_default = COALESCE(?7, is_default), \
                 default_render_type_id = COALESCE(?8, default_render_type_id), \
                 updated_at = {NOW} \
             WHERE id = ?1 \
             RETURNING {COLUMNS}"
        );
        let Some(style) = sqlx::query_as::<_, Style>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.category)
            .bind(&input.prompt_template)
            .bind(&input.negative_prompt_template)
            .bind(input.is_active)
            .bind(input.is_default)
            .bind(input.default_render_type_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if let Some(ids) = &input.compatible_render_type_ids {
            Self::set_render_types_inner(&mut tx, id, ids).await?;
        }

        tx.commit().await?;
        Ok(Some(style))
    }

    /// Flip the `is_default` flag.
    pub async fn toggle_default(pool: &SqlitePool, id: DbId) -> Result<Option<Style>, sqlx::Error> {
        let query = format!(
            "UPDATE styles SET is_default = NOT is_default, updated_at = {NOW} \
             WHERE id = ?1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Style>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a style. Its compatibility rows cascade.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM styles WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_render_types_inner(
        tx: &mut Transaction<'_, Sqlite>,
        style_id: DbId,
        render_type_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM style_render_types WHERE style_id = ?1")
            .bind(style_id)
            .execute(&mut **tx)
            .await?;

        for render_type_id in render_type_ids {
            sqlx::query(
                "INSERT INTO style_render_types (style_id, render_type_id) VALUES (?1, ?2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(style_id)
            .bind(render_type_id)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}
