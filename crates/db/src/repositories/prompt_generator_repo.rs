//! Repository for `prompt_generator_settings` and
//! `prompt_generator_allowed_styles`.

use genimage_core::types::DbId;
use sqlx::SqlitePool;

use super::NOW;
use crate::models::prompt_generator_settings::{
    PromptGeneratorSettings, UpdatePromptGeneratorSettings,
};
use crate::models::style::Style;

const COLUMNS: &str = "\
    subjects_to_propose, elements_to_propose, elements_to_select, \
    variations_to_propose, updated_at";

pub struct PromptGeneratorRepo;

impl PromptGeneratorRepo {
    pub async fn get_settings(pool: &SqlitePool) -> Result<PromptGeneratorSettings, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM prompt_generator_settings WHERE id = 1");
        sqlx::query_as::<_, PromptGeneratorSettings>(&query)
            .fetch_one(pool)
            .await
    }

    /// Update the counters and, when given, replace the allowed style set.
    pub async fn update_settings(
        pool: &SqlitePool,
        input: &UpdatePromptGeneratorSettings,
    ) -> Result<PromptGeneratorSettings, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE prompt_generator_settings SET \
                 subjects_to_propose = COALESCE(?1, subjects_to_propose), \
                 elements_to_propose = COALESCE(?2, elements_to_propose), \
                 elements_to_select = COALESCE(?3, elements_to_select), \
                 variations_to_propose = COALESCE(?4, variations_to_propose), \
                 updated_at = {NOW} \
             WHERE id = 1 \
             RETURNING {COLUMNS}"
        );
        let settings = sqlx::query_as::<_, PromptGeneratorSettings>(&query)
            .bind(input.subjects_to_propose)
            .bind(input.elements_to_propose)
            .bind(input.elements_to_select)
            .bind(input.variations_to_propose)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(style_ids) = &input.allowed_style_ids {
            sqlx::query("DELETE FROM prompt_generator_allowed_styles")
                .execute(&mut *tx)
                .await?;
            for &style_id in style_ids {
                sqlx::query(
                    "INSERT INTO prompt_generator_allowed_styles (style_id) VALUES (?1) \
                     ON CONFLICT DO NOTHING",
                )
                .bind(style_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(settings)
    }

    pub async fn allowed_style_ids(pool: &SqlitePool) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT style_id FROM prompt_generator_allowed_styles ORDER BY style_id ASC")
            .fetch_all(pool)
            .await
    }

    /// Allowed styles that are also active, ordered by name.
    pub async fn allowed_styles(pool: &SqlitePool) -> Result<Vec<Style>, sqlx::Error> {
        sqlx::query_as::<_, Style>(
            "SELECT s.id, s.name, s.category, s.prompt_template, s.negative_prompt_template, \
                    s.is_active, s.is_default, s.default_render_type_id, s.created_at, s.updated_at \
             FROM styles s \
             JOIN prompt_generator_allowed_styles a ON a.style_id = s.id \
             WHERE s.is_active = 1 \
             ORDER BY s.name ASC",
        )
        .fetch_all(pool)
        .await
    }
}
