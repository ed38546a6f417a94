//! Repository for the single-row `description_settings` table.

use sqlx::SqlitePool;

use super::NOW;
use crate::models::description_settings::{DescriptionSettings, UpdateDescriptionSettings};

const COLUMNS: &str = "\
    ollama_instance_id, model_name, \
    natural_prompt_template_en, optimized_prompt_template_en, \
    natural_prompt_template_fr, optimized_prompt_template_fr, updated_at";

pub struct DescriptionSettingsRepo;

impl DescriptionSettingsRepo {
    /// The settings row. It is seeded by the initial migration.
    pub async fn get(pool: &SqlitePool) -> Result<DescriptionSettings, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM description_settings WHERE id = 1");
        sqlx::query_as::<_, DescriptionSettings>(&query)
            .fetch_one(pool)
            .await
    }

    /// Replace every field. `None` clears it.
    pub async fn update(
        pool: &SqlitePool,
        input: &UpdateDescriptionSettings,
    ) -> Result<DescriptionSettings, sqlx::Error> {
        let query = format!(
            "UPDATE description_settings SET \
                 ollama_instance_id = ?1, \
                 model_name = ?2, \
                 natural_prompt_template_en = ?3, \
                 optimized_prompt_template_en = ?4, \
                 natural_prompt_template_fr = ?5, \
                 optimized_prompt_template_fr = ?6, \
                 updated_at = {NOW} \
             WHERE id = 1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DescriptionSettings>(&query)
            .bind(input.ollama_instance_id)
            .bind(&input.model_name)
            .bind(&input.natural_prompt_template_en)
            .bind(&input.optimized_prompt_template_en)
            .bind(&input.natural_prompt_template_fr)
            .bind(&input.optimized_prompt_template_fr)
            .fetch_one(pool)
            .await
    }
}
