//! Settings for the `generate_prompt` tool (single row plus the allowed
//! style set).

use genimage_core::prompt_generator::GeneratorConfig;
use genimage_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// The `prompt_generator_settings` row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PromptGeneratorSettings {
    pub subjects_to_propose: i64,
    pub elements_to_propose: i64,
    pub elements_to_select: i64,
    pub variations_to_propose: i64,
    pub updated_at: Timestamp,
}

impl PromptGeneratorSettings {
    pub fn config(&self) -> GeneratorConfig {
        let count = |v: i64| u32::try_from(v).unwrap_or(1).max(1);
        GeneratorConfig {
            subjects_to_propose: count(self.subjects_to_propose),
            elements_to_propose: count(self.elements_to_propose),
            elements_to_select: count(self.elements_to_select),
            variations_to_propose: count(self.variations_to_propose),
        }
    }
}

/// Settings as served by the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct PromptGeneratorSettingsDetail {
    #[serde(flatten)]
    pub settings: PromptGeneratorSettings,
    pub allowed_style_ids: Vec<DbId>,
}

/// Partial update. `allowed_style_ids`, when present, replaces the set.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePromptGeneratorSettings {
    #[validate(range(min = 1, max = 100))]
    pub subjects_to_propose: Option<i64>,
    #[validate(range(min = 1, max = 100))]
    pub elements_to_propose: Option<i64>,
    #[validate(range(min = 1, max = 100))]
    pub elements_to_select: Option<i64>,
    #[validate(range(min = 1, max = 100))]
    pub variations_to_propose: Option<i64>,
    pub allowed_style_ids: Option<Vec<DbId>>,
}
