//! Settings for the `describe_image` tool (single row).

use genimage_core::tools::{DescriptionType, Language};
use genimage_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// The `description_settings` row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DescriptionSettings {
    pub ollama_instance_id: Option<DbId>,
    pub model_name: Option<String>,
    pub natural_prompt_template_en: Option<String>,
    pub optimized_prompt_template_en: Option<String>,
    pub natural_prompt_template_fr: Option<String>,
    pub optimized_prompt_template_fr: Option<String>,
    pub updated_at: Timestamp,
}

impl DescriptionSettings {
    /// Instance and model, when both are set.
    pub fn target(&self) -> Option<(DbId, &str)> {
        let model = self.model_name.as_deref().map(str::trim).filter(|m| !m.is_empty())?;
        Some((self.ollama_instance_id?, model))
    }

    pub fn is_configured(&self) -> bool {
        self.target().is_some()
    }

    /// Instruction text for the requested description type and language.
    pub fn template(&self, kind: DescriptionType, language: Language) -> Option<&str> {
        let template = match (kind, language) {
            (DescriptionType::Natural, Language::En) => &self.natural_prompt_template_en,
            (DescriptionType::Optimized, Language::En) => &self.optimized_prompt_template_en,
            (DescriptionType::Natural, Language::Fr) => &self.natural_prompt_template_fr,
            (DescriptionType::Optimized, Language::Fr) => &self.optimized_prompt_template_fr,
        };
        template.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Full replacement of the description settings.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateDescriptionSettings {
    pub ollama_instance_id: Option<DbId>,
    #[validate(length(max = 200))]
    pub model_name: Option<String>,
    pub natural_prompt_template_en: Option<String>,
    pub optimized_prompt_template_en: Option<String>,
    pub natural_prompt_template_fr: Option<String>,
    pub optimized_prompt_template_fr: Option<String>,
}
