//! Render type models and DTOs.
//!
//! A render type names a ComfyUI workflow file and the mode it serves.

use genimage_core::error::CoreError;
use genimage_core::generation::GenerationMode;
use genimage_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `render_types` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RenderType {
    pub id: DbId,
    pub name: String,
    pub workflow_filename: String,
    pub prompt_examples: Option<String>,
    pub is_visible: bool,
    pub generation_mode: String,
    pub is_default_for_generation: bool,
    pub is_default_for_upscale: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RenderType {
    pub fn mode(&self) -> Result<GenerationMode, CoreError> {
        self.generation_mode.parse()
    }

    /// Few-shot examples for prompt enhancement, if any are set.
    pub fn prompt_examples(&self) -> Option<&str> {
        self.prompt_examples
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRenderType {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub workflow_filename: String,
    pub prompt_examples: Option<String>,
    pub is_visible: Option<bool>,
    #[serde(default)]
    pub generation_mode: GenerationMode,
}

/// Partial update. Changing the mode drops any default flag that no longer
/// matches it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRenderType {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub workflow_filename: Option<String>,
    pub prompt_examples: Option<String>,
    pub is_visible: Option<bool>,
    pub generation_mode: Option<GenerationMode>,
}
