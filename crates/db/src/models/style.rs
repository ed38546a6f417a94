//! Style models and DTOs.
//!
//! A style contributes prompt fragments and may constrain which render
//! types it can be combined with.

use genimage_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `styles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Style {
    pub id: DbId,
    pub name: String,
    pub category: String,
    pub prompt_template: String,
    pub negative_prompt_template: String,
    pub is_active: bool,
    pub is_default: bool,
    pub default_render_type_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A style together with its compatible render type IDs, as served by the
/// admin API.
#[derive(Debug, Clone, Serialize)]
pub struct StyleDetail {
    #[serde(flatten)]
    pub style: Style,
    pub compatible_render_type_ids: Vec<DbId>,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStyle {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub category: Option<String>,
    pub prompt_template: Option<String>,
    pub negative_prompt_template: Option<String>,
    pub is_active: Option<bool>,
    pub is_default: Option<bool>,
    pub default_render_type_id: Option<DbId>,
    #[serde(default)]
    pub compatible_render_type_ids: Vec<DbId>,
}

/// Partial update. `compatible_render_type_ids`, when present, replaces the
/// whole set.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateStyle {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub category: Option<String>,
    pub prompt_template: Option<String>,
    pub negative_prompt_template: Option<String>,
    pub is_active: Option<bool>,
    pub is_default: Option<bool>,
    pub default_render_type_id: Option<DbId>,
    pub compatible_render_type_ids: Option<Vec<DbId>>,
}
