//! ComfyUI instance models and DTOs.

use genimage_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A ComfyUI server the orchestrator may submit workflows to.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ComfyUIInstance {
    pub id: DbId,
    pub name: String,
    pub base_url: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An instance together with the render types it can run.
#[derive(Debug, Clone, Serialize)]
pub struct ComfyUIInstanceDetail {
    #[serde(flatten)]
    pub instance: ComfyUIInstance,
    pub compatible_render_type_ids: Vec<DbId>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateComfyUIInstance {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(url)]
    pub base_url: String,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub compatible_render_type_ids: Vec<DbId>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateComfyUIInstance {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(url)]
    pub base_url: Option<String>,
    pub is_active: Option<bool>,
    pub compatible_render_type_ids: Option<Vec<DbId>>,
}
