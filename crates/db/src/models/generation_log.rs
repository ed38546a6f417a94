//! Generation audit log models.
//!
//! The log is append-only; one row per tool call that reached execution.

use genimage_core::generation::GenerationStatus;
use genimage_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Separator used when storing several style names in one column.
pub const STYLE_NAMES_SEPARATOR: &str = ", ";

/// A row from the `generation_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GenerationLog {
    pub id: DbId,
    pub tool_name: String,
    pub positive_prompt: String,
    pub negative_prompt: String,
    pub render_type_name: Option<String>,
    pub style_names: Option<String>,
    pub aspect_ratio: Option<String>,
    pub seed: Option<i64>,
    pub llm_enhanced: bool,
    pub status: String,
    pub duration_ms: Option<i64>,
    pub error_message: Option<String>,
    pub image_filename: Option<String>,
    pub comfyui_instance_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// Values for a new log row.
///
/// Starts out `FAILED`; the task flips it to `SUCCESS` only once the
/// result has been delivered.
#[derive(Debug, Clone)]
pub struct NewGenerationLog {
    pub tool_name: String,
    pub positive_prompt: String,
    pub negative_prompt: String,
    pub render_type_name: Option<String>,
    pub style_names: Vec<String>,
    pub aspect_ratio: Option<String>,
    pub seed: Option<i64>,
    pub llm_enhanced: bool,
    pub status: GenerationStatus,
    pub duration_ms: Option<i64>,
    pub error_message: Option<String>,
    pub image_filename: Option<String>,
    pub comfyui_instance_id: Option<DbId>,
}

impl NewGenerationLog {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            positive_prompt: String::new(),
            negative_prompt: String::new(),
            render_type_name: None,
            style_names: Vec::new(),
            aspect_ratio: None,
            seed: None,
            llm_enhanced: false,
            status: GenerationStatus::Failed,
            duration_ms: None,
            error_message: None,
            image_filename: None,
            comfyui_instance_id: None,
        }
    }

    /// Style names as stored, or `None` when there are none.
    pub fn joined_style_names(&self) -> Option<String> {
        (!self.style_names.is_empty()).then(|| self.style_names.join(STYLE_NAMES_SEPARATOR))
    }
}

/// Query parameters for listing logs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationLogQuery {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

/// How often one render type or style appears in successful generations.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct UsageCount {
    pub name: String,
    pub count: i64,
}

/// Aggregates served by `/statistics`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationStats {
    pub total_successful: i64,
    pub llm_enhanced: i64,
    pub render_type_usage: Vec<UsageCount>,
    pub style_usage: Vec<UsageCount>,
}
