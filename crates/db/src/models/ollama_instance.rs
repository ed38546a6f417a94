//! Ollama instance models and DTOs.

use genimage_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// An Ollama server used for prompt enhancement, descriptions and the
/// prompt generator.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OllamaInstance {
    pub id: DbId,
    pub name: String,
    pub base_url: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOllamaInstance {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(url)]
    pub base_url: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateOllamaInstance {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(url)]
    pub base_url: Option<String>,
    pub is_active: Option<bool>,
}
