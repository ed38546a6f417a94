//! Handlers for runtime settings: the key/value table, image description
//! and the prompt generator.

use axum::extract::State;
use axum::Json;
use genimage_core::error::CoreError;
use genimage_core::settings::{
    DEFAULT_UPSCALE_DENOISE, OLLAMA_CONTEXT_WINDOW, OUTPUT_URL_BASE,
    PROMPT_ENHANCEMENT_OLLAMA_INSTANCE_ID,
};
use genimage_core::types::DbId;
use genimage_db::models::description_settings::{DescriptionSettings, UpdateDescriptionSettings};
use genimage_db::models::prompt_generator_settings::{
    PromptGeneratorSettingsDetail, UpdatePromptGeneratorSettings,
};
use genimage_db::models::setting::UpsertSettings;
use genimage_db::repositories::{
    DescriptionSettingsRepo, OllamaInstanceRepo, PromptGeneratorRepo, SettingRepo,
};
use genimage_db::DbPool;
use std::collections::HashMap;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Key/value settings
// ---------------------------------------------------------------------------

/// GET /api/v1/settings
pub async fn get_settings(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<HashMap<String, String>>>> {
    let settings = SettingRepo::get_all(&state.pool).await?;
    Ok(Json(DataResponse { data: settings }))
}

/// PUT /api/v1/settings
///
/// Upserts the given keys; keys not in the body are left alone.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(input): Json<UpsertSettings>,
) -> AppResult<Json<DataResponse<HashMap<String, String>>>> {
    for (key, value) in &input {
        validate_setting(key, value)?;
    }
    SettingRepo::upsert_many(&state.pool, &input).await?;
    tracing::info!(keys = input.len(), "Settings updated");

    let settings = SettingRepo::get_all(&state.pool).await?;
    Ok(Json(DataResponse { data: settings }))
}

/// Reject values the orchestrator could not use. Empty means unset.
fn validate_setting(key: &str, value: &str) -> Result<(), CoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }
    let valid = match key {
        OUTPUT_URL_BASE => value.starts_with("http://") || value.starts_with("https://"),
        DEFAULT_UPSCALE_DENOISE => value
            .parse::<f64>()
            .is_ok_and(|v| (0.0..=1.0).contains(&v)),
        PROMPT_ENHANCEMENT_OLLAMA_INSTANCE_ID => value.parse::<DbId>().is_ok(),
        OLLAMA_CONTEXT_WINDOW => value.parse::<u32>().is_ok(),
        _ => true,
    };
    if valid {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("Invalid value for {key}: '{value}'")))
    }
}

// ---------------------------------------------------------------------------
// Image description
// ---------------------------------------------------------------------------

/// GET /api/v1/description-settings
pub async fn get_description_settings(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DescriptionSettings>>> {
    let settings = DescriptionSettingsRepo::get(&state.pool).await?;
    Ok(Json(DataResponse { data: settings }))
}

/// PUT /api/v1/description-settings
pub async fn update_description_settings(
    State(state): State<AppState>,
    Json(input): Json<UpdateDescriptionSettings>,
) -> AppResult<Json<DataResponse<DescriptionSettings>>> {
    input.validate()?;
    if let Some(id) = input.ollama_instance_id {
        OllamaInstanceRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "OllamaInstance",
                id,
            }))?;
    }

    let settings = DescriptionSettingsRepo::update(&state.pool, &input).await?;
    tracing::info!(configured = settings.is_configured(), "Description settings updated");
    Ok(Json(DataResponse { data: settings }))
}

// ---------------------------------------------------------------------------
// Prompt generator
// ---------------------------------------------------------------------------

async fn generator_detail(pool: &DbPool) -> AppResult<PromptGeneratorSettingsDetail> {
    let settings = PromptGeneratorRepo::get_settings(pool).await?;
    let allowed_style_ids = PromptGeneratorRepo::allowed_style_ids(pool).await?;
    Ok(PromptGeneratorSettingsDetail {
        settings,
        allowed_style_ids,
    })
}

/// GET /api/v1/prompt-generator-settings
pub async fn get_prompt_generator_settings(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<PromptGeneratorSettingsDetail>>> {
    let data = generator_detail(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/prompt-generator-settings
///
/// Unknown style ids are rejected by the foreign key (409).
pub async fn update_prompt_generator_settings(
    State(state): State<AppState>,
    Json(input): Json<UpdatePromptGeneratorSettings>,
) -> AppResult<Json<DataResponse<PromptGeneratorSettingsDetail>>> {
    input.validate()?;
    PromptGeneratorRepo::update_settings(&state.pool, &input).await?;
    tracing::info!("Prompt generator settings updated");
    let data = generator_detail(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}
