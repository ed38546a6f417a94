//! Handlers for the `/ollama-instances` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use genimage_core::error::CoreError;
use genimage_core::types::DbId;
use genimage_db::models::ollama_instance::{
    CreateOllamaInstance, OllamaInstance, UpdateOllamaInstance,
};
use genimage_db::repositories::OllamaInstanceRepo;
use genimage_ollama::api::ModelInfo;
use genimage_ollama::OllamaApi;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "OllamaInstance",
        id,
    })
}

/// GET /api/v1/ollama-instances
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let instances = OllamaInstanceRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: instances }))
}

/// POST /api/v1/ollama-instances
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateOllamaInstance>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let instance = OllamaInstanceRepo::create(&state.pool, &input).await?;
    tracing::info!(id = instance.id, url = %instance.base_url, "Ollama instance registered");
    Ok((StatusCode::CREATED, Json(DataResponse { data: instance })))
}

/// GET /api/v1/ollama-instances/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<OllamaInstance>>> {
    let instance = OllamaInstanceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: instance }))
}

/// PUT /api/v1/ollama-instances/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateOllamaInstance>,
) -> AppResult<Json<DataResponse<OllamaInstance>>> {
    input.validate()?;
    let instance = OllamaInstanceRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(id, "Ollama instance updated");
    Ok(Json(DataResponse { data: instance }))
}

/// DELETE /api/v1/ollama-instances/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if OllamaInstanceRepo::delete(&state.pool, id).await? {
        tracing::info!(id, "Ollama instance deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// POST /api/v1/ollama-instances/{id}/toggle-active
pub async fn toggle_active(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<OllamaInstance>>> {
    let instance = OllamaInstanceRepo::toggle_active(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(id, is_active = instance.is_active, "Ollama instance toggled");
    Ok(Json(DataResponse { data: instance }))
}

/// GET /api/v1/ollama-instances/{id}/models
///
/// Models installed on the instance, as reported by Ollama.
pub async fn list_models(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ModelInfo>>>> {
    let instance = OllamaInstanceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let api = OllamaApi::with_client(
        state.http.clone(),
        instance.base_url,
        state.config.ollama_timeout(),
    );
    let models = api
        .list_models()
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;
    Ok(Json(DataResponse { data: models }))
}
