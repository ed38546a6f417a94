//! Handlers for the `/comfyui-instances` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use genimage_core::error::CoreError;
use genimage_core::types::DbId;
use genimage_db::models::comfyui_instance::{
    ComfyUIInstance, ComfyUIInstanceDetail, CreateComfyUIInstance, UpdateComfyUIInstance,
};
use genimage_db::repositories::ComfyUIInstanceRepo;
use genimage_db::DbPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "ComfyUIInstance",
        id,
    })
}

async fn detail(pool: &DbPool, instance: ComfyUIInstance) -> AppResult<ComfyUIInstanceDetail> {
    let compatible_render_type_ids = ComfyUIInstanceRepo::render_type_ids(pool, instance.id).await?;
    Ok(ComfyUIInstanceDetail {
        instance,
        compatible_render_type_ids,
    })
}

/// GET /api/v1/comfyui-instances
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let instances = ComfyUIInstanceRepo::list(&state.pool).await?;
    let mut details = Vec::with_capacity(instances.len());
    for instance in instances {
        details.push(detail(&state.pool, instance).await?);
    }
    Ok(Json(DataResponse { data: details }))
}

/// POST /api/v1/comfyui-instances
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateComfyUIInstance>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let instance = ComfyUIInstanceRepo::create(&state.pool, &input).await?;
    tracing::info!(id = instance.id, url = %instance.base_url, "ComfyUI instance registered");
    let data = detail(&state.pool, instance).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/comfyui-instances/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ComfyUIInstanceDetail>>> {
    let instance = ComfyUIInstanceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let data = detail(&state.pool, instance).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/comfyui-instances/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateComfyUIInstance>,
) -> AppResult<Json<DataResponse<ComfyUIInstanceDetail>>> {
    input.validate()?;
    let instance = ComfyUIInstanceRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(id, "ComfyUI instance updated");
    let data = detail(&state.pool, instance).await?;
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/comfyui-instances/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if ComfyUIInstanceRepo::delete(&state.pool, id).await? {
        tracing::info!(id, "ComfyUI instance deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// POST /api/v1/comfyui-instances/{id}/toggle-active
pub async fn toggle_active(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ComfyUIInstanceDetail>>> {
    let instance = ComfyUIInstanceRepo::toggle_active(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(id, is_active = instance.is_active, "ComfyUI instance toggled");
    let data = detail(&state.pool, instance).await?;
    Ok(Json(DataResponse { data }))
}
