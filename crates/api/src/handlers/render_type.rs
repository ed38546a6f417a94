//! Handlers for the `/render-types` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use genimage_core::error::CoreError;
use genimage_core::types::DbId;
use genimage_core::workflow::validate_workflow_filename;
use genimage_db::models::render_type::{CreateRenderType, RenderType, UpdateRenderType};
use genimage_db::repositories::RenderTypeRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "RenderType",
        id,
    })
}

/// GET /api/v1/render-types
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let render_types = RenderTypeRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: render_types }))
}

/// POST /api/v1/render-types
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateRenderType>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    validate_workflow_filename(&input.workflow_filename)?;

    let render_type = RenderTypeRepo::create(&state.pool, &input).await?;
    tracing::info!(id = render_type.id, name = %render_type.name, "Render type created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: render_type })))
}

/// GET /api/v1/render-types/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RenderType>>> {
    let render_type = RenderTypeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: render_type }))
}

/// PUT /api/v1/render-types/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRenderType>,
) -> AppResult<Json<DataResponse<RenderType>>> {
    input.validate()?;
    if let Some(filename) = &input.workflow_filename {
        validate_workflow_filename(filename)?;
    }

    let render_type = RenderTypeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(id, "Render type updated");
    Ok(Json(DataResponse { data: render_type }))
}

/// DELETE /api/v1/render-types/{id}
///
/// Refused with 409 while styles or instances still reference it.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let render_type = RenderTypeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let references = RenderTypeRepo::count_references(&state.pool, id).await?;
    if references > 0 {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Render type '{}' is still referenced by {references} style or instance link(s)",
            render_type.name
        ))));
    }

    if RenderTypeRepo::delete(&state.pool, id).await? {
        tracing::info!(id, "Render type deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// POST /api/v1/render-types/{id}/default
///
/// Make the render type the default for its generation mode.
pub async fn set_default(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RenderType>>> {
    let render_type = RenderTypeRepo::set_default(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(id, mode = %render_type.generation_mode, "Default render type changed");
    Ok(Json(DataResponse { data: render_type }))
}
