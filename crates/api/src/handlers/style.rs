//! Handlers for the `/styles` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use genimage_core::error::CoreError;
use genimage_core::types::DbId;
use genimage_db::models::style::{CreateStyle, Style, StyleDetail, UpdateStyle};
use genimage_db::repositories::StyleRepo;
use genimage_db::DbPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Style", id })
}

async fn detail(pool: &DbPool, style: Style) -> AppResult<StyleDetail> {
    let compatible_render_type_ids = StyleRepo::compatible_render_type_ids(pool, style.id).await?;
    Ok(StyleDetail {
        style,
        compatible_render_type_ids,
    })
}

/// GET /api/v1/styles
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let styles = StyleRepo::list(&state.pool).await?;
    let mut details = Vec::with_capacity(styles.len());
    for style in styles {
        details.push(detail(&state.pool, style).await?);
    }
    Ok(Json(DataResponse { data: details }))
}

/// POST /api/v1/styles
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateStyle>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let style = StyleRepo::create(&state.pool, &input).await?;
    tracing::info!(id = style.id, name = %style.name, "Style created");
    let data = detail(&state.pool, style).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/styles/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<StyleDetail>>> {
    let style = StyleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let data = detail(&state.pool, style).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/styles/{id}
///
/// `compatible_render_type_ids`, when present, replaces the whole set.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStyle>,
) -> AppResult<Json<DataResponse<StyleDetail>>> {
    input.validate()?;
    let style = StyleRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(id, "Style updated");
    let data = detail(&state.pool, style).await?;
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/styles/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if StyleRepo::delete(&state.pool, id).await? {
        tracing::info!(id, "Style deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// POST /api/v1/styles/{id}/toggle-default
pub async fn toggle_default(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<StyleDetail>>> {
    let style = StyleRepo::toggle_default(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(id, is_default = style.is_default, "Style default flag toggled");
    let data = detail(&state.pool, style).await?;
    Ok(Json(DataResponse { data }))
}
