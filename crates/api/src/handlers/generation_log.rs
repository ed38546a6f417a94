//! Handlers for the generation audit log and its statistics.

use axum::extract::{Query, State};
use axum::Json;
use genimage_db::models::generation_log::{GenerationLog, GenerationLogQuery, GenerationStats};
use genimage_db::repositories::generation_log_repo::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use genimage_db::repositories::GenerationLogRepo;

use crate::error::AppResult;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// GET /api/v1/generation-logs?offset=&limit=
///
/// Newest first.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<GenerationLogQuery>,
) -> AppResult<Json<PageResponse<GenerationLog>>> {
    let offset = query.offset.unwrap_or(0).max(0);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let data = GenerationLogRepo::list(&state.pool, Some(offset), Some(limit)).await?;
    let total = GenerationLogRepo::count(&state.pool).await?;
    Ok(Json(PageResponse {
        data,
        total,
        offset,
        limit,
    }))
}

/// GET /api/v1/statistics
pub async fn statistics(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<GenerationStats>>> {
    let stats = GenerationLogRepo::stats(&state.pool).await?;
    Ok(Json(DataResponse { data: stats }))
}
