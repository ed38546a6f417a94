use axum::routing::{get, post};
use axum::Router;

use crate::handlers::render_type;
use crate::state::AppState;

/// Routes mounted at `/render-types`.
///
/// ```text
/// GET    /                 -> list
/// POST   /                 -> create
/// GET    /{id}             -> get_by_id
/// PUT    /{id}             -> update
/// DELETE /{id}             -> delete
/// POST   /{id}/default     -> set_default
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(render_type::list).post(render_type::create))
        .route(
            "/{id}",
            get(render_type::get_by_id)
                .put(render_type::update)
                .delete(render_type::delete),
        )
        .route("/{id}/default", post(render_type::set_default))
}
