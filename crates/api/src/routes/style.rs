use axum::routing::{get, post};
use axum::Router;

use crate::handlers::style;
use crate::state::AppState;

/// Routes mounted at `/styles`.
///
/// ```text
/// GET    /                      -> list
/// POST   /                      -> create
/// GET    /{id}                  -> get_by_id
/// PUT    /{id}                  -> update
/// DELETE /{id}                  -> delete
/// POST   /{id}/toggle-default   -> toggle_default
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(style::list).post(style::create))
        .route(
            "/{id}",
            get(style::get_by_id).put(style::update).delete(style::delete),
        )
        .route("/{id}/toggle-default", post(style::toggle_default))
}
