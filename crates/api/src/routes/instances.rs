//! Backend instance routes: ComfyUI render servers and Ollama LLM servers.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{comfyui_instance, ollama_instance};
use crate::state::AppState;

/// Routes mounted at `/comfyui-instances`.
///
/// ```text
/// GET    /                      -> list
/// POST   /                      -> create
/// GET    /{id}                  -> get_by_id
/// PUT    /{id}                  -> update
/// DELETE /{id}                  -> delete
/// POST   /{id}/toggle-active    -> toggle_active
/// ```
pub fn comfyui_router() -> Router<AppState> {
    Router::new()
        .route("/", get(comfyui_instance::list).post(comfyui_instance::create))
        .route(
            "/{id}",
            get(comfyui_instance::get_by_id)
                .put(comfyui_instance::update)
                .delete(comfyui_instance::delete),
        )
        .route("/{id}/toggle-active", post(comfyui_instance::toggle_active))
}

/// Routes mounted at `/ollama-instances`.
///
/// ```text
/// GET    /                      -> list
/// POST   /                      -> create
/// GET    /{id}                  -> get_by_id
/// PUT    /{id}                  -> update
/// DELETE /{id}                  -> delete
/// POST   /{id}/toggle-active    -> toggle_active
/// GET    /{id}/models           -> list_models
/// ```
pub fn ollama_router() -> Router<AppState> {
    Router::new()
        .route("/", get(ollama_instance::list).post(ollama_instance::create))
        .route(
            "/{id}",
            get(ollama_instance::get_by_id)
                .put(ollama_instance::update)
                .delete(ollama_instance::delete),
        )
        .route("/{id}/toggle-active", post(ollama_instance::toggle_active))
        .route("/{id}/models", get(ollama_instance::list_models))
}
