pub mod health;
pub mod instances;
pub mod render_type;
pub mod style;

use axum::routing::get;
use axum::Router;

use crate::handlers::{generation_log, settings};
use crate::state::AppState;

/// Build the `/api/v1` admin route tree.
///
/// Route hierarchy:
///
/// ```text
/// /render-types                                    list, create
/// /render-types/{id}                               get, update, delete
/// /render-types/{id}/default                       make default for its mode (POST)
///
/// /styles                                          list, create
/// /styles/{id}                                     get, update, delete
/// /styles/{id}/toggle-default                      toggle default flag (POST)
///
/// /comfyui-instances                               list, create
/// /comfyui-instances/{id}                          get, update, delete
/// /comfyui-instances/{id}/toggle-active            toggle active flag (POST)
///
/// /ollama-instances                                list, create
/// /ollama-instances/{id}                           get, update, delete
/// /ollama-instances/{id}/toggle-active             toggle active flag (POST)
/// /ollama-instances/{id}/models                    installed models (GET)
///
/// /settings                                        key/value map (GET, PUT)
/// /description-settings                            get, replace (GET, PUT)
/// /prompt-generator-settings                       get, update (GET, PUT)
///
/// /generation-logs                                 paginated audit log (GET)
/// /statistics                                      usage aggregates (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/render-types", render_type::router())
        .nest("/styles", style::router())
        .nest("/comfyui-instances", instances::comfyui_router())
        .nest("/ollama-instances", instances::ollama_router())
        .route(
            "/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route(
            "/description-settings",
            get(settings::get_description_settings).put(settings::update_description_settings),
        )
        .route(
            "/prompt-generator-settings",
            get(settings::get_prompt_generator_settings)
                .put(settings::update_prompt_generator_settings),
        )
        .route("/generation-logs", get(generation_log::list))
        .route("/statistics", get(generation_log::statistics))
}
