//! HTTP-level integration tests for the `/api/v1` admin endpoints.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router
//! without an actual TCP listener.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post, post_json, put_json, TestApp};
use genimage_core::generation::GenerationStatus;
use genimage_db::models::generation_log::NewGenerationLog;
use genimage_db::repositories::GenerationLogRepo;
use serde_json::json;

async fn create_render_type(app: &TestApp, name: &str, mode: &str) -> i64 {
    let response = post_json(
        app.router(),
        "/api/v1/render-types",
        json!({"name": name, "workflow_filename": format!("{name}.json"), "generation_mode": mode}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_reports_database_and_streams() {
    let app = TestApp::new().await;
    let response = get(app.router(), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-request-id").is_some());
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
    assert_eq!(json["open_streams"], 0);
}

// ---------------------------------------------------------------------------
// Render types
// ---------------------------------------------------------------------------

#[tokio::test]
async fn render_type_crud_round() {
    let app = TestApp::new().await;
    let id = create_render_type(&app, "sdxl", "image_generation").await;

    let response = get(app.router(), &format!("/api/v1/render-types/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "sdxl");
    assert_eq!(json["data"]["is_default_for_generation"], false);

    let response = put_json(
        app.router(),
        &format!("/api/v1/render-types/{id}"),
        json!({"prompt_examples": "a castle at dusk"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["prompt_examples"], "a castle at dusk");

    let response = delete(app.router(), &format!("/api/v1/render-types/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app.router(), &format!("/api/v1/render-types/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_render_type_name_is_conflict() {
    let app = TestApp::new().await;
    create_render_type(&app, "sdxl", "image_generation").await;

    let response = post_json(
        app.router(),
        "/api/v1/render-types",
        json!({"name": "sdxl", "workflow_filename": "other.json"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[tokio::test]
async fn render_type_workflow_path_must_stay_in_directory() {
    let app = TestApp::new().await;
    let response = post_json(
        app.router(),
        "/api/v1/render-types",
        json!({"name": "sneaky", "workflow_filename": "../secrets.json"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn set_default_replaces_previous_default_of_same_mode() {
    let app = TestApp::new().await;
    let first = create_render_type(&app, "sdxl", "image_generation").await;
    let second = create_render_type(&app, "flux", "image_generation").await;
    let upscale = create_render_type(&app, "upscale-2x", "upscale").await;

    for id in [first, upscale, second] {
        let response = post(app.router(), &format!("/api/v1/render-types/{id}/default")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let first_json = body_json(get(app.router(), &format!("/api/v1/render-types/{first}")).await).await;
    let second_json = body_json(get(app.router(), &format!("/api/v1/render-types/{second}")).await).await;
    let upscale_json = body_json(get(app.router(), &format!("/api/v1/render-types/{upscale}")).await).await;
    assert_eq!(first_json["data"]["is_default_for_generation"], false);
    assert_eq!(second_json["data"]["is_default_for_generation"], true);
    assert_eq!(upscale_json["data"]["is_default_for_upscale"], true);

    let response = post(app.router(), "/api/v1/render-types/999/default").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn referenced_render_type_cannot_be_deleted() {
    let app = TestApp::new().await;
    let id = create_render_type(&app, "sdxl", "image_generation").await;

    let response = post_json(
        app.router(),
        "/api/v1/styles",
        json!({"name": "anime", "default_render_type_id": id, "compatible_render_type_ids": [id]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = delete(app.router(), &format!("/api/v1/render-types/{id}")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = get(app.router(), &format!("/api/v1/render-types/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Styles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn style_detail_carries_compatible_render_types() {
    let app = TestApp::new().await;
    let sdxl = create_render_type(&app, "sdxl", "image_generation").await;
    let flux = create_render_type(&app, "flux", "image_generation").await;

    let response = post_json(
        app.router(),
        "/api/v1/styles",
        json!({
            "name": "watercolor",
            "prompt_template": "watercolor painting",
            "compatible_render_type_ids": [flux, sdxl]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["data"]["id"].as_i64().unwrap();
    assert_eq!(created["data"]["name"], "watercolor");
    assert_eq!(created["data"]["compatible_render_type_ids"], json!([sdxl, flux]));

    let response = put_json(
        app.router(),
        &format!("/api/v1/styles/{id}"),
        json!({"compatible_render_type_ids": [flux]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["compatible_render_type_ids"], json!([flux]));

    let response = post(app.router(), &format!("/api/v1/styles/{id}/toggle-default")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_default"], true);
}

#[tokio::test]
async fn style_with_unknown_render_type_is_conflict() {
    let app = TestApp::new().await;
    let response = post_json(
        app.router(),
        "/api/v1/styles",
        json!({"name": "ghost", "compatible_render_type_ids": [999]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn missing_style_is_not_found() {
    let app = TestApp::new().await;
    assert_eq!(
        get(app.router(), "/api/v1/styles/42").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        delete(app.router(), "/api/v1/styles/42").await.status(),
        StatusCode::NOT_FOUND
    );
}

// ---------------------------------------------------------------------------
// Backend instances
// ---------------------------------------------------------------------------

#[tokio::test]
async fn comfyui_instance_toggle_and_validation() {
    let app = TestApp::new().await;
    let sdxl = create_render_type(&app, "sdxl", "image_generation").await;

    let response = post_json(
        app.router(),
        "/api/v1/comfyui-instances",
        json!({"name": "gpu-1", "base_url": "not a url"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        app.router(),
        "/api/v1/comfyui-instances",
        json!({"name": "gpu-1", "base_url": "http://10.0.0.5:8188/", "compatible_render_type_ids": [sdxl]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["data"]["id"].as_i64().unwrap();
    assert_eq!(created["data"]["base_url"], "http://10.0.0.5:8188");
    assert_eq!(created["data"]["is_active"], true);
    assert_eq!(created["data"]["compatible_render_type_ids"], json!([sdxl]));

    let response = post(app.router(), &format!("/api/v1/comfyui-instances/{id}/toggle-active")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_active"], false);

    let response = delete(app.router(), &format!("/api/v1/comfyui-instances/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn ollama_models_of_unreachable_instance_is_bad_gateway() {
    let app = TestApp::new().await;
    let response = post_json(
        app.router(),
        "/api/v1/ollama-instances",
        json!({"name": "llm", "base_url": "http://127.0.0.1:9"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = get(app.router(), &format!("/api/v1/ollama-instances/{id}/models")).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let response = get(app.router(), "/api/v1/ollama-instances/999/models").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn settings_are_validated_per_key() {
    let app = TestApp::new().await;

    let response = put_json(
        app.router(),
        "/api/v1/settings",
        json!({"DEFAULT_UPSCALE_DENOISE": "1.7"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json(
        app.router(),
        "/api/v1/settings",
        json!({"OLLAMA_CONTEXT_WINDOW": "big"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json(
        app.router(),
        "/api/v1/settings",
        json!({"OUTPUT_URL_BASE": "http://img.local/outputs", "DEFAULT_UPSCALE_DENOISE": "0.35"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["OUTPUT_URL_BASE"], "http://img.local/outputs");
    assert_eq!(json["data"]["DEFAULT_UPSCALE_DENOISE"], "0.35");
    // Untouched keys keep their seeded value.
    assert_eq!(json["data"]["PROMPT_ENHANCEMENT_MODEL_NAME"], "");
    assert_eq!(json["data"]["OLLAMA_CONTEXT_WINDOW"], "2048");
}

#[tokio::test]
async fn description_settings_require_existing_instance() {
    let app = TestApp::new().await;

    let response = put_json(
        app.router(),
        "/api/v1/description-settings",
        json!({"ollama_instance_id": 999, "model_name": "llava"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(app.router(), "/api/v1/description-settings").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["ollama_instance_id"], serde_json::Value::Null);
    assert!(json["data"]["natural_prompt_template_en"].is_string());
}

#[tokio::test]
async fn prompt_generator_settings_update_allowed_styles() {
    let app = TestApp::new().await;
    let response = post_json(app.router(), "/api/v1/styles", json!({"name": "noir"})).await;
    let style_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = put_json(
        app.router(),
        "/api/v1/prompt-generator-settings",
        json!({"elements_to_select": 3, "allowed_style_ids": [style_id]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["elements_to_select"], 3);
    assert_eq!(json["data"]["allowed_style_ids"], json!([style_id]));

    let response = put_json(
        app.router(),
        "/api/v1/prompt-generator-settings",
        json!({"allowed_style_ids": [999]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Audit log
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generation_logs_are_paginated_newest_first() {
    let app = TestApp::new().await;
    for (i, status) in [
        GenerationStatus::Success,
        GenerationStatus::Failed,
        GenerationStatus::Success,
    ]
    .into_iter()
    .enumerate()
    {
        let mut log = NewGenerationLog::new("generate_image");
        log.positive_prompt = format!("prompt {i}");
        log.render_type_name = Some("sdxl".to_string());
        log.status = status;
        GenerationLogRepo::create(app.pool(), &log).await.unwrap();
    }

    let response = get(app.router(), "/api/v1/generation-logs?limit=2").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 3);
    assert_eq!(json["limit"], 2);
    assert_eq!(json["offset"], 0);
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
    assert_eq!(json["data"][0]["positive_prompt"], "prompt 2");

    let response = get(app.router(), "/api/v1/generation-logs?offset=2&limit=2").await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["positive_prompt"], "prompt 0");

    let response = get(app.router(), "/api/v1/statistics").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["total_successful"], 2);
    assert_eq!(json["data"]["render_type_usage"][0]["name"], "sdxl");
    assert_eq!(json["data"]["render_type_usage"][0]["count"], 2);
}
