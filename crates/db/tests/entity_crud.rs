//! Integration tests for the repository layer:
//! - Render type defaults (one per mode)
//! - Style and instance compatibility sets
//! - Unique and foreign key violations
//! - Settings, generator settings and the audit log

use std::collections::HashMap;

use assert_matches::assert_matches;
use genimage_core::generation::{GenerationMode, GenerationStatus};
use genimage_core::prompt_generator::GeneratorConfig;
use genimage_db::models::comfyui_instance::{CreateComfyUIInstance, UpdateComfyUIInstance};
use genimage_db::models::description_settings::UpdateDescriptionSettings;
use genimage_db::models::generation_log::NewGenerationLog;
use genimage_db::models::ollama_instance::CreateOllamaInstance;
use genimage_db::models::prompt_generator_settings::UpdatePromptGeneratorSettings;
use genimage_db::models::render_type::{CreateRenderType, UpdateRenderType};
use genimage_db::models::style::{CreateStyle, UpdateStyle};
use genimage_db::repositories::{
    ComfyUIInstanceRepo, DescriptionSettingsRepo, GenerationLogRepo, OllamaInstanceRepo,
    PromptGeneratorRepo, RenderTypeRepo, SettingRepo, StyleRepo,
};
use genimage_db::DbPool;
use sqlx::sqlite::SqlitePoolOptions;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn pool() -> DbPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    genimage_db::run_migrations(&pool).await.unwrap();
    pool
}

fn new_render_type(name: &str, mode: GenerationMode) -> CreateRenderType {
    CreateRenderType {
        name: name.to_string(),
        workflow_filename: format!("{name}.json"),
        prompt_examples: None,
        is_visible: None,
        generation_mode: mode,
    }
}

fn new_style(name: &str, compatible: Vec<i64>) -> CreateStyle {
    CreateStyle {
        name: name.to_string(),
        category: None,
        prompt_template: Some(format!("{name} style")),
        negative_prompt_template: None,
        is_active: None,
        is_default: None,
        default_render_type_id: None,
        compatible_render_type_ids: compatible,
    }
}

fn new_instance(name: &str, compatible: Vec<i64>) -> CreateComfyUIInstance {
    CreateComfyUIInstance {
        name: name.to_string(),
        base_url: format!("http://{name}:8188/"),
        is_active: None,
        compatible_render_type_ids: compatible,
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

// ---------------------------------------------------------------------------
// Render types
// ---------------------------------------------------------------------------

#[tokio::test]
async fn render_type_create_and_find() {
    let pool = pool().await;
    let created = RenderTypeRepo::create(&pool, &new_render_type("flux", GenerationMode::ImageGeneration))
        .await
        .unwrap();
    assert!(created.is_visible);
    assert_eq!(created.mode().unwrap(), GenerationMode::ImageGeneration);

    let found = RenderTypeRepo::find_by_name(&pool, "flux").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert!(RenderTypeRepo::find_by_id(&pool, 999).await.unwrap().is_none());
}

#[tokio::test]
async fn render_type_duplicate_name_rejected() {
    let pool = pool().await;
    let input = new_render_type("flux", GenerationMode::ImageGeneration);
    RenderTypeRepo::create(&pool, &input).await.unwrap();
    let err = RenderTypeRepo::create(&pool, &input).await.unwrap_err();
    assert!(is_unique_violation(&err), "expected unique violation, got {err}");
}

#[tokio::test]
async fn setting_default_clears_previous_default_of_same_mode() {
    let pool = pool().await;
    let a = RenderTypeRepo::create(&pool, &new_render_type("a", GenerationMode::ImageGeneration))
        .await
        .unwrap();
    let b = RenderTypeRepo::create(&pool, &new_render_type("b", GenerationMode::ImageGeneration))
        .await
        .unwrap();
    let up = RenderTypeRepo::create(&pool, &new_render_type("up", GenerationMode::Upscale))
        .await
        .unwrap();

    RenderTypeRepo::set_default(&pool, a.id).await.unwrap().unwrap();
    RenderTypeRepo::set_default(&pool, up.id).await.unwrap().unwrap();
    let b = RenderTypeRepo::set_default(&pool, b.id).await.unwrap().unwrap();
    assert!(b.is_default_for_generation);
    assert!(!b.is_default_for_upscale);

    let generation_default = RenderTypeRepo::find_default(&pool, GenerationMode::ImageGeneration)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(generation_default.id, b.id);

    let upscale_default = RenderTypeRepo::find_default(&pool, GenerationMode::Upscale)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(upscale_default.id, up.id);

    let a = RenderTypeRepo::find_by_id(&pool, a.id).await.unwrap().unwrap();
    assert!(!a.is_default_for_generation);
}

#[tokio::test]
async fn set_default_unknown_id_is_none() {
    let pool = pool().await;
    assert!(RenderTypeRepo::set_default(&pool, 42).await.unwrap().is_none());
}

#[tokio::test]
async fn changing_mode_drops_stale_default() {
    let pool = pool().await;
    let rt = RenderTypeRepo::create(&pool, &new_render_type("flux", GenerationMode::ImageGeneration))
        .await
        .unwrap();
    RenderTypeRepo::set_default(&pool, rt.id).await.unwrap();

    let update = UpdateRenderType {
        generation_mode: Some(GenerationMode::Upscale),
        ..Default::default()
    };
    let updated = RenderTypeRepo::update(&pool, rt.id, &update).await.unwrap().unwrap();
    assert_eq!(updated.generation_mode, "upscale");
    assert!(!updated.is_default_for_generation);
    assert!(!updated.is_default_for_upscale);
}

#[tokio::test]
async fn visible_listing_filters_mode_and_visibility() {
    let pool = pool().await;
    RenderTypeRepo::create(&pool, &new_render_type("zeta", GenerationMode::ImageGeneration))
        .await
        .unwrap();
    RenderTypeRepo::create(&pool, &new_render_type("alpha", GenerationMode::ImageGeneration))
        .await
        .unwrap();
    RenderTypeRepo::create(&pool, &new_render_type("up", GenerationMode::Upscale))
        .await
        .unwrap();
    let mut hidden = new_render_type("hidden", GenerationMode::ImageGeneration);
    hidden.is_visible = Some(false);
    RenderTypeRepo::create(&pool, &hidden).await.unwrap();

    let names: Vec<String> = RenderTypeRepo::list_visible(&pool, GenerationMode::ImageGeneration)
        .await
        .unwrap()
        .into_iter()
        .map(|rt| rt.name)
        .collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
}

#[tokio::test]
async fn referenced_render_type_cannot_be_deleted() {
    let pool = pool().await;
    let rt = RenderTypeRepo::create(&pool, &new_render_type("flux", GenerationMode::ImageGeneration))
        .await
        .unwrap();
    StyleRepo::create(&pool, &new_style("anime", vec![rt.id])).await.unwrap();
    ComfyUIInstanceRepo::create(&pool, &new_instance("gpu1", vec![rt.id]))
        .await
        .unwrap();

    assert_eq!(RenderTypeRepo::count_references(&pool, rt.id).await.unwrap(), 2);
    let err = RenderTypeRepo::delete(&pool, rt.id).await.unwrap_err();
    assert_matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation());
    assert!(RenderTypeRepo::find_by_id(&pool, rt.id).await.unwrap().is_some());
}

#[tokio::test]
async fn unreferenced_render_type_is_deleted() {
    let pool = pool().await;
    let rt = RenderTypeRepo::create(&pool, &new_render_type("flux", GenerationMode::ImageGeneration))
        .await
        .unwrap();
    assert_eq!(RenderTypeRepo::count_references(&pool, rt.id).await.unwrap(), 0);
    assert!(RenderTypeRepo::delete(&pool, rt.id).await.unwrap());
    assert!(!RenderTypeRepo::delete(&pool, rt.id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Styles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn style_compatibility_is_replaced_on_update() {
    let pool = pool().await;
    let flux = RenderTypeRepo::create(&pool, &new_render_type("flux", GenerationMode::ImageGeneration))
        .await
        .unwrap();
    let sdxl = RenderTypeRepo::create(&pool, &new_render_type("sdxl", GenerationMode::ImageGeneration))
        .await
        .unwrap();

    let style = StyleRepo::create(&pool, &new_style("anime", vec![flux.id, sdxl.id]))
        .await
        .unwrap();
    assert_eq!(
        StyleRepo::compatible_render_type_names(&pool, style.id).await.unwrap(),
        vec!["flux", "sdxl"]
    );

    let update = UpdateStyle {
        compatible_render_type_ids: Some(vec![sdxl.id]),
        ..Default::default()
    };
    StyleRepo::update(&pool, style.id, &update).await.unwrap().unwrap();
    assert_eq!(
        StyleRepo::compatible_render_type_ids(&pool, style.id).await.unwrap(),
        vec![sdxl.id]
    );

    // Updates without the field keep the set.
    let rename = UpdateStyle {
        name: Some("manga".into()),
        ..Default::default()
    };
    let renamed = StyleRepo::update(&pool, style.id, &rename).await.unwrap().unwrap();
    assert_eq!(renamed.name, "manga");
    assert_eq!(
        StyleRepo::compatible_render_type_ids(&pool, style.id).await.unwrap(),
        vec![sdxl.id]
    );
}

#[tokio::test]
async fn style_with_unknown_render_type_rolls_back() {
    let pool = pool().await;
    let err = StyleRepo::create(&pool, &new_style("anime", vec![77])).await.unwrap_err();
    assert_matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation());
    assert!(StyleRepo::find_by_name(&pool, "anime").await.unwrap().is_none());
}

#[tokio::test]
async fn defaults_only_include_active_styles() {
    let pool = pool().await;
    let a = StyleRepo::create(&pool, &new_style("anime", vec![])).await.unwrap();
    let b = StyleRepo::create(&pool, &new_style("noir", vec![])).await.unwrap();

    StyleRepo::toggle_default(&pool, a.id).await.unwrap().unwrap();
    let b = StyleRepo::toggle_default(&pool, b.id).await.unwrap().unwrap();
    assert!(b.is_default);
    let deactivate = UpdateStyle {
        is_active: Some(false),
        ..Default::default()
    };
    StyleRepo::update(&pool, b.id, &deactivate).await.unwrap();

    let names: Vec<String> = StyleRepo::list_defaults(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["anime"]);

    let a = StyleRepo::toggle_default(&pool, a.id).await.unwrap().unwrap();
    assert!(!a.is_default);
}

// ---------------------------------------------------------------------------
// Instances
// ---------------------------------------------------------------------------

#[tokio::test]
async fn instance_candidates_follow_render_type_and_activity() {
    let pool = pool().await;
    let flux = RenderTypeRepo::create(&pool, &new_render_type("flux", GenerationMode::ImageGeneration))
        .await
        .unwrap();
    let gpu1 = ComfyUIInstanceRepo::create(&pool, &new_instance("gpu1", vec![flux.id]))
        .await
        .unwrap();
    let gpu2 = ComfyUIInstanceRepo::create(&pool, &new_instance("gpu2", vec![]))
        .await
        .unwrap();
    let gpu3 = ComfyUIInstanceRepo::create(&pool, &new_instance("gpu3", vec![flux.id]))
        .await
        .unwrap();
    assert_eq!(gpu1.base_url, "http://gpu1:8188");

    ComfyUIInstanceRepo::toggle_active(&pool, gpu3.id).await.unwrap().unwrap();

    let ids = |list: Vec<genimage_db::models::comfyui_instance::ComfyUIInstance>| {
        list.into_iter().map(|i| i.id).collect::<Vec<_>>()
    };
    let for_flux = ComfyUIInstanceRepo::list_active_for_render_type(&pool, Some(flux.id))
        .await
        .unwrap();
    assert_eq!(ids(for_flux), vec![gpu1.id]);

    let any = ComfyUIInstanceRepo::list_active_for_render_type(&pool, None)
        .await
        .unwrap();
    assert_eq!(ids(any), vec![gpu1.id, gpu2.id]);
}

#[tokio::test]
async fn instance_update_replaces_render_types() {
    let pool = pool().await;
    let flux = RenderTypeRepo::create(&pool, &new_render_type("flux", GenerationMode::ImageGeneration))
        .await
        .unwrap();
    let gpu = ComfyUIInstanceRepo::create(&pool, &new_instance("gpu", vec![flux.id]))
        .await
        .unwrap();
    let update = UpdateComfyUIInstance {
        compatible_render_type_ids: Some(vec![]),
        ..Default::default()
    };
    ComfyUIInstanceRepo::update(&pool, gpu.id, &update).await.unwrap().unwrap();
    assert!(ComfyUIInstanceRepo::render_type_ids(&pool, gpu.id).await.unwrap().is_empty());

    // Unlinked now, so the render type is deletable.
    assert!(RenderTypeRepo::delete(&pool, flux.id).await.unwrap());
}

#[tokio::test]
async fn duplicate_instance_url_rejected() {
    let pool = pool().await;
    let input = CreateOllamaInstance {
        name: "llm".into(),
        base_url: "http://llm:11434".into(),
        is_active: None,
    };
    OllamaInstanceRepo::create(&pool, &input).await.unwrap();
    let dup = CreateOllamaInstance {
        name: "other".into(),
        ..input
    };
    let err = OllamaInstanceRepo::create(&pool, &dup).await.unwrap_err();
    assert!(is_unique_violation(&err));
}

#[tokio::test]
async fn inactive_ollama_instance_is_not_found_as_active() {
    let pool = pool().await;
    let llm = OllamaInstanceRepo::create(
        &pool,
        &CreateOllamaInstance {
            name: "llm".into(),
            base_url: "http://llm:11434".into(),
            is_active: Some(false),
        },
    )
    .await
    .unwrap();
    assert!(OllamaInstanceRepo::find_active(&pool, llm.id).await.unwrap().is_none());
    OllamaInstanceRepo::toggle_active(&pool, llm.id).await.unwrap();
    assert!(OllamaInstanceRepo::find_active(&pool, llm.id).await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn settings_upsert_overwrites_and_inserts() {
    let pool = pool().await;
    let values = HashMap::from([
        ("OUTPUT_URL_BASE".to_string(), " http://cdn/outputs ".to_string()),
        ("CUSTOM".to_string(), "1".to_string()),
    ]);
    SettingRepo::upsert_many(&pool, &values).await.unwrap();

    let all = SettingRepo::get_all(&pool).await.unwrap();
    assert_eq!(all["OUTPUT_URL_BASE"], "http://cdn/outputs");
    assert_eq!(all["CUSTOM"], "1");
    assert_eq!(all["DEFAULT_UPSCALE_DENOISE"], "0.2");
    assert_eq!(
        SettingRepo::get(&pool, "CUSTOM").await.unwrap().as_deref(),
        Some("1")
    );
}

#[tokio::test]
async fn description_settings_round_trip_and_clear_on_instance_delete() {
    let pool = pool().await;
    let llm = OllamaInstanceRepo::create(
        &pool,
        &CreateOllamaInstance {
            name: "llm".into(),
            base_url: "http://llm:11434".into(),
            is_active: None,
        },
    )
    .await
    .unwrap();

    let seeded = DescriptionSettingsRepo::get(&pool).await.unwrap();
    assert!(!seeded.is_configured());

    let update = UpdateDescriptionSettings {
        ollama_instance_id: Some(llm.id),
        model_name: Some("llava".into()),
        natural_prompt_template_en: seeded.natural_prompt_template_en.clone(),
        ..Default::default()
    };
    let saved = DescriptionSettingsRepo::update(&pool, &update).await.unwrap();
    assert_eq!(saved.target(), Some((llm.id, "llava")));

    OllamaInstanceRepo::delete(&pool, llm.id).await.unwrap();
    let after = DescriptionSettingsRepo::get(&pool).await.unwrap();
    assert_eq!(after.ollama_instance_id, None);
}

#[tokio::test]
async fn prompt_generator_settings_and_allowed_styles() {
    let pool = pool().await;
    let anime = StyleRepo::create(&pool, &new_style("anime", vec![])).await.unwrap();
    let noir = StyleRepo::create(&pool, &new_style("noir", vec![])).await.unwrap();

    let defaults = PromptGeneratorRepo::get_settings(&pool).await.unwrap();
    assert_eq!(defaults.config(), GeneratorConfig::default());

    let update = UpdatePromptGeneratorSettings {
        subjects_to_propose: Some(3),
        allowed_style_ids: Some(vec![noir.id, anime.id]),
        ..Default::default()
    };
    let saved = PromptGeneratorRepo::update_settings(&pool, &update).await.unwrap();
    assert_eq!(saved.subjects_to_propose, 3);
    assert_eq!(saved.elements_to_propose, 15);

    let names: Vec<String> = PromptGeneratorRepo::allowed_styles(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["anime", "noir"]);

    StyleRepo::delete(&pool, noir.id).await.unwrap();
    assert_eq!(
        PromptGeneratorRepo::allowed_style_ids(&pool).await.unwrap(),
        vec![anime.id]
    );
}

#[tokio::test]
async fn prompt_generator_rejects_zero_counts() {
    let pool = pool().await;
    let update = UpdatePromptGeneratorSettings {
        elements_to_select: Some(0),
        ..Default::default()
    };
    assert!(PromptGeneratorRepo::update_settings(&pool, &update).await.is_err());
}

// ---------------------------------------------------------------------------
// Generation log
// ---------------------------------------------------------------------------

fn log(status: GenerationStatus, render_type: &str, styles: &[&str], enhanced: bool) -> NewGenerationLog {
    NewGenerationLog {
        render_type_name: Some(render_type.to_string()),
        style_names: styles.iter().map(|s| s.to_string()).collect(),
        llm_enhanced: enhanced,
        status,
        ..NewGenerationLog::new("generate_image")
    }
}

#[tokio::test]
async fn log_listing_is_newest_first_and_paginated() {
    let pool = pool().await;
    for i in 0..3 {
        let mut entry = NewGenerationLog::new("generate_image");
        entry.positive_prompt = format!("prompt {i}");
        GenerationLogRepo::create(&pool, &entry).await.unwrap();
    }
    assert_eq!(GenerationLogRepo::count(&pool).await.unwrap(), 3);

    let page = GenerationLogRepo::list(&pool, Some(0), Some(2)).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].positive_prompt, "prompt 2");
    assert_eq!(page[0].status, "FAILED");

    let rest = GenerationLogRepo::list(&pool, Some(2), None).await.unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].positive_prompt, "prompt 0");
}

#[tokio::test]
async fn stats_only_count_successes() {
    let pool = pool().await;
    let entries = [
        log(GenerationStatus::Success, "flux", &["anime", "noir"], true),
        log(GenerationStatus::Success, "flux", &["noir"], false),
        log(GenerationStatus::Success, "sdxl", &[], false),
        log(GenerationStatus::Failed, "sdxl", &["anime"], true),
    ];
    for entry in &entries {
        GenerationLogRepo::create(&pool, entry).await.unwrap();
    }

    let stats = GenerationLogRepo::stats(&pool).await.unwrap();
    assert_eq!(stats.total_successful, 3);
    assert_eq!(stats.llm_enhanced, 1);
    assert_eq!(stats.render_type_usage[0].name, "flux");
    assert_eq!(stats.render_type_usage[0].count, 2);
    assert_eq!(stats.render_type_usage[1].count, 1);
    assert_eq!(stats.style_usage[0].name, "noir");
    assert_eq!(stats.style_usage[0].count, 2);
    assert_eq!(stats.style_usage.len(), 2);
}
