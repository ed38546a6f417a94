//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&SqlitePool` as the first argument.

pub mod comfyui_instance_repo;
pub mod description_settings_repo;
pub mod generation_log_repo;
pub mod ollama_instance_repo;
pub mod prompt_generator_repo;
pub mod render_type_repo;
pub mod setting_repo;
pub mod style_repo;

pub use comfyui_instance_repo::ComfyUIInstanceRepo;
pub use description_settings_repo::DescriptionSettingsRepo;
pub use generation_log_repo::GenerationLogRepo;
pub use ollama_instance_repo::OllamaInstanceRepo;
pub use prompt_generator_repo::PromptGeneratorRepo;
pub use render_type_repo::RenderTypeRepo;
pub use setting_repo::SettingRepo;
pub use style_repo::StyleRepo;

/// SQL expression for "now" in the stored timestamp format.
pub(crate) const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";
