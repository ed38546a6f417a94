//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod comfyui_instance;
pub mod description_settings;
pub mod generation_log;
pub mod ollama_instance;
pub mod prompt_generator_settings;
pub mod render_type;
pub mod setting;
pub mod style;
