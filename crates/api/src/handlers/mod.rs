pub mod comfyui_instance;
pub mod generation_log;
pub mod ollama_instance;
pub mod render_type;
pub mod settings;
pub mod style;
