//! MCP tool definitions: argument types, validation and the schemas
//! advertised by `tools/list`.

use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::generation::AspectRatio;

/* --------------------------------------------------------------------------
Tool names
-------------------------------------------------------------------------- */

pub const TOOL_GENERATE_IMAGE: &str = "generate_image";
pub const TOOL_UPSCALE_IMAGE: &str = "upscale_image";
pub const TOOL_DESCRIBE_IMAGE: &str = "describe_image";
pub const TOOL_GENERATE_PROMPT: &str = "generate_prompt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    GenerateImage,
    UpscaleImage,
    DescribeImage,
    GeneratePrompt,
}

impl ToolName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GenerateImage => TOOL_GENERATE_IMAGE,
            Self::UpscaleImage => TOOL_UPSCALE_IMAGE,
            Self::DescribeImage => TOOL_DESCRIBE_IMAGE,
            Self::GeneratePrompt => TOOL_GENERATE_PROMPT,
        }
    }
}

impl FromStr for ToolName {
    type Err = ToolArgsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            TOOL_GENERATE_IMAGE => Ok(Self::GenerateImage),
            TOOL_UPSCALE_IMAGE => Ok(Self::UpscaleImage),
            TOOL_DESCRIBE_IMAGE => Ok(Self::DescribeImage),
            TOOL_GENERATE_PROMPT => Ok(Self::GeneratePrompt),
            other => Err(ToolArgsError(format!("Tool '{other}' not found."))),
        }
    }
}

/* --------------------------------------------------------------------------
Arguments
-------------------------------------------------------------------------- */

/// Tool name or arguments rejected before any work starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ToolArgsError(pub String);

/// Deserialize and validate a tool's `arguments` object.
pub fn parse_args<T: DeserializeOwned + Validate>(arguments: Value) -> Result<T, ToolArgsError> {
    let args: T = serde_json::from_value(arguments)
        .map_err(|e| ToolArgsError(format!("Invalid parameters: {e}")))?;
    args.validate()
        .map_err(|e| ToolArgsError(format!("Invalid parameters: {e}")))?;
    Ok(args)
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateImageArgs {
    #[validate(length(min = 1, message = "prompt must not be empty"))]
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub style_names: Option<Vec<String>>,
    pub aspect_ratio: Option<AspectRatio>,
    pub render_type: Option<String>,
    #[validate(range(min = 0, message = "seed must be non-negative"))]
    pub seed: Option<i64>,
    pub enhance_prompt: Option<bool>,
}

impl GenerateImageArgs {
    pub fn negative_prompt(&self) -> &str {
        self.negative_prompt.as_deref().unwrap_or_default()
    }

    pub fn style_names(&self) -> &[String] {
        self.style_names.as_deref().unwrap_or_default()
    }

    /// Enhancement is on unless explicitly disabled.
    pub fn enhance_prompt(&self) -> bool {
        self.enhance_prompt.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpscaleImageArgs {
    #[validate(url(message = "input_image_url must be a valid URL"))]
    pub input_image_url: String,
    pub prompt: Option<String>,
    pub render_type: Option<String>,
    /// Older clients send the render type under this name.
    pub upscale_type: Option<String>,
    #[validate(range(min = 0.0, max = 1.0, message = "denoise must be between 0.0 and 1.0"))]
    pub denoise: Option<f64>,
    #[validate(range(min = 0, message = "seed must be non-negative"))]
    pub seed: Option<i64>,
}

impl UpscaleImageArgs {
    pub fn render_type(&self) -> Option<&str> {
        self.render_type
            .as_deref()
            .or(self.upscale_type.as_deref())
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionType {
    Natural,
    #[default]
    Optimized,
}

impl DescriptionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Natural => "natural",
            Self::Optimized => "optimized",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DescribeImageArgs {
    #[validate(url(message = "input_image_url must be a valid URL"))]
    pub input_image_url: String,
    #[serde(default)]
    pub description_type: DescriptionType,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct GeneratePromptArgs {
    pub subject: Option<String>,
    pub elements: Option<Vec<String>>,
    pub render_style: Option<String>,
}

impl GeneratePromptArgs {
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn elements(&self) -> Vec<&str> {
        self.elements
            .iter()
            .flatten()
            .map(|e| e.trim())
            .filter(|e| !e.is_empty())
            .collect()
    }
}

/* --------------------------------------------------------------------------
Schemas
-------------------------------------------------------------------------- */

/// Configuration snapshot that decides which tools are advertised.
///
/// Every list must already be in a stable order (the repositories sort by
/// name) so that the same configuration always yields the same listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCatalog {
    /// Visible render types in `image_generation` mode.
    pub generation_render_types: Vec<String>,
    /// Visible render types in `upscale` mode.
    pub upscale_render_types: Vec<String>,
    /// Active styles.
    pub style_names: Vec<String>,
    /// Whether description settings name an instance and a model.
    pub describe_configured: bool,
    /// Styles the prompt generator may use.
    pub generator_styles: Vec<String>,
}

impl ToolCatalog {
    /// Tool definitions for `tools/list`.
    pub fn tools(&self) -> Vec<Value> {
        let mut tools = Vec::new();
        if !self.generation_render_types.is_empty() {
            tools.push(generate_image_tool(&self.generation_render_types, &self.style_names));
        }
        if !self.upscale_render_types.is_empty() {
            tools.push(upscale_image_tool(&self.upscale_render_types));
        }
        if self.describe_configured {
            tools.push(describe_image_tool());
        }
        if !self.generator_styles.is_empty() {
            tools.push(generate_prompt_tool(&self.generator_styles));
        }
        tools
    }
}

fn image_output_schema(what: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "image_url": {"type": "string", "description": format!("The URL of the {what} image.")},
            "seed": {"type": "integer", "description": "The seed used for the generation."},
            "human_readable_summary": {"type": "string", "description": "A summary of the result."}
        },
        "required": ["image_url", "seed", "human_readable_summary"]
    })
}

fn generate_image_tool(render_types: &[String], style_names: &[String]) -> Value {
    let mut style_items = json!({"type": "string"});
    if !style_names.is_empty() {
        style_items["enum"] = json!(style_names);
    }
    let ratios: Vec<&str> = AspectRatio::ALL.iter().map(|r| r.as_str()).collect();

    json!({
        "name": TOOL_GENERATE_IMAGE,
        "title": "Generate Image from Text",
        "description": "Generates a new image based on a textual description (prompt).",
        "inputSchema": {
            "type": "object",
            "properties": {
                "prompt": {
                    "type": "string",
                    "description": "A detailed description of the image to generate."
                },
                "negative_prompt": {
                    "type": "string",
                    "description": "Optional. A description of elements to avoid in the image."
                },
                "style_names": {
                    "type": "array",
                    "description": "Optional. A list of style names to apply.",
                    "items": style_items
                },
                "aspect_ratio": {
                    "type": "string",
                    "description": "Optional. The desired aspect ratio of the final image.",
                    "enum": ratios
                },
                "render_type": {
                    "type": "string",
                    "description": "Optional. The specific rendering workflow to use.",
                    "enum": render_types
                },
                "seed": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Optional. A specific seed for reproducing an image."
                },
                "enhance_prompt": {
                    "type": "boolean",
                    "description": "Optional. If true, an LLM will enhance the prompt. Defaults to true.",
                    "default": true
                }
            },
            "required": ["prompt"]
        },
        "outputSchema": image_output_schema("generated")
    })
}

fn upscale_image_tool(render_types: &[String]) -> Value {
    json!({
        "name": TOOL_UPSCALE_IMAGE,
        "title": "Upscale an Image",
        "description": "Increases the resolution and enhances the detail of an existing image.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "input_image_url": {
                    "type": "string",
                    "description": "The URL of the source image to upscale."
                },
                "prompt": {
                    "type": "string",
                    "description": "Optional. A textual description to guide the upscaling process."
                },
                "render_type": {
                    "type": "string",
                    "description": "Optional. The specific upscaling workflow to use.",
                    "enum": render_types
                },
                "upscale_type": {
                    "type": "string",
                    "title": "Upscale Type",
                    "description": "Alias of render_type.",
                    "enum": render_types
                },
                "denoise": {
                    "type": "number",
                    "minimum": 0.0,
                    "maximum": 1.0,
                    "description": "Optional. Denoising factor (0.0 to 1.0). Higher values allow for more creative changes."
                },
                "seed": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Optional. A specific seed for reproducing the upscale."
                }
            },
            "required": ["input_image_url"]
        },
        "outputSchema": image_output_schema("upscaled")
    })
}

fn describe_image_tool() -> Value {
    json!({
        "name": TOOL_DESCRIBE_IMAGE,
        "title": "Describe an Image",
        "description": "Analyzes an image and provides a description. It can return a natural language description or an optimized text-to-image prompt.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "input_image_url": {
                    "type": "string",
                    "description": "The URL of the source image to describe."
                },
                "description_type": {
                    "type": "string",
                    "description": "The type of description to generate.",
                    "enum": ["natural", "optimized"],
                    "default": "optimized"
                },
                "language": {
                    "type": "string",
                    "description": "The language of the returned description.",
                    "enum": ["en", "fr"],
                    "default": "en"
                }
            },
            "required": ["input_image_url"]
        },
        "outputSchema": {
            "type": "object",
            "properties": {
                "description": {"type": "string", "description": "The generated textual description of the image."},
                "human_readable_summary": {"type": "string", "description": "A summary of the result."}
            },
            "required": ["description", "human_readable_summary"]
        }
    })
}

fn generate_prompt_tool(styles: &[String]) -> Value {
    json!({
        "name": TOOL_GENERATE_PROMPT,
        "title": "Generate a Creative Prompt",
        "description": "Generates a complete and creative prompt for image generation by combining a subject, contextual elements, and a render style, using an LLM for creative expansion.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "subject": {
                    "type": "string",
                    "description": "Optional. The main subject of the prompt. If not provided, a random one will be generated."
                },
                "elements": {
                    "type": "array",
                    "description": "Optional. A list of contextual element categories (e.g., 'lighting', 'clothing', 'background'). If not provided, random ones will be selected.",
                    "items": {"type": "string"}
                },
                "render_style": {
                    "type": "string",
                    "description": "Optional. The name of the render style to apply. If not provided, one will be chosen based on the subject.",
                    "enum": styles
                }
            },
            "required": []
        },
        "outputSchema": {
            "type": "object",
            "properties": {
                "positive_prompt": {"type": "string", "description": "The generated positive prompt."},
                "negative_prompt": {"type": "string", "description": "The generated negative prompt."},
                "human_readable_summary": {"type": "string", "description": "A formatted summary of the generated prompts."}
            },
            "required": ["positive_prompt", "negative_prompt", "human_readable_summary"]
        }
    })
}
