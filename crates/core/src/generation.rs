//! Generation modes, aspect-ratio presets and audit status values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Generation mode
-------------------------------------------------------------------------- */

/// Mode stored as `generation_mode`: 'image_generation'.
pub const MODE_IMAGE_GENERATION: &str = "image_generation";

/// Mode stored as `generation_mode`: 'upscale'.
pub const MODE_UPSCALE: &str = "upscale";

/// What a render type's workflow does.
///
/// Stored as text in `render_types.generation_mode`. Each mode has at most
/// one default render type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    #[default]
    ImageGeneration,
    Upscale,
}

impl GenerationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ImageGeneration => MODE_IMAGE_GENERATION,
            Self::Upscale => MODE_UPSCALE,
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            MODE_IMAGE_GENERATION => Ok(Self::ImageGeneration),
            MODE_UPSCALE => Ok(Self::Upscale),
            other => Err(CoreError::Validation(format!(
                "Unknown generation mode: '{other}'. Valid modes: {MODE_IMAGE_GENERATION}, {MODE_UPSCALE}"
            ))),
        }
    }
}

/* --------------------------------------------------------------------------
Aspect ratios
-------------------------------------------------------------------------- */

/// Resolution used when no aspect ratio is requested.
pub const DEFAULT_DIMENSIONS: (u32, u32) = (1024, 1024);

/// Aspect-ratio presets offered by `generate_image`.
///
/// Dimensions are the usual SDXL-friendly buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "4:3")]
    Classic,
    #[serde(rename = "3:4")]
    ClassicPortrait,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        Self::Square,
        Self::Landscape,
        Self::Portrait,
        Self::Classic,
        Self::ClassicPortrait,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::Classic => "4:3",
            Self::ClassicPortrait => "3:4",
        }
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Square => (1024, 1024),
            Self::Landscape => (1344, 768),
            Self::Portrait => (768, 1344),
            Self::Classic => (1152, 896),
            Self::ClassicPortrait => (896, 1152),
        }
    }
}

/* --------------------------------------------------------------------------
Audit status
-------------------------------------------------------------------------- */

/// Outcome recorded in `generation_logs.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GenerationStatus {
    Success,
    Failed,
}

impl GenerationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}
