//! Prompt assembly and render-type resolution against style compatibility.
//!
//! Styles contribute prompt fragments and may constrain which render types
//! they work with. A style with an empty compatibility list accepts every
//! render type.
//!
//! Resolution tries candidates in a fixed order and keeps the first one
//! every constraining style accepts:
//!
//! 1. the render type the caller asked for,
//! 2. each style's fallback render type, in style order,
//! 3. the default render type for the generation mode.
//!
//! The first style whose fallback satisfies everyone wins, so a later style
//! never silently overrides an earlier one.

use crate::error::CoreError;

/// Separator between the base prompt and style fragments.
pub const PROMPT_SEPARATOR: &str = ", ";

/// The parts of a style that prompt assembly cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSpec {
    pub name: String,
    pub prompt_template: String,
    pub negative_prompt_template: String,
    /// Recommended render type, used when the current one is incompatible.
    pub fallback_render_type: Option<String>,
    /// Render types this style works with. Empty means "any".
    pub compatible_render_types: Vec<String>,
}

impl StyleSpec {
    /// Whether this style restricts the render type at all.
    pub fn is_constraining(&self) -> bool {
        !self.compatible_render_types.is_empty()
    }

    /// Whether `render_type` is acceptable for this style.
    pub fn accepts(&self, render_type: &str) -> bool {
        !self.is_constraining() || self.compatible_render_types.iter().any(|rt| rt == render_type)
    }
}

/// Pick the render type for a request.
///
/// Returns `Ok(None)` only when there is no candidate at all (nothing
/// requested, no style fallback, no mode default). Returns
/// [`CoreError::Conflict`] naming the constraining styles when candidates
/// exist but none is accepted by all of them.
pub fn resolve_render_type(
    requested: Option<&str>,
    styles: &[StyleSpec],
    mode_default: Option<&str>,
) -> Result<Option<String>, CoreError> {
    let candidates: Vec<&str> = requested
        .into_iter()
        .chain(styles.iter().filter_map(|s| s.fallback_render_type.as_deref()))
        .chain(mode_default)
        .collect();

    if candidates.is_empty() {
        return Ok(None);
    }

    if let Some(found) = candidates
        .iter()
        .find(|candidate| styles.iter().all(|s| s.accepts(candidate)))
    {
        return Ok(Some((*found).to_string()));
    }

    let constraining: Vec<&str> = styles
        .iter()
        .filter(|s| s.is_constraining())
        .map(|s| s.name.as_str())
        .collect();
    Err(CoreError::Conflict(format!(
        "No render type is compatible with styles [{}] (tried: {})",
        constraining.join(", "),
        candidates.join(", ")
    )))
}

/// Drop style fallbacks that fail `usable`, e.g. render types of the
/// other generation mode, so resolution moves on to the next candidate.
pub fn usable_fallbacks_only(styles: &[StyleSpec], usable: impl Fn(&str) -> bool) -> Vec<StyleSpec> {
    styles
        .iter()
        .cloned()
        .map(|mut style| {
            if style.fallback_render_type.as_deref().is_some_and(|rt| !usable(rt)) {
                style.fallback_render_type = None;
            }
            style
        })
        .collect()
}

/// Join non-empty parts with [`PROMPT_SEPARATOR`].
pub fn join_prompt_parts<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(PROMPT_SEPARATOR)
}

/// Final positive and negative prompts after applying styles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    pub positive: String,
    pub negative: String,
}

/// Append each style's fragments to the base prompts.
pub fn assemble_prompt(positive: &str, negative: &str, styles: &[StyleSpec]) -> AssembledPrompt {
    let positive = join_prompt_parts(
        std::iter::once(positive).chain(styles.iter().map(|s| s.prompt_template.as_str())),
    );
    let negative = join_prompt_parts(
        std::iter::once(negative).chain(styles.iter().map(|s| s.negative_prompt_template.as_str())),
    );
    AssembledPrompt { positive, negative }
}
