//! Building blocks for the `generate_prompt` tool.
//!
//! The tool itself talks to an LLM several times; this module holds the
//! pieces that don't: built-in themes, the instruction texts, tolerant
//! parsing of the JSON lists the model returns, and the random choices.

use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Themes used when the caller gives no subject.
pub const SUBJECT_THEMES: &[&str] = &[
    "a dramatic close-up portrait of a character",
    "a full body shot of a character in a dynamic action pose",
    "an intimate scene focusing on a character's emotions",
    "a character interacting with a fantastical creature",
    "a character set against a vast, breathtaking landscape",
    "a mysterious figure in a dark, moody environment",
    "a sci-fi character with advanced technology",
    "a fantasy hero preparing for battle",
    "an epic, panoramic view of a mountain range at sunrise",
    "an enchanted forest with glowing flora and a mystical river",
    "a desolate, alien desert under a sky with two moons",
    "a storm-swept coastline with crashing waves against dramatic cliffs",
    "a sprawling, futuristic cityscape with flying vehicles and towering megastructures",
    "the intricate, gothic interior of a grand cathedral with stained glass windows",
    "the overgrown ruins of an ancient, forgotten temple in the jungle",
    "a cozy, detailed cutaway of a hobbit-style burrow built into a hillside",
];

/// How many options the model is asked for at each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub subjects_to_propose: u32,
    pub elements_to_propose: u32,
    pub elements_to_select: u32,
    pub variations_to_propose: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            subjects_to_propose: 5,
            elements_to_propose: 15,
            elements_to_select: 5,
            variations_to_propose: 10,
        }
    }
}

/// Pull a list of strings out of whatever JSON the model produced.
///
/// Accepts a bare array, or an object whose first array-valued field holds
/// the list. Non-string and blank entries are dropped.
pub fn extract_string_list(value: &Value) -> Vec<String> {
    let list = match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.values().find_map(Value::as_array),
        _ => None,
    };
    list.into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Random choices
// ---------------------------------------------------------------------------

pub fn random_theme() -> &'static str {
    SUBJECT_THEMES
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(SUBJECT_THEMES[0])
}

pub fn pick_one<T: Clone>(items: &[T]) -> Option<T> {
    items.choose(&mut rand::rng()).cloned()
}

/// Up to `count` distinct items in random order.
pub fn sample<T: Clone>(items: &[T], count: usize) -> Vec<T> {
    let mut picked = items.to_vec();
    picked.shuffle(&mut rand::rng());
    picked.truncate(count);
    picked
}

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

pub fn translation_instruction(text: &str) -> String {
    format!(
        "Your task is to ensure the following text is in English. \
         If it is already in English, return it verbatim. \
         If it is in another language, translate it to English. \
         Respond with ONLY the resulting English text, without any quotes or explanations. \
         Text: \"{text}\""
    )
}

pub fn style_choice_instruction(theme: &str, styles: &[String]) -> String {
    format!(
        "Given the theme '{theme}', which of the following visual styles is most appropriate? \
         Styles: {styles:?}. Respond with only the name of the style from the list, and nothing else."
    )
}

/// Ask for variations of a caller-supplied subject, or fresh subjects for
/// a random theme.
pub fn subject_instruction(theme: &str, style: &str, user_subject: bool, count: u32) -> String {
    if user_subject {
        format!(
            "Based on the core subject '{theme}', generate a list of {count} creative and specific variations for an image. \
             Each variation MUST be a direct elaboration of the original subject, adding context, action, or details. \
             Do not replace the core subject. Feel free to place the subject in diverse settings (realistic, fantasy, sci-fi, etc.) \
             unless the subject itself implies a specific universe. Your response MUST be a single valid JSON list of strings."
        )
    } else {
        format!(
            "Based on the theme '{theme}, in the style of {style}', generate a list of {count} different, specific, and creative subjects \
             for a visual image. Focus on concrete scenes, characters, or objects. Avoid abstract concepts. \
             Your response MUST be a single valid JSON list of strings, and nothing else. \
             Example: [\"a majestic griffon...\", \"a clever kitsune...\", \"a terrifying chimera...\"]"
        )
    }
}

pub fn element_proposal_instruction(subject: &str, count: u32) -> String {
    format!(
        "You are an assistant for creating image prompts. Your task is to propose {count} categories of visual details \
         relevant to the subject '{subject}'. Focus on concrete, visual attributes. \
         Good examples: 'Character's Pose', 'Facial Expression', 'Clothing Style', 'Hairstyle', 'Key Accessory', \
         'Lighting', 'Background Environment', 'Color Palette', 'Mood'. \
         Bad examples: 'Symbolism', 'Narrative', 'Motivation'. \
         Your response MUST be a single JSON list of strings, and nothing else."
    )
}

pub fn element_variation_instruction(context: &[String], element: &str, count: u32) -> String {
    format!(
        "Current prompt context: '{}'. Propose {count} specific, visual, and concrete variations for the element '{element}'. \
         Avoid abstract ideas. For 'Lighting', suggest 'dramatic Rembrandt lighting' not 'sad lighting'. \
         For 'Clothing', suggest 'tattered leather armor' not 'adventurous attire'. \
         Your response MUST be a single JSON list of strings, and nothing else.",
        context.join(", ")
    )
}

pub fn fusion_instruction(concepts: &[String]) -> String {
    format!(
        "You are an expert prompt engineer. Transform the following list of visual concepts into a single, cohesive, \
         and highly descriptive prompt for an image generation AI. Combine the ideas into a flowing sentence or two. \
         Focus on what is *seen* in the image. Do not use abstract terms. Concepts to combine: {concepts:?}"
    )
}

/// Strip the quotes models like to wrap single-word answers in.
pub fn clean_short_answer(text: &str) -> String {
    text.trim().replace('"', "")
}
