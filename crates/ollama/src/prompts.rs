//! System prompts and user-message builders for prompt enhancement, plus
//! cleanup of raw model output.

pub const ENHANCE_POSITIVE_SYSTEM: &str = "You are an expert prompt engineer for text-to-image diffusion models. \
Rewrite the user's prompt into a rich, detailed prompt. \
Always answer in English; translate the user's prompt first if it is written in another language. \
When style examples are provided, use them as a strong guide for vocabulary, structure and tone. \
Preserve the user's key concepts, keywords and weighting syntax such as (word:1.2) exactly. \
Add details about subject, composition, lighting and atmosphere around those core concepts. \
Output only the final prompt, without any preamble, explanation or quotes.";

pub const ENHANCE_NEGATIVE_SYSTEM: &str = "You are an expert prompt engineer for text-to-image diffusion models. \
Create a coherent negative prompt from the positive prompt context and the base negative concepts. \
Keep every embedding or special token from the base negative concepts unchanged. \
Add common quality terms such as ugly, deformed, blurry, watermark, text, \
but never add a term that contradicts the positive prompt. \
Output a single line of comma-separated terms and nothing else.";

/// Base negative used when the caller supplied none.
pub const DEFAULT_NEGATIVE_BASE: &str = "standard negative terms";

/// User message for positive enhancement. `examples` comes from the
/// render type and is skipped when blank.
pub fn positive_user_message(base: &str, examples: Option<&str>) -> String {
    match examples.map(str::trim).filter(|e| !e.is_empty()) {
        Some(examples) => format!(
            "Here are some examples of high-quality prompts for the desired style:\n---\n{examples}\n---\n\
             Now, using those examples as a strong style guide, please enhance the following user prompt:\n\"{base}\""
        ),
        None => format!("Please enhance the following user prompt:\n\"{base}\""),
    }
}

pub fn negative_user_message(negative: &str, positive: &str) -> String {
    let negative = match negative.trim() {
        "" => DEFAULT_NEGATIVE_BASE,
        n => n,
    };
    format!("Positive Prompt Context: \"{positive}\"\n\nBase Negative Concepts: \"{negative}\"")
}

/// Strip surrounding code fences (and a language tag on the opening
/// fence) and surrounding quotes from a model answer.
pub fn clean_content(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let rest = rest.strip_suffix("```").unwrap_or(rest);
        // Opening fence may carry a language tag on its own line.
        text = match rest.split_once('\n') {
            Some((tag, body)) if !tag.trim().contains(' ') => body,
            _ => rest,
        };
        text = text.trim();
    }

    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            text = text[1..text.len() - 1].trim();
            break;
        }
    }

    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_content_strips_fences_and_quotes() {
        assert_eq!(clean_content("  a cat  "), "a cat");
        assert_eq!(clean_content("\"a cat\""), "a cat");
        assert_eq!(clean_content("'a cat'"), "a cat");
        assert_eq!(clean_content("```\na cat\n```"), "a cat");
        assert_eq!(clean_content("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(clean_content("```\n\"quoted\"\n```"), "quoted");
    }

    #[test]
    fn clean_content_leaves_inner_quotes() {
        assert_eq!(clean_content("a \"quoted\" cat"), "a \"quoted\" cat");
        assert_eq!(clean_content("\""), "\"");
    }

    #[test]
    fn positive_message_includes_examples_when_present() {
        let with = positive_user_message("a cat", Some("ex1\nex2"));
        assert!(with.contains("---\nex1\nex2\n---"));
        assert!(with.ends_with("\"a cat\""));

        let without = positive_user_message("a cat", Some("   "));
        assert!(!without.contains("---"));
        assert!(without.ends_with("\"a cat\""));
    }

    #[test]
    fn negative_message_falls_back_to_default_base() {
        let msg = negative_user_message("  ", "a cat");
        assert_eq!(
            msg,
            "Positive Prompt Context: \"a cat\"\n\nBase Negative Concepts: \"standard negative terms\""
        );
    }
}
