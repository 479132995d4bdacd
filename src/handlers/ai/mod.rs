//! AI-assisted handlers.
//!
//! Each `ai-*` handler validates its option block, assembles a user prompt
//! (topic, structural requirements, required JSON schema with a concrete
//! example, only-JSON instruction), makes one generation request, and
//! converts the sanitized response into the same parameter structs its
//! manual twin emits. Responses that violate per-handler invariants are
//! discarded entry by entry with a warning; anything unrecoverable falls
//! back to a deterministic fragment so the build still succeeds.

pub(crate) mod blanks;
pub(crate) mod crossword;
pub(crate) mod dialog_cards;
pub(crate) mod dragtext;
pub(crate) mod essay;
pub(crate) mod flashcards;
pub(crate) mod quiz;
pub(crate) mod truefalse;

use log::warn;
use serde_json::Value;

use crate::ai::{AiError, parse_json_response, sanitize_value};
use crate::definition::ContentItem;
use crate::error::Result;

use super::{HandlerContext, invalid};

/// Requested difficulty of generated material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub(crate) fn parse(item: &ContentItem) -> Result<Self> {
        match item.get("difficulty") {
            None => Ok(Difficulty::Medium),
            Some(Value::String(level)) => match level.as_str() {
                "easy" => Ok(Difficulty::Easy),
                "medium" => Ok(Difficulty::Medium),
                "hard" => Ok(Difficulty::Hard),
                other => Err(invalid(format!(
                    "'difficulty' must be easy, medium, or hard (got '{other}')"
                ))),
            },
            Some(_) => Err(invalid("'difficulty' must be a string")),
        }
    }

    /// Default blanks per sentence for the fill-style handlers.
    pub(crate) fn default_blanks(self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }

    /// Guidance sentence appended to user prompts.
    pub(crate) fn guidance(self) -> &'static str {
        match self {
            Difficulty::Easy => "Keep vocabulary simple and sentences short.",
            Difficulty::Medium => "Use moderately challenging vocabulary.",
            Difficulty::Hard => "Use advanced vocabulary and nuanced phrasing.",
        }
    }
}

/// The required `prompt` field.
pub(crate) fn required_prompt(item: &ContentItem) -> Result<String> {
    match item.get("prompt") {
        Some(Value::String(prompt)) if !prompt.trim().is_empty() => Ok(prompt.clone()),
        Some(Value::String(_)) => Err(invalid("'prompt' must not be empty")),
        Some(_) => Err(invalid("'prompt' must be a string")),
        None => Err(invalid("missing 'prompt' field")),
    }
}

/// An optional positive integer option with a default.
pub(crate) fn count_option(item: &ContentItem, field: &str, default: u32) -> Result<u32> {
    match item.get(field) {
        None => Ok(default),
        Some(value) => value
            .as_u64()
            .filter(|&n| n > 0 && n <= 100)
            .map(|n| n as u32)
            .ok_or_else(|| invalid(format!("'{field}' must be a positive number"))),
    }
}

/// An optional boolean option with a default.
pub(crate) fn flag_option(item: &ContentItem, field: &str, default: bool) -> Result<bool> {
    match item.get(field) {
        None => Ok(default),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(_) => Err(invalid(format!("'{field}' must be a boolean"))),
    }
}

/// Make one generation request and return the sanitized JSON document.
pub(crate) fn generate(
    ctx: &HandlerContext<'_, '_, '_>,
    item: &ContentItem,
    user_prompt: &str,
) -> std::result::Result<Value, AiError> {
    let client = ctx
        .ai
        .ok_or_else(|| AiError::Unavailable("no generation credentials configured".to_string()))?;
    let system_prompt = ctx.ai_config_for(item).system_prompt();
    let response = client.complete(&system_prompt, user_prompt)?;
    Ok(sanitize_value(parse_json_response(&response)?))
}

/// Log the fallback warning, naming the originating prompt.
pub(crate) fn warn_fallback(tag: &str, prompt: &str, error: &AiError) {
    warn!(
        "{tag} generation failed for '{}': {error}; emitting fallback fragment",
        snippet(prompt)
    );
}

/// First 60 characters of a prompt, for log lines.
fn snippet(prompt: &str) -> &str {
    match prompt.char_indices().nth(60) {
        Some((offset, _)) => &prompt[..offset],
        None => prompt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(payload: serde_json::Value) -> ContentItem {
        ContentItem::new("ai-test", payload.as_object().unwrap().clone())
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!(
            Difficulty::parse(&item(json!({"difficulty": "easy"}))).unwrap(),
            Difficulty::Easy
        );
        assert_eq!(
            Difficulty::parse(&item(json!({}))).unwrap(),
            Difficulty::Medium
        );
        assert!(Difficulty::parse(&item(json!({"difficulty": "brutal"}))).is_err());
    }

    #[test]
    fn test_difficulty_default_blanks() {
        assert_eq!(Difficulty::Easy.default_blanks(), 1);
        assert_eq!(Difficulty::Medium.default_blanks(), 2);
        assert_eq!(Difficulty::Hard.default_blanks(), 3);
    }

    #[test]
    fn test_required_prompt() {
        assert_eq!(
            required_prompt(&item(json!({"prompt": "colors"}))).unwrap(),
            "colors"
        );
        assert!(required_prompt(&item(json!({"prompt": "  "}))).is_err());
        assert!(required_prompt(&item(json!({}))).is_err());
        assert!(required_prompt(&item(json!({"prompt": 3}))).is_err());
    }

    #[test]
    fn test_count_option() {
        assert_eq!(count_option(&item(json!({})), "sentenceCount", 5).unwrap(), 5);
        assert_eq!(
            count_option(&item(json!({"sentenceCount": 2})), "sentenceCount", 5).unwrap(),
            2
        );
        assert!(count_option(&item(json!({"sentenceCount": 0})), "sentenceCount", 5).is_err());
        assert!(count_option(&item(json!({"sentenceCount": -3})), "sentenceCount", 5).is_err());
    }
}
