//! The AI generation protocol.
//!
//! AI-assisted handlers delegate content synthesis to an external
//! text-generation service through this module: a pure config cascade, a
//! transport seam with a blocking HTTP implementation, and response
//! sanitation (fence stripping, JSON parsing, markup removal).
//!
//! Nothing in here ever aborts a build. [`AiError`] is caught inside the
//! owning handler, which logs a warning and emits a fallback fragment.

mod client;
mod sanitize;

pub use client::{AiClient, AiError, AiTransport, HttpAiTransport};
pub use sanitize::{parse_json_response, sanitize_value, strip_code_fences};

use crate::definition::AiConfig;

/// The effective generation preferences for one content item, after
/// walking item → chapter → book → defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAiConfig {
    pub target_audience: String,
    pub tone: String,
    pub customization: String,
}

impl Default for ResolvedAiConfig {
    fn default() -> Self {
        Self {
            target_audience: "grade-6".to_string(),
            tone: "educational".to_string(),
            customization: String::new(),
        }
    }
}

/// Resolve the config cascade. Pure: the first present value per field
/// wins; inputs are never mutated.
pub fn resolve_config(
    item: Option<&AiConfig>,
    chapter: Option<&AiConfig>,
    book: Option<&AiConfig>,
) -> ResolvedAiConfig {
    let defaults = ResolvedAiConfig::default();
    let pick = |field: fn(&AiConfig) -> Option<&String>, fallback: &str| {
        [item, chapter, book]
            .into_iter()
            .flatten()
            .find_map(|config| field(config).cloned())
            .unwrap_or_else(|| fallback.to_string())
    };
    ResolvedAiConfig {
        target_audience: pick(|c| c.target_audience.as_ref(), &defaults.target_audience),
        tone: pick(|c| c.tone.as_ref(), &defaults.tone),
        customization: pick(|c| c.customization.as_ref(), &defaults.customization),
    }
}

impl ResolvedAiConfig {
    /// The system prompt sent with every generation request.
    pub fn system_prompt(&self) -> String {
        let mut prompt = format!(
            "You are an expert creator of educational course material. \
             Write for {} learners. Keep the tone {}.",
            self.target_audience, self.tone
        );
        if !self.customization.is_empty() {
            prompt.push(' ');
            prompt.push_str(&self.customization);
        }
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(
        audience: Option<&str>,
        tone: Option<&str>,
        customization: Option<&str>,
    ) -> AiConfig {
        AiConfig {
            target_audience: audience.map(String::from),
            tone: tone.map(String::from),
            customization: customization.map(String::from),
        }
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let resolved = resolve_config(None, None, None);
        assert_eq!(resolved.target_audience, "grade-6");
        assert_eq!(resolved.tone, "educational");
        assert_eq!(resolved.customization, "");
    }

    #[test]
    fn test_item_wins_over_chapter_and_book() {
        let item = config(Some("grade-2"), None, None);
        let chapter = config(Some("grade-8"), Some("playful"), None);
        let book = config(Some("grade-12"), Some("formal"), Some("use metric units"));
        let resolved = resolve_config(Some(&item), Some(&chapter), Some(&book));
        assert_eq!(resolved.target_audience, "grade-2");
        assert_eq!(resolved.tone, "playful");
        assert_eq!(resolved.customization, "use metric units");
    }

    #[test]
    fn test_fields_resolve_independently() {
        let chapter = config(None, Some("casual"), None);
        let resolved = resolve_config(None, Some(&chapter), None);
        assert_eq!(resolved.target_audience, "grade-6");
        assert_eq!(resolved.tone, "casual");
    }

    #[test]
    fn test_system_prompt_mentions_config() {
        let resolved = ResolvedAiConfig {
            target_audience: "grade-9".to_string(),
            tone: "playful".to_string(),
            customization: "Prefer short sentences.".to_string(),
        };
        let prompt = resolved.system_prompt();
        assert!(prompt.contains("grade-9"));
        assert!(prompt.contains("playful"));
        assert!(prompt.ends_with("Prefer short sentences."));
    }
}
