//! Declarative book definition — the compiler's input model.
//!
//! A definition document is plain JSON:
//!
//! ```json
//! {
//!   "title": "Bio 101",
//!   "language": "en",
//!   "chapters": [
//!     {
//!       "title": "Photosynthesis",
//!       "content": [
//!         { "type": "text", "title": "Intro", "text": "Plants convert light..." },
//!         { "type": "image", "path": "./img/leaf.jpg", "alt": "leaf" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Each content item carries a `type` discriminator; the rest of the item is
//! an open payload that the matching handler re-deserializes into its own
//! typed parameter struct. Unknown types are rejected at dispatch, not here.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A complete book definition: title, language tag, optional cover image
/// reference, optional book-level AI configuration, and ordered chapters.
#[derive(Debug, Clone, Deserialize)]
pub struct BookDefinition {
    pub title: String,
    pub language: String,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default, rename = "aiConfig")]
    pub ai_config: Option<AiConfig>,
    #[serde(default)]
    pub chapters: Vec<ChapterDefinition>,
}

/// One chapter: a title, optional chapter-level AI configuration, and an
/// ordered list of content items.
#[derive(Debug, Clone, Deserialize)]
pub struct ChapterDefinition {
    pub title: String,
    #[serde(default, rename = "aiConfig")]
    pub ai_config: Option<AiConfig>,
    #[serde(default)]
    pub content: Vec<ContentItem>,
}

/// A tagged content item: the `type` discriminator plus the per-variant
/// payload, kept as raw JSON until a handler claims it.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// Declarative AI generation preferences. May appear at book, chapter, or
/// item level; resolution walks item → chapter → book → defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AiConfig {
    #[serde(default, rename = "targetAudience", alias = "target_audience")]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub customization: Option<String>,
}

impl BookDefinition {
    /// Parse a definition from a JSON document.
    pub fn from_json(document: &str) -> Result<Self> {
        let definition: BookDefinition = serde_json::from_str(document)?;
        Ok(definition)
    }

    /// Check the structural invariants: at least one chapter, and at least
    /// one content item in every chapter.
    pub fn validate(&self) -> Result<()> {
        if self.chapters.is_empty() {
            return Err(Error::EmptyBook);
        }
        for chapter in &self.chapters {
            if chapter.content.is_empty() {
                return Err(Error::EmptyChapter(chapter.title.clone()));
            }
        }
        Ok(())
    }
}

impl ContentItem {
    /// Construct an item from a type tag and payload fields. Mostly useful
    /// in tests and for programmatic definitions.
    pub fn new(content_type: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            content_type: content_type.into(),
            payload,
        }
    }

    /// Look up a payload field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.payload.get(field)
    }

    /// Look up a payload field as a string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.payload.get(field).and_then(Value::as_str)
    }

    /// The payload as a JSON object value, for re-deserialization into a
    /// handler's typed parameter struct.
    pub fn payload_value(&self) -> Value {
        Value::Object(self.payload.clone())
    }

    /// The item-level AI configuration block, if one is present.
    pub fn ai_config(&self) -> Option<AiConfig> {
        self.payload
            .get("aiConfig")
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "title": "Bio 101",
        "language": "en",
        "chapters": [
            {
                "title": "Photosynthesis",
                "content": [
                    { "type": "text", "title": "Intro", "text": "Plants convert light..." }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_minimal() {
        let definition = BookDefinition::from_json(MINIMAL).unwrap();
        assert_eq!(definition.title, "Bio 101");
        assert_eq!(definition.language, "en");
        assert_eq!(definition.chapters.len(), 1);
        let item = &definition.chapters[0].content[0];
        assert_eq!(item.content_type, "text");
        assert_eq!(item.get_str("title"), Some("Intro"));
        definition.validate().unwrap();
    }

    #[test]
    fn test_validate_empty_book() {
        let definition = BookDefinition::from_json(
            r#"{"title": "x", "language": "en", "chapters": []}"#,
        )
        .unwrap();
        assert!(matches!(definition.validate(), Err(Error::EmptyBook)));
    }

    #[test]
    fn test_validate_empty_chapter() {
        let definition = BookDefinition::from_json(
            r#"{"title": "x", "language": "en",
                "chapters": [{"title": "empty", "content": []}]}"#,
        )
        .unwrap();
        match definition.validate() {
            Err(Error::EmptyChapter(title)) => assert_eq!(title, "empty"),
            other => panic!("expected EmptyChapter, got {other:?}"),
        }
    }

    #[test]
    fn test_ai_config_cascade_fields() {
        let definition = BookDefinition::from_json(
            r#"{"title": "x", "language": "en",
                "aiConfig": {"targetAudience": "grade-9", "tone": "playful"},
                "chapters": [{"title": "c", "content": [
                    {"type": "ai-dragtext", "prompt": "colors",
                     "aiConfig": {"customization": "use color names only"}}
                ]}]}"#,
        )
        .unwrap();
        let book_ai = definition.ai_config.as_ref().unwrap();
        assert_eq!(book_ai.target_audience.as_deref(), Some("grade-9"));
        let item_ai = definition.chapters[0].content[0].ai_config().unwrap();
        assert_eq!(item_ai.customization.as_deref(), Some("use color names only"));
        assert!(item_ai.tone.is_none());
    }
}
