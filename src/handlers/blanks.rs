//! Fill-in-the-blanks handler.
//!
//! Same dual-shape contract as drag-text: simplified `sentences` with
//! `{blank}` placeholders, or a native `questions` list of marker lines.
//! Answers are typed rather than dragged.

use serde_json::Value;

use crate::definition::ContentItem;
use crate::error::Result;
use crate::graph::Fragment;
use crate::graph::params::{BlanksBehaviour, BlanksL10n, BlanksParams, default_overall_feedback};
use crate::util::escape_html;

use super::markers;
use super::{Handler, HandlerContext, invalid};

const DEFAULT_TASK: &str = "Fill in the missing words";

pub struct BlanksHandler;

struct ParsedBlanks {
    title: Option<String>,
    task: String,
    questions: Vec<String>,
}

impl BlanksHandler {
    fn parse(item: &ContentItem) -> Result<ParsedBlanks> {
        let questions = match (item.get("sentences"), item.get("questions")) {
            (Some(_), Some(_)) => {
                return Err(invalid("provide either 'sentences' or 'questions', not both"));
            }
            (None, None) => {
                return Err(invalid("missing content: provide 'sentences' or 'questions'"));
            }
            (Some(sentences), None) => parse_simplified(sentences)?,
            (None, Some(native)) => parse_native_questions(native)?,
        };

        Ok(ParsedBlanks {
            title: item.get_str("title").map(String::from),
            task: item.get_str("task").unwrap_or(DEFAULT_TASK).to_string(),
            questions,
        })
    }
}

fn parse_simplified(sentences: &Value) -> Result<Vec<String>> {
    let sentences = sentences
        .as_array()
        .ok_or_else(|| invalid("'sentences' must be a list"))?;
    if sentences.is_empty() {
        return Err(invalid("'sentences' must not be empty"));
    }

    let mut questions = Vec::with_capacity(sentences.len());
    for (index, sentence) in sentences.iter().enumerate() {
        let number = index + 1;
        let object = sentence
            .as_object()
            .ok_or_else(|| invalid(format!("sentence {number} must be an object")))?;
        let text = object
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid(format!("sentence {number} missing 'text'")))?;

        let placeholder_count = markers::count_placeholders(text);
        if placeholder_count == 0 {
            return Err(invalid(format!(
                "sentence {number} has no {} markers",
                markers::PLACEHOLDER
            )));
        }
        let declared = object
            .get("blanks")
            .and_then(Value::as_array)
            .ok_or_else(|| invalid(format!("sentence {number} missing 'blanks'")))?;
        if placeholder_count != declared.len() {
            return Err(invalid(format!(
                "sentence {number}: {placeholder_count} {} markers but {} blanks declared",
                markers::PLACEHOLDER,
                declared.len()
            )));
        }

        let mut blanks = Vec::with_capacity(declared.len());
        for (blank_index, blank) in declared.iter().enumerate() {
            blanks.push(markers::parse_blank(blank).map_err(|reason| {
                invalid(format!("sentence {number}, blank {}: {reason}", blank_index + 1))
            })?);
        }
        questions.push(markers::rewrite_sentence(text, &blanks));
    }
    Ok(questions)
}

fn parse_native_questions(native: &Value) -> Result<Vec<String>> {
    let questions = native
        .as_array()
        .ok_or_else(|| invalid("'questions' must be a list of marker strings"))?;
    if questions.is_empty() {
        return Err(invalid("'questions' must not be empty"));
    }
    let mut parsed = Vec::with_capacity(questions.len());
    for (index, question) in questions.iter().enumerate() {
        let number = index + 1;
        let line = question
            .as_str()
            .ok_or_else(|| invalid(format!("question {number} must be a string")))?;
        if markers::count_markers(line) == 0 {
            return Err(invalid(format!(
                "question {number} contains no *marker* groups"
            )));
        }
        parsed.push(line.to_string());
    }
    Ok(parsed)
}

impl Handler for BlanksHandler {
    fn content_type(&self) -> &'static str {
        "blanks"
    }

    fn required_libraries(&self) -> &'static [&'static str] {
        &["H5P.Blanks"]
    }

    fn validate(&self, item: &ContentItem) -> Result<()> {
        Self::parse(item).map(drop)
    }

    fn process(&self, ctx: &mut HandlerContext<'_, '_, '_>, item: &ContentItem) -> Result<()> {
        let parsed = Self::parse(item)?;
        let params = BlanksParams {
            text: format!("<p>{}</p>", escape_html(&parsed.task)),
            questions: parsed
                .questions
                .into_iter()
                .map(|question| format!("<p>{question}</p>"))
                .collect(),
            behaviour: BlanksBehaviour::default(),
            overall_feedback: default_overall_feedback(),
            l10n: BlanksL10n::default(),
        };
        ctx.chapter.fragment(Fragment::Blanks(params), parsed.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(payload: serde_json::Value) -> ContentItem {
        ContentItem::new("blanks", payload.as_object().unwrap().clone())
    }

    #[test]
    fn test_simplified_sentences() {
        let parsed = BlanksHandler::parse(&item(json!({
            "sentences": [
                {"text": "Water boils at {blank} degrees.", "blanks": [{"answer": ["100", "one hundred"]}]}
            ]
        })))
        .unwrap();
        assert_eq!(parsed.questions, vec!["Water boils at *100/one hundred* degrees."]);
    }

    #[test]
    fn test_native_questions() {
        let parsed = BlanksHandler::parse(&item(json!({
            "questions": ["Oslo is the capital of *Norway*."]
        })))
        .unwrap();
        assert_eq!(parsed.questions.len(), 1);
    }

    #[test]
    fn test_mismatch_rejected() {
        assert!(BlanksHandler
            .validate(&item(json!({
                "sentences": [{"text": "{blank}", "blanks": []}]
            })))
            .is_err());
    }

    #[test]
    fn test_native_without_markers_rejected() {
        assert!(BlanksHandler
            .validate(&item(json!({"questions": ["no markers"]})))
            .is_err());
    }
}
