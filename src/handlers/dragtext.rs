//! Drag-the-words handler.
//!
//! Accepts two exclusive input shapes:
//!
//! 1. *Simplified*: a `sentences` list, each with a `text` containing
//!    `{blank}` placeholders and a parallel `blanks` array (`answer`
//!    string-or-list, optional `tip`).
//! 2. *Native*: a single `textField` string already in marker syntax,
//!    one sentence per line.
//!
//! `distractors` accepts a list of strings or a native marker string used
//! verbatim. Simplified input is rewritten to native syntax before
//! emission.

use serde_json::Value;

use crate::definition::ContentItem;
use crate::error::Result;
use crate::graph::Fragment;
use crate::graph::params::{DragTextBehaviour, DragTextL10n, DragTextParams, default_overall_feedback};
use crate::util::escape_html;

use super::markers;
use super::{Handler, HandlerContext, invalid};

const DEFAULT_TASK: &str = "Drag the words into the correct boxes";

pub struct DragTextHandler;

/// Fully validated input, ready for emission.
struct ParsedDragText {
    title: Option<String>,
    task_description: String,
    text_field: String,
    distractors: String,
}

impl DragTextHandler {
    fn parse(item: &ContentItem) -> Result<ParsedDragText> {
        let text_field = match (item.get("sentences"), item.get("textField")) {
            (Some(_), Some(_)) => {
                return Err(invalid(
                    "provide either 'sentences' or 'textField', not both",
                ));
            }
            (None, None) => {
                return Err(invalid("missing content: provide 'sentences' or 'textField'"));
            }
            (Some(sentences), None) => parse_simplified(sentences)?,
            (None, Some(native)) => parse_native_field(native)?,
        };

        let distractors =
            markers::distractors_to_native(item.get("distractors")).map_err(invalid)?;

        Ok(ParsedDragText {
            title: item.get_str("title").map(String::from),
            task_description: item
                .get_str("taskDescription")
                .unwrap_or(DEFAULT_TASK)
                .to_string(),
            text_field,
            distractors,
        })
    }
}

/// Rewrite the simplified sentence list to native syntax.
fn parse_simplified(sentences: &Value) -> Result<String> {
    let sentences = sentences
        .as_array()
        .ok_or_else(|| invalid("'sentences' must be a list"))?;
    if sentences.is_empty() {
        return Err(invalid("'sentences' must not be empty"));
    }

    let mut lines = Vec::with_capacity(sentences.len());
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
        lines.push(markers::rewrite_sentence(text, &blanks));
    }
    Ok(lines.join("\n"))
}

/// Check a native `textField` without rewriting it.
fn parse_native_field(native: &Value) -> Result<String> {
    let text_field = native
        .as_str()
        .ok_or_else(|| invalid("'textField' must be a string"))?;
    if text_field.trim().is_empty() {
        return Err(invalid("'textField' must not be empty"));
    }
    let sentences = markers::parse_native(text_field);
    if sentences.iter().all(|sentence| sentence.blanks.is_empty()) {
        return Err(invalid("'textField' contains no *marker* groups"));
    }
    for (index, sentence) in sentences.iter().enumerate() {
        for blank in &sentence.blanks {
            if blank.answers.iter().any(String::is_empty) {
                return Err(invalid(format!(
                    "sentence {}: answer must be a non-empty string",
                    index + 1
                )));
            }
        }
    }
    Ok(text_field.to_string())
}

impl Handler for DragTextHandler {
    fn content_type(&self) -> &'static str {
        "dragtext"
    }

    fn required_libraries(&self) -> &'static [&'static str] {
        &["H5P.DragText"]
    }

    fn validate(&self, item: &ContentItem) -> Result<()> {
        Self::parse(item).map(drop)
    }

    fn process(&self, ctx: &mut HandlerContext<'_, '_, '_>, item: &ContentItem) -> Result<()> {
        let parsed = Self::parse(item)?;
        let params = DragTextParams {
            task_description: format!("<p>{}</p>", escape_html(&parsed.task_description)),
            text_field: parsed.text_field,
            distractors: parsed.distractors,
            behaviour: DragTextBehaviour::default(),
            overall_feedback: default_overall_feedback(),
            l10n: DragTextL10n::default(),
        };
        ctx.chapter
            .fragment(Fragment::DragText(params), parsed.title)
    }
}
