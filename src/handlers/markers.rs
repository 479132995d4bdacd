//! The blank-marker syntax shared by drag-text and fill-in-the-blanks.
//!
//! Native syntax, one sentence per line: answers wrapped in asterisks,
//! alternatives separated by `/`, a tip appended after `:`.
//!
//! ```text
//! Sky is *blue*.
//! Grass is *green/verdant:think of lawns*.
//! ```
//!
//! Simplified input uses `{blank}` placeholders plus a parallel list of
//! blank definitions; [`rewrite_sentence`] converts it to native syntax.

use memchr::memchr_iter;
use serde_json::Value;

/// The `{blank}` placeholder of the simplified shape.
pub const PLACEHOLDER: &str = "{blank}";

/// One blank: its accepted answers (first is canonical) and optional tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blank {
    pub answers: Vec<String>,
    pub tip: Option<String>,
}

impl Blank {
    /// Render as a native marker group: `*a1/a2:tip*`.
    pub fn to_marker(&self) -> String {
        let mut marker = String::from("*");
        marker.push_str(&self.answers.join("/"));
        if let Some(tip) = &self.tip {
            marker.push(':');
            marker.push_str(tip);
        }
        marker.push('*');
        marker
    }
}

/// Count `{blank}` placeholders in a simplified sentence.
pub fn count_placeholders(text: &str) -> usize {
    text.matches(PLACEHOLDER).count()
}

/// Count complete `*...*` marker groups in native text.
pub fn count_markers(text: &str) -> usize {
    memchr_iter(b'*', text.as_bytes()).count() / 2
}

/// Rewrite a simplified sentence to native syntax. The caller has already
/// checked that the placeholder count matches `blanks.len()`.
pub fn rewrite_sentence(text: &str, blanks: &[Blank]) -> String {
    let mut result = text.to_string();
    for blank in blanks {
        result = result.replacen(PLACEHOLDER, &blank.to_marker(), 1);
    }
    result
}

/// Parse one blank definition from the simplified shape.
///
/// An `answer` is a non-empty string or a non-empty list of non-empty
/// strings. The empty-string check runs before the missing-field check so
/// an empty answer gets the more specific message.
pub fn parse_blank(value: &Value) -> Result<Blank, String> {
    let object = value
        .as_object()
        .ok_or_else(|| "blank must be an object".to_string())?;

    let answers = match object.get("answer") {
        Some(Value::String(answer)) if answer.is_empty() => {
            return Err("answer must be a non-empty string".to_string());
        }
        Some(Value::String(answer)) => vec![answer.clone()],
        Some(Value::Array(alternatives)) => {
            if alternatives.is_empty() {
                return Err("answer list must not be empty".to_string());
            }
            let mut answers = Vec::with_capacity(alternatives.len());
            for alternative in alternatives {
                match alternative.as_str() {
                    Some("") => return Err("answer must be a non-empty string".to_string()),
                    Some(answer) => answers.push(answer.to_string()),
                    None => return Err("answer list entries must be strings".to_string()),
                }
            }
            answers
        }
        Some(_) => return Err("answer must be a string or a list of strings".to_string()),
        None => return Err("missing 'answer' field".to_string()),
    };

    let tip = match object.get("tip") {
        Some(Value::String(tip)) if !tip.is_empty() => Some(tip.clone()),
        Some(Value::String(_)) | None => None,
        Some(_) => return Err("tip must be a string".to_string()),
    };

    Ok(Blank { answers, tip })
}

/// One sentence recovered from native syntax: the text with placeholders
/// restored plus the parsed blanks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeSentence {
    pub text: String,
    pub blanks: Vec<Blank>,
}

/// Parse native text back into sentence structure. Used by validation and
/// round-trip tests; marker groups left unclosed are treated as literal
/// text.
pub fn parse_native(text_field: &str) -> Vec<NativeSentence> {
    text_field
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_native_line)
        .collect()
}

fn parse_native_line(line: &str) -> NativeSentence {
    let mut text = String::with_capacity(line.len());
    let mut blanks = Vec::new();
    let mut rest = line;

    while let Some(open) = rest.find('*') {
        match rest[open + 1..].find('*') {
            Some(length) => {
                text.push_str(&rest[..open]);
                text.push_str(PLACEHOLDER);
                blanks.push(parse_marker(&rest[open + 1..open + 1 + length]));
                rest = &rest[open + length + 2..];
            }
            None => break,
        }
    }
    text.push_str(rest);

    NativeSentence { text, blanks }
}

fn parse_marker(marker: &str) -> Blank {
    let (answers_part, tip) = match marker.split_once(':') {
        Some((answers, tip)) if !tip.is_empty() => (answers, Some(tip.to_string())),
        Some((answers, _)) => (answers, None),
        None => (marker, None),
    };
    Blank {
        answers: answers_part.split('/').map(String::from).collect(),
        tip,
    }
}

/// Convert a `distractors` payload to native syntax. A raw string is used
/// verbatim (it already carries markers, handcrafted escapes included); a
/// list of strings is rewritten through the marker builder.
pub fn distractors_to_native(value: Option<&Value>) -> Result<String, String> {
    match value {
        None => Ok(String::new()),
        Some(Value::String(native)) => Ok(native.clone()),
        Some(Value::Array(entries)) => {
            let mut markers = Vec::with_capacity(entries.len());
            for entry in entries {
                match entry.as_str() {
                    Some("") => return Err("distractor must be a non-empty string".to_string()),
                    Some(distractor) => markers.push(
                        Blank {
                            answers: vec![distractor.to_string()],
                            tip: None,
                        }
                        .to_marker(),
                    ),
                    None => return Err("distractors must be strings".to_string()),
                }
            }
            Ok(markers.join("\n"))
        }
        Some(_) => Err("distractors must be a list of strings or a marker string".to_string()),
    }
}
