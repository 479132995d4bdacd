//! Crossword handler. Answers must be single words; the runtime lays out
//! the grid from letter overlaps.

use serde_json::Value;

use crate::definition::ContentItem;
use crate::error::Result;
use crate::graph::Fragment;
use crate::graph::params::{CrosswordBehaviour, CrosswordL10n, CrosswordParams, CrosswordWord};
use crate::util::escape_html;

use super::{Handler, HandlerContext, invalid};

/// Below this many words no meaningful grid exists.
pub(crate) const MIN_WORDS: usize = 2;

pub struct CrosswordHandler;

impl CrosswordHandler {
    fn parse(item: &ContentItem) -> Result<Vec<(String, String)>> {
        let words = item
            .get("words")
            .and_then(Value::as_array)
            .ok_or_else(|| invalid("missing 'words' list"))?;
        if words.len() < MIN_WORDS {
            return Err(invalid(format!(
                "a crossword needs at least {MIN_WORDS} words"
            )));
        }

        let mut parsed = Vec::with_capacity(words.len());
        for (index, word) in words.iter().enumerate() {
            let number = index + 1;
            let object = word
                .as_object()
                .ok_or_else(|| invalid(format!("word {number} must be an object")))?;
            let clue = object
                .get("clue")
                .and_then(Value::as_str)
                .filter(|clue| !clue.trim().is_empty())
                .ok_or_else(|| invalid(format!("word {number} missing 'clue'")))?;
            let answer = object
                .get("answer")
                .and_then(Value::as_str)
                .filter(|answer| !answer.is_empty())
                .ok_or_else(|| invalid(format!("word {number} missing 'answer'")))?;
            if answer.contains(char::is_whitespace) {
                return Err(invalid(format!(
                    "word {number}: answer '{answer}' must be a single word"
                )));
            }
            parsed.push((clue.to_string(), answer.to_string()));
        }
        Ok(parsed)
    }
}

impl Handler for CrosswordHandler {
    fn content_type(&self) -> &'static str {
        "crossword"
    }

    fn required_libraries(&self) -> &'static [&'static str] {
        &["H5P.Crossword"]
    }

    fn validate(&self, item: &ContentItem) -> Result<()> {
        Self::parse(item).map(drop)
    }

    fn process(&self, ctx: &mut HandlerContext<'_, '_, '_>, item: &ContentItem) -> Result<()> {
        let parsed = Self::parse(item)?;
        let words = parsed
            .into_iter()
            .map(|(clue, answer)| CrosswordWord {
                clue: escape_html(&clue),
                answer: answer.to_uppercase(),
                fix_word: false,
            })
            .collect();

        let task = item
            .get_str("task")
            .unwrap_or("Solve the crossword")
            .to_string();
        ctx.chapter.fragment(
            Fragment::Crossword(CrosswordParams {
                task_description: format!("<p>{}</p>", escape_html(&task)),
                words,
                behaviour: CrosswordBehaviour::default(),
                l10n: CrosswordL10n::default(),
            }),
            item.get_str("title").map(String::from),
        )
    }
}
