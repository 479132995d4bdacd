//! True/false question handler.

use serde_json::Value;

use crate::definition::ContentItem;
use crate::error::Result;
use crate::graph::Fragment;
use crate::graph::params::{TrueFalseBehaviour, TrueFalseL10n, TrueFalseParams};
use crate::util::escape_html;

use super::{Handler, HandlerContext, invalid};

pub struct TrueFalseHandler;

impl Handler for TrueFalseHandler {
    fn content_type(&self) -> &'static str {
        "truefalse"
    }

    fn required_libraries(&self) -> &'static [&'static str] {
        &["H5P.TrueFalse"]
    }

    fn validate(&self, item: &ContentItem) -> Result<()> {
        match item.get_str("question") {
            Some(question) if !question.trim().is_empty() => {}
            Some(_) => return Err(invalid("'question' must not be empty")),
            None => return Err(invalid("missing 'question' field")),
        }
        match item.get("correct") {
            Some(Value::Bool(_)) => Ok(()),
            Some(_) => Err(invalid("'correct' must be a boolean")),
            None => Err(invalid("missing 'correct' field")),
        }
    }

    fn process(&self, ctx: &mut HandlerContext<'_, '_, '_>, item: &ContentItem) -> Result<()> {
        let question = item.get_str("question").unwrap_or_default();
        let correct = item.get("correct").and_then(Value::as_bool).unwrap_or(false);
        let params = TrueFalseParams {
            question: format!("<p>{}</p>", escape_html(question)),
            correct: if correct { "true" } else { "false" }.to_string(),
            behaviour: TrueFalseBehaviour::default(),
            l10n: TrueFalseL10n::default(),
        };
        ctx.chapter
            .fragment(Fragment::TrueFalse(params), item.get_str("title").map(String::from))
    }
}
