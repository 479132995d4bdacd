//! Single-choice-set handler. Each question lists its answers with the
//! correct one first; the runtime shuffles at play time.

use serde_json::Value;

use crate::definition::ContentItem;
use crate::error::Result;
use crate::graph::Fragment;
use crate::graph::params::{
    SingleChoice, SingleChoiceSetBehaviour, SingleChoiceSetL10n, SingleChoiceSetParams,
};
use crate::util::escape_html;

use super::{Handler, HandlerContext, invalid};

pub struct SingleChoiceSetHandler;

impl SingleChoiceSetHandler {
    fn parse(item: &ContentItem) -> Result<Vec<(String, Vec<String>)>> {
        let questions = item
            .get("questions")
            .and_then(Value::as_array)
            .ok_or_else(|| invalid("missing 'questions' list"))?;
        if questions.is_empty() {
            return Err(invalid("'questions' must not be empty"));
        }

        let mut parsed = Vec::with_capacity(questions.len());
        for (index, question) in questions.iter().enumerate() {
            let number = index + 1;
            let object = question
                .as_object()
                .ok_or_else(|| invalid(format!("question {number} must be an object")))?;
            let text = object
                .get("question")
                .and_then(Value::as_str)
                .filter(|text| !text.trim().is_empty())
                .ok_or_else(|| invalid(format!("question {number} missing 'question'")))?;
            let answers = object
                .get("answers")
                .and_then(Value::as_array)
                .ok_or_else(|| invalid(format!("question {number} missing 'answers'")))?;
            if answers.len() < 2 {
                return Err(invalid(format!(
                    "question {number} needs at least 2 answers (correct one first)"
                )));
            }
            let answers = answers
                .iter()
                .map(|answer| {
                    answer
                        .as_str()
                        .filter(|text| !text.is_empty())
                        .map(String::from)
                        .ok_or_else(|| {
                            invalid(format!("question {number}: answers must be non-empty strings"))
                        })
                })
                .collect::<Result<Vec<String>>>()?;
            parsed.push((text.to_string(), answers));
        }
        Ok(parsed)
    }
}

impl Handler for SingleChoiceSetHandler {
    fn content_type(&self) -> &'static str {
        "single-choice-set"
    }

    fn required_libraries(&self) -> &'static [&'static str] {
        &["H5P.SingleChoiceSet"]
    }

    fn validate(&self, item: &ContentItem) -> Result<()> {
        Self::parse(item).map(drop)
    }

    fn process(&self, ctx: &mut HandlerContext<'_, '_, '_>, item: &ContentItem) -> Result<()> {
        let parsed = Self::parse(item)?;
        let choices = parsed
            .into_iter()
            .map(|(question, answers)| SingleChoice {
                question: format!("<p>{}</p>", escape_html(&question)),
                answers: answers
                    .into_iter()
                    .map(|answer| format!("<p>{}</p>", escape_html(&answer)))
                    .collect(),
                sub_content_id: ctx.chapter.next_sub_content_id(),
            })
            .collect();

        ctx.chapter.fragment(
            Fragment::SingleChoiceSet(SingleChoiceSetParams {
                choices,
                behaviour: SingleChoiceSetBehaviour::default(),
                l10n: SingleChoiceSetL10n::default(),
            }),
            item.get_str("title").map(String::from),
        )
    }
}
