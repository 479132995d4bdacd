//! Multiple-choice quiz handler.

use serde_json::Value;

use crate::definition::ContentItem;
use crate::error::Result;
use crate::graph::params::{MultiChoiceAnswer, TipsAndFeedback};
use crate::util::escape_html;

use super::{Handler, HandlerContext, invalid};

pub struct QuizHandler;

struct ParsedQuiz {
    title: Option<String>,
    question: String,
    answers: Vec<(String, bool, Option<String>)>,
    single_answer: bool,
}

impl QuizHandler {
    fn parse(item: &ContentItem) -> Result<ParsedQuiz> {
        let question = item
            .get_str("question")
            .filter(|question| !question.trim().is_empty())
            .ok_or_else(|| invalid("missing 'question' field"))?;

        let answers = item
            .get("answers")
            .and_then(Value::as_array)
            .ok_or_else(|| invalid("missing 'answers' list"))?;
        if answers.len() < 2 {
            return Err(invalid("a quiz needs at least 2 answers"));
        }

        let mut parsed = Vec::with_capacity(answers.len());
        for (index, answer) in answers.iter().enumerate() {
            let number = index + 1;
            let object = answer
                .as_object()
                .ok_or_else(|| invalid(format!("answer {number} must be an object")))?;
            let text = object
                .get("text")
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .ok_or_else(|| invalid(format!("answer {number} missing 'text'")))?;
            let correct = object
                .get("correct")
                .and_then(Value::as_bool)
                .ok_or_else(|| invalid(format!("answer {number} missing 'correct' flag")))?;
            let feedback = object
                .get("feedback")
                .and_then(Value::as_str)
                .map(String::from);
            parsed.push((text.to_string(), correct, feedback));
        }

        let correct_count = parsed.iter().filter(|(_, correct, _)| *correct).count();
        if correct_count == 0 {
            return Err(invalid("at least one answer must be correct"));
        }

        let single_answer = match item.get("singleAnswer") {
            None => correct_count == 1,
            Some(Value::Bool(flag)) => *flag,
            Some(_) => return Err(invalid("'singleAnswer' must be a boolean")),
        };

        Ok(ParsedQuiz {
            title: item.get_str("title").map(String::from),
            question: question.to_string(),
            answers: parsed,
            single_answer,
        })
    }
}

impl Handler for QuizHandler {
    fn content_type(&self) -> &'static str {
        "quiz"
    }

    fn required_libraries(&self) -> &'static [&'static str] {
        &["H5P.MultiChoice"]
    }

    fn validate(&self, item: &ContentItem) -> Result<()> {
        Self::parse(item).map(drop)
    }

    fn process(&self, ctx: &mut HandlerContext<'_, '_, '_>, item: &ContentItem) -> Result<()> {
        let parsed = Self::parse(item)?;
        let question = format!("<p>{}</p>", escape_html(&parsed.question));
        let answers = parsed
            .answers
            .into_iter()
            .map(|(text, correct, feedback)| MultiChoiceAnswer {
                text: format!("<div>{}</div>", escape_html(&text)),
                correct,
                tips_and_feedback: TipsAndFeedback {
                    chosen_feedback: feedback.map(|f| escape_html(&f)).unwrap_or_default(),
                    ..TipsAndFeedback::default()
                },
            })
            .collect();
        ctx.chapter
            .quiz_page(parsed.title, question, answers, parsed.single_answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(payload: serde_json::Value) -> ContentItem {
        ContentItem::new("quiz", payload.as_object().unwrap().clone())
    }

    #[test]
    fn test_parse_infers_single_answer() {
        let parsed = QuizHandler::parse(&item(json!({
            "question": "Which planet is red?",
            "answers": [
                {"text": "Mars", "correct": true},
                {"text": "Venus", "correct": false}
            ]
        })))
        .unwrap();
        assert!(parsed.single_answer);

        let multi = QuizHandler::parse(&item(json!({
            "question": "Which are planets?",
            "answers": [
                {"text": "Mars", "correct": true},
                {"text": "Venus", "correct": true},
                {"text": "Sol", "correct": false}
            ]
        })))
        .unwrap();
        assert!(!multi.single_answer);
    }

    #[test]
    fn test_needs_two_answers_and_one_correct() {
        assert!(QuizHandler
            .validate(&item(json!({
                "question": "Q",
                "answers": [{"text": "only", "correct": true}]
            })))
            .is_err());
        assert!(QuizHandler
            .validate(&item(json!({
                "question": "Q",
                "answers": [
                    {"text": "a", "correct": false},
                    {"text": "b", "correct": false}
                ]
            })))
            .is_err());
    }
}
