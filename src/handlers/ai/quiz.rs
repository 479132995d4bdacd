//! AI-generated multiple-choice quiz. Emits one fragment per generated
//! question.

use serde_json::Value;

use crate::ai::AiError;
use crate::definition::ContentItem;
use crate::error::Result;
use crate::graph::Fragment;
use crate::graph::params::{
    MultiChoiceAnswer, MultiChoiceBehaviour, MultiChoiceParams, QuestionUi, TipsAndFeedback,
    default_overall_feedback,
};
use crate::handlers::{Handler, HandlerContext};
use crate::util::escape_html;

use super::{Difficulty, count_option, generate, required_prompt, warn_fallback};

pub struct AiQuizHandler;

struct Options {
    title: Option<String>,
    prompt: String,
    question_count: u32,
    answers_per_question: u32,
    difficulty: Difficulty,
}

impl AiQuizHandler {
    fn parse(item: &ContentItem) -> Result<Options> {
        Ok(Options {
            title: item.get_str("title").map(String::from),
            prompt: required_prompt(item)?,
            question_count: count_option(item, "questionCount", 5)?,
            answers_per_question: count_option(item, "answersPerQuestion", 4)?,
            difficulty: Difficulty::parse(item)?,
        })
    }

    fn user_prompt(options: &Options) -> String {
        format!(
            "Create a multiple-choice quiz about: {topic}\n\
             \n\
             Requirements:\n\
             - Exactly {questions} questions.\n\
             - Each question has exactly {answers} answer options, exactly one correct.\n\
             - {guidance}\n\
             \n\
             Return ONLY a JSON object with no surrounding markup, matching:\n\
             {{\"questions\": [{{\"question\": \"Which planet is red?\", \
             \"answers\": [{{\"text\": \"Mars\", \"correct\": true}}, \
             {{\"text\": \"Venus\", \"correct\": false}}]}}]}}",
            topic = options.prompt,
            questions = options.question_count,
            answers = options.answers_per_question,
            guidance = options.difficulty.guidance(),
        )
    }

    fn convert(
        document: &Value,
        _options: &Options,
    ) -> std::result::Result<Vec<MultiChoiceParams>, AiError> {
        let questions = document
            .get("questions")
            .and_then(Value::as_array)
            .ok_or_else(|| AiError::MalformedResponse("missing 'questions' array".to_string()))?;

        let mut converted = Vec::with_capacity(questions.len());
        for question in questions {
            let Some(text) = question.get("question").and_then(Value::as_str) else {
                log::warn!("discarding generated question without text");
                continue;
            };
            let answers: Vec<MultiChoiceAnswer> = question
                .get("answers")
                .and_then(Value::as_array)
                .map(|answers| {
                    answers
                        .iter()
                        .filter_map(|answer| {
                            let text = answer.get("text").and_then(Value::as_str)?;
                            if text.is_empty() {
                                return None;
                            }
                            Some(MultiChoiceAnswer {
                                text: format!("<div>{}</div>", escape_html(text)),
                                correct: answer
                                    .get("correct")
                                    .and_then(Value::as_bool)
                                    .unwrap_or(false),
                                tips_and_feedback: TipsAndFeedback::default(),
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();

            let correct_count = answers.iter().filter(|answer| answer.correct).count();
            if answers.len() < 2 || correct_count == 0 {
                log::warn!("discarding generated question without a valid answer set: {text}");
                continue;
            }
            converted.push(MultiChoiceParams {
                question: format!("<p>{}</p>", escape_html(text)),
                answers,
                behaviour: MultiChoiceBehaviour {
                    single_answer: correct_count == 1,
                    ..MultiChoiceBehaviour::default()
                },
                ui: QuestionUi::default(),
                overall_feedback: default_overall_feedback(),
            });
        }

        if converted.is_empty() {
            return Err(AiError::MalformedResponse(
                "no usable questions in response".to_string(),
            ));
        }
        Ok(converted)
    }

    fn fallback(options: &Options) -> Vec<MultiChoiceParams> {
        vec![MultiChoiceParams {
            question: format!(
                "<p>The quiz about {} could not be generated. Try rebuilding.</p>",
                escape_html(&options.prompt)
            ),
            answers: vec![
                MultiChoiceAnswer {
                    text: "<div>Understood</div>".to_string(),
                    correct: true,
                    tips_and_feedback: TipsAndFeedback::default(),
                },
                MultiChoiceAnswer {
                    text: "<div>Skip</div>".to_string(),
                    correct: false,
                    tips_and_feedback: TipsAndFeedback::default(),
                },
            ],
            behaviour: MultiChoiceBehaviour {
                single_answer: true,
                ..MultiChoiceBehaviour::default()
            },
            ui: QuestionUi::default(),
            overall_feedback: default_overall_feedback(),
        }]
    }
}

impl Handler for AiQuizHandler {
    fn content_type(&self) -> &'static str {
        "ai-quiz"
    }

    fn required_libraries(&self) -> &'static [&'static str] {
        &["H5P.MultiChoice"]
    }

    fn validate(&self, item: &ContentItem) -> Result<()> {
        Self::parse(item).map(drop)
    }

    fn process(&self, ctx: &mut HandlerContext<'_, '_, '_>, item: &ContentItem) -> Result<()> {
        let options = Self::parse(item)?;
        let questions = generate(ctx, item, &Self::user_prompt(&options))
            .and_then(|document| Self::convert(&document, &options))
            .unwrap_or_else(|error| {
                warn_fallback(self.content_type(), &options.prompt, &error);
                Self::fallback(&options)
            });
        for params in questions {
            ctx.chapter
                .fragment(Fragment::MultiChoice(params), options.title.clone())?;
        }
        Ok(())
    }
}
