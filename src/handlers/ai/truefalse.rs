//! AI-generated true/false statements. Emits one fragment per statement.

use serde_json::Value;

use crate::ai::AiError;
use crate::definition::ContentItem;
use crate::error::Result;
use crate::graph::Fragment;
use crate::graph::params::{TrueFalseBehaviour, TrueFalseL10n, TrueFalseParams};
use crate::handlers::{Handler, HandlerContext};
use crate::util::escape_html;

use super::{Difficulty, count_option, generate, required_prompt, warn_fallback};

pub struct AiTrueFalseHandler;

struct Options {
    title: Option<String>,
    prompt: String,
    statement_count: u32,
    difficulty: Difficulty,
}

impl AiTrueFalseHandler {
    fn parse(item: &ContentItem) -> Result<Options> {
        Ok(Options {
            title: item.get_str("title").map(String::from),
            prompt: required_prompt(item)?,
            statement_count: count_option(item, "statementCount", 5)?,
            difficulty: Difficulty::parse(item)?,
        })
    }

    fn user_prompt(options: &Options) -> String {
        format!(
            "Create true/false statements about: {topic}\n\
             \n\
             Requirements:\n\
             - Exactly {count} statements, roughly half true and half false.\n\
             - {guidance}\n\
             \n\
             Return ONLY a JSON object with no surrounding markup, matching:\n\
             {{\"statements\": [{{\"statement\": \"Mars is red.\", \"correct\": true}}]}}",
            topic = options.prompt,
            count = options.statement_count,
            guidance = options.difficulty.guidance(),
        )
    }

    fn convert(
        document: &Value,
        _options: &Options,
    ) -> std::result::Result<Vec<TrueFalseParams>, AiError> {
        let statements = document
            .get("statements")
            .and_then(Value::as_array)
            .ok_or_else(|| AiError::MalformedResponse("missing 'statements' array".to_string()))?;

        let mut converted = Vec::with_capacity(statements.len());
        for statement in statements {
            let text = statement.get("statement").and_then(Value::as_str);
            let correct = statement.get("correct").and_then(Value::as_bool);
            match (text, correct) {
                (Some(text), Some(correct)) if !text.is_empty() => {
                    converted.push(TrueFalseParams {
                        question: format!("<p>{}</p>", escape_html(text)),
                        correct: if correct { "true" } else { "false" }.to_string(),
                        behaviour: TrueFalseBehaviour::default(),
                        l10n: TrueFalseL10n::default(),
                    });
                }
                _ => log::warn!("discarding generated statement without text or verdict"),
            }
        }

        if converted.is_empty() {
            return Err(AiError::MalformedResponse(
                "no usable statements in response".to_string(),
            ));
        }
        Ok(converted)
    }

    fn fallback(options: &Options) -> Vec<TrueFalseParams> {
        vec![TrueFalseParams {
            question: format!(
                "<p>The statements about {} could not be generated.</p>",
                escape_html(&options.prompt)
            ),
            correct: "true".to_string(),
            behaviour: TrueFalseBehaviour::default(),
            l10n: TrueFalseL10n::default(),
        }]
    }
}

impl Handler for AiTrueFalseHandler {
    fn content_type(&self) -> &'static str {
        "ai-truefalse"
    }

    fn required_libraries(&self) -> &'static [&'static str] {
        &["H5P.TrueFalse"]
    }

    fn validate(&self, item: &ContentItem) -> Result<()> {
        Self::parse(item).map(drop)
    }

    fn process(&self, ctx: &mut HandlerContext<'_, '_, '_>, item: &ContentItem) -> Result<()> {
        let options = Self::parse(item)?;
        let statements = generate(ctx, item, &Self::user_prompt(&options))
            .and_then(|document| Self::convert(&document, &options))
            .unwrap_or_else(|error| {
                warn_fallback(self.content_type(), &options.prompt, &error);
                Self::fallback(&options)
            });
        for params in statements {
            ctx.chapter
                .fragment(Fragment::TrueFalse(params), options.title.clone())?;
        }
        Ok(())
    }
}
