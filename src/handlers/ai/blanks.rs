//! AI-generated fill-in-the-blanks.

use serde_json::Value;

use crate::ai::AiError;
use crate::definition::ContentItem;
use crate::error::Result;
use crate::graph::Fragment;
use crate::graph::params::{BlanksBehaviour, BlanksL10n, BlanksParams, default_overall_feedback};
use crate::handlers::markers::{self, Blank};
use crate::handlers::{Handler, HandlerContext};
use crate::util::escape_html;

use super::{Difficulty, count_option, generate, required_prompt, warn_fallback};

pub struct AiBlanksHandler;

struct Options {
    title: Option<String>,
    prompt: String,
    sentence_count: u32,
    blanks_per_sentence: u32,
    difficulty: Difficulty,
}

impl AiBlanksHandler {
    fn parse(item: &ContentItem) -> Result<Options> {
        let difficulty = Difficulty::parse(item)?;
        Ok(Options {
            title: item.get_str("title").map(String::from),
            prompt: required_prompt(item)?,
            sentence_count: count_option(item, "sentenceCount", 5)?,
            blanks_per_sentence: count_option(
                item,
                "blanksPerSentence",
                difficulty.default_blanks(),
            )?,
            difficulty,
        })
    }

    fn user_prompt(options: &Options) -> String {
        format!(
            "Create a fill-in-the-blanks exercise about: {topic}\n\
             \n\
             Requirements:\n\
             - Exactly {sentences} sentences.\n\
             - Each sentence contains exactly {blanks} {{blank}} placeholder(s) \
               for the word a learner types.\n\
             - For each sentence, list the answer for each placeholder, in order.\n\
             - {guidance}\n\
             \n\
             Return ONLY a JSON object with no surrounding markup, matching:\n\
             {{\"sentences\": [{{\"text\": \"Water boils at {{blank}} degrees.\", \
             \"blanks\": [\"100\"]}}]}}",
            topic = options.prompt,
            sentences = options.sentence_count,
            blanks = options.blanks_per_sentence,
            guidance = options.difficulty.guidance(),
        )
    }

    fn convert(document: &Value, options: &Options) -> std::result::Result<BlanksParams, AiError> {
        let sentences = document
            .get("sentences")
            .and_then(Value::as_array)
            .ok_or_else(|| AiError::MalformedResponse("missing 'sentences' array".to_string()))?;

        let mut questions = Vec::with_capacity(sentences.len());
        for sentence in sentences {
            let Some(text) = sentence.get("text").and_then(Value::as_str) else {
                log::warn!("discarding generated sentence without text");
                continue;
            };
            let answers: Vec<String> = sentence
                .get("blanks")
                .and_then(Value::as_array)
                .map(|blanks| {
                    blanks
                        .iter()
                        .filter_map(Value::as_str)
                        .filter(|answer| !answer.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default();

            if answers.is_empty() || markers::count_placeholders(text) != answers.len() {
                log::warn!("discarding generated sentence with mismatched blanks: {text}");
                continue;
            }
            let blanks: Vec<Blank> = answers
                .into_iter()
                .map(|answer| Blank {
                    answers: vec![answer],
                    tip: None,
                })
                .collect();
            questions.push(format!("<p>{}</p>", markers::rewrite_sentence(text, &blanks)));
        }

        if questions.is_empty() {
            return Err(AiError::MalformedResponse(
                "no usable sentences in response".to_string(),
            ));
        }
        Ok(Self::params(
            format!("Fill in the blanks about {}", options.prompt),
            questions,
        ))
    }

    fn fallback(options: &Options) -> BlanksParams {
        Self::params(
            format!("Exercise about {}", options.prompt),
            vec![format!(
                "<p>The exercise about {} could not be generated; type *placeholder* here.</p>",
                options.prompt
            )],
        )
    }

    fn params(task: String, questions: Vec<String>) -> BlanksParams {
        BlanksParams {
            text: format!("<p>{}</p>", escape_html(&task)),
            questions,
            behaviour: BlanksBehaviour::default(),
            overall_feedback: default_overall_feedback(),
            l10n: BlanksL10n::default(),
        }
    }
}

impl Handler for AiBlanksHandler {
    fn content_type(&self) -> &'static str {
        "ai-blanks"
    }

    fn required_libraries(&self) -> &'static [&'static str] {
        &["H5P.Blanks"]
    }

    fn validate(&self, item: &ContentItem) -> Result<()> {
        Self::parse(item).map(drop)
    }

    fn process(&self, ctx: &mut HandlerContext<'_, '_, '_>, item: &ContentItem) -> Result<()> {
        let options = Self::parse(item)?;
        let params = generate(ctx, item, &Self::user_prompt(&options))
            .and_then(|document| Self::convert(&document, &options))
            .unwrap_or_else(|error| {
                warn_fallback(self.content_type(), &options.prompt, &error);
                Self::fallback(&options)
            });
        ctx.chapter.fragment(Fragment::Blanks(params), options.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options() -> Options {
        Options {
            title: None,
            prompt: "chemistry".to_string(),
            sentence_count: 2,
            blanks_per_sentence: 1,
            difficulty: Difficulty::Medium,
        }
    }

    #[test]
    fn test_convert() {
        let document = json!({"sentences": [
            {"text": "Water is {blank}.", "blanks": ["H2O"]}
        ]});
        let params = AiBlanksHandler::convert(&document, &options()).unwrap();
        assert_eq!(params.questions, vec!["<p>Water is *H2O*.</p>"]);
    }

    #[test]
    fn test_convert_empty_response() {
        assert!(AiBlanksHandler::convert(&json!({"sentences": []}), &options()).is_err());
    }

    #[test]
    fn test_fallback_has_marker() {
        let params = AiBlanksHandler::fallback(&options());
        assert_eq!(markers::count_markers(&params.questions[0]), 1);
        assert!(params.questions[0].contains("chemistry"));
    }
}
