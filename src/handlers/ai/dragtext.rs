//! AI-generated drag-the-words.
//!
//! Generates sentences with `{blank}` placeholders, then rewrites them to
//! native marker syntax through the same path as the manual handler.

use serde_json::Value;

use crate::ai::AiError;
use crate::definition::ContentItem;
use crate::error::Result;
use crate::graph::Fragment;
use crate::graph::params::{
    DragTextBehaviour, DragTextL10n, DragTextParams, default_overall_feedback,
};
use crate::handlers::markers::{self, Blank};
use crate::handlers::{Handler, HandlerContext};
use crate::util::escape_html;

use super::{Difficulty, count_option, flag_option, generate, required_prompt, warn_fallback};

pub struct AiDragTextHandler;

#[derive(Debug)]
struct Options {
    title: Option<String>,
    prompt: String,
    sentence_count: u32,
    blanks_per_sentence: u32,
    include_distractors: bool,
    distractor_count: u32,
    difficulty: Difficulty,
}

impl AiDragTextHandler {
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
            include_distractors: flag_option(item, "includeDistractors", true)?,
            distractor_count: count_option(item, "distractorCount", 3)?,
            difficulty,
        })
    }

    fn user_prompt(options: &Options) -> String {
        format!(
            "Create a drag-the-words exercise about: {topic}\n\
             \n\
             Requirements:\n\
             - Exactly {sentences} sentences.\n\
             - Each sentence contains exactly {blanks} {{blank}} placeholder(s) \
               marking the word a learner drags into place.\n\
             - For each sentence, list the answer word for each placeholder, in order.\n\
             {distractors}\
             - {guidance}\n\
             \n\
             Return ONLY a JSON object with no surrounding markup, matching:\n\
             {{\"sentences\": [{{\"text\": \"The sky is {{blank}}.\", \"blanks\": [\"blue\"]}}], \
             \"distractors\": [\"red\"]}}",
            topic = options.prompt,
            sentences = options.sentence_count,
            blanks = options.blanks_per_sentence,
            distractors = if options.include_distractors {
                format!(
                    "- Also provide {} plausible distractor words that fit no blank.\n",
                    options.distractor_count
                )
            } else {
                String::new()
            },
            guidance = options.difficulty.guidance(),
        )
    }

    /// Convert a sanitized response document, discarding invalid entries.
    fn convert(document: &Value, options: &Options) -> std::result::Result<DragTextParams, AiError> {
        let sentences = document
            .get("sentences")
            .and_then(Value::as_array)
            .ok_or_else(|| AiError::MalformedResponse("missing 'sentences' array".to_string()))?;

        let mut lines = Vec::with_capacity(sentences.len());
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
            lines.push(markers::rewrite_sentence(text, &blanks));
        }

        if lines.is_empty() {
            return Err(AiError::MalformedResponse(
                "no usable sentences in response".to_string(),
            ));
        }

        let distractors = if options.include_distractors {
            document
                .get("distractors")
                .and_then(Value::as_array)
                .map(|distractors| {
                    distractors
                        .iter()
                        .filter_map(Value::as_str)
                        .filter(|distractor| {
                            !distractor.is_empty() && !distractor.contains('*')
                        })
                        .take(options.distractor_count as usize)
                        .map(|distractor| format!("*{distractor}*"))
                        .collect::<Vec<String>>()
                        .join("\n")
                })
                .unwrap_or_default()
        } else {
            String::new()
        };

        Ok(Self::params(
            format!("Drag the words about {}", options.prompt),
            lines.join("\n"),
            distractors,
        ))
    }

    /// Minimal well-formed fragment naming the failed prompt.
    fn fallback(options: &Options) -> DragTextParams {
        Self::params(
            format!("Exercise about {}", options.prompt),
            format!(
                "The exercise about {} could not be generated; this is a *placeholder*.",
                options.prompt
            ),
            String::new(),
        )
    }

    fn params(task: String, text_field: String, distractors: String) -> DragTextParams {
        DragTextParams {
            task_description: format!("<p>{}</p>", escape_html(&task)),
            text_field,
            distractors,
            behaviour: DragTextBehaviour::default(),
            overall_feedback: default_overall_feedback(),
            l10n: DragTextL10n::default(),
        }
    }
}

impl Handler for AiDragTextHandler {
    fn content_type(&self) -> &'static str {
        "ai-dragtext"
    }

    fn required_libraries(&self) -> &'static [&'static str] {
        &["H5P.DragText"]
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
        ctx.chapter
            .fragment(Fragment::DragText(params), options.title)
    }
}
