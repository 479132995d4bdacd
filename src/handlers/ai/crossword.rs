//! AI-generated crossword. Multi-word answers are discarded; fewer than
//! two surviving words triggers the fallback.

use serde_json::Value;

use crate::ai::AiError;
use crate::definition::ContentItem;
use crate::error::Result;
use crate::graph::Fragment;
use crate::graph::params::{CrosswordBehaviour, CrosswordL10n, CrosswordParams, CrosswordWord};
use crate::handlers::crossword::MIN_WORDS;
use crate::handlers::{Handler, HandlerContext};
use crate::util::escape_html;

use super::{Difficulty, count_option, generate, required_prompt, warn_fallback};

pub struct AiCrosswordHandler;

struct Options {
    title: Option<String>,
    prompt: String,
    word_count: u32,
    difficulty: Difficulty,
}

impl AiCrosswordHandler {
    fn parse(item: &ContentItem) -> Result<Options> {
        Ok(Options {
            title: item.get_str("title").map(String::from),
            prompt: required_prompt(item)?,
            word_count: count_option(item, "wordCount", 5)?,
            difficulty: Difficulty::parse(item)?,
        })
    }

    fn user_prompt(options: &Options) -> String {
        format!(
            "Create crossword clues about: {topic}\n\
             \n\
             Requirements:\n\
             - Exactly {count} entries.\n\
             - Every answer is a SINGLE word with no spaces or hyphens.\n\
             - Clues are short and unambiguous.\n\
             - {guidance}\n\
             \n\
             Return ONLY a JSON object with no surrounding markup, matching:\n\
             {{\"words\": [{{\"clue\": \"Red planet\", \"answer\": \"Mars\"}}]}}",
            topic = options.prompt,
            count = options.word_count,
            guidance = options.difficulty.guidance(),
        )
    }

    fn convert(document: &Value, options: &Options) -> std::result::Result<CrosswordParams, AiError> {
        let words = document
            .get("words")
            .and_then(Value::as_array)
            .ok_or_else(|| AiError::MalformedResponse("missing 'words' array".to_string()))?;

        let mut converted = Vec::with_capacity(words.len());
        for word in words {
            let clue = word.get("clue").and_then(Value::as_str);
            let answer = word.get("answer").and_then(Value::as_str);
            let (Some(clue), Some(answer)) = (clue, answer) else {
                log::warn!("discarding generated crossword entry without clue or answer");
                continue;
            };
            if clue.is_empty() || answer.is_empty() {
                log::warn!("discarding empty crossword entry");
                continue;
            }
            if answer.contains(char::is_whitespace) {
                log::warn!("discarding multi-word crossword answer '{answer}'");
                continue;
            }
            converted.push(CrosswordWord {
                clue: escape_html(clue),
                answer: answer.to_uppercase(),
                fix_word: false,
            });
        }

        if converted.len() < MIN_WORDS {
            return Err(AiError::MalformedResponse(format!(
                "only {} usable words in response, need {MIN_WORDS}",
                converted.len()
            )));
        }
        Ok(Self::params(
            format!("Solve the crossword about {}", options.prompt),
            converted,
        ))
    }

    fn fallback(options: &Options) -> CrosswordParams {
        Self::params(
            format!("The crossword about {} could not be generated", options.prompt),
            vec![
                CrosswordWord {
                    clue: "Do this to the build to get a real crossword".to_string(),
                    answer: "RETRY".to_string(),
                    fix_word: false,
                },
                CrosswordWord {
                    clue: "What this placeholder content is".to_string(),
                    answer: "FALLBACK".to_string(),
                    fix_word: false,
                },
            ],
        )
    }

    fn params(task: String, words: Vec<CrosswordWord>) -> CrosswordParams {
        CrosswordParams {
            task_description: format!("<p>{}</p>", escape_html(&task)),
            words,
            behaviour: CrosswordBehaviour::default(),
            l10n: CrosswordL10n::default(),
        }
    }
}

impl Handler for AiCrosswordHandler {
    fn content_type(&self) -> &'static str {
        "ai-crossword"
    }

    fn required_libraries(&self) -> &'static [&'static str] {
        &["H5P.Crossword"]
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
            .fragment(Fragment::Crossword(params), options.title)
    }
}
