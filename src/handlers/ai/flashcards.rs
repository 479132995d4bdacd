//! AI-generated flashcards.

use serde_json::Value;

use crate::ai::AiError;
use crate::definition::ContentItem;
use crate::error::Result;
use crate::graph::Fragment;
use crate::graph::params::{Flashcard, FlashcardsL10n, FlashcardsParams};
use crate::handlers::{Handler, HandlerContext};
use crate::util::escape_html;

use super::{Difficulty, count_option, generate, required_prompt, warn_fallback};

pub struct AiFlashcardsHandler;

struct Options {
    title: Option<String>,
    prompt: String,
    card_count: u32,
    difficulty: Difficulty,
}

impl AiFlashcardsHandler {
    fn parse(item: &ContentItem) -> Result<Options> {
        Ok(Options {
            title: item.get_str("title").map(String::from),
            prompt: required_prompt(item)?,
            card_count: count_option(item, "cardCount", 5)?,
            difficulty: Difficulty::parse(item)?,
        })
    }

    fn user_prompt(options: &Options) -> String {
        format!(
            "Create flashcards about: {topic}\n\
             \n\
             Requirements:\n\
             - Exactly {count} cards.\n\
             - Each card has a short question and a one-or-two word answer the \
               learner types.\n\
             - Optionally add a short tip per card.\n\
             - {guidance}\n\
             \n\
             Return ONLY a JSON object with no surrounding markup, matching:\n\
             {{\"cards\": [{{\"question\": \"Capital of Norway?\", \"answer\": \"Oslo\", \
             \"tip\": \"Fjord city\"}}]}}",
            topic = options.prompt,
            count = options.card_count,
            guidance = options.difficulty.guidance(),
        )
    }

    fn convert(document: &Value, options: &Options) -> std::result::Result<FlashcardsParams, AiError> {
        let cards = document
            .get("cards")
            .and_then(Value::as_array)
            .ok_or_else(|| AiError::MalformedResponse("missing 'cards' array".to_string()))?;

        let mut converted = Vec::with_capacity(cards.len());
        for card in cards {
            let question = card.get("question").and_then(Value::as_str);
            let answer = card.get("answer").and_then(Value::as_str);
            let (Some(question), Some(answer)) = (question, answer) else {
                log::warn!("discarding generated card without question or answer");
                continue;
            };
            if question.is_empty() || answer.is_empty() {
                log::warn!("discarding empty generated card");
                continue;
            }
            converted.push(Flashcard {
                text: escape_html(question),
                answer: answer.to_string(),
                image: None,
                tip: card
                    .get("tip")
                    .and_then(Value::as_str)
                    .filter(|tip| !tip.is_empty())
                    .map(escape_html),
            });
        }

        if converted.is_empty() {
            return Err(AiError::MalformedResponse(
                "no usable cards in response".to_string(),
            ));
        }
        Ok(Self::params(
            format!("Flashcards about {}", options.prompt),
            converted,
        ))
    }

    fn fallback(options: &Options) -> FlashcardsParams {
        Self::params(
            format!("The flashcards about {} could not be generated", options.prompt),
            vec![Flashcard {
                text: "What should you do to get real cards?".to_string(),
                answer: "rebuild".to_string(),
                image: None,
                tip: None,
            }],
        )
    }

    fn params(description: String, cards: Vec<Flashcard>) -> FlashcardsParams {
        FlashcardsParams {
            description: escape_html(&description),
            cards,
            case_sensitive: false,
            random_cards: false,
            show_solutions_requires_input: true,
            l10n: FlashcardsL10n::default(),
        }
    }
}

impl Handler for AiFlashcardsHandler {
    fn content_type(&self) -> &'static str {
        "ai-flashcards"
    }

    fn required_libraries(&self) -> &'static [&'static str] {
        &["H5P.Flashcards"]
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
            .fragment(Fragment::Flashcards(params), options.title)
    }
}
