//! Flashcards handler: question cards with typed answers, optional images.

use serde_json::Value;

use crate::definition::ContentItem;
use crate::error::Result;
use crate::graph::Fragment;
use crate::graph::params::{Flashcard, FlashcardsL10n, FlashcardsParams, MediaFile};
use crate::util::escape_html;

use super::{Handler, HandlerContext, invalid};

pub struct FlashcardsHandler;

struct ParsedCard {
    question: String,
    answer: String,
    image_path: Option<String>,
    tip: Option<String>,
}

impl FlashcardsHandler {
    fn parse(item: &ContentItem) -> Result<Vec<ParsedCard>> {
        let cards = item
            .get("cards")
            .and_then(Value::as_array)
            .ok_or_else(|| invalid("missing 'cards' list"))?;
        if cards.is_empty() {
            return Err(invalid("'cards' must not be empty"));
        }

        let mut parsed = Vec::with_capacity(cards.len());
        for (index, card) in cards.iter().enumerate() {
            let number = index + 1;
            let object = card
                .as_object()
                .ok_or_else(|| invalid(format!("card {number} must be an object")))?;
            let question = object
                .get("question")
                .and_then(Value::as_str)
                .filter(|question| !question.trim().is_empty())
                .ok_or_else(|| invalid(format!("card {number} missing 'question'")))?;
            let answer = object
                .get("answer")
                .and_then(Value::as_str)
                .filter(|answer| !answer.is_empty())
                .ok_or_else(|| invalid(format!("card {number} missing 'answer'")))?;
            parsed.push(ParsedCard {
                question: question.to_string(),
                answer: answer.to_string(),
                image_path: object
                    .get("imagePath")
                    .and_then(Value::as_str)
                    .map(String::from),
                tip: object.get("tip").and_then(Value::as_str).map(String::from),
            });
        }
        Ok(parsed)
    }
}

impl Handler for FlashcardsHandler {
    fn content_type(&self) -> &'static str {
        "flashcards"
    }

    fn required_libraries(&self) -> &'static [&'static str] {
        &["H5P.Flashcards"]
    }

    fn validate(&self, item: &ContentItem) -> Result<()> {
        Self::parse(item).map(drop)
    }

    fn process(&self, ctx: &mut HandlerContext<'_, '_, '_>, item: &ContentItem) -> Result<()> {
        let parsed = Self::parse(item)?;
        let mut cards = Vec::with_capacity(parsed.len());
        for card in parsed {
            let image = match card.image_path {
                Some(reference) => {
                    let media = ctx.media.load(&reference)?;
                    let mime = media.mime.clone();
                    let path = ctx.chapter.register_image(media);
                    Some(MediaFile::new(path, mime))
                }
                None => None,
            };
            cards.push(Flashcard {
                text: escape_html(&card.question),
                answer: card.answer,
                image,
                tip: card.tip.map(|tip| escape_html(&tip)),
            });
        }

        let description = item
            .get_str("description")
            .unwrap_or("Answer the cards")
            .to_string();
        ctx.chapter.fragment(
            Fragment::Flashcards(FlashcardsParams {
                description: escape_html(&description),
                cards,
                case_sensitive: false,
                random_cards: false,
                show_solutions_requires_input: true,
                l10n: FlashcardsL10n::default(),
            }),
            item.get_str("title").map(String::from),
        )
    }
}
