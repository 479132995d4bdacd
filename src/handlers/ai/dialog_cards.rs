//! AI-generated dialog cards.

use serde_json::Value;

use crate::ai::AiError;
use crate::definition::ContentItem;
use crate::error::Result;
use crate::graph::Fragment;
use crate::graph::params::{
    DialogCard, DialogCardTips, DialogCardsBehaviour, DialogCardsL10n, DialogCardsParams,
};
use crate::handlers::{Handler, HandlerContext};
use crate::util::escape_html;

use super::{Difficulty, count_option, generate, required_prompt, warn_fallback};

pub struct AiDialogCardsHandler;

struct Options {
    title: Option<String>,
    prompt: String,
    card_count: u32,
    difficulty: Difficulty,
}

impl AiDialogCardsHandler {
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
            "Create two-sided study cards about: {topic}\n\
             \n\
             Requirements:\n\
             - Exactly {count} cards.\n\
             - Each card has a 'front' (term or question) and a 'back' \
               (definition or answer).\n\
             - {guidance}\n\
             \n\
             Return ONLY a JSON object with no surrounding markup, matching:\n\
             {{\"cards\": [{{\"front\": \"photosynthesis\", \
             \"back\": \"How plants turn light into sugar\"}}]}}",
            topic = options.prompt,
            count = options.card_count,
            guidance = options.difficulty.guidance(),
        )
    }

    fn convert(
        document: &Value,
        options: &Options,
    ) -> std::result::Result<DialogCardsParams, AiError> {
        let cards = document
            .get("cards")
            .and_then(Value::as_array)
            .ok_or_else(|| AiError::MalformedResponse("missing 'cards' array".to_string()))?;

        let mut converted = Vec::with_capacity(cards.len());
        for card in cards {
            let front = card.get("front").and_then(Value::as_str);
            let back = card.get("back").and_then(Value::as_str);
            let (Some(front), Some(back)) = (front, back) else {
                log::warn!("discarding generated card without front or back");
                continue;
            };
            if front.is_empty() || back.is_empty() {
                log::warn!("discarding empty generated card");
                continue;
            }
            converted.push(DialogCard {
                text: escape_html(front),
                answer: escape_html(back),
                image: None,
                audio: None,
                tips: DialogCardTips::default(),
            });
        }

        if converted.is_empty() {
            return Err(AiError::MalformedResponse(
                "no usable cards in response".to_string(),
            ));
        }
        Ok(Self::params(options, converted))
    }

    fn fallback(options: &Options) -> DialogCardsParams {
        Self::params(
            options,
            vec![DialogCard {
                text: format!("Cards about {}", escape_html(&options.prompt)),
                answer: "This content could not be generated; rebuild to retry.".to_string(),
                image: None,
                audio: None,
                tips: DialogCardTips::default(),
            }],
        )
    }

    fn params(options: &Options, dialogs: Vec<DialogCard>) -> DialogCardsParams {
        DialogCardsParams {
            title: options.title.clone().unwrap_or_default(),
            mode: "normal".to_string(),
            description: format!("Study cards about {}", escape_html(&options.prompt)),
            dialogs,
            behaviour: DialogCardsBehaviour::default(),
            l10n: DialogCardsL10n::default(),
        }
    }
}

impl Handler for AiDialogCardsHandler {
    fn content_type(&self) -> &'static str {
        "ai-dialogcards"
    }

    fn required_libraries(&self) -> &'static [&'static str] {
        &["H5P.DialogCards"]
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
            .fragment(Fragment::DialogCards(params), options.title)
    }
}
