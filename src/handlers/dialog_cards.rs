//! Dialog-cards handler: turnable front/back cards with optional media.

use serde_json::Value;

use crate::definition::ContentItem;
use crate::error::Result;
use crate::graph::Fragment;
use crate::graph::params::{
    DialogCard, DialogCardTips, DialogCardsBehaviour, DialogCardsL10n, DialogCardsParams,
    MediaFile,
};
use crate::util::escape_html;

use super::{Handler, HandlerContext, invalid};

pub struct DialogCardsHandler;

struct ParsedCard {
    front: String,
    back: String,
    image_path: Option<String>,
    audio_path: Option<String>,
}

impl DialogCardsHandler {
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
            let front = object
                .get("front")
                .and_then(Value::as_str)
                .filter(|front| !front.trim().is_empty())
                .ok_or_else(|| invalid(format!("card {number} missing 'front'")))?;
            let back = object
                .get("back")
                .and_then(Value::as_str)
                .filter(|back| !back.trim().is_empty())
                .ok_or_else(|| invalid(format!("card {number} missing 'back'")))?;
            parsed.push(ParsedCard {
                front: front.to_string(),
                back: back.to_string(),
                image_path: object
                    .get("imagePath")
                    .and_then(Value::as_str)
                    .map(String::from),
                audio_path: object
                    .get("audioPath")
                    .and_then(Value::as_str)
                    .map(String::from),
            });
        }
        Ok(parsed)
    }
}

impl Handler for DialogCardsHandler {
    fn content_type(&self) -> &'static str {
        "dialogcards"
    }

    fn required_libraries(&self) -> &'static [&'static str] {
        &["H5P.DialogCards"]
    }

    fn validate(&self, item: &ContentItem) -> Result<()> {
        Self::parse(item).map(drop)
    }

    fn process(&self, ctx: &mut HandlerContext<'_, '_, '_>, item: &ContentItem) -> Result<()> {
        let parsed = Self::parse(item)?;
        let mut dialogs = Vec::with_capacity(parsed.len());
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
            let audio = match card.audio_path {
                Some(reference) => {
                    let media = ctx.media.load(&reference)?;
                    let mime = media.mime.clone();
                    let path = ctx.chapter.register_audio(media);
                    Some(vec![MediaFile::new(path, mime)])
                }
                None => None,
            };
            dialogs.push(DialogCard {
                text: escape_html(&card.front),
                answer: escape_html(&card.back),
                image,
                audio,
                tips: DialogCardTips::default(),
            });
        }

        let title = item.get_str("title").map(String::from);
        let description = item.get_str("description").unwrap_or_default().to_string();
        ctx.chapter.fragment(
            Fragment::DialogCards(DialogCardsParams {
                title: title.clone().unwrap_or_default(),
                mode: "normal".to_string(),
                description: escape_html(&description),
                dialogs,
                behaviour: DialogCardsBehaviour::default(),
                l10n: DialogCardsL10n::default(),
            }),
            title,
        )
    }
}
