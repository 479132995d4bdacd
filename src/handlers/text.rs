//! Plain text handler: emits an escaped text fragment.

use crate::definition::ContentItem;
use crate::error::Result;

use super::{Handler, HandlerContext, invalid};

pub struct TextHandler;

impl Handler for TextHandler {
    fn content_type(&self) -> &'static str {
        "text"
    }

    fn required_libraries(&self) -> &'static [&'static str] {
        &["H5P.AdvancedText"]
    }

    fn validate(&self, item: &ContentItem) -> Result<()> {
        match item.get_str("text") {
            Some(text) if !text.trim().is_empty() => Ok(()),
            Some(_) => Err(invalid("'text' must not be empty")),
            None => Err(invalid("missing 'text' field")),
        }
    }

    fn process(&self, ctx: &mut HandlerContext<'_, '_, '_>, item: &ContentItem) -> Result<()> {
        let text = item.get_str("text").unwrap_or_default();
        let title = item.get_str("title").map(String::from);
        ctx.chapter.text_page(title, text)
    }
}
