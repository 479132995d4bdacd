//! Audio handler: loads the referenced media and emits an audio fragment.

use serde_json::Value;

use crate::definition::ContentItem;
use crate::error::Result;

use super::{Handler, HandlerContext, invalid};

pub struct AudioHandler;

impl Handler for AudioHandler {
    fn content_type(&self) -> &'static str {
        "audio"
    }

    fn required_libraries(&self) -> &'static [&'static str] {
        &["H5P.Audio"]
    }

    fn validate(&self, item: &ContentItem) -> Result<()> {
        match item.get_str("path") {
            Some(path) if !path.is_empty() => {}
            Some(_) => return Err(invalid("'path' must not be empty")),
            None => return Err(invalid("missing 'path' field")),
        }
        match item.get("fitToWrapper") {
            None | Some(Value::Bool(_)) => Ok(()),
            Some(_) => Err(invalid("'fitToWrapper' must be a boolean")),
        }
    }

    fn process(&self, ctx: &mut HandlerContext<'_, '_, '_>, item: &ContentItem) -> Result<()> {
        let path = item.get_str("path").unwrap_or_default();
        let title = item.get_str("title").map(String::from);
        let fit_to_wrapper = item
            .get("fitToWrapper")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let media = ctx.media.load(path)?;
        ctx.chapter.audio_page(title, media, fit_to_wrapper)
    }
}
