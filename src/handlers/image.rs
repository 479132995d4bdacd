//! Image handler: loads the referenced media and emits an image fragment.

use crate::definition::ContentItem;
use crate::error::Result;

use super::{Handler, HandlerContext, invalid};

pub struct ImageHandler;

impl Handler for ImageHandler {
    fn content_type(&self) -> &'static str {
        "image"
    }

    fn required_libraries(&self) -> &'static [&'static str] {
        &["H5P.Image"]
    }

    fn validate(&self, item: &ContentItem) -> Result<()> {
        match item.get_str("path") {
            Some(path) if !path.is_empty() => {}
            Some(_) => return Err(invalid("'path' must not be empty")),
            None => return Err(invalid("missing 'path' field")),
        }
        match item.get_str("alt") {
            Some(_) => Ok(()),
            None => Err(invalid("missing 'alt' field")),
        }
    }

    fn process(&self, ctx: &mut HandlerContext<'_, '_, '_>, item: &ContentItem) -> Result<()> {
        let path = item.get_str("path").unwrap_or_default();
        let alt = item.get_str("alt").unwrap_or_default();
        let title = item.get_str("title").map(String::from);
        let hover = item.get_str("hover").map(String::from);

        let media = ctx.media.load(path)?;
        ctx.chapter.image_page(title, media, alt, hover)
    }
}
