//! Accordion handler: titled panels wrapping embedded text instances.

use serde_json::Value;

use crate::definition::ContentItem;
use crate::error::Result;
use crate::graph::Fragment;
use crate::graph::params::{AccordionPanel, AccordionParams, EmbeddedText, TextParams};
use crate::util::escape_html;

use super::{Handler, HandlerContext, invalid};

pub struct AccordionHandler;

impl AccordionHandler {
    fn parse(item: &ContentItem) -> Result<Vec<(String, String)>> {
        let panels = item
            .get("panels")
            .and_then(Value::as_array)
            .ok_or_else(|| invalid("missing 'panels' list"))?;
        if panels.is_empty() {
            return Err(invalid("'panels' must not be empty"));
        }

        let mut parsed = Vec::with_capacity(panels.len());
        for (index, panel) in panels.iter().enumerate() {
            let number = index + 1;
            let object = panel
                .as_object()
                .ok_or_else(|| invalid(format!("panel {number} must be an object")))?;
            let title = object
                .get("title")
                .and_then(Value::as_str)
                .filter(|title| !title.is_empty())
                .ok_or_else(|| invalid(format!("panel {number} missing 'title'")))?;
            let text = object
                .get("text")
                .and_then(Value::as_str)
                .filter(|text| !text.trim().is_empty())
                .ok_or_else(|| invalid(format!("panel {number} missing 'text'")))?;
            parsed.push((title.to_string(), text.to_string()));
        }
        Ok(parsed)
    }
}

impl Handler for AccordionHandler {
    fn content_type(&self) -> &'static str {
        "accordion"
    }

    fn required_libraries(&self) -> &'static [&'static str] {
        &["H5P.Accordion", "H5P.AdvancedText"]
    }

    fn validate(&self, item: &ContentItem) -> Result<()> {
        Self::parse(item).map(drop)
    }

    fn process(&self, ctx: &mut HandlerContext<'_, '_, '_>, item: &ContentItem) -> Result<()> {
        let parsed = Self::parse(item)?;
        let text_library = ctx.chapter.library_tag("H5P.AdvancedText")?.to_string();

        let panels = parsed
            .into_iter()
            .map(|(title, text)| AccordionPanel {
                title: escape_html(&title),
                content: EmbeddedText {
                    params: TextParams {
                        text: format!("<p>{}</p>", escape_html(&text)),
                    },
                    library: text_library.clone(),
                    sub_content_id: ctx.chapter.next_sub_content_id(),
                },
            })
            .collect();

        ctx.chapter.fragment(
            Fragment::Accordion(AccordionParams {
                panels,
                h_tag: "h2".to_string(),
            }),
            item.get_str("title").map(String::from),
        )
    }
}
