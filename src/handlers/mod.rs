//! Content-type handlers and their dispatch registry.
//!
//! A handler is a value implementing the four-method [`Handler`] contract:
//! it names its type tag, declares the runtime libraries it emits
//! fragments for, validates one input shape, and appends fragments to the
//! current chapter through the builder. Handlers are stored in a
//! name-keyed map; one handler may register under several aliases.
//!
//! Manual handlers emit deterministic fragments and propagate processing
//! errors. AI-assisted handlers (the `ai-*` tags) call the generation
//! protocol and recover from any generation failure by emitting a
//! fallback fragment, so the overall build still succeeds.

mod accordion;
mod ai;
mod audio;
mod blanks;
mod crossword;
mod dialog_cards;
mod dragtext;
mod essay;
mod flashcards;
mod image;
pub mod markers;
mod quiz;
mod single_choice_set;
mod text;
mod truefalse;

pub use accordion::AccordionHandler;
pub use audio::AudioHandler;
pub use blanks::BlanksHandler;
pub use crossword::CrosswordHandler;
pub use dialog_cards::DialogCardsHandler;
pub use dragtext::DragTextHandler;
pub use essay::EssayHandler;
pub use flashcards::FlashcardsHandler;
pub use image::ImageHandler;
pub use quiz::QuizHandler;
pub use single_choice_set::SingleChoiceSetHandler;
pub use text::TextHandler;
pub use truefalse::TrueFalseHandler;

use std::collections::HashMap;
use std::sync::Arc;

use crate::ai::{AiClient, ResolvedAiConfig, resolve_config};
use crate::definition::{AiConfig, ContentItem};
use crate::error::{Error, Result};
use crate::graph::ChapterBuilder;
use crate::media::MediaLoader;

/// Everything a handler may touch while processing one content item.
pub struct HandlerContext<'c, 'a, 'r> {
    /// Builder for the chapter the item belongs to.
    pub chapter: &'c mut ChapterBuilder<'a, 'r>,
    /// Loader for media references in the item payload.
    pub media: &'c MediaLoader,
    /// Generation client; `None` means AI handlers fall back uniformly.
    pub ai: Option<&'c AiClient>,
    /// Book-level AI configuration, for the cascade.
    pub book_ai: Option<&'c AiConfig>,
    /// Chapter-level AI configuration, for the cascade.
    pub chapter_ai: Option<&'c AiConfig>,
    /// Human-readable item position: `chapter 3 / item 2 (drag-the-words)`.
    pub item_path: String,
}

impl HandlerContext<'_, '_, '_> {
    /// Effective AI config for an item: item → chapter → book → defaults.
    pub fn ai_config_for(&self, item: &ContentItem) -> ResolvedAiConfig {
        resolve_config(item.ai_config().as_ref(), self.chapter_ai, self.book_ai)
    }
}

/// The four-method handler contract.
pub trait Handler: Send + Sync {
    /// The primary type tag this handler owns.
    fn content_type(&self) -> &'static str;

    /// Machine names of the libraries this handler emits fragments for.
    fn required_libraries(&self) -> &'static [&'static str];

    /// Check the input shape. Errors abort the build with a
    /// path-qualified message.
    fn validate(&self, item: &ContentItem) -> Result<()>;

    /// Append one or more fragments to the current chapter.
    fn process(&self, ctx: &mut HandlerContext<'_, '_, '_>, item: &ContentItem) -> Result<()>;
}

/// Construct a validation error; the dispatcher fills in the item path.
pub(crate) fn invalid(reason: impl Into<String>) -> Error {
    Error::InvalidContent {
        path: String::new(),
        reason: reason.into(),
    }
}

/// Maps type tags to handlers.
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    /// An empty registry. Useful for pruned or experimental handler sets.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// The full built-in handler set.
    pub fn with_default_handlers() -> Self {
        let mut registry = Self::new();
        let register = |registry: &mut Self, handler: Arc<dyn Handler>, aliases: &[&str]| {
            registry
                .register(handler, aliases)
                .expect("built-in handler tags are unique");
        };

        register(&mut registry, Arc::new(text::TextHandler), &[]);
        register(&mut registry, Arc::new(image::ImageHandler), &[]);
        register(&mut registry, Arc::new(audio::AudioHandler), &[]);
        register(&mut registry, Arc::new(quiz::QuizHandler), &["multichoice"]);
        register(&mut registry, Arc::new(accordion::AccordionHandler), &[]);
        register(
            &mut registry,
            Arc::new(dragtext::DragTextHandler),
            &["drag-the-words"],
        );
        register(
            &mut registry,
            Arc::new(blanks::BlanksHandler),
            &["fill-in-the-blanks"],
        );
        register(
            &mut registry,
            Arc::new(truefalse::TrueFalseHandler),
            &["true-false"],
        );
        register(&mut registry, Arc::new(essay::EssayHandler), &[]);
        register(
            &mut registry,
            Arc::new(single_choice_set::SingleChoiceSetHandler),
            &["singlechoiceset"],
        );
        register(&mut registry, Arc::new(crossword::CrosswordHandler), &[]);
        register(&mut registry, Arc::new(flashcards::FlashcardsHandler), &[]);
        register(
            &mut registry,
            Arc::new(dialog_cards::DialogCardsHandler),
            &["dialog-cards"],
        );

        register(&mut registry, Arc::new(ai::dragtext::AiDragTextHandler), &[]);
        register(&mut registry, Arc::new(ai::quiz::AiQuizHandler), &[]);
        register(&mut registry, Arc::new(ai::blanks::AiBlanksHandler), &[]);
        register(
            &mut registry,
            Arc::new(ai::truefalse::AiTrueFalseHandler),
            &[],
        );
        register(
            &mut registry,
            Arc::new(ai::crossword::AiCrosswordHandler),
            &[],
        );
        register(
            &mut registry,
            Arc::new(ai::flashcards::AiFlashcardsHandler),
            &[],
        );
        register(
            &mut registry,
            Arc::new(ai::dialog_cards::AiDialogCardsHandler),
            &["ai-dialog-cards"],
        );
        register(&mut registry, Arc::new(ai::essay::AiEssayHandler), &[]);

        registry
    }

    /// Bind a handler under its own tag plus any aliases. Binding an
    /// already-bound tag is an error.
    pub fn register(&mut self, handler: Arc<dyn Handler>, aliases: &[&str]) -> Result<()> {
        let mut tags = vec![handler.content_type()];
        tags.extend_from_slice(aliases);
        for tag in &tags {
            if self.handlers.contains_key(*tag) {
                return Err(Error::HandlerConflict(tag.to_string()));
            }
        }
        for tag in tags {
            self.handlers.insert(tag.to_string(), Arc::clone(&handler));
        }
        Ok(())
    }

    /// Look up the handler for a type tag.
    pub fn get(&self, tag: &str) -> Option<&Arc<dyn Handler>> {
        self.handlers.get(tag)
    }

    /// Validate and process one content item.
    pub fn dispatch(
        &self,
        item: &ContentItem,
        ctx: &mut HandlerContext<'_, '_, '_>,
    ) -> Result<()> {
        let handler = self
            .handlers
            .get(&item.content_type)
            .ok_or_else(|| Error::NoHandler(item.content_type.clone()))?;
        handler
            .validate(item)
            .map_err(|e| e.at_path(&ctx.item_path))?;
        handler
            .process(ctx, item)
            .map_err(|e| e.at_path(&ctx.item_path))
    }

    /// Union of every registered handler's declared libraries, sorted and
    /// deduplicated. The orchestrator seeds the library registry with it.
    pub fn required_libraries(&self) -> Vec<&'static str> {
        let mut libraries: Vec<&'static str> = self
            .handlers
            .values()
            .flat_map(|handler| handler.required_libraries().iter().copied())
            .collect();
        libraries.sort_unstable();
        libraries.dedup();
        libraries
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::with_default_handlers()
    }
}
