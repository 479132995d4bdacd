//! The compilation pipeline.
//!
//! [`Compiler`] drives one build end to end: validate the definition,
//! aggregate and resolve the required libraries, dispatch every content
//! item in declaration order, validate the finished graph, and stream the
//! archive. Chapters, items, media numbering, and sub-content ids all
//! follow declaration order, so identical inputs against a warm cache
//! produce byte-identical archives.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};

use crate::ai::AiClient;
use crate::archive::{MAIN_LIBRARY, PackageAssembler};
use crate::definition::BookDefinition;
use crate::error::{Error, Result};
use crate::graph::{BookBuilder, ContentGraph, MediaManifest};
use crate::handlers::{HandlerContext, HandlerRegistry};
use crate::media::MediaLoader;
use crate::registry::{Library, LibraryRegistry};

/// The chapter container library; every emitted book uses it.
const CHAPTER_LIBRARY: &str = "H5P.Column";

/// Cooperative cancellation for a running build. Checked between content
/// items; in-flight network requests complete but their results are
/// discarded, and no partial archive is ever written.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The result of a successful compilation, before archive emission.
#[derive(Debug)]
pub struct CompiledBook {
    pub graph: ContentGraph,
    pub media: MediaManifest,
    pub libraries: Vec<Arc<Library>>,
}

/// Drives input → registry → handlers → builder → assembler.
pub struct Compiler {
    registry: Arc<LibraryRegistry>,
    handlers: HandlerRegistry,
    media: MediaLoader,
    ai: Option<AiClient>,
    cancel: CancelFlag,
}

impl Compiler {
    pub fn new(
        registry: Arc<LibraryRegistry>,
        handlers: HandlerRegistry,
        media: MediaLoader,
        ai: Option<AiClient>,
    ) -> Self {
        Self {
            registry,
            handlers,
            media,
            ai,
            cancel: CancelFlag::new(),
        }
    }

    /// A flag that cancels this compiler's builds from another thread.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Compile a validated definition into a content graph, its media, and
    /// the resolved library closure.
    pub fn compile(&self, definition: &BookDefinition) -> Result<CompiledBook> {
        definition.validate()?;

        // Resolve the dependency closure up front so every fragment can
        // name the exact fetched library version.
        let mut roots = vec![MAIN_LIBRARY, CHAPTER_LIBRARY];
        roots.extend(self.handlers.required_libraries());
        let libraries = self.registry.resolve_all(&roots)?;
        info!(
            "resolved {} libraries for '{}'",
            libraries.len(),
            definition.title
        );

        let mut builder = BookBuilder::new(
            definition.title.as_str(),
            definition.language.as_str(),
            &self.registry,
        );
        if let Some(reference) = &definition.cover {
            let cover = self.media.load(reference)?;
            builder.set_cover(cover, "Cover", None)?;
        }

        for (chapter_index, chapter_def) in definition.chapters.iter().enumerate() {
            debug!("chapter {}: {}", chapter_index + 1, chapter_def.title);
            let mut chapter = builder.chapter(chapter_def.title.as_str())?;
            for (item_index, item) in chapter_def.content.iter().enumerate() {
                if self.cancel.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                let item_path = format!(
                    "chapter {} / item {} ({})",
                    chapter_index + 1,
                    item_index + 1,
                    item.content_type
                );
                let mut ctx = HandlerContext {
                    chapter: &mut chapter,
                    media: &self.media,
                    ai: self.ai.as_ref(),
                    book_ai: definition.ai_config.as_ref(),
                    chapter_ai: chapter_def.ai_config.as_ref(),
                    item_path,
                };
                self.handlers.dispatch(item, &mut ctx)?;
            }
        }

        let (graph, media) = builder.build()?;
        Ok(CompiledBook {
            graph,
            media,
            libraries,
        })
    }

    /// Compile and write the archive to `path` (write-to-temp, rename on
    /// success).
    pub fn compile_to_file(&self, definition: &BookDefinition, path: &Path) -> Result<()> {
        let compiled = self.compile(definition)?;
        PackageAssembler::save(&compiled.graph, &compiled.libraries, &compiled.media, path)
    }
}
