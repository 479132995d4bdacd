//! # h5forge
//!
//! A template-free compiler from declarative book definitions to
//! self-contained H5P interactive-book archives.
//!
//! ## How it works
//!
//! - Runtime libraries are fetched from the content-type catalog, cached
//!   on disk, and dependency-resolved ([`registry`])
//! - Content items are dispatched to type handlers that validate input
//!   and emit typed fragments ([`handlers`])
//! - The content graph is validated against each library's schema
//!   ([`semantics`], [`graph`])
//! - The archive is streamed into a fresh ZIP: manifest, content
//!   document, media, and every library directory ([`archive`])
//!
//! No pre-existing archive is ever used as a starting point.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use h5forge::{
//!     BookDefinition, Compiler, HandlerRegistry, HttpCatalog, LibraryCache,
//!     LibraryRegistry, MediaLoader,
//! };
//!
//! let definition = BookDefinition::from_json(r#"{
//!     "title": "Bio 101",
//!     "language": "en",
//!     "chapters": [{
//!         "title": "Photosynthesis",
//!         "content": [
//!             {"type": "text", "title": "Intro", "text": "Plants convert light..."}
//!         ]
//!     }]
//! }"#)?;
//!
//! let registry = Arc::new(LibraryRegistry::new(
//!     Box::new(HttpCatalog::from_env()),
//!     Some(LibraryCache::new("/tmp/h5forge-cache")),
//! ));
//! let compiler = Compiler::new(
//!     registry,
//!     HandlerRegistry::with_default_handlers(),
//!     MediaLoader::new("."),
//!     h5forge::AiClient::from_env(),
//! );
//! compiler.compile_to_file(&definition, "bio101.h5p".as_ref())?;
//! # Ok::<(), h5forge::Error>(())
//! ```

pub mod ai;
pub mod archive;
pub mod compile;
pub mod definition;
pub mod error;
pub mod graph;
pub mod handlers;
pub mod media;
pub mod registry;
pub mod semantics;
pub mod util;

pub use ai::AiClient;
pub use archive::{MAIN_LIBRARY, PackageAssembler};
pub use compile::{CancelFlag, CompiledBook, Compiler};
pub use definition::{AiConfig, BookDefinition, ChapterDefinition, ContentItem};
pub use error::{Error, Result};
pub use graph::{BookBuilder, ContentGraph, Fragment, MediaManifest};
pub use handlers::{Handler, HandlerContext, HandlerRegistry};
pub use media::{LoadedMedia, MediaLoader};
pub use registry::{Catalog, HttpCatalog, Library, LibraryCache, LibraryRegistry};
pub use semantics::Schema;
