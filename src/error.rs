//! Error types for h5forge operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while compiling a book definition into an archive.
///
/// Everything here aborts the build. AI generation failures are deliberately
/// absent: they are confined to the AI-assisted handlers, which recover by
/// emitting a fallback fragment (see [`crate::ai::AiError`]).
#[derive(Error, Debug)]
pub enum Error {
    #[error("content-type catalog unavailable: {0}")]
    CatalogUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("unresolved library dependency: {0}")]
    UnresolvedDependency(String),

    #[error("library package corrupt: {0}")]
    LibraryCorrupt(String),

    #[error("schema violation at {path}: {rule}")]
    SchemaInvalid { path: String, rule: String },

    #[error("media not found: {}", .0.display())]
    MediaNotFound(PathBuf),

    #[error("failed to fetch media: {0}")]
    MediaFetchFailed(String),

    #[error("invalid content at {path}: {reason}")]
    InvalidContent { path: String, reason: String },

    #[error("no handler registered for content type '{0}'")]
    NoHandler(String),

    #[error("handler already registered for content type '{0}'")]
    HandlerConflict(String),

    #[error("book definition has no chapters")]
    EmptyBook,

    #[error("chapter '{0}' has no content items")]
    EmptyChapter(String),

    #[error("archive assembly failed: {0}")]
    AssemblerFailed(String),

    #[error("build cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Prefix a handler error with the content path that produced it,
    /// e.g. `chapter 3 / item 2 (drag-the-words)`.
    pub(crate) fn at_path(self, path: &str) -> Error {
        match self {
            Error::InvalidContent { reason, .. } => Error::InvalidContent {
                path: path.to_string(),
                reason,
            },
            other => other,
        }
    }
}
