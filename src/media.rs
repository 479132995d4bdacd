//! Media reference resolution.
//!
//! A media reference is either a filesystem path (relative paths resolve
//! against a configured base directory) or an absolute HTTP(S) URL. Loading
//! produces the raw bytes plus an extension and MIME type; no
//! normalization, transcoding, or resizing happens here.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;

use crate::error::{Error, Result};

/// A loaded media buffer with its detected extension and MIME type.
#[derive(Debug, Clone)]
pub struct LoadedMedia {
    pub data: Vec<u8>,
    pub extension: String,
    pub mime: String,
}

/// Resolves media references into [`LoadedMedia`] buffers.
pub struct MediaLoader {
    base_dir: PathBuf,
    client: reqwest::blocking::Client,
}

impl MediaLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("default TLS backend available");
        Self {
            base_dir: base_dir.into(),
            client,
        }
    }

    /// Load a media reference.
    pub fn load(&self, reference: &str) -> Result<LoadedMedia> {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            self.load_url(reference)
        } else {
            self.load_file(reference)
        }
    }

    fn load_file(&self, reference: &str) -> Result<LoadedMedia> {
        let path = {
            let candidate = Path::new(reference);
            if candidate.is_absolute() {
                candidate.to_path_buf()
            } else {
                self.base_dir.join(candidate)
            }
        };
        let data = std::fs::read(&path).map_err(|_| Error::MediaNotFound(path.clone()))?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("bin")
            .to_ascii_lowercase();
        let mime = mime_for_extension(&extension).to_string();
        debug!("loaded {} ({} bytes, {mime})", path.display(), data.len());
        Ok(LoadedMedia {
            data,
            extension,
            mime,
        })
    }

    fn load_url(&self, url: &str) -> Result<LoadedMedia> {
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|_| Error::MediaFetchFailed(url.to_string()))?;

        // Server-declared content type wins; the URL path only contributes
        // the extension.
        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or(value).trim().to_string());
        let extension = url_extension(url);
        let mime = mime.unwrap_or_else(|| mime_for_extension(&extension).to_string());

        let data = response
            .bytes()
            .map_err(|_| Error::MediaFetchFailed(url.to_string()))?
            .to_vec();
        debug!("fetched {url} ({} bytes, {mime})", data.len());
        Ok(LoadedMedia {
            data,
            extension,
            mime,
        })
    }
}

fn url_extension(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("bin")
        .to_ascii_lowercase()
}

/// MIME detection from extension, for filesystem references.
pub fn mime_for_extension(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogv" => "video/ogg",
        _ => "application/octet-stream",
    }
}

/// Media kinds recognized by the canonical archive layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Audio,
    Video,
}

impl MediaKind {
    /// Directory name under `content/`: `images`, `audios`, `videos`.
    pub fn directory(&self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Audio => "audios",
            MediaKind::Video => "videos",
        }
    }
}
