//! Streams the output archive.
//!
//! Layout:
//!
//! ```text
//! h5p.json                          root manifest
//! content/content.json              the serialized content graph
//! content/images/<n>.<ext>          media, numbered by the builder
//! content/audios/<n>.<ext>
//! content/videos/<n>.<ext>
//! <machine-name>-<major>.<minor>/…  one directory per resolved library,
//!                                   copied verbatim from its cached package
//! ```
//!
//! Output is byte-deterministic for identical inputs: entry order is fixed,
//! timestamps are the ZIP epoch default, and JSON documents serialize with
//! sorted keys. A failed build never leaves a torn file: `save` writes to a
//! temp file in the output directory and renames on success.

use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use serde_json::json;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{Error, Result};
use crate::graph::{ContentGraph, MediaManifest};
use crate::registry::Library;

/// The root manifest's `mainLibrary`. Fixed: the emitted content document
/// is always an interactive book.
pub const MAIN_LIBRARY: &str = "H5P.InteractiveBook";

pub struct PackageAssembler;

impl PackageAssembler {
    /// Assemble the archive in memory.
    pub fn assemble(
        graph: &ContentGraph,
        libraries: &[Arc<Library>],
        media: &MediaManifest,
    ) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        Self::write_to(graph, libraries, media, &mut buffer)?;
        Ok(buffer.into_inner())
    }

    /// Stream the archive to any `Write + Seek` destination.
    pub fn write_to<W: Write + Seek>(
        graph: &ContentGraph,
        libraries: &[Arc<Library>],
        media: &MediaManifest,
        writer: W,
    ) -> Result<()> {
        let mut zip = ZipWriter::new(writer);

        let options_stored =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        // Level 1: the bulk of an archive is pre-compressed library assets
        // and media, so a high deflate level buys nothing.
        let options_deflate = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .compression_level(Some(1));

        // 1. Root manifest.
        let manifest = json!({
            "title": &graph.title,
            "language": &graph.language,
            "mainLibrary": MAIN_LIBRARY,
            "embedTypes": ["div"],
            "license": "U",
            "preloadedDependencies": libraries
                .iter()
                .map(|library| json!({
                    "machineName": &library.machine_name,
                    "majorVersion": library.major_version,
                    "minorVersion": library.minor_version,
                }))
                .collect::<Vec<serde_json::Value>>(),
        });
        zip.start_file("h5p.json", options_deflate)?;
        zip.write_all(serde_json::to_string(&manifest)?.as_bytes())?;

        // 2. Content document.
        zip.start_file("content/content.json", options_deflate)?;
        zip.write_all(serde_json::to_string(&graph.to_json())?.as_bytes())?;

        // 3. Media, already numbered canonically by the builder.
        for entry in media.entries() {
            let opts = if is_precompressed(&entry.mime) {
                options_stored
            } else {
                options_deflate
            };
            zip.start_file(format!("content/{}", entry.path), opts)?;
            zip.write_all(&entry.data)?;
        }

        // 4. Library directories, copied verbatim from the cached packages.
        for library in libraries {
            let directory = library.directory_name();
            debug!("bundling {directory}");
            let mut package = library.open_package()?;
            for index in 0..package.len() {
                let mut entry = package.by_index(index)?;
                if entry.is_dir() {
                    continue;
                }
                let Some(name) = entry.enclosed_name() else {
                    return Err(Error::AssemblerFailed(format!(
                        "{directory}: unsafe entry path '{}'",
                        entry.name()
                    )));
                };
                let mut data = Vec::with_capacity(entry.size() as usize);
                entry.read_to_end(&mut data)?;

                let opts = if is_precompressed_path(&name) {
                    options_stored
                } else {
                    options_deflate
                };
                zip.start_file(format!("{directory}/{}", name.display()), opts)?;
                zip.write_all(&data)?;
            }
        }

        zip.finish()?;
        Ok(())
    }

    /// Assemble and atomically write the archive to `path`.
    pub fn save(
        graph: &ContentGraph,
        libraries: &[Arc<Library>],
        media: &MediaManifest,
        path: &Path,
    ) -> Result<()> {
        let bytes = Self::assemble(graph, libraries, media)?;
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let mut temp = match dir {
            Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
            None => tempfile::NamedTempFile::new_in(".")?,
        };
        temp.write_all(&bytes)?;
        temp.persist(path)
            .map_err(|e| Error::AssemblerFailed(format!("renaming into place: {}", e.error)))?;
        info!("wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }
}

/// No benefit from deflating these again.
#[inline]
fn is_precompressed(mime: &str) -> bool {
    matches!(
        mime,
        "image/jpeg"
            | "image/png"
            | "image/gif"
            | "image/webp"
            | "audio/mpeg"
            | "audio/mp4"
            | "audio/ogg"
            | "video/mp4"
            | "video/webm"
            | "font/woff"
            | "font/woff2"
    )
}

fn is_precompressed_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("jpg" | "jpeg" | "png" | "gif" | "webp" | "mp3" | "mp4" | "ogg" | "woff" | "woff2")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    use zip::ZipArchive;

    use crate::graph::BookBuilder;
    use crate::media::LoadedMedia;
    use crate::registry::LibraryRegistry;
    use crate::registry::test_fixtures::{MemoryCatalog, library_package};

    fn registry() -> LibraryRegistry {
        let open = Some("[]");
        LibraryRegistry::new(
            Box::new(MemoryCatalog::new(vec![
                (
                    "H5P.InteractiveBook",
                    library_package("H5P.InteractiveBook", 1, 11, &[("H5P.Column", 1, 18)], open),
                ),
                ("H5P.Column", library_package("H5P.Column", 1, 18, &[], open)),
                (
                    "H5P.AdvancedText",
                    library_package("H5P.AdvancedText", 1, 1, &[], open),
                ),
                ("H5P.Image", library_package("H5P.Image", 1, 1, &[], open)),
            ])),
            None,
        )
    }

    fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut entry = archive.by_name(name).expect(name);
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_archive_layout() {
        let registry = registry();
        let libraries = registry
            .resolve_all(&["H5P.InteractiveBook", "H5P.AdvancedText"])
            .unwrap();

        let mut builder = BookBuilder::new("Bio 101", "en", &registry);
        {
            let mut chapter = builder.chapter("Photosynthesis").unwrap();
            chapter
                .text_page(Some("Intro".to_string()), "Plants convert light...")
                .unwrap();
            chapter
                .image_page(
                    None,
                    LoadedMedia {
                        data: vec![0xff, 0xd8],
                        extension: "jpg".to_string(),
                        mime: "image/jpeg".to_string(),
                    },
                    "leaf",
                    None,
                )
                .unwrap();
        }
        let (graph, media) = builder.build().unwrap();

        let bytes = PackageAssembler::assemble(&graph, &libraries, &media).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        let manifest: serde_json::Value =
            serde_json::from_str(&read_entry(&mut archive, "h5p.json")).unwrap();
        assert_eq!(manifest["mainLibrary"], "H5P.InteractiveBook");
        assert_eq!(manifest["embedTypes"], serde_json::json!(["div"]));
        let dependencies = manifest["preloadedDependencies"].as_array().unwrap();
        // Topological: Column before InteractiveBook.
        let names: Vec<&str> = dependencies
            .iter()
            .map(|dep| dep["machineName"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["H5P.Column", "H5P.InteractiveBook", "H5P.AdvancedText"]);

        let content: serde_json::Value =
            serde_json::from_str(&read_entry(&mut archive, "content/content.json")).unwrap();
        assert_eq!(content["chapters"][0]["metadata"]["title"], "Photosynthesis");

        // Media and library entries exist; no directory entries anywhere.
        assert!(archive.by_name("content/images/0.jpg").is_ok());
        assert!(archive.by_name("H5P.Column-1.18/library.json").is_ok());
        assert!(archive.by_name("H5P.InteractiveBook-1.11/library.json").is_ok());
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert!(names.iter().all(|name| !name.ends_with('/')), "{names:?}");
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let registry = registry();
        let libraries = registry.resolve_all(&["H5P.AdvancedText"]).unwrap();

        let build = || {
            let mut builder = BookBuilder::new("T", "en", &registry);
            builder.chapter("C").unwrap().text_page(None, "same text").unwrap();
            builder.build().unwrap()
        };
        let (graph_a, media_a) = build();
        let (graph_b, media_b) = build();
        let a = PackageAssembler::assemble(&graph_a, &libraries, &media_a).unwrap();
        let b = PackageAssembler::assemble(&graph_b, &libraries, &media_b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_save_writes_archive_atomically() {
        let registry = registry();
        let libraries = registry.resolve_all(&["H5P.AdvancedText"]).unwrap();
        let mut builder = BookBuilder::new("T", "en", &registry);
        builder.chapter("C").unwrap().text_page(None, "x").unwrap();
        let (graph, media) = builder.build().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.h5p");
        PackageAssembler::save(&graph, &libraries, &media, &path).unwrap();
        assert!(path.exists());
        // Only the archive remains; the temp file is gone.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
