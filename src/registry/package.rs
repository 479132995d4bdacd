//! Library package parsing.
//!
//! A library package is a ZIP whose root holds the library manifest
//! (`library.json`), the schema document (`semantics.json`), and the
//! library's preloaded code and assets. The raw bytes are retained so the
//! assembler can copy the directory into the output archive verbatim.

use std::io::{Cursor, Read};

use serde::Deserialize;
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::semantics::Schema;

/// A dependency declared by a library manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LibraryDependency {
    #[serde(rename = "machineName")]
    pub machine_name: String,
    #[serde(rename = "majorVersion")]
    pub major_version: u32,
    #[serde(rename = "minorVersion")]
    pub minor_version: u32,
}

/// Parsed metadata for one fetched library, plus the raw package bytes.
#[derive(Debug)]
pub struct Library {
    pub machine_name: String,
    pub title: String,
    pub major_version: u32,
    pub minor_version: u32,
    pub patch_version: u32,
    pub runnable: bool,
    pub dependencies: Vec<LibraryDependency>,
    pub preloaded_js: Vec<String>,
    pub preloaded_css: Vec<String>,
    /// Parsed schema; `None` only for non-runnable utility libraries that
    /// ship no schema document.
    pub schema: Option<Schema>,
    /// The package exactly as fetched from the catalog.
    pub package: Vec<u8>,
}

/// Wire shape of `library.json`.
#[derive(Debug, Deserialize)]
struct LibraryManifest {
    #[serde(rename = "machineName")]
    machine_name: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "majorVersion")]
    major_version: u32,
    #[serde(rename = "minorVersion")]
    minor_version: u32,
    #[serde(rename = "patchVersion", default)]
    patch_version: u32,
    #[serde(default, deserialize_with = "flag_from_int_or_bool")]
    runnable: bool,
    #[serde(rename = "preloadedDependencies", default)]
    preloaded_dependencies: Vec<LibraryDependency>,
    #[serde(rename = "preloadedJs", default)]
    preloaded_js: Vec<PreloadedFile>,
    #[serde(rename = "preloadedCss", default)]
    preloaded_css: Vec<PreloadedFile>,
}

#[derive(Debug, Deserialize)]
struct PreloadedFile {
    path: String,
}

/// `runnable` appears as both `0`/`1` and `true`/`false` in the wild.
fn flag_from_int_or_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde_json::Value;
    match Value::deserialize(deserializer)? {
        Value::Bool(flag) => Ok(flag),
        Value::Number(number) => Ok(number.as_i64().unwrap_or(0) != 0),
        _ => Ok(false),
    }
}

impl Library {
    /// Parse a library package.
    ///
    /// `name` is the machine name the package was requested under; it is
    /// used only for error reporting and a mismatch warning.
    pub fn parse(name: &str, package: Vec<u8>) -> Result<Library> {
        let mut archive = ZipArchive::new(Cursor::new(package.as_slice()))
            .map_err(|_| Error::LibraryCorrupt(format!("{name}: not a ZIP package")))?;

        let manifest_json = read_entry(&mut archive, "library.json")
            .ok_or_else(|| Error::LibraryCorrupt(format!("{name}: missing library.json")))?;
        let manifest: LibraryManifest = serde_json::from_slice(&manifest_json)
            .map_err(|e| Error::LibraryCorrupt(format!("{name}: malformed library.json: {e}")))?;

        if manifest.machine_name != name {
            log::warn!(
                "catalog returned '{}' for requested library '{}'",
                manifest.machine_name,
                name
            );
        }

        let schema = match read_entry(&mut archive, "semantics.json") {
            Some(semantics_json) => {
                let document: serde_json::Value = serde_json::from_slice(&semantics_json)
                    .map_err(|e| {
                        Error::LibraryCorrupt(format!("{name}: malformed semantics.json: {e}"))
                    })?;
                Some(Schema::parse(&document).map_err(|e| {
                    Error::LibraryCorrupt(format!("{name}: invalid semantics.json: {e}"))
                })?)
            }
            None if manifest.runnable => {
                return Err(Error::LibraryCorrupt(format!(
                    "{name}: runnable library missing semantics.json"
                )));
            }
            None => None,
        };

        drop(archive);
        Ok(Library {
            machine_name: manifest.machine_name,
            title: manifest.title,
            major_version: manifest.major_version,
            minor_version: manifest.minor_version,
            patch_version: manifest.patch_version,
            runnable: manifest.runnable,
            dependencies: manifest.preloaded_dependencies,
            preloaded_js: manifest.preloaded_js.into_iter().map(|f| f.path).collect(),
            preloaded_css: manifest.preloaded_css.into_iter().map(|f| f.path).collect(),
            schema,
            package,
        })
    }

    /// Directory name inside the output archive: `H5P.DragText-1.10`.
    pub fn directory_name(&self) -> String {
        format!("{}-{}.{}", self.machine_name, self.major_version, self.minor_version)
    }

    /// Versioned name as fragments reference it: `H5P.DragText 1.10`.
    pub fn versioned_name(&self) -> String {
        format!("{} {}.{}", self.machine_name, self.major_version, self.minor_version)
    }

    /// Open the raw package for entry-by-entry reading.
    pub fn open_package(&self) -> Result<ZipArchive<Cursor<&[u8]>>> {
        ZipArchive::new(Cursor::new(self.package.as_slice()))
            .map_err(|_| Error::LibraryCorrupt(format!("{}: not a ZIP package", self.machine_name)))
    }
}

fn read_entry<R: Read + std::io::Seek>(archive: &mut ZipArchive<R>, name: &str) -> Option<Vec<u8>> {
    let mut entry = archive.by_name(name).ok()?;
    let mut data = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut data).ok()?;
    Some(data)
}
