//! On-disk cache for fetched library packages.
//!
//! Keyed by machine name (the catalog serves the latest version for a
//! name). Values are the raw package bytes as fetched. Writes go through a
//! temp file and an atomic rename, so concurrent builds sharing the cache
//! never observe a partial download; when two builds race, the last rename
//! wins and both read back identical bytes. Invalidation is manual: delete
//! the directory.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::error::Result;

const PACKAGE_EXTENSION: &str = "h5plib";

#[derive(Debug)]
pub struct LibraryCache {
    dir: PathBuf,
}

impl LibraryCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, machine_name: &str) -> PathBuf {
        self.dir.join(format!("{machine_name}.{PACKAGE_EXTENSION}"))
    }

    /// Read a cached package. Unreadable cache entries are treated as
    /// absent so a corrupt cache degrades to a re-download.
    pub fn load(&self, machine_name: &str) -> Option<Vec<u8>> {
        let path = self.path_for(machine_name);
        match fs::read(&path) {
            Ok(bytes) => {
                debug!("cache hit for {machine_name} ({} bytes)", bytes.len());
                Some(bytes)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("ignoring unreadable cache entry {}: {e}", path.display());
                None
            }
        }
    }

    /// Atomically write a package into the cache.
    pub fn store(&self, machine_name: &str, package: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(package)?;
        temp.persist(self.path_for(machine_name))
            .map_err(|e| e.error)?;
        debug!("cached {machine_name} ({} bytes)", package.len());
        Ok(())
    }
}

/// Placement helper shared with the CLI: `<dir>/h5forge` under the
/// platform cache directory, or a local fallback.
pub fn default_cache_dir() -> PathBuf {
    std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| Path::new(&home).join(".cache")))
        .unwrap_or_else(|| PathBuf::from(".h5forge-cache"))
        .join("h5forge")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LibraryCache::new(dir.path());
        assert!(cache.load("H5P.DragText").is_none());
        cache.store("H5P.DragText", b"package-bytes").unwrap();
        assert_eq!(cache.load("H5P.DragText").unwrap(), b"package-bytes");
    }

    #[test]
    fn test_store_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LibraryCache::new(dir.path());
        cache.store("H5P.X", b"old").unwrap();
        cache.store("H5P.X", b"new").unwrap();
        assert_eq!(cache.load("H5P.X").unwrap(), b"new");
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LibraryCache::new(dir.path());
        cache.store("H5P.X", b"bytes").unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries, vec![format!("H5P.X.{PACKAGE_EXTENSION}")]);
    }
}
