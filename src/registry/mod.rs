//! Library acquisition: fetch, cache, and dependency resolution.
//!
//! The [`LibraryRegistry`] outlives individual builds. Fetched libraries
//! are memoized for the process lifetime behind a mutex, backed by an
//! on-disk cache, backed by the remote catalog. Transitive resolution
//! produces the topological order the output manifest lists libraries in.

mod cache;
mod catalog;
mod package;

pub use cache::{LibraryCache, default_cache_dir};
pub use catalog::{Catalog, DEFAULT_CATALOG_URL, HttpCatalog};
pub use package::{Library, LibraryDependency};

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use log::{debug, warn};

use crate::error::{Error, Result};

pub struct LibraryRegistry {
    catalog: Box<dyn Catalog>,
    cache: Option<LibraryCache>,
    libraries: Mutex<HashMap<String, Arc<Library>>>,
}

impl LibraryRegistry {
    pub fn new(catalog: Box<dyn Catalog>, cache: Option<LibraryCache>) -> Self {
        Self {
            catalog,
            cache,
            libraries: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch a library: in-memory map, then disk cache, then catalog.
    ///
    /// Fetch-then-fetch of the same name returns the same `Arc`. The memo
    /// lock is not held across network or disk reads, so two builds racing
    /// on a cold cache both download and the first insert wins.
    pub fn fetch(&self, machine_name: &str) -> Result<Arc<Library>> {
        if let Some(library) = self.get(machine_name) {
            return Ok(library);
        }

        let package = match self.cache.as_ref().and_then(|cache| cache.load(machine_name)) {
            Some(package) => package,
            None => {
                let package = self.catalog.download(machine_name)?;
                if let Some(cache) = &self.cache {
                    cache.store(machine_name, &package)?;
                }
                package
            }
        };
        let library = Arc::new(Library::parse(machine_name, package)?);
        debug!("registered library {}", library.versioned_name());

        let mut libraries = self.libraries.lock().expect("registry lock poisoned");
        Ok(Arc::clone(
            libraries
                .entry(machine_name.to_string())
                .or_insert(library),
        ))
    }

    /// Look up an already-fetched library.
    pub fn get(&self, machine_name: &str) -> Option<Arc<Library>> {
        self.libraries
            .lock()
            .expect("registry lock poisoned")
            .get(machine_name)
            .cloned()
    }

    /// Resolve a library and its transitive dependencies.
    ///
    /// The returned order is topological: every dependency precedes its
    /// dependents, each library appears exactly once, and the named library
    /// comes last. Cycles are broken on second visit and logged.
    pub fn resolve_transitive(&self, machine_name: &str) -> Result<Vec<Arc<Library>>> {
        let mut order = Vec::new();
        let mut done = HashSet::new();
        let mut visiting = Vec::new();
        self.visit(machine_name, true, &mut visiting, &mut done, &mut order)?;
        Ok(order)
    }

    /// Resolve the union of several roots, deduplicated, dependencies
    /// still preceding dependents.
    pub fn resolve_all<S: AsRef<str>>(&self, roots: &[S]) -> Result<Vec<Arc<Library>>> {
        let mut order = Vec::new();
        let mut done = HashSet::new();
        let mut visiting = Vec::new();
        for root in roots {
            self.visit(root.as_ref(), true, &mut visiting, &mut done, &mut order)?;
        }
        Ok(order)
    }

    fn visit(
        &self,
        machine_name: &str,
        is_root: bool,
        visiting: &mut Vec<String>,
        done: &mut HashSet<String>,
        order: &mut Vec<Arc<Library>>,
    ) -> Result<()> {
        if done.contains(machine_name) {
            return Ok(());
        }
        if visiting.iter().any(|name| name == machine_name) {
            warn!("dependency cycle broken at {machine_name}");
            return Ok(());
        }

        let library = if is_root {
            self.fetch(machine_name)?
        } else {
            self.fetch(machine_name)
                .map_err(|_| Error::UnresolvedDependency(machine_name.to_string()))?
        };

        visiting.push(machine_name.to_string());
        for dependency in &library.dependencies {
            self.visit(&dependency.machine_name, false, visiting, done, order)?;
        }
        visiting.pop();

        done.insert(machine_name.to_string());
        order.push(library);
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::test_fixtures::*;
    use super::*;

    fn registry_with(entries: Vec<(&str, Vec<u8>)>) -> LibraryRegistry {
        LibraryRegistry::new(Box::new(MemoryCatalog::new(entries)), None)
    }

    const SCHEMA: Option<&str> = Some(r#"[{"name": "text", "type": "text"}]"#);

    #[test]
    fn test_fetch_memoizes() {
        let registry = registry_with(vec![(
            "H5P.AdvancedText",
            library_package("H5P.AdvancedText", 1, 1, &[], SCHEMA),
        )]);
        let first = registry.fetch("H5P.AdvancedText").unwrap();
        let second = registry.fetch("H5P.AdvancedText").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(registry.get("H5P.AdvancedText").is_some());
        assert!(registry.get("H5P.Missing").is_none());
    }

    #[test]
    fn test_fetch_uses_disk_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LibraryCache::new(dir.path());
        cache
            .store("H5P.Cached", &library_package("H5P.Cached", 2, 3, &[], SCHEMA))
            .unwrap();
        // Empty catalog: a hit proves the cache was consulted.
        let registry = LibraryRegistry::new(
            Box::new(MemoryCatalog::new(vec![])),
            Some(LibraryCache::new(dir.path())),
        );
        let library = registry.fetch("H5P.Cached").unwrap();
        assert_eq!(library.major_version, 2);
        assert_eq!(library.minor_version, 3);
    }

    #[test]
    fn test_fetch_populates_disk_cache() {
        let dir = tempfile::tempdir().unwrap();
        let registry = LibraryRegistry::new(
            Box::new(MemoryCatalog::new(vec![(
                "H5P.X",
                library_package("H5P.X", 1, 0, &[], SCHEMA),
            )])),
            Some(LibraryCache::new(dir.path())),
        );
        registry.fetch("H5P.X").unwrap();
        assert!(LibraryCache::new(dir.path()).load("H5P.X").is_some());
    }

    #[test]
    fn test_resolve_transitive_topological() {
        // Book -> Column -> Text; Book -> Text (diamond).
        let registry = registry_with(vec![
            (
                "H5P.Book",
                library_package(
                    "H5P.Book",
                    1,
                    0,
                    &[("H5P.Column", 1, 0), ("H5P.Text", 1, 0)],
                    SCHEMA,
                ),
            ),
            (
                "H5P.Column",
                library_package("H5P.Column", 1, 0, &[("H5P.Text", 1, 0)], SCHEMA),
            ),
            ("H5P.Text", library_package("H5P.Text", 1, 0, &[], SCHEMA)),
        ]);
        let order = registry.resolve_transitive("H5P.Book").unwrap();
        let names: Vec<&str> = order.iter().map(|l| l.machine_name.as_str()).collect();
        assert_eq!(names, vec!["H5P.Text", "H5P.Column", "H5P.Book"]);
    }

    #[test]
    fn test_resolve_breaks_cycles() {
        let registry = registry_with(vec![
            (
                "H5P.A",
                library_package("H5P.A", 1, 0, &[("H5P.B", 1, 0)], SCHEMA),
            ),
            (
                "H5P.B",
                library_package("H5P.B", 1, 0, &[("H5P.A", 1, 0)], SCHEMA),
            ),
        ]);
        let order = registry.resolve_transitive("H5P.A").unwrap();
        let names: Vec<&str> = order.iter().map(|l| l.machine_name.as_str()).collect();
        assert_eq!(names, vec!["H5P.B", "H5P.A"]);
    }

    #[test]
    fn test_resolve_missing_dependency() {
        let registry = registry_with(vec![(
            "H5P.A",
            library_package("H5P.A", 1, 0, &[("H5P.Gone", 1, 0)], SCHEMA),
        )]);
        match registry.resolve_transitive("H5P.A") {
            Err(Error::UnresolvedDependency(name)) => assert_eq!(name, "H5P.Gone"),
            other => panic!("expected UnresolvedDependency, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_missing_root_is_catalog_error() {
        let registry = registry_with(vec![]);
        assert!(matches!(
            registry.resolve_transitive("H5P.Gone"),
            Err(Error::CatalogUnavailable(_))
        ));
    }

    #[test]
    fn test_resolve_all_union() {
        let registry = registry_with(vec![
            (
                "H5P.A",
                library_package("H5P.A", 1, 0, &[("H5P.Shared", 1, 0)], SCHEMA),
            ),
            (
                "H5P.B",
                library_package("H5P.B", 1, 0, &[("H5P.Shared", 1, 0)], SCHEMA),
            ),
            (
                "H5P.Shared",
                library_package("H5P.Shared", 1, 0, &[], SCHEMA),
            ),
        ]);
        let order = registry.resolve_all(&["H5P.A", "H5P.B"]).unwrap();
        let names: Vec<&str> = order.iter().map(|l| l.machine_name.as_str()).collect();
        assert_eq!(names, vec!["H5P.Shared", "H5P.A", "H5P.B"]);
    }

    #[test]
    fn test_utility_library_without_schema() {
        let registry = registry_with(vec![(
            "FontAwesome",
            utility_package("FontAwesome", 4, 5, &[]),
        )]);
        let library = registry.fetch("FontAwesome").unwrap();
        assert!(library.schema.is_none());
        assert!(!library.runnable);
    }
}
