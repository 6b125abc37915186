/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Resources that may hold a settings document.
//!
//! A location string is turned into a [`Resource`] by [`ResourceResolver`]:
//!
//! - `classpath:<name>`: a resource bundled with the application
//! - `file:<path>`: a filesystem path
//! - a path containing `*`, `?` or `[`: the first existing file matching the pattern
//! - anything else: a filesystem path

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Prefix selecting a bundled resource.
pub const CLASSPATH_PREFIX: &str = "classpath:";
/// Prefix selecting a filesystem resource.
pub const FILE_PREFIX: &str = "file:";

/// A readable resource that may or may not exist.
pub trait Resource: fmt::Debug + Send + Sync {
    /// Human-readable description used in logs and errors.
    fn description(&self) -> String;

    /// Returns true if the resource exists and can be opened.
    fn exists(&self) -> bool;

    /// Opens the resource for reading.
    ///
    /// # Errors
    /// Returns an I/O error if the resource cannot be opened.
    fn open(&self) -> io::Result<Box<dyn Read + Send>>;
}

/// Resource backed by a filesystem path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResource {
    path: PathBuf,
}

impl FileResource {
    /// Creates a resource for the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Resource for FileResource {
    fn description(&self) -> String {
        format!("file [{}]", self.path.display())
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(File::open(&self.path)?))
    }
}

#[derive(Debug, Clone)]
enum BundledSource {
    Embedded(Arc<[u8]>),
    OnDisk(PathBuf),
    Missing,
}

/// Resource looked up in a [`BundledResources`] catalog.
#[derive(Debug, Clone)]
pub struct BundledResource {
    name: String,
    source: BundledSource,
}

impl Resource for BundledResource {
    fn description(&self) -> String {
        format!("bundled resource [{}]", self.name)
    }

    fn exists(&self) -> bool {
        match &self.source {
            BundledSource::Embedded(_) => true,
            BundledSource::OnDisk(path) => path.is_file(),
            BundledSource::Missing => false,
        }
    }

    fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        match &self.source {
            BundledSource::Embedded(bytes) => Ok(Box::new(Cursor::new(Arc::clone(bytes)))),
            BundledSource::OnDisk(path) => Ok(Box::new(File::open(path)?)),
            BundledSource::Missing => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("bundled resource {} does not exist", self.name),
            )),
        }
    }
}

/// Catalog of resources shipped with the application.
///
/// Embedded documents (usually registered with `include_str!`) are searched
/// first, then each root directory in registration order.
#[derive(Debug, Clone, Default)]
pub struct BundledResources {
    embedded: HashMap<String, Arc<[u8]>>,
    roots: Vec<PathBuf>,
}

impl BundledResources {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an embedded document under a name.
    ///
    /// # Arguments
    /// * `name` - Name used after `classpath:`
    /// * `content` - Document bytes
    #[must_use]
    pub fn with_resource(mut self, name: impl Into<String>, content: impl AsRef<[u8]>) -> Self {
        self.embedded
            .insert(normalize(&name.into()).to_string(), Arc::from(content.as_ref()));
        self
    }

    /// Adds a directory searched for bundled resources.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// Looks up a bundled resource by name.
    #[must_use]
    pub fn find(&self, name: &str) -> BundledResource {
        let name = normalize(name);
        let source = if let Some(bytes) = self.embedded.get(name) {
            BundledSource::Embedded(Arc::clone(bytes))
        } else {
            self.roots
                .iter()
                .map(|root| root.join(name))
                .find(|path| path.is_file())
                .map_or(BundledSource::Missing, BundledSource::OnDisk)
        };
        BundledResource {
            name: name.to_string(),
            source,
        }
    }
}

fn normalize(name: &str) -> &str {
    name.trim_start_matches('/')
}

fn is_pattern(location: &str) -> bool {
    location.contains(['*', '?', '['])
}

/// Turns location strings into resources.
#[derive(Debug, Clone, Default)]
pub struct ResourceResolver {
    bundled: BundledResources,
}

impl ResourceResolver {
    /// Creates a resolver over the given bundled catalog.
    #[must_use]
    pub fn new(bundled: BundledResources) -> Self {
        Self { bundled }
    }

    /// Resolves a location string.
    ///
    /// Returns `None` when the location is empty, is an invalid pattern or a
    /// pattern matching nothing. A returned resource may still not exist.
    #[must_use]
    pub fn resolve(&self, location: &str) -> Option<Box<dyn Resource>> {
        let location = location.trim();
        if location.is_empty() {
            return None;
        }
        if let Some(name) = location.strip_prefix(CLASSPATH_PREFIX) {
            return Some(Box::new(self.bundled.find(name)));
        }
        let path = location.strip_prefix(FILE_PREFIX).unwrap_or(location);
        if is_pattern(path) {
            return first_match(path).map(|p| Box::new(FileResource::new(p)) as Box<dyn Resource>);
        }
        Some(Box::new(FileResource::new(path)))
    }
}

fn first_match(pattern: &str) -> Option<PathBuf> {
    match glob::glob(pattern) {
        Ok(paths) => paths.filter_map(Result::ok).find(|p| p.is_file()),
        Err(e) => {
            warn!(%pattern, error = %e, "invalid settings location pattern");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn read_all(resource: &dyn Resource) -> String {
        let mut out = String::new();
        resource.open().unwrap().read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_file_resource() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fix.cfg");
        fs::write(&path, "[DEFAULT]\n").unwrap();

        let resource = FileResource::new(&path);
        assert!(resource.exists());
        assert_eq!(read_all(&resource), "[DEFAULT]\n");
        assert!(!FileResource::new(dir.path().join("missing.cfg")).exists());
        assert!(!FileResource::new(dir.path()).exists());
    }

    #[test]
    fn test_bundled_embedded_and_roots() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("on-disk.cfg"), "disk").unwrap();
        let catalog = BundledResources::new()
            .with_resource("/embedded.cfg", "mem")
            .with_root(dir.path());

        let embedded = catalog.find("embedded.cfg");
        assert!(embedded.exists());
        assert_eq!(read_all(&embedded), "mem");

        let on_disk = catalog.find("/on-disk.cfg");
        assert!(on_disk.exists());
        assert_eq!(read_all(&on_disk), "disk");

        let missing = catalog.find("nope.cfg");
        assert!(!missing.exists());
        assert!(missing.open().is_err());
    }

    #[test]
    fn test_resolve_prefixes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.cfg");
        fs::write(&path, "file").unwrap();
        let resolver = ResourceResolver::new(BundledResources::new().with_resource("a.cfg", "bundled"));

        let bundled = resolver.resolve("classpath:a.cfg").unwrap();
        assert_eq!(read_all(bundled.as_ref()), "bundled");

        let prefixed = resolver.resolve(&format!("file:{}", path.display())).unwrap();
        assert_eq!(read_all(prefixed.as_ref()), "file");

        let plain = resolver.resolve(&path.display().to_string()).unwrap();
        assert!(plain.exists());

        assert!(resolver.resolve("").is_none());
        assert!(resolver.resolve("   ").is_none());
    }

    #[test]
    fn test_resolve_glob() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b-session.cfg"), "b").unwrap();
        fs::write(dir.path().join("a-session.cfg"), "a").unwrap();
        let resolver = ResourceResolver::default();

        let pattern = format!("{}/*-session.cfg", dir.path().display());
        let found = resolver.resolve(&pattern).unwrap();
        assert_eq!(read_all(found.as_ref()), "a");

        let none = format!("{}/*.missing", dir.path().display());
        assert!(resolver.resolve(&none).is_none());
        assert!(resolver.resolve("[unclosed").is_none());
    }
}
