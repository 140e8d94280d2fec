//! Resource loading utilities
//!
//! The reader fetches documents through a [`WsdlLocator`]. Two locators are
//! provided: [`Loader`] reads from the file system, [`MemoryLocator`] serves
//! documents registered in memory (useful for tests and embedded catalogs).

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::locations::Location;
use std::collections::HashMap;
use std::fs;
use thiserror::Error;
use url::Url;

/// Failure to fetch a document
#[derive(Error, Debug)]
pub enum LoadError {
    /// Reading the resource failed
    #[error("Failed to read '{location}': {source}")]
    Io {
        /// Location that was read
        location: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Remote retrieval is not provided
    #[error("Remote resources are not supported: '{0}'")]
    Remote(String),

    /// Nothing registered under the location
    #[error("No document registered at '{0}'")]
    NotFound(String),

    /// No base document was configured
    #[error("No base document location")]
    NoBase,
}

impl From<LoadError> for Error {
    fn from(err: LoadError) -> Self {
        Error::other(err.to_string()).with_source(err)
    }
}

/// Source of description documents
///
/// `import_document` resolves `location` against `parent` (the base URI of the
/// importing document) and records the resolved URI, which is then reported
/// by `latest_import_uri` and becomes the base URI of the imported definition.
pub trait WsdlLocator {
    /// Contents of the root document
    fn base_document(&mut self) -> Result<String>;

    /// Contents of an imported document
    fn import_document(&mut self, parent: Option<&str>, location: &str) -> Result<String>;

    /// URI of the root document
    fn base_uri(&self) -> Option<String>;

    /// URI resolved by the most recent `import_document` call
    fn latest_import_uri(&self) -> Option<String>;

    /// Canonical key of an import without fetching it
    ///
    /// The reader uses this to hit its resolution cache before retrieval.
    /// Locators that cannot tell return `None` and the key is taken from
    /// `latest_import_uri` after the fetch.
    fn canonical_import_uri(&self, parent: Option<&str>, location: &str) -> Option<String> {
        let _ = (parent, location);
        None
    }
}

/// File-system locator
#[derive(Debug, Clone)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
    /// Root document
    base: Option<Location>,
    /// Last resolved import
    latest_import: Option<String>,
}

impl Loader {
    /// Create a new loader with default settings
    pub fn new() -> Self {
        Self {
            limits: Limits::default(),
            base: None,
            latest_import: None,
        }
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the root document
    pub fn with_base(mut self, base: Location) -> Self {
        self.base = Some(base);
        self
    }

    /// Load a resource as a string
    pub fn load(&self, location: &Location) -> Result<String> {
        match location {
            Location::Path(path) => {
                let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
                    location: path.display().to_string(),
                    source,
                })?;

                self.limits.check_document_size(content.len())?;

                Ok(content)
            }
            Location::Url(url) => Err(LoadError::Remote(url.to_string()).into()),
        }
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl WsdlLocator for Loader {
    fn base_document(&mut self) -> Result<String> {
        let base = self.base.as_ref().ok_or(LoadError::NoBase)?;
        self.load(base)
    }

    fn import_document(&mut self, parent: Option<&str>, location: &str) -> Result<String> {
        let resolved = Location::resolve(parent, location)?;
        self.latest_import = Some(resolved.as_str());
        self.load(&resolved)
    }

    fn base_uri(&self) -> Option<String> {
        self.base.as_ref().map(Location::as_str)
    }

    fn latest_import_uri(&self) -> Option<String> {
        self.latest_import.clone()
    }

    fn canonical_import_uri(&self, parent: Option<&str>, location: &str) -> Option<String> {
        Location::resolve(parent, location)
            .ok()
            .map(|resolved| resolved.canonical())
    }
}

/// In-memory locator keyed by URI
///
/// Imports are joined against the parent URI when both are URL-like
/// (`mem://defs/a.wsdl` + `b.wsdl` gives `mem://defs/b.wsdl`); otherwise the
/// import location is used as the key verbatim.
#[derive(Debug, Clone, Default)]
pub struct MemoryLocator {
    documents: HashMap<String, String>,
    base: Option<String>,
    latest_import: Option<String>,
}

impl MemoryLocator {
    /// Create an empty locator
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document under `uri`
    pub fn with_document(mut self, uri: impl Into<String>, text: impl Into<String>) -> Self {
        self.documents.insert(uri.into(), text.into());
        self
    }

    /// Select the root document
    pub fn with_base(mut self, uri: impl Into<String>) -> Self {
        self.base = Some(uri.into());
        self
    }

    fn resolve(&self, parent: Option<&str>, location: &str) -> String {
        parent
            .and_then(|p| Url::parse(p).ok())
            .and_then(|base| base.join(location).ok())
            .map(|joined| joined.to_string())
            .filter(|joined| self.documents.contains_key(joined))
            .unwrap_or_else(|| location.to_string())
    }

    fn fetch(&self, uri: &str) -> Result<String> {
        self.documents
            .get(uri)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(uri.to_string()).into())
    }
}

impl WsdlLocator for MemoryLocator {
    fn base_document(&mut self) -> Result<String> {
        let base = self.base.as_deref().ok_or(LoadError::NoBase)?;
        self.fetch(base)
    }

    fn import_document(&mut self, parent: Option<&str>, location: &str) -> Result<String> {
        let uri = self.resolve(parent, location);
        self.latest_import = Some(uri.clone());
        self.fetch(&uri)
    }

    fn base_uri(&self) -> Option<String> {
        self.base.clone()
    }

    fn latest_import_uri(&self) -> Option<String> {
        self.latest_import.clone()
    }

    fn canonical_import_uri(&self, parent: Option<&str>, location: &str) -> Option<String> {
        Some(self.resolve(parent, location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FaultCode;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "<definitions/>").unwrap();

        let location = Location::Path(file.path().to_path_buf());
        let loader = Loader::new();
        let content = loader.load(&location).unwrap();

        assert!(content.contains("<definitions/>"));
    }

    #[test]
    fn test_size_limit() {
        let mut file = NamedTempFile::new().unwrap();
        let large_content = "x".repeat(11 * 1024 * 1024); // 11 MB
        write!(file, "{}", large_content).unwrap();

        let location = Location::Path(file.path().to_path_buf());
        let loader = Loader::new().with_limits(Limits::strict());

        // Strict limits (10 MB max) should reject 11MB file
        assert!(loader.load(&location).is_err());
    }

    #[test]
    fn test_remote_rejected() {
        let loader = Loader::new();
        let location = Location::parse("http://example.com/a.wsdl").unwrap();
        let err = loader.load(&location).unwrap_err();
        assert!(err.is(FaultCode::OtherError));
        assert!(err.message.contains("Remote resources"));
    }

    #[test]
    fn test_import_relative_to_parent() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("root.wsdl");
        fs::write(&root, "<root/>").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("child.wsdl"), "<child/>").unwrap();

        let mut loader = Loader::new().with_base(Location::Path(root.clone()));
        assert_eq!(loader.base_document().unwrap(), "<root/>");

        let parent = root.to_string_lossy().to_string();
        let text = loader.import_document(Some(&parent), "sub/child.wsdl").unwrap();
        assert_eq!(text, "<child/>");
        assert!(loader
            .latest_import_uri()
            .unwrap()
            .ends_with("child.wsdl"));
    }

    #[test]
    fn test_missing_file_is_other_error() {
        let mut loader = Loader::new();
        let err = loader.import_document(None, "/nonexistent/x.wsdl").unwrap_err();
        assert!(err.is(FaultCode::OtherError));
    }

    #[test]
    fn test_memory_locator() {
        let mut locator = MemoryLocator::new()
            .with_document("mem://defs/a.wsdl", "<a/>")
            .with_document("mem://defs/b.wsdl", "<b/>")
            .with_base("mem://defs/a.wsdl");

        assert_eq!(locator.base_document().unwrap(), "<a/>");
        let b = locator
            .import_document(Some("mem://defs/a.wsdl"), "b.wsdl")
            .unwrap();
        assert_eq!(b, "<b/>");
        assert_eq!(
            locator.latest_import_uri().as_deref(),
            Some("mem://defs/b.wsdl")
        );
        assert!(locator.import_document(None, "c.wsdl").is_err());
    }
}
