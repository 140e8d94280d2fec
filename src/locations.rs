//! Resource location resolution
//!
//! Import locations are resolved against the base URI of the importing
//! document. Bases that parse as URLs are joined with URL semantics; anything
//! else is treated as a file-system path and resolved against its parent
//! directory.

use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Resource location - a URL or a file path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// File system path
    Path(PathBuf),
    /// URL with a non-file scheme
    Url(Url),
}

impl Location {
    /// Create a location from a string (auto-detect type)
    pub fn parse(s: &str) -> Result<Self> {
        match parse_url(s) {
            Some(url) => Self::from_url(url),
            None => Ok(Location::Path(PathBuf::from(s))),
        }
    }

    /// Resolve `location` against an optional base URI
    pub fn resolve(base: Option<&str>, location: &str) -> Result<Self> {
        if let Some(url) = parse_url(location) {
            return Self::from_url(url);
        }
        let Some(base) = base else {
            return Ok(Location::Path(PathBuf::from(location)));
        };
        match parse_url(base) {
            Some(base_url) => {
                let joined = base_url.join(location).map_err(|e| {
                    Error::other(format!(
                        "Unable to resolve '{}' relative to '{}'.",
                        location, base
                    ))
                    .with_source(e)
                })?;
                Self::from_url(joined)
            }
            None => {
                let parent = Path::new(base).parent().unwrap_or_else(|| Path::new(""));
                Ok(Location::Path(parent.join(location)))
            }
        }
    }

    fn from_url(url: Url) -> Result<Self> {
        if url.scheme() == "file" {
            url.to_file_path()
                .map(Location::Path)
                .map_err(|_| Error::other(format!("Invalid file URL '{}'.", url)))
        } else {
            Ok(Location::Url(url))
        }
    }

    /// Key identifying the resource independently of how it was spelled
    pub fn canonical(&self) -> String {
        match self {
            Location::Path(p) => std::fs::canonicalize(p)
                .unwrap_or_else(|_| p.clone())
                .to_string_lossy()
                .to_string(),
            Location::Url(u) => u.to_string(),
        }
    }

    /// Get the location as a string
    pub fn as_str(&self) -> String {
        match self {
            Location::Path(p) => p.to_string_lossy().to_string(),
            Location::Url(u) => u.to_string(),
        }
    }

    /// Check if this is a remote location (URL)
    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Url(_))
    }

    /// Check if this is a local file
    pub fn is_file(&self) -> bool {
        matches!(self, Location::Path(_))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

/// Parse an absolute URL; single-letter schemes are drive letters, not URLs
fn parse_url(s: &str) -> Option<Url> {
    Url::parse(s).ok().filter(|u| u.scheme().len() > 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_url() {
        let loc = Location::parse("http://example.com/service.wsdl").unwrap();
        assert!(matches!(loc, Location::Url(_)));
        assert!(loc.is_remote());
    }

    #[test]
    fn test_location_from_path() {
        let loc = Location::parse("/tmp/service.wsdl").unwrap();
        assert!(matches!(loc, Location::Path(_)));
        assert!(loc.is_file());
    }

    #[test]
    fn test_file_url_becomes_path() {
        let loc = Location::parse("file:///tmp/a.wsdl").unwrap();
        assert_eq!(loc, Location::Path(PathBuf::from("/tmp/a.wsdl")));
    }

    #[test]
    fn test_resolve_against_path_base() {
        let loc = Location::resolve(Some("/defs/root.wsdl"), "sub/types.xsd").unwrap();
        assert_eq!(loc, Location::Path(PathBuf::from("/defs/sub/types.xsd")));
    }

    #[test]
    fn test_resolve_against_url_base() {
        let loc = Location::resolve(Some("http://example.com/a/root.wsdl"), "../b.wsdl").unwrap();
        assert_eq!(loc.as_str(), "http://example.com/b.wsdl");
    }

    #[test]
    fn test_resolve_absolute_ignores_base() {
        let loc = Location::resolve(Some("/defs/root.wsdl"), "urn:x:y").unwrap();
        assert_eq!(loc.as_str(), "urn:x:y");
    }

    #[test]
    fn test_resolve_without_base() {
        let loc = Location::resolve(None, "local.wsdl").unwrap();
        assert_eq!(loc, Location::Path(PathBuf::from("local.wsdl")));
    }
}
