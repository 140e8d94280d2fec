//! XML namespace handling
//!
//! This module provides qualified names (QNames), the identity key used by
//! every named WSDL entity, and the prefix → namespace tables used both while
//! reading (resolving `tns:Foo` attribute values) and while writing
//! (choosing prefixes for emitted elements).

use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::fmt;

/// XML Namespace URI
pub type NamespaceUri = String;

/// Namespace prefix
pub type Prefix = String;

/// Qualified name (QName) - combination of namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<NamespaceUri>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        let namespace: Option<String> = namespace.map(|s| s.into());
        Self {
            namespace: namespace.filter(|s| !s.is_empty()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self::new(Some(namespace), local_name)
    }

    /// Namespace URI, if any
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Check whether this name is `local_name` in `namespace`
    pub fn matches(&self, namespace: &str, local_name: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local_name == local_name
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => f.write_str(&self.local_name),
        }
    }
}

/// Namespace context for resolving prefixes
///
/// The default namespace is stored under the empty prefix. Iteration follows
/// declaration order so that emitted documents are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceContext {
    prefixes: IndexMap<Prefix, NamespaceUri>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace prefix mapping; an empty prefix sets the default namespace
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Remove a prefix mapping
    pub fn remove_prefix(&mut self, prefix: &str) -> Option<NamespaceUri> {
        self.prefixes.shift_remove(prefix)
    }

    /// Set the default namespace
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        self.add_prefix("", namespace);
    }

    /// Get the namespace for a prefix
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Get the default namespace
    pub fn get_default_namespace(&self) -> Option<&str> {
        self.get_namespace("")
    }

    /// Find a prefix bound to `namespace`; named prefixes win over the default one
    pub fn get_prefix(&self, namespace: &str) -> Option<&str> {
        let mut default = None;
        for (prefix, uri) in &self.prefixes {
            if uri == namespace {
                if prefix.is_empty() {
                    default = Some(prefix.as_str());
                } else {
                    return Some(prefix);
                }
            }
        }
        default
    }

    /// Find a non-empty prefix bound to `namespace` (attributes cannot use the default)
    pub fn get_named_prefix(&self, namespace: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|(prefix, uri)| !prefix.is_empty() && uri.as_str() == namespace)
            .map(|(prefix, _)| prefix.as_str())
    }

    /// Iterate over (prefix, namespace) pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, n)| (p.as_str(), n.as_str()))
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Check if there are no bindings
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// First of `base0`, `base1`, ... that is not bound yet
    pub fn unused_prefix(&self, base: &str) -> Prefix {
        let mut index = 0usize;
        loop {
            let candidate = format!("{}{}", base, index);
            if !self.prefixes.contains_key(&candidate) {
                return candidate;
            }
            index += 1;
        }
    }

    /// Resolve a prefixed name to a QName
    ///
    /// Unprefixed names take the default namespace, as element names and
    /// QName-valued WSDL attributes do.
    pub fn resolve(&self, prefixed_name: &str) -> Result<QName> {
        if let Some((prefix, local)) = prefixed_name.split_once(':') {
            let namespace = self.get_namespace(prefix).ok_or_else(|| {
                Error::invalid_wsdl(format!(
                    "Unable to determine namespace of '{}'.",
                    prefixed_name
                ))
            })?;
            Ok(QName::namespaced(namespace, local))
        } else {
            Ok(QName::new(self.get_default_namespace(), prefixed_name))
        }
    }

    /// Bindings in `self` that are absent from, or differ in, `outer`
    pub fn difference(&self, outer: &NamespaceContext) -> NamespaceContext {
        let mut diff = NamespaceContext::new();
        for (prefix, uri) in self.iter() {
            if outer.get_namespace(prefix) != Some(uri) {
                diff.add_prefix(prefix, uri);
            }
        }
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qname_creation() {
        let qname = QName::namespaced("http://example.com", "element");
        assert_eq!(qname.namespace, Some("http://example.com".to_string()));
        assert_eq!(qname.local_name, "element");
        assert!(qname.matches("http://example.com", "element"));
    }

    #[test]
    fn test_empty_namespace_is_no_namespace() {
        assert_eq!(QName::namespaced("", "a"), QName::local("a"));
    }

    #[test]
    fn test_qname_to_string() {
        let qname = QName::namespaced("http://example.com", "element");
        assert_eq!(qname.to_string(), "{http://example.com}element");

        let qname_local = QName::local("element");
        assert_eq!(qname_local.to_string(), "element");
    }

    #[test]
    fn test_namespace_context() {
        let mut ctx = NamespaceContext::new();
        ctx.add_prefix("xs", "http://www.w3.org/2001/XMLSchema");
        ctx.set_default_namespace("http://example.com");

        assert_eq!(
            ctx.get_namespace("xs"),
            Some("http://www.w3.org/2001/XMLSchema")
        );
        assert_eq!(ctx.get_default_namespace(), Some("http://example.com"));
        assert_eq!(ctx.get_prefix("http://example.com"), Some(""));
    }

    #[test]
    fn test_named_prefix_preferred() {
        let mut ctx = NamespaceContext::new();
        ctx.set_default_namespace("urn:a");
        ctx.add_prefix("a", "urn:a");
        assert_eq!(ctx.get_prefix("urn:a"), Some("a"));
    }

    #[test]
    fn test_resolve_prefixed_name() {
        let mut ctx = NamespaceContext::new();
        ctx.add_prefix("tns", "urn:example");

        let qname = ctx.resolve("tns:Get").unwrap();
        assert_eq!(qname, QName::namespaced("urn:example", "Get"));
        assert!(ctx.resolve("missing:Get").is_err());
        assert_eq!(ctx.resolve("Get").unwrap(), QName::local("Get"));
    }

    #[test]
    fn test_unused_prefix() {
        let mut ctx = NamespaceContext::new();
        assert_eq!(ctx.unused_prefix("ns"), "ns0");
        ctx.add_prefix("ns0", "urn:a");
        ctx.add_prefix("ns1", "urn:b");
        assert_eq!(ctx.unused_prefix("ns"), "ns2");
    }

    #[test]
    fn test_difference() {
        let mut inner = NamespaceContext::new();
        inner.add_prefix("a", "urn:a");
        inner.add_prefix("b", "urn:b");
        let mut outer = NamespaceContext::new();
        outer.add_prefix("a", "urn:a");
        outer.add_prefix("b", "urn:other");

        let diff = inner.difference(&outer);
        assert_eq!(diff.len(), 1);
        assert_eq!(diff.get_namespace("b"), Some("urn:b"));
    }
}
