//! XML document handling
//!
//! An owned, namespace-aware element tree. Documents are parsed with
//! `roxmltree` and converted into [`Element`] values that keep everything the
//! reader and writer need: the resolved name and its original prefix, the
//! in-scope and locally declared namespaces, mixed content, and a path-like
//! location used in error reports. Printing goes through a `quick-xml` writer
//! with indentation.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::namespaces::{NamespaceContext, QName};
use crate::XML_NAMESPACE;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

/// Attribute of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Resolved attribute name
    pub name: QName,
    /// Prefix used in the source (or chosen for output)
    pub prefix: Option<String>,
    /// Attribute value
    pub value: String,
}

impl Attribute {
    /// Prefixed name as it appears in markup
    pub fn qualified_name(&self) -> String {
        qualify(self.prefix.as_deref(), &self.name.local_name)
    }
}

/// Content node of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Child element
    Element(Element),
    /// Character data
    Text(String),
    /// Comment text, without the delimiters
    Comment(String),
    /// Processing instruction
    ProcessingInstruction {
        /// PI target
        target: String,
        /// Everything after the target, if present
        value: Option<String>,
    },
}

/// XML Element in the document tree
///
/// Equality is structural: names, attribute names and values, and content.
/// Prefixes, namespace declarations and source locations are ignored, so an
/// element compares equal to itself after a print and re-parse.
#[derive(Debug, Clone)]
pub struct Element {
    /// Resolved element name
    pub name: QName,
    /// Prefix used in the source (or chosen for output)
    pub prefix: Option<String>,
    /// Attributes in document order, namespace declarations excluded
    pub attributes: Vec<Attribute>,
    /// Namespace declarations made on this element
    pub declared: NamespaceContext,
    /// All namespace bindings in scope at this element
    pub namespaces: NamespaceContext,
    /// Mixed content
    pub children: Vec<Node>,
    /// Path-like pointer to this element in its source document
    pub location: String,
}

impl Element {
    /// Create a new element
    pub fn new(name: QName) -> Self {
        Self {
            name,
            prefix: None,
            attributes: Vec::new(),
            declared: NamespaceContext::new(),
            namespaces: NamespaceContext::new(),
            children: Vec::new(),
            location: String::new(),
        }
    }

    /// Set the prefix used when printing
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix = if prefix.is_empty() { None } else { Some(prefix) };
        self
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.name.local_name
    }

    /// Get the namespace of the element
    pub fn namespace(&self) -> Option<&str> {
        self.name.namespace()
    }

    /// Prefixed name as it appears in markup
    pub fn qualified_name(&self) -> String {
        qualify(self.prefix.as_deref(), &self.name.local_name)
    }

    /// Check whether this element is `local_name` in `namespace`
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.name.matches(namespace, local_name)
    }

    /// Get an unqualified attribute value
    pub fn attribute(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.namespace.is_none() && a.name.local_name == local_name)
            .map(|a| a.value.as_str())
    }

    /// Get an attribute value by qualified name
    pub fn attribute_ns(&self, name: &QName) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| &a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing any existing value with the same name
    pub fn set_attribute(&mut self, name: QName, prefix: Option<String>, value: impl Into<String>) {
        let value = value.into();
        if let Some(existing) = self.attributes.iter_mut().find(|a| a.name == name) {
            existing.prefix = prefix;
            existing.value = value;
        } else {
            self.attributes.push(Attribute {
                name,
                prefix,
                value,
            });
        }
    }

    /// Set an unqualified attribute
    pub fn set_local_attribute(&mut self, local_name: &str, value: impl Into<String>) {
        self.set_attribute(QName::local(local_name), None, value);
    }

    /// Declare a namespace on this element; an empty prefix declares the default
    pub fn declare_namespace(&mut self, prefix: &str, namespace: &str) {
        self.declared.add_prefix(prefix, namespace);
        self.namespaces.add_prefix(prefix, namespace);
    }

    /// Append a child element
    pub fn push_element(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Append character data
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Concatenated character data of the direct children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Make this fragment self-contained when placed under `outer`
    ///
    /// Every binding that was in scope where the fragment was parsed and that
    /// `outer` does not provide is declared on the fragment root, so prefixes
    /// used inside attribute values keep their meaning. Element and attribute
    /// names whose prefix does not resolve are then fixed up recursively.
    pub fn rebase_namespaces(&mut self, outer: &NamespaceContext) {
        let mut declared = self.namespaces.difference(outer);
        for (prefix, uri) in self.declared.iter() {
            declared.add_prefix(prefix, uri);
        }
        self.declared = declared;
        self.fix_namespaces(outer);
    }

    fn fix_namespaces(&mut self, outer: &NamespaceContext) {
        let mut scope = outer.clone();
        for (prefix, uri) in self.declared.iter() {
            scope.add_prefix(prefix, uri);
        }

        match self.name.namespace.clone() {
            Some(ns) => {
                let bound = match &self.prefix {
                    Some(prefix) => scope.get_namespace(prefix),
                    None => scope.get_default_namespace(),
                };
                if bound != Some(ns.as_str()) {
                    let prefix = self.prefix.clone().unwrap_or_default();
                    self.declared.add_prefix(prefix.as_str(), ns.as_str());
                    scope.add_prefix(prefix, ns);
                }
            }
            None => {
                self.prefix = None;
                if scope.get_default_namespace().is_some_and(|d| !d.is_empty()) {
                    self.declared.set_default_namespace("");
                    scope.set_default_namespace("");
                }
            }
        }

        for attr in &mut self.attributes {
            let Some(ns) = attr.name.namespace.clone() else {
                attr.prefix = None;
                continue;
            };
            if ns == XML_NAMESPACE {
                attr.prefix = Some("xml".to_string());
                continue;
            }
            if let Some(prefix) = &attr.prefix {
                if scope.get_namespace(prefix) == Some(ns.as_str()) {
                    continue;
                }
            }
            if let Some(prefix) = scope.get_named_prefix(&ns) {
                attr.prefix = Some(prefix.to_string());
                continue;
            }
            let prefix = match &attr.prefix {
                Some(p) if scope.get_namespace(p).is_none() => p.clone(),
                _ => scope.unused_prefix("ns"),
            };
            self.declared.add_prefix(prefix.as_str(), ns.as_str());
            scope.add_prefix(prefix.as_str(), ns.as_str());
            attr.prefix = Some(prefix);
        }

        for child in &mut self.children {
            if let Node::Element(e) = child {
                e.fix_namespaces(&scope);
            }
        }
        self.namespaces = scope;
    }

    /// Print this element (without an XML declaration)
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        write_element(self, &mut writer)?;
        bytes_to_string(writer.into_inner())
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.attributes.len() == other.attributes.len()
            && self
                .attributes
                .iter()
                .zip(&other.attributes)
                .all(|(a, b)| a.name == b.name && a.value == b.value)
            && self.children == other.children
    }
}

impl Eq for Element {}

/// XML Document representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Root element of the document
    pub root: Element,
}

impl Document {
    /// Wrap a root element
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Parse an XML document from a string
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse_with_limits(xml, &Limits::default())
    }

    /// Parse an XML document from bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(xml)
            .map_err(|e| Error::parser(format!("Document is not valid UTF-8: {}", e)).with_source(e))?;
        Self::from_string(text)
    }

    /// Parse with explicit limits
    pub fn parse_with_limits(xml: &str, limits: &Limits) -> Result<Self> {
        limits.check_document_size(xml.len())?;
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let doc = roxmltree::Document::parse_with_options(xml, options)?;
        let builder = TreeBuilder { text: xml, limits };
        let root_element = doc.root_element();
        let location = format!("/{}", builder.raw_name(&root_element));
        let root = builder.convert(root_element, &NamespaceContext::new(), &location, 1)?;
        Ok(Self { root })
    }

    /// Get the root element
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Get the root element mutably
    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Print the document with an XML declaration to `out`
    pub fn write<W: Write>(&self, out: W) -> Result<()> {
        let mut writer = Writer::new_with_indent(out, b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        write_element(&self.root, &mut writer)?;
        writer.get_mut().write_all(b"\n")?;
        Ok(())
    }

    /// Print the document with an XML declaration
    pub fn to_xml_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write(&mut buf)?;
        bytes_to_string(buf)
    }
}

struct TreeBuilder<'t> {
    text: &'t str,
    limits: &'t Limits,
}

impl<'t> TreeBuilder<'t> {
    fn convert(
        &self,
        node: roxmltree::Node<'_, '_>,
        parent_scope: &NamespaceContext,
        location: &str,
        depth: usize,
    ) -> Result<Element> {
        self.limits.check_xml_depth(depth)?;

        let mut namespaces = NamespaceContext::new();
        for ns in node.namespaces() {
            match ns.name() {
                Some("xml") => {}
                Some(prefix) => namespaces.add_prefix(prefix, ns.uri()),
                None => namespaces.set_default_namespace(ns.uri()),
            }
        }

        let tag = node.tag_name();
        let name = QName::new(tag.namespace(), tag.name());
        let prefix = self
            .raw_name(&node)
            .split_once(':')
            .map(|(prefix, _)| prefix.to_string());

        let mut attributes = Vec::new();
        for attr in node.attributes() {
            let attr_prefix = match attr.namespace() {
                Some(XML_NAMESPACE) => Some("xml".to_string()),
                Some(ns) => namespaces.get_named_prefix(ns).map(str::to_string),
                None => None,
            };
            attributes.push(Attribute {
                name: QName::new(attr.namespace(), attr.name()),
                prefix: attr_prefix,
                value: attr.value().to_string(),
            });
        }

        let mut element = Element {
            name,
            prefix,
            attributes,
            declared: namespaces.difference(parent_scope),
            namespaces,
            children: Vec::new(),
            location: location.to_string(),
        };

        let mut seen: Vec<(&'t str, usize)> = Vec::new();
        for child in node.children() {
            if child.is_element() {
                let child_raw = self.raw_name(&child);
                let total = node
                    .children()
                    .filter(|c| c.is_element() && self.raw_name(c) == child_raw)
                    .count();
                let position = match seen.iter_mut().find(|(n, _)| *n == child_raw) {
                    Some(entry) => {
                        entry.1 += 1;
                        entry.1
                    }
                    None => {
                        seen.push((child_raw, 1));
                        1
                    }
                };
                let child_location = if total > 1 {
                    format!("{}/{}[{}]", location, child_raw, position)
                } else {
                    format!("{}/{}", location, child_raw)
                };
                let converted =
                    self.convert(child, &element.namespaces, &child_location, depth + 1)?;
                element.children.push(Node::Element(converted));
            } else if child.is_text() {
                let text = child.text().unwrap_or_default();
                if !text.trim().is_empty() {
                    element.children.push(Node::Text(text.to_string()));
                }
            } else if child.is_comment() {
                let text = child.text().unwrap_or_default();
                element.children.push(Node::Comment(text.to_string()));
            } else if let Some(pi) = child.pi() {
                element.children.push(Node::ProcessingInstruction {
                    target: pi.target.to_string(),
                    value: pi.value.map(str::to_string),
                });
            }
        }

        Ok(element)
    }

    /// Prefixed tag name exactly as written in the source
    fn raw_name(&self, node: &roxmltree::Node<'_, '_>) -> &'t str {
        let start = node.range().start;
        let tail = self.text.get(start + 1..).unwrap_or_default();
        let end = tail
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
            .unwrap_or(tail.len());
        &tail[..end]
    }
}

fn qualify(prefix: Option<&str>, local_name: &str) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("{}:{}", p, local_name),
        _ => local_name.to_string(),
    }
}

fn write_element<W: Write>(el: &Element, writer: &mut Writer<W>) -> Result<()> {
    let qualified = el.qualified_name();
    let mut start = BytesStart::new(qualified.as_str());
    for (prefix, uri) in el.declared.iter() {
        let key = if prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{}", prefix)
        };
        start.push_attribute((key.as_str(), uri));
    }
    for attr in &el.attributes {
        start.push_attribute((attr.qualified_name().as_str(), attr.value.as_str()));
    }

    if el.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &el.children {
        match child {
            Node::Element(e) => write_element(e, writer)?,
            Node::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
            Node::Comment(c) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(c.as_str())))?
            }
            Node::ProcessingInstruction { target, value } => {
                let content = match value {
                    Some(value) => format!("{} {}", target, value),
                    None => target.clone(),
                };
                writer.write_event(Event::PI(BytesText::from_escaped(content)))?
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(qualified.as_str())))?;
    Ok(())
}

fn bytes_to_string(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|e| Error::other(format!("Printed document is not valid UTF-8: {}", e)).with_source(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_xml() {
        let xml = r#"<root><child>text</child></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root();
        assert_eq!(root.local_name(), "root");
        assert_eq!(root.elements().count(), 1);
        let child = root.elements().next().unwrap();
        assert_eq!(child.local_name(), "child");
        assert_eq!(child.text(), "text");
    }

    #[test]
    fn test_parse_with_attributes() {
        let xml = r#"<root attr1="value1" xmlns:x="urn:x" x:attr2="value2"><child/></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root();
        assert_eq!(root.attribute("attr1"), Some("value1"));
        assert_eq!(root.attribute("attr2"), None);
        assert_eq!(
            root.attribute_ns(&QName::namespaced("urn:x", "attr2")),
            Some("value2")
        );
        assert_eq!(root.attributes[1].qualified_name(), "x:attr2");
    }

    #[test]
    fn test_parse_with_namespaces() {
        let xml = r#"<w:root xmlns:w="urn:w" xmlns="urn:d"><w:a><b xmlns:z="urn:z"/></w:a></w:root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root();
        assert!(root.is("urn:w", "root"));
        assert_eq!(root.prefix.as_deref(), Some("w"));
        assert_eq!(root.declared.len(), 2);

        let a = root.elements().next().unwrap();
        assert!(a.declared.is_empty());
        let b = a.elements().next().unwrap();
        assert!(b.is("urn:d", "b"));
        assert_eq!(b.prefix, None);
        assert_eq!(b.declared.get_namespace("z"), Some("urn:z"));
        assert_eq!(b.namespaces.get_namespace("w"), Some("urn:w"));
    }

    #[test]
    fn test_comments_and_pis_survive_printing() {
        let xml = r#"<x:policy xmlns:x="urn:x"><!-- keep me --><?audit level="2"?><x:rule a="1"/></x:policy>"#;
        let doc = Document::from_string(xml).unwrap();
        let root = doc.root();
        assert_eq!(root.children[0], Node::Comment(" keep me ".to_string()));
        assert_eq!(
            root.children[1],
            Node::ProcessingInstruction {
                target: "audit".to_string(),
                value: Some(r#"level="2""#.to_string()),
            }
        );
        assert_eq!(root.elements().count(), 1);
        assert_eq!(root.text(), "");

        let printed = root.to_xml_string().unwrap();
        assert!(printed.contains("<!-- keep me -->"), "{}", printed);
        assert!(printed.contains(r#"<?audit level="2"?>"#), "{}", printed);
        assert_eq!(Document::from_string(&printed).unwrap().root(), root);
    }

    #[test]
    fn test_locations() {
        let xml = r#"<d:definitions xmlns:d="urn:d"><d:message/><d:message><d:part/></d:message><d:types/></d:definitions>"#;
        let doc = Document::from_string(xml).unwrap();
        let locations: Vec<_> = doc.root().elements().map(|e| e.location.clone()).collect();
        assert_eq!(
            locations,
            vec![
                "/d:definitions/d:message[1]",
                "/d:definitions/d:message[2]",
                "/d:definitions/d:types",
            ]
        );
        let part = doc.root().elements().nth(1).unwrap().elements().next().unwrap();
        assert_eq!(part.location, "/d:definitions/d:message[2]/d:part");
    }

    #[test]
    fn test_structural_equality() {
        let a = Document::from_string(r#"<x:a xmlns:x="urn:x" k="v"><x:b/></x:a>"#).unwrap();
        let b = Document::from_string(r#"<a xmlns="urn:x" k="v"><b/></a>"#).unwrap();
        assert_eq!(a.root(), b.root());

        let c = Document::from_string(r#"<a xmlns="urn:x" k="w"><b/></a>"#).unwrap();
        assert_ne!(a.root(), c.root());
    }

    #[test]
    fn test_malformed_is_parser_error() {
        let err = Document::from_string("<a><b></a>").unwrap_err();
        assert!(err.is(crate::error::FaultCode::ParserError));
    }

    #[test]
    fn test_depth_limit() {
        let limits = Limits {
            max_xml_depth: 2,
            ..Limits::default()
        };
        assert!(Document::parse_with_limits("<a><b/></a>", &limits).is_ok());
        assert!(Document::parse_with_limits("<a><b><c/></b></a>", &limits).is_err());
    }

    #[test]
    fn test_print_mixed_content() {
        let xml = r#"<doc xmlns="urn:d">Hello <b>bold</b> &amp; more</doc>"#;
        let doc = Document::from_string(xml).unwrap();
        let printed = doc.root().to_xml_string().unwrap();
        assert_eq!(
            printed,
            r#"<doc xmlns="urn:d">Hello <b>bold</b> &amp; more</doc>"#
        );
    }

    #[test]
    fn test_document_declaration() {
        let doc = Document::new(Element::new(QName::local("root")));
        let printed = doc.to_xml_string().unwrap();
        assert!(printed.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(printed.contains("<root/>"));
    }

    #[test]
    fn test_rebase_declares_missing_bindings() {
        let xml = r#"<root xmlns:tns="urn:t" xmlns:xsd="urn:xsd"><xsd:schema><xsd:element type="tns:T"/></xsd:schema></root>"#;
        let doc = Document::from_string(xml).unwrap();
        let mut schema = doc.root().elements().next().unwrap().clone();

        let mut outer = NamespaceContext::new();
        outer.add_prefix("xsd", "urn:xsd");
        schema.rebase_namespaces(&outer);

        assert_eq!(schema.declared.get_namespace("tns"), Some("urn:t"));
        assert_eq!(schema.declared.get_namespace("xsd"), None);
        let printed = schema.to_xml_string().unwrap();
        assert!(printed.starts_with(r#"<xsd:schema xmlns:tns="urn:t">"#));
    }

    #[test]
    fn test_rebase_fixes_unbound_names() {
        let mut el = Element::new(QName::namespaced("urn:ext", "thing"));
        el.set_attribute(QName::namespaced("urn:attr", "flag"), None, "true");
        el.push_element(Element::new(QName::local("plain")));
        el.rebase_namespaces(&NamespaceContext::new());

        assert_eq!(el.declared.get_default_namespace(), Some("urn:ext"));
        assert_eq!(el.declared.get_namespace("ns0"), Some("urn:attr"));
        assert_eq!(el.attributes[0].qualified_name(), "ns0:flag");

        let plain = el.elements().next().unwrap();
        assert_eq!(plain.declared.get_default_namespace(), Some(""));
    }
}
