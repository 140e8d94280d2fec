//! Messages and their parts

use crate::documents::Element;
use crate::model::extensible::ExtensionAttributes;
use crate::namespaces::QName;
use indexmap::IndexMap;

/// A named piece of a message, typed by a schema element or type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Part name, unique within its message
    pub name: String,
    /// Schema element describing the part
    pub element_name: Option<QName>,
    /// Schema type describing the part
    pub type_name: Option<QName>,
    /// `documentation` child
    pub documentation: Option<Element>,
    /// Foreign-namespace attributes
    pub extension_attributes: ExtensionAttributes,
}

impl Part {
    /// Create a part with no type information
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            element_name: None,
            type_name: None,
            documentation: None,
            extension_attributes: ExtensionAttributes::new(),
        }
    }

    /// Set the element reference
    pub fn with_element(mut self, element_name: QName) -> Self {
        self.element_name = Some(element_name);
        self
    }

    /// Set the type reference
    pub fn with_type(mut self, type_name: QName) -> Self {
        self.type_name = Some(type_name);
        self
    }
}

/// Abstract message exchanged by an operation
///
/// Parts are kept in insertion order. Re-adding a part with an existing name
/// replaces it without moving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Message name
    pub qname: QName,
    parts: IndexMap<String, Part>,
    /// `documentation` child
    pub documentation: Option<Element>,
    /// Referenced before (or without) being defined
    pub undefined: bool,
    /// Foreign-namespace attributes
    pub extension_attributes: ExtensionAttributes,
}

impl Message {
    /// Create a defined, empty message
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            parts: IndexMap::new(),
            documentation: None,
            undefined: false,
            extension_attributes: ExtensionAttributes::new(),
        }
    }

    /// Create a forward-reference placeholder
    pub fn placeholder(qname: QName) -> Self {
        Self {
            undefined: true,
            ..Self::new(qname)
        }
    }

    /// Add a part
    pub fn add_part(&mut self, part: Part) {
        self.parts.insert(part.name.clone(), part);
    }

    /// Get a part by name
    pub fn part(&self, name: &str) -> Option<&Part> {
        self.parts.get(name)
    }

    /// Get a part by name mutably
    pub fn part_mut(&mut self, name: &str) -> Option<&mut Part> {
        self.parts.get_mut(name)
    }

    /// Remove a part, keeping the order of the others
    pub fn remove_part(&mut self, name: &str) -> Option<Part> {
        self.parts.shift_remove(name)
    }

    /// Parts in insertion order
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.values()
    }

    /// Number of parts
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Parts in the given order, or insertion order when `order` is `None`
    ///
    /// Names without a matching part are skipped.
    pub fn ordered_parts<S: AsRef<str>>(&self, order: Option<&[S]>) -> Vec<&Part> {
        match order {
            Some(names) => names
                .iter()
                .filter_map(|name| self.parts.get(name.as_ref()))
                .collect(),
            None => self.parts.values().collect(),
        }
    }
}
