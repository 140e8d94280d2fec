//! Imports and the types section

use crate::documents::Element;
use crate::model::definition::Definition;
use crate::model::extensible::{ExtensibilityElement, ExtensionAttributes};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Shared handle to a definition in an import graph
pub type DefinitionRef = Rc<RefCell<Definition>>;

/// Target of a resolved import
///
/// A definition that was still being read when the import was reached (an
/// import cycle) is held weakly so the graph can be dropped. The reader keeps
/// the target of a back-edge to the root alive for as long as the returned
/// root definition lives.
#[derive(Debug, Clone)]
pub enum ImportedDefinition {
    /// Fully read definition
    Loaded(DefinitionRef),
    /// Back-edge to a definition that was in progress
    InProgress(Weak<RefCell<Definition>>),
}

impl ImportedDefinition {
    /// Strong handle to the imported definition, if it is still alive
    pub fn get(&self) -> Option<DefinitionRef> {
        match self {
            Self::Loaded(rc) => Some(Rc::clone(rc)),
            Self::InProgress(weak) => weak.upgrade(),
        }
    }

    /// Whether this is a back-edge created by an import cycle
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::InProgress(_))
    }
}

impl PartialEq for ImportedDefinition {
    /// Targets compare by identity of their target namespace and base URI;
    /// a deep comparison could loop on cyclic graphs.
    fn eq(&self, other: &Self) -> bool {
        fn key(target: &ImportedDefinition) -> Option<(Option<String>, Option<String>)> {
            let rc = target.get()?;
            let def = rc.try_borrow().ok()?;
            Some((def.target_namespace.clone(), def.document_base_uri.clone()))
        }
        key(self) == key(other)
    }
}

impl Eq for ImportedDefinition {}

/// `import` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Namespace being imported
    pub namespace_uri: String,
    /// Where the imported document lives
    pub location_uri: String,
    /// Resolved target, unset when resolution was disabled or failed
    pub definition: Option<ImportedDefinition>,
    /// `documentation` child
    pub documentation: Option<Element>,
    /// Foreign-namespace attributes
    pub extension_attributes: ExtensionAttributes,
}

impl Import {
    /// Create an unresolved import
    pub fn new(namespace_uri: impl Into<String>, location_uri: impl Into<String>) -> Self {
        Self {
            namespace_uri: namespace_uri.into(),
            location_uri: location_uri.into(),
            definition: None,
            documentation: None,
            extension_attributes: ExtensionAttributes::new(),
        }
    }

    /// Strong handle to the resolved target
    pub fn definition(&self) -> Option<DefinitionRef> {
        self.definition.as_ref().and_then(ImportedDefinition::get)
    }
}

/// `types` element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Types {
    /// `documentation` child
    pub documentation: Option<Element>,
    /// Schema payloads, usually unknown `xsd:schema` elements
    pub extensibility_elements: Vec<ExtensibilityElement>,
    /// Foreign-namespace attributes
    pub extension_attributes: ExtensionAttributes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weak_target_expires() {
        let rc = Rc::new(RefCell::new(Definition::new()));
        rc.borrow_mut().target_namespace = Some("urn:a".to_string());

        let mut import = Import::new("urn:a", "a.wsdl");
        import.definition = Some(ImportedDefinition::InProgress(Rc::downgrade(&rc)));
        assert!(import.definition().is_some());
        assert!(import.definition.as_ref().unwrap().is_cycle());

        drop(rc);
        assert!(import.definition().is_none());
    }

    #[test]
    fn test_equality_by_target_namespace() {
        let a = Rc::new(RefCell::new(Definition::new()));
        a.borrow_mut().target_namespace = Some("urn:a".to_string());
        let b = Rc::new(RefCell::new(Definition::new()));
        b.borrow_mut().target_namespace = Some("urn:a".to_string());

        assert_eq!(
            ImportedDefinition::Loaded(Rc::clone(&a)),
            ImportedDefinition::InProgress(Rc::downgrade(&b))
        );
    }
}
