//! Import resolution
//!
//! Imported documents are fetched through the reader's [`WsdlLocator`] and
//! cached by canonical location for the duration of one read. A document that
//! is reached again while it is still being read (an import cycle) resolves to
//! a weak back-edge instead of being read a second time.
//!
//! [`WsdlLocator`]: crate::loaders::WsdlLocator

use crate::constants::{elements, is_schema_root};
use crate::documents::{Document, Element};
use crate::error::{Error, FaultCode, Result};
use crate::extensions::parse_required;
use crate::model::{
    Definition, ExtensibilityElement, ImportedDefinition, Types, UnknownExtensibilityElement,
};
use crate::reader::Parser;
use crate::WSDL_NAMESPACE;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, info, warn};

impl Parser<'_> {
    /// Resolve the import at `location` made by `def`
    ///
    /// Failures to find or fetch the document leave the import unresolved
    /// (with a warning) unless imports are required. Malformed or invalid
    /// imported documents always fail the read.
    pub(crate) fn resolve_import(
        &mut self,
        def: &Definition,
        location: &str,
    ) -> Result<Option<ImportedDefinition>> {
        let base = def.document_base_uri.as_deref();
        match self.fetch_import(base, location) {
            Ok(target) => Ok(target),
            Err(err) if err.is(FaultCode::OtherError) && !self.reader.features().require_imports => {
                warn!(location, error = %err, "leaving import unresolved");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Key identifying a document in the resolution cache
    pub(crate) fn cache_key(&self, parent: Option<&str>, location: &str) -> String {
        self.locator
            .canonical_import_uri(parent, location)
            .unwrap_or_else(|| location.to_string())
    }

    fn fetch_import(
        &mut self,
        base: Option<&str>,
        location: &str,
    ) -> Result<Option<ImportedDefinition>> {
        self.reader.limits().check_import_depth(self.depth + 1)?;

        let known_key = self.locator.canonical_import_uri(base, location);
        if let Some(hit) = known_key.as_ref().and_then(|key| self.cache.get(key)) {
            debug!(location, cycle = hit.is_cycle(), "import already resolved");
            return Ok(Some(hit.clone()));
        }

        let text = self
            .locator
            .import_document(base, location)
            .map_err(|e| locate_error(base, location, e))?;
        let uri = self
            .locator
            .latest_import_uri()
            .unwrap_or_else(|| location.to_string());
        let key = known_key.unwrap_or_else(|| uri.clone());
        if let Some(hit) = self.cache.get(&key) {
            return Ok(Some(hit.clone()));
        }

        let document = Document::parse_with_limits(&text, self.reader.limits()).map_err(|e| {
            if e.is(FaultCode::ParserError) {
                Error::parser(format!("Problem parsing '{}'.", uri)).with_source(e)
            } else {
                e
            }
        })?;
        let root = document.root();

        if root.is(WSDL_NAMESPACE, elements::DEFINITIONS) {
            if self.reader.features().verbose {
                info!(
                    "Retrieving document at '{}'{}.",
                    location,
                    base.map(|b| format!(", relative to '{}'", b))
                        .unwrap_or_default()
                );
            }
            self.depth += 1;
            let parsed = self.parse_definitions(Some(uri), root, Some(key));
            self.depth -= 1;
            return parsed.map(|rc| Some(ImportedDefinition::Loaded(rc)));
        }

        if is_schema_root(&root.name) {
            let target = ImportedDefinition::Loaded(Rc::new(RefCell::new(
                self.schema_definition(uri, root),
            )));
            self.cache.insert(key, target.clone());
            return Ok(Some(target));
        }

        debug!(location, root = %root.name, "import is neither WSDL nor schema");
        Ok(None)
    }

    /// Wrap a bare schema document as a definition with a single types entry
    fn schema_definition(&self, uri: String, root: &Element) -> Definition {
        let mut def = Definition::new();
        if let Some(registry) = self.reader.extension_registry() {
            def.set_extension_registry(Some(Arc::clone(registry)));
        }
        def.document_base_uri = Some(uri);
        def.types = Some(Types {
            extensibility_elements: vec![ExtensibilityElement::Unknown(
                UnknownExtensibilityElement {
                    element_type: root.name.clone(),
                    required: parse_required(root),
                    element: root.clone(),
                },
            )],
            ..Types::default()
        });
        def
    }
}

fn locate_error(base: Option<&str>, location: &str, cause: Error) -> Error {
    let message = match base {
        Some(base) => format!(
            "Unable to locate imported document at '{}', relative to '{}'.",
            location, base
        ),
        None => format!("Unable to locate imported document at '{}'.", location),
    };
    Error::other(message).with_source(cause)
}

#[cfg(test)]
mod tests {
    use crate::error::FaultCode;
    use crate::extensions::ExtensionRegistry;
    use crate::loaders::MemoryLocator;
    use crate::model::Definition;
    use crate::namespaces::QName;
    use crate::reader::{WsdlReader, FEATURE_REQUIRE_IMPORTS};
    use std::sync::Arc;

    const ROOT: &str = r#"<definitions xmlns="http://schemas.xmlsoap.org/wsdl/" xmlns:a="urn:a"
        targetNamespace="urn:root">
      <import namespace="urn:a" location="a.wsdl"/>
      <binding name="B" type="a:PT"/>
    </definitions>"#;

    const IMPORTED: &str = r#"<definitions xmlns="http://schemas.xmlsoap.org/wsdl/"
        targetNamespace="urn:a">
      <portType name="PT"/>
    </definitions>"#;

    fn reader() -> WsdlReader {
        WsdlReader::new().with_extension_registry(Arc::new(ExtensionRegistry::populated()))
    }

    fn read(locator: MemoryLocator) -> crate::Result<Definition> {
        let mut locator = locator;
        reader().read_wsdl_with_locator(&mut locator)
    }

    #[test]
    fn test_imported_port_type_satisfies_binding() {
        let def = read(
            MemoryLocator::new()
                .with_document("mem://defs/root.wsdl", ROOT)
                .with_document("mem://defs/a.wsdl", IMPORTED)
                .with_base("mem://defs/root.wsdl"),
        )
        .unwrap();

        let pt_name = QName::namespaced("urn:a", "PT");
        // resolved through the import, so no placeholder was added locally
        assert!(def.port_type(&pt_name).is_none());
        assert!(def.lookup_port_type(&pt_name).is_some());

        let import = &def.imports("urn:a")[0];
        let target = import.definition().unwrap();
        assert_eq!(
            target.borrow().document_base_uri.as_deref(),
            Some("mem://defs/a.wsdl")
        );
    }

    #[test]
    fn test_missing_import_is_tolerated() {
        let def = read(
            MemoryLocator::new()
                .with_document("mem://defs/root.wsdl", ROOT)
                .with_base("mem://defs/root.wsdl"),
        )
        .unwrap();
        assert!(def.imports("urn:a")[0].definition.is_none());
        // the binding's port type becomes a local placeholder instead
        assert!(def
            .port_type(&QName::namespaced("urn:a", "PT"))
            .unwrap()
            .undefined);
    }

    #[test]
    fn test_missing_import_required() {
        let mut reader = reader();
        reader.set_feature(FEATURE_REQUIRE_IMPORTS, true).unwrap();
        let mut locator = MemoryLocator::new()
            .with_document("mem://defs/root.wsdl", ROOT)
            .with_base("mem://defs/root.wsdl");
        let err = reader.read_wsdl_with_locator(&mut locator).unwrap_err();
        assert!(err.is(FaultCode::OtherError));
        assert!(err.message.contains("Unable to locate imported document at 'a.wsdl'"));
        assert!(err.location.unwrap().ends_with("import"));
    }

    #[test]
    fn test_import_cycle_terminates() {
        let a = r#"<definitions xmlns="http://schemas.xmlsoap.org/wsdl/" name="A" targetNamespace="urn:a">
          <import namespace="urn:b" location="b.wsdl"/>
        </definitions>"#;
        let b = r#"<definitions xmlns="http://schemas.xmlsoap.org/wsdl/" targetNamespace="urn:b">
          <import namespace="urn:a" location="a.wsdl"/>
          <message name="M"/>
        </definitions>"#;
        let def = read(
            MemoryLocator::new()
                .with_document("mem://defs/a.wsdl", a)
                .with_document("mem://defs/b.wsdl", b)
                .with_base("mem://defs/a.wsdl"),
        )
        .unwrap();

        let b_def = def.imports("urn:b")[0].definition().unwrap();
        let b_def = b_def.borrow();
        assert!(b_def.message(&QName::namespaced("urn:b", "M")).is_some());
        let back_edge = &b_def.imports("urn:a")[0];
        assert!(back_edge.definition.as_ref().unwrap().is_cycle());

        // the back-edge still reaches the root after the read returned
        let root = back_edge.definition().unwrap();
        assert_eq!(root.borrow().qname, Some(QName::namespaced("urn:a", "A")));
        assert_eq!(root.borrow().qname, def.qname);
    }

    #[test]
    fn test_schema_import_wrapped_in_types() {
        let root = r#"<definitions xmlns="http://schemas.xmlsoap.org/wsdl/" targetNamespace="urn:root">
          <import namespace="urn:s" location="s.xsd"/>
        </definitions>"#;
        let schema = r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:s"/>"#;
        let def = read(
            MemoryLocator::new()
                .with_document("mem://defs/root.wsdl", root)
                .with_document("mem://defs/s.xsd", schema)
                .with_base("mem://defs/root.wsdl"),
        )
        .unwrap();

        let target = def.imports("urn:s")[0].definition().unwrap();
        let target = target.borrow();
        let types = target.types.as_ref().unwrap();
        let ext = types.extensibility_elements[0].as_unknown().unwrap();
        assert_eq!(ext.element.local_name(), "schema");
        assert_eq!(target.document_base_uri.as_deref(), Some("mem://defs/s.xsd"));
    }

    #[test]
    fn test_malformed_import_fails() {
        let def = read(
            MemoryLocator::new()
                .with_document("mem://defs/root.wsdl", ROOT)
                .with_document("mem://defs/a.wsdl", "<definitions")
                .with_base("mem://defs/root.wsdl"),
        );
        let err = def.unwrap_err();
        assert!(err.is(FaultCode::ParserError));
        assert!(err.message.contains("mem://defs/a.wsdl"));
    }

    #[test]
    fn test_import_documents_disabled() {
        let mut reader = reader();
        reader
            .set_feature(crate::reader::FEATURE_IMPORT_DOCUMENTS, false)
            .unwrap();
        let mut locator = MemoryLocator::new()
            .with_document("mem://defs/root.wsdl", ROOT)
            .with_document("mem://defs/a.wsdl", IMPORTED)
            .with_base("mem://defs/root.wsdl");
        let def = reader.read_wsdl_with_locator(&mut locator).unwrap();
        assert!(def.imports("urn:a")[0].definition.is_none());
    }
}
