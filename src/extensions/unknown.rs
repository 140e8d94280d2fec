//! Fallback plugin keeping unrecognized elements verbatim

use super::{
    parse_required, wrong_variant, ExtensionDeserializer, ExtensionOwner, ExtensionRegistry,
    ExtensionSerializer, XmlSink,
};
use crate::documents::Element;
use crate::error::Result;
use crate::model::definition::Definition;
use crate::model::extensible::{ExtensibilityElement, UnknownExtensibilityElement};
use crate::namespaces::QName;

/// Writes an unknown element back as it was read
#[derive(Debug, Clone, Copy, Default)]
pub struct UnknownExtensionSerializer;

impl ExtensionSerializer for UnknownExtensionSerializer {
    fn marshall(
        &self,
        _owner: ExtensionOwner,
        _element_type: &QName,
        extension: &ExtensibilityElement,
        sink: &mut XmlSink<'_>,
        _definition: &Definition,
        _registry: &ExtensionRegistry,
    ) -> Result<()> {
        let unknown = extension
            .as_unknown()
            .ok_or_else(|| wrong_variant("unknown", extension))?;
        sink.push_fragment(&unknown.element);
        Ok(())
    }
}

/// Captures any element as an [`UnknownExtensibilityElement`]
#[derive(Debug, Clone, Copy, Default)]
pub struct UnknownExtensionDeserializer;

impl ExtensionDeserializer for UnknownExtensionDeserializer {
    fn unmarshall(
        &self,
        _owner: ExtensionOwner,
        element_type: &QName,
        element: &Element,
        _definition: &Definition,
        _registry: &ExtensionRegistry,
    ) -> Result<ExtensibilityElement> {
        tracing::debug!(element = %element_type, "keeping unrecognized extension element");
        Ok(ExtensibilityElement::Unknown(UnknownExtensibilityElement {
            element_type: element_type.clone(),
            required: parse_required(element),
            element: element.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;
    use crate::namespaces::NamespaceContext;

    #[test]
    fn test_unknown_round_trip_through_sink() {
        let doc = Document::from_string(
            r#"<x:policy xmlns:x="urn:x" xmlns:w="http://schemas.xmlsoap.org/wsdl/" w:required="true" level="2"><x:rule>on</x:rule></x:policy>"#,
        )
        .unwrap();
        let element = doc.root();
        let registry = ExtensionRegistry::populated();
        let def = Definition::new();

        let ext = UnknownExtensionDeserializer
            .unmarshall(ExtensionOwner::Definition, &element.name, element, &def, &registry)
            .unwrap();
        assert_eq!(ext.required(), Some(true));

        let mut parent = Element::new(QName::local("holder"));
        let mut namespaces = NamespaceContext::new();
        let mut sink = XmlSink::new(&mut parent, &mut namespaces);
        UnknownExtensionSerializer
            .marshall(
                ExtensionOwner::Definition,
                &element.name,
                &ext,
                &mut sink,
                &def,
                &registry,
            )
            .unwrap();

        let written = parent.elements().next().unwrap();
        assert_eq!(written, element);
    }
}
