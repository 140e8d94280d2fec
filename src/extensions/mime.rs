//! MIME binding extensions (`http://schemas.xmlsoap.org/wsdl/mime/`)
//!
//! `mime:multipartRelated` is the one built-in extension with nested
//! extensibility: each `mime:part` holds further elements that are read and
//! written through the registry with [`ExtensionOwner::MimePart`].

use super::{
    expect_element, marshall_child, parse_required, unmarshall_child, wrong_variant,
    ExtensionDeserializer, ExtensionOwner, ExtensionRegistry, ExtensionRegistryBuilder,
    ExtensionSerializer, XmlSink,
};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::model::definition::Definition;
use crate::model::extensible::ExtensibilityElement;
use crate::namespaces::QName;
use std::sync::Arc;

/// MIME binding namespace
pub const MIME_NAMESPACE: &str = "http://schemas.xmlsoap.org/wsdl/mime/";

fn mime_qname(local_name: &str) -> QName {
    QName::namespaced(MIME_NAMESPACE, local_name)
}

/// `mime:content`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeContent {
    /// Element name
    pub element_type: QName,
    /// `wsdl:required`
    pub required: Option<bool>,
    /// Message part carried
    pub part: Option<String>,
    /// MIME type
    pub type_: Option<String>,
}

impl MimeContent {
    /// Empty `mime:content`
    pub fn new() -> Self {
        Self {
            element_type: mime_qname("content"),
            required: None,
            part: None,
            type_: None,
        }
    }
}

impl Default for MimeContent {
    fn default() -> Self {
        Self::new()
    }
}

/// `mime:part` inside `mime:multipartRelated`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MimePart {
    /// `wsdl:required`
    pub required: Option<bool>,
    /// Content description of this part
    pub extensibility_elements: Vec<ExtensibilityElement>,
}

/// `mime:multipartRelated`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeMultipartRelated {
    /// Element name
    pub element_type: QName,
    /// `wsdl:required`
    pub required: Option<bool>,
    /// Parts in document order
    pub mime_parts: Vec<MimePart>,
}

impl MimeMultipartRelated {
    /// Empty `mime:multipartRelated`
    pub fn new() -> Self {
        Self {
            element_type: mime_qname("multipartRelated"),
            required: None,
            mime_parts: Vec::new(),
        }
    }
}

impl Default for MimeMultipartRelated {
    fn default() -> Self {
        Self::new()
    }
}

/// `mime:mimeXml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeXml {
    /// Element name
    pub element_type: QName,
    /// `wsdl:required`
    pub required: Option<bool>,
    /// Message part carried
    pub part: Option<String>,
}

impl MimeXml {
    /// Empty `mime:mimeXml`
    pub fn new() -> Self {
        Self {
            element_type: mime_qname("mimeXml"),
            required: None,
            part: None,
        }
    }
}

impl Default for MimeXml {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads and writes every MIME extension element
#[derive(Debug, Clone, Copy, Default)]
pub struct MimeExtensions;

/// Register the MIME plugin for the owners the binding allows
pub fn register(builder: ExtensionRegistryBuilder) -> ExtensionRegistryBuilder {
    let plugin = Arc::new(MimeExtensions);
    let owners = [
        ExtensionOwner::BindingInput,
        ExtensionOwner::BindingOutput,
        ExtensionOwner::MimePart,
    ];
    let mut builder = builder;
    for owner in owners {
        for local_name in ["content", "multipartRelated", "mimeXml"] {
            builder = builder.register(owner, mime_qname(local_name), plugin.clone());
        }
    }
    builder
}

fn read_mime_part(
    element: &Element,
    definition: &Definition,
    registry: &ExtensionRegistry,
) -> Result<MimePart> {
    expect_element(element, MIME_NAMESPACE, "part")?;
    let extensibility_elements = element
        .elements()
        .map(|child| unmarshall_child(ExtensionOwner::MimePart, child, definition, registry))
        .collect::<Result<Vec<_>>>()?;
    Ok(MimePart {
        required: parse_required(element),
        extensibility_elements,
    })
}

impl ExtensionDeserializer for MimeExtensions {
    fn unmarshall(
        &self,
        _owner: ExtensionOwner,
        element_type: &QName,
        element: &Element,
        definition: &Definition,
        registry: &ExtensionRegistry,
    ) -> Result<ExtensibilityElement> {
        let required = parse_required(element);
        let element_type = element_type.clone();
        let part = element.attribute("part").map(str::to_string);
        Ok(match element.local_name() {
            "content" => ExtensibilityElement::MimeContent(MimeContent {
                element_type,
                required,
                part,
                type_: element.attribute("type").map(str::to_string),
            }),
            "mimeXml" => ExtensibilityElement::MimeXml(MimeXml {
                element_type,
                required,
                part,
            }),
            "multipartRelated" => {
                let mime_parts = element
                    .elements()
                    .map(|child| read_mime_part(child, definition, registry))
                    .collect::<Result<Vec<_>>>()?;
                ExtensibilityElement::MimeMultipartRelated(MimeMultipartRelated {
                    element_type,
                    required,
                    mime_parts,
                })
            }
            _ => {
                return Err(Error::invalid_wsdl(format!(
                    "Unsupported MIME element '{}'.",
                    element.name
                ))
                .with_location(&element.location))
            }
        })
    }
}

impl ExtensionSerializer for MimeExtensions {
    fn marshall(
        &self,
        _owner: ExtensionOwner,
        element_type: &QName,
        extension: &ExtensibilityElement,
        sink: &mut XmlSink<'_>,
        definition: &Definition,
        registry: &ExtensionRegistry,
    ) -> Result<()> {
        let mut element = sink.element(element_type);
        match extension {
            ExtensibilityElement::MimeContent(e) => {
                if let Some(part) = &e.part {
                    element.set_local_attribute("part", part.as_str());
                }
                if let Some(type_) = &e.type_ {
                    element.set_local_attribute("type", type_.as_str());
                }
            }
            ExtensibilityElement::MimeXml(e) => {
                if let Some(part) = &e.part {
                    element.set_local_attribute("part", part.as_str());
                }
            }
            ExtensibilityElement::MimeMultipartRelated(e) => {
                for mime_part in &e.mime_parts {
                    let mut part_element = sink.element(&mime_qname("part"));
                    sink.set_required(&mut part_element, mime_part.required);
                    {
                        let mut nested = sink.nested(&mut part_element);
                        for child in &mime_part.extensibility_elements {
                            marshall_child(
                                ExtensionOwner::MimePart,
                                child,
                                &mut nested,
                                definition,
                                registry,
                            )?;
                        }
                    }
                    element.push_element(part_element);
                }
            }
            other => return Err(wrong_variant("MIME", other)),
        }
        sink.set_required(&mut element, extension.required());
        sink.push(element);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;
    use crate::error::FaultCode;
    use crate::extensions::soap::SOAP_NAMESPACE;
    use crate::namespaces::NamespaceContext;

    const MULTIPART: &str = r#"<mime:multipartRelated xmlns:mime="http://schemas.xmlsoap.org/wsdl/mime/" xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/">
  <mime:part>
    <soap:body use="literal"/>
  </mime:part>
  <mime:part>
    <mime:content part="photo" type="image/jpeg"/>
  </mime:part>
</mime:multipartRelated>"#;

    fn read(xml: &str) -> Result<ExtensibilityElement> {
        let doc = Document::from_string(xml).unwrap();
        let registry = ExtensionRegistry::populated();
        MimeExtensions.unmarshall(
            ExtensionOwner::BindingInput,
            &doc.root().name,
            doc.root(),
            &Definition::new(),
            &registry,
        )
    }

    #[test]
    fn test_multipart_nested_extensions() {
        let ext = read(MULTIPART).unwrap();
        let ExtensibilityElement::MimeMultipartRelated(multipart) = &ext else {
            panic!("expected mime:multipartRelated");
        };
        assert_eq!(multipart.mime_parts.len(), 2);
        assert_eq!(
            multipart.mime_parts[0].extensibility_elements[0].element_type(),
            &QName::namespaced(SOAP_NAMESPACE, "body")
        );
        assert!(matches!(
            multipart.mime_parts[1].extensibility_elements[0],
            ExtensibilityElement::MimeContent(_)
        ));
    }

    #[test]
    fn test_multipart_rejects_non_part_child() {
        let err = read(
            r#"<mime:multipartRelated xmlns:mime="http://schemas.xmlsoap.org/wsdl/mime/"><mime:content/></mime:multipartRelated>"#,
        )
        .unwrap_err();
        assert!(err.is(FaultCode::InvalidWsdl));
    }

    #[test]
    fn test_multipart_written_back() {
        let ext = read(MULTIPART).unwrap();
        let registry = ExtensionRegistry::populated();
        let def = Definition::new();
        let mut namespaces = NamespaceContext::new();
        namespaces.add_prefix("mime", MIME_NAMESPACE);
        namespaces.add_prefix("soap", SOAP_NAMESPACE);
        let mut parent = Element::new(QName::local("input"));
        let mut sink = XmlSink::new(&mut parent, &mut namespaces);
        MimeExtensions
            .marshall(
                ExtensionOwner::BindingInput,
                ext.element_type(),
                &ext,
                &mut sink,
                &def,
                &registry,
            )
            .unwrap();

        let written = parent.elements().next().unwrap();
        let original = Document::from_string(MULTIPART).unwrap();
        assert_eq!(written, original.root());
    }
}
