//! HTTP GET/POST binding extensions (`http://schemas.xmlsoap.org/wsdl/http/`)

use super::{
    parse_required, wrong_variant, ExtensionDeserializer, ExtensionOwner, ExtensionRegistry,
    ExtensionRegistryBuilder, ExtensionSerializer, XmlSink,
};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::model::definition::Definition;
use crate::model::extensible::ExtensibilityElement;
use crate::namespaces::QName;
use std::sync::Arc;

/// HTTP binding namespace
pub const HTTP_NAMESPACE: &str = "http://schemas.xmlsoap.org/wsdl/http/";

fn http_qname(local_name: &str) -> QName {
    QName::namespaced(HTTP_NAMESPACE, local_name)
}

/// `http:binding`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpBinding {
    /// Element name
    pub element_type: QName,
    /// `wsdl:required`
    pub required: Option<bool>,
    /// HTTP verb, e.g. `GET`
    pub verb: Option<String>,
}

impl HttpBinding {
    /// Empty `http:binding`
    pub fn new() -> Self {
        Self {
            element_type: http_qname("binding"),
            required: None,
            verb: None,
        }
    }
}

impl Default for HttpBinding {
    fn default() -> Self {
        Self::new()
    }
}

/// `http:operation`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOperation {
    /// Element name
    pub element_type: QName,
    /// `wsdl:required`
    pub required: Option<bool>,
    /// Relative URI of the operation
    pub location_uri: Option<String>,
}

impl HttpOperation {
    /// Empty `http:operation`
    pub fn new() -> Self {
        Self {
            element_type: http_qname("operation"),
            required: None,
            location_uri: None,
        }
    }
}

impl Default for HttpOperation {
    fn default() -> Self {
        Self::new()
    }
}

/// `http:address`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpAddress {
    /// Element name
    pub element_type: QName,
    /// `wsdl:required`
    pub required: Option<bool>,
    /// Base URI of the endpoint
    pub location_uri: Option<String>,
}

impl HttpAddress {
    /// Empty `http:address`
    pub fn new() -> Self {
        Self {
            element_type: http_qname("address"),
            required: None,
            location_uri: None,
        }
    }
}

impl Default for HttpAddress {
    fn default() -> Self {
        Self::new()
    }
}

/// `http:urlEncoded`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpUrlEncoded {
    /// Element name
    pub element_type: QName,
    /// `wsdl:required`
    pub required: Option<bool>,
}

impl HttpUrlEncoded {
    /// Empty `http:urlEncoded`
    pub fn new() -> Self {
        Self {
            element_type: http_qname("urlEncoded"),
            required: None,
        }
    }
}

impl Default for HttpUrlEncoded {
    fn default() -> Self {
        Self::new()
    }
}

/// `http:urlReplacement`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpUrlReplacement {
    /// Element name
    pub element_type: QName,
    /// `wsdl:required`
    pub required: Option<bool>,
}

impl HttpUrlReplacement {
    /// Empty `http:urlReplacement`
    pub fn new() -> Self {
        Self {
            element_type: http_qname("urlReplacement"),
            required: None,
        }
    }
}

impl Default for HttpUrlReplacement {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads and writes every HTTP extension element
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpExtensions;

/// Register the HTTP plugin for the owners the binding allows
pub fn register(builder: ExtensionRegistryBuilder) -> ExtensionRegistryBuilder {
    let plugin = Arc::new(HttpExtensions);
    [
        (ExtensionOwner::Binding, "binding"),
        (ExtensionOwner::BindingOperation, "operation"),
        (ExtensionOwner::BindingInput, "urlEncoded"),
        (ExtensionOwner::BindingInput, "urlReplacement"),
        (ExtensionOwner::Port, "address"),
    ]
    .into_iter()
    .fold(builder, |builder, (owner, local_name)| {
        builder.register(owner, http_qname(local_name), plugin.clone())
    })
}

impl ExtensionDeserializer for HttpExtensions {
    fn unmarshall(
        &self,
        _owner: ExtensionOwner,
        element_type: &QName,
        element: &Element,
        _definition: &Definition,
        _registry: &ExtensionRegistry,
    ) -> Result<ExtensibilityElement> {
        let required = parse_required(element);
        let element_type = element_type.clone();
        let location_uri = element.attribute("location").map(str::to_string);
        Ok(match element.local_name() {
            "binding" => ExtensibilityElement::HttpBinding(HttpBinding {
                element_type,
                required,
                verb: element.attribute("verb").map(str::to_string),
            }),
            "operation" => ExtensibilityElement::HttpOperation(HttpOperation {
                element_type,
                required,
                location_uri,
            }),
            "address" => ExtensibilityElement::HttpAddress(HttpAddress {
                element_type,
                required,
                location_uri,
            }),
            "urlEncoded" => ExtensibilityElement::HttpUrlEncoded(HttpUrlEncoded {
                element_type,
                required,
            }),
            "urlReplacement" => ExtensibilityElement::HttpUrlReplacement(HttpUrlReplacement {
                element_type,
                required,
            }),
            _ => {
                return Err(Error::invalid_wsdl(format!(
                    "Unsupported HTTP element '{}'.",
                    element.name
                ))
                .with_location(&element.location))
            }
        })
    }
}

impl ExtensionSerializer for HttpExtensions {
    fn marshall(
        &self,
        _owner: ExtensionOwner,
        element_type: &QName,
        extension: &ExtensibilityElement,
        sink: &mut XmlSink<'_>,
        _definition: &Definition,
        _registry: &ExtensionRegistry,
    ) -> Result<()> {
        let mut element = sink.element(element_type);
        let (name, value) = match extension {
            ExtensibilityElement::HttpBinding(e) => ("verb", e.verb.as_deref()),
            ExtensibilityElement::HttpOperation(e) => ("location", e.location_uri.as_deref()),
            ExtensibilityElement::HttpAddress(e) => ("location", e.location_uri.as_deref()),
            ExtensibilityElement::HttpUrlEncoded(_)
            | ExtensibilityElement::HttpUrlReplacement(_) => ("", None),
            other => return Err(wrong_variant("HTTP", other)),
        };
        if let Some(value) = value {
            element.set_local_attribute(name, value);
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

    #[test]
    fn test_read_binding_verb() {
        let doc = Document::from_string(
            r#"<http:binding xmlns:http="http://schemas.xmlsoap.org/wsdl/http/" verb="POST"/>"#,
        )
        .unwrap();
        let registry = ExtensionRegistry::populated();
        let ext = HttpExtensions
            .unmarshall(
                ExtensionOwner::Binding,
                &doc.root().name,
                doc.root(),
                &Definition::new(),
                &registry,
            )
            .unwrap();
        assert_eq!(
            ext,
            ExtensibilityElement::HttpBinding(HttpBinding {
                verb: Some("POST".to_string()),
                ..HttpBinding::new()
            })
        );
    }

    #[test]
    fn test_url_encoded_not_registered_for_output() {
        let registry = ExtensionRegistry::populated();
        let outputs = registry.allowable_extensions(ExtensionOwner::BindingOutput);
        assert!(!outputs.contains(&http_qname("urlEncoded")));
        assert!(registry
            .allowable_extensions(ExtensionOwner::BindingInput)
            .contains(&http_qname("urlReplacement")));
    }
}
