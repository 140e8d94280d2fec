//! SOAP 1.1 binding extensions (`http://schemas.xmlsoap.org/wsdl/soap/`)

use super::{
    expect_element, parse_required, qname_attribute, wrong_variant, ExtensionDeserializer,
    ExtensionOwner, ExtensionRegistry, ExtensionRegistryBuilder, ExtensionSerializer, XmlSink,
};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::model::definition::Definition;
use crate::model::extensible::ExtensibilityElement;
use crate::names::{join_nmtokens, parse_nmtokens};
use crate::namespaces::QName;
use std::sync::Arc;

/// SOAP binding namespace
pub const SOAP_NAMESPACE: &str = "http://schemas.xmlsoap.org/wsdl/soap/";

fn soap_qname(local_name: &str) -> QName {
    QName::namespaced(SOAP_NAMESPACE, local_name)
}

/// `soap:binding`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapBinding {
    /// Element name
    pub element_type: QName,
    /// `wsdl:required`
    pub required: Option<bool>,
    /// `rpc` or `document`
    pub style: Option<String>,
    /// Transport URI
    pub transport_uri: Option<String>,
}

impl SoapBinding {
    /// Empty `soap:binding`
    pub fn new() -> Self {
        Self {
            element_type: soap_qname("binding"),
            required: None,
            style: None,
            transport_uri: None,
        }
    }
}

impl Default for SoapBinding {
    fn default() -> Self {
        Self::new()
    }
}

/// `soap:operation`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapOperation {
    /// Element name
    pub element_type: QName,
    /// `wsdl:required`
    pub required: Option<bool>,
    /// Value of `soapAction`
    pub soap_action_uri: Option<String>,
    /// Per-operation style override
    pub style: Option<String>,
}

impl SoapOperation {
    /// Empty `soap:operation`
    pub fn new() -> Self {
        Self {
            element_type: soap_qname("operation"),
            required: None,
            soap_action_uri: None,
            style: None,
        }
    }
}

impl Default for SoapOperation {
    fn default() -> Self {
        Self::new()
    }
}

/// `soap:body`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapBody {
    /// Element name
    pub element_type: QName,
    /// `wsdl:required`
    pub required: Option<bool>,
    /// Message parts carried in the body
    pub parts: Option<Vec<String>>,
    /// `literal` or `encoded`
    pub use_: Option<String>,
    /// Values of `encodingStyle`
    pub encoding_styles: Option<Vec<String>>,
    /// Value of `namespace`
    pub namespace_uri: Option<String>,
}

impl SoapBody {
    /// Empty `soap:body`
    pub fn new() -> Self {
        Self {
            element_type: soap_qname("body"),
            required: None,
            parts: None,
            use_: None,
            encoding_styles: None,
            namespace_uri: None,
        }
    }
}

impl Default for SoapBody {
    fn default() -> Self {
        Self::new()
    }
}

/// `soap:headerfault` inside a `soap:header`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapHeaderFault {
    /// Element name
    pub element_type: QName,
    /// `wsdl:required`
    pub required: Option<bool>,
    /// Message holding the fault part
    pub message: Option<QName>,
    /// Part of that message
    pub part: Option<String>,
    /// `literal` or `encoded`
    pub use_: Option<String>,
    /// Values of `encodingStyle`
    pub encoding_styles: Option<Vec<String>>,
    /// Value of `namespace`
    pub namespace_uri: Option<String>,
}

impl SoapHeaderFault {
    /// Empty `soap:headerfault`
    pub fn new() -> Self {
        Self {
            element_type: soap_qname("headerfault"),
            required: None,
            message: None,
            part: None,
            use_: None,
            encoding_styles: None,
            namespace_uri: None,
        }
    }
}

impl Default for SoapHeaderFault {
    fn default() -> Self {
        Self::new()
    }
}

/// `soap:header`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapHeader {
    /// Element name
    pub element_type: QName,
    /// `wsdl:required`
    pub required: Option<bool>,
    /// Message holding the header part
    pub message: Option<QName>,
    /// Part of that message
    pub part: Option<String>,
    /// `literal` or `encoded`
    pub use_: Option<String>,
    /// Values of `encodingStyle`
    pub encoding_styles: Option<Vec<String>>,
    /// Value of `namespace`
    pub namespace_uri: Option<String>,
    /// `soap:headerfault` children
    pub header_faults: Vec<SoapHeaderFault>,
}

impl SoapHeader {
    /// Empty `soap:header`
    pub fn new() -> Self {
        Self {
            element_type: soap_qname("header"),
            required: None,
            message: None,
            part: None,
            use_: None,
            encoding_styles: None,
            namespace_uri: None,
            header_faults: Vec::new(),
        }
    }
}

impl Default for SoapHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// `soap:fault`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    /// Element name
    pub element_type: QName,
    /// `wsdl:required`
    pub required: Option<bool>,
    /// Fault name
    pub name: Option<String>,
    /// `literal` or `encoded`
    pub use_: Option<String>,
    /// Values of `encodingStyle`
    pub encoding_styles: Option<Vec<String>>,
    /// Value of `namespace`
    pub namespace_uri: Option<String>,
}

impl SoapFault {
    /// Empty `soap:fault`
    pub fn new() -> Self {
        Self {
            element_type: soap_qname("fault"),
            required: None,
            name: None,
            use_: None,
            encoding_styles: None,
            namespace_uri: None,
        }
    }
}

impl Default for SoapFault {
    fn default() -> Self {
        Self::new()
    }
}

/// `soap:address`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapAddress {
    /// Element name
    pub element_type: QName,
    /// `wsdl:required`
    pub required: Option<bool>,
    /// Endpoint URI
    pub location_uri: Option<String>,
}

impl SoapAddress {
    /// Empty `soap:address`
    pub fn new() -> Self {
        Self {
            element_type: soap_qname("address"),
            required: None,
            location_uri: None,
        }
    }
}

impl Default for SoapAddress {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads and writes every SOAP extension element
#[derive(Debug, Clone, Copy, Default)]
pub struct SoapExtensions;

/// Register the SOAP plugin for the owners the binding allows
pub fn register(builder: ExtensionRegistryBuilder) -> ExtensionRegistryBuilder {
    use ExtensionOwner::*;
    let plugin = Arc::new(SoapExtensions);
    [
        (Binding, "binding"),
        (BindingOperation, "operation"),
        (BindingInput, "body"),
        (BindingOutput, "body"),
        (MimePart, "body"),
        (BindingInput, "header"),
        (BindingOutput, "header"),
        (BindingFault, "fault"),
        (Port, "address"),
    ]
    .into_iter()
    .fold(builder, |builder, (owner, local_name)| {
        builder.register(owner, soap_qname(local_name), plugin.clone())
    })
}

fn string_attr(element: &Element, name: &str) -> Option<String> {
    element.attribute(name).map(str::to_string)
}

fn list_attr(element: &Element, name: &str) -> Option<Vec<String>> {
    element.attribute(name).map(parse_nmtokens)
}

fn set_opt(element: &mut Element, name: &str, value: &Option<String>) {
    if let Some(value) = value {
        element.set_local_attribute(name, value.as_str());
    }
}

fn set_list(element: &mut Element, name: &str, value: &Option<Vec<String>>) {
    if let Some(joined) = value.as_deref().and_then(join_nmtokens) {
        element.set_local_attribute(name, joined);
    }
}

fn read_header_fault(element: &Element) -> Result<SoapHeaderFault> {
    expect_element(element, SOAP_NAMESPACE, "headerfault")?;
    Ok(SoapHeaderFault {
        element_type: element.name.clone(),
        required: parse_required(element),
        message: qname_attribute(element, "message")?,
        part: string_attr(element, "part"),
        use_: string_attr(element, "use"),
        encoding_styles: list_attr(element, "encodingStyle"),
        namespace_uri: string_attr(element, "namespace"),
    })
}

impl ExtensionDeserializer for SoapExtensions {
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
        let extension = match element.local_name() {
            "binding" => ExtensibilityElement::SoapBinding(SoapBinding {
                element_type,
                required,
                style: string_attr(element, "style"),
                transport_uri: string_attr(element, "transport"),
            }),
            "operation" => ExtensibilityElement::SoapOperation(SoapOperation {
                element_type,
                required,
                soap_action_uri: string_attr(element, "soapAction"),
                style: string_attr(element, "style"),
            }),
            "body" => ExtensibilityElement::SoapBody(SoapBody {
                element_type,
                required,
                parts: list_attr(element, "parts"),
                use_: string_attr(element, "use"),
                encoding_styles: list_attr(element, "encodingStyle"),
                namespace_uri: string_attr(element, "namespace"),
            }),
            "header" => {
                let header_faults = element
                    .elements()
                    .map(read_header_fault)
                    .collect::<Result<Vec<_>>>()?;
                ExtensibilityElement::SoapHeader(SoapHeader {
                    element_type,
                    required,
                    message: qname_attribute(element, "message")?,
                    part: string_attr(element, "part"),
                    use_: string_attr(element, "use"),
                    encoding_styles: list_attr(element, "encodingStyle"),
                    namespace_uri: string_attr(element, "namespace"),
                    header_faults,
                })
            }
            "fault" => ExtensibilityElement::SoapFault(SoapFault {
                element_type,
                required,
                name: string_attr(element, "name"),
                use_: string_attr(element, "use"),
                encoding_styles: list_attr(element, "encodingStyle"),
                namespace_uri: string_attr(element, "namespace"),
            }),
            "address" => ExtensibilityElement::SoapAddress(SoapAddress {
                element_type,
                required,
                location_uri: string_attr(element, "location"),
            }),
            _ => {
                return Err(Error::invalid_wsdl(format!(
                    "Unsupported SOAP element '{}'.",
                    element.name
                ))
                .with_location(&element.location))
            }
        };
        Ok(extension)
    }
}

impl ExtensionSerializer for SoapExtensions {
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
        match extension {
            ExtensibilityElement::SoapBinding(e) => {
                set_opt(&mut element, "style", &e.style);
                set_opt(&mut element, "transport", &e.transport_uri);
            }
            ExtensibilityElement::SoapOperation(e) => {
                set_opt(&mut element, "soapAction", &e.soap_action_uri);
                set_opt(&mut element, "style", &e.style);
            }
            ExtensibilityElement::SoapBody(e) => {
                set_list(&mut element, "parts", &e.parts);
                set_opt(&mut element, "use", &e.use_);
                set_list(&mut element, "encodingStyle", &e.encoding_styles);
                set_opt(&mut element, "namespace", &e.namespace_uri);
            }
            ExtensibilityElement::SoapHeader(e) => {
                if let Some(message) = &e.message {
                    let value = sink.qualified_value(message);
                    element.set_local_attribute("message", value);
                }
                set_opt(&mut element, "part", &e.part);
                set_opt(&mut element, "use", &e.use_);
                set_list(&mut element, "encodingStyle", &e.encoding_styles);
                set_opt(&mut element, "namespace", &e.namespace_uri);
                for fault in &e.header_faults {
                    let mut child = sink.element(&fault.element_type);
                    if let Some(message) = &fault.message {
                        let value = sink.qualified_value(message);
                        child.set_local_attribute("message", value);
                    }
                    set_opt(&mut child, "part", &fault.part);
                    set_opt(&mut child, "use", &fault.use_);
                    set_list(&mut child, "encodingStyle", &fault.encoding_styles);
                    set_opt(&mut child, "namespace", &fault.namespace_uri);
                    sink.set_required(&mut child, fault.required);
                    element.push_element(child);
                }
            }
            ExtensibilityElement::SoapFault(e) => {
                set_opt(&mut element, "name", &e.name);
                set_opt(&mut element, "use", &e.use_);
                set_list(&mut element, "encodingStyle", &e.encoding_styles);
                set_opt(&mut element, "namespace", &e.namespace_uri);
            }
            ExtensibilityElement::SoapAddress(e) => {
                set_opt(&mut element, "location", &e.location_uri);
            }
            other => return Err(wrong_variant("SOAP", other)),
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
    use crate::namespaces::NamespaceContext;

    fn read(xml: &str, owner: ExtensionOwner) -> Result<ExtensibilityElement> {
        let doc = Document::from_string(xml).unwrap();
        let registry = ExtensionRegistry::populated();
        let def = Definition::new();
        let element = doc.root();
        registry
            .query_deserializer(owner, &element.name)?
            .unmarshall(owner, &element.name, element, &def, &registry)
    }

    #[test]
    fn test_read_binding() {
        let ext = read(
            r#"<soap:binding xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/" style="document" transport="http://schemas.xmlsoap.org/soap/http"/>"#,
            ExtensionOwner::Binding,
        )
        .unwrap();
        match ext {
            ExtensibilityElement::SoapBinding(b) => {
                assert_eq!(b.style.as_deref(), Some("document"));
                assert_eq!(
                    b.transport_uri.as_deref(),
                    Some("http://schemas.xmlsoap.org/soap/http")
                );
                assert_eq!(b.required, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_read_body_lists() {
        let ext = read(
            r#"<soap:body xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/" parts="a  b" use="encoded" encodingStyle="urn:e1 urn:e2" namespace="urn:n"/>"#,
            ExtensionOwner::BindingInput,
        )
        .unwrap();
        let ExtensibilityElement::SoapBody(body) = ext else {
            panic!("expected soap:body");
        };
        assert_eq!(body.parts, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(body.encoding_styles.unwrap().len(), 2);
        assert_eq!(body.use_.as_deref(), Some("encoded"));
    }

    #[test]
    fn test_read_header_with_faults() {
        let ext = read(
            r#"<soap:header xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/" xmlns:tns="urn:t" message="tns:Hdr" part="auth" use="literal">
                 <soap:headerfault message="tns:HdrFault" part="reason" use="literal"/>
               </soap:header>"#,
            ExtensionOwner::BindingInput,
        )
        .unwrap();
        let ExtensibilityElement::SoapHeader(header) = ext else {
            panic!("expected soap:header");
        };
        assert_eq!(header.message, Some(QName::namespaced("urn:t", "Hdr")));
        assert_eq!(header.header_faults.len(), 1);
        assert_eq!(
            header.header_faults[0].message,
            Some(QName::namespaced("urn:t", "HdrFault"))
        );
    }

    #[test]
    fn test_header_rejects_foreign_child() {
        let err = read(
            r#"<soap:header xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/" message="Hdr"><soap:body/></soap:header>"#,
            ExtensionOwner::BindingInput,
        )
        .unwrap_err();
        assert!(err.is(FaultCode::InvalidWsdl));
    }

    #[test]
    fn test_write_address_and_required() {
        let mut address = SoapAddress::new();
        address.location_uri = Some("http://example.com/svc".to_string());
        address.required = Some(false);
        let ext = ExtensibilityElement::SoapAddress(address);

        let mut namespaces = NamespaceContext::new();
        namespaces.add_prefix("soap", SOAP_NAMESPACE);
        namespaces.add_prefix("wsdl", crate::WSDL_NAMESPACE);
        let mut parent = Element::new(QName::local("port"));
        let registry = ExtensionRegistry::populated();
        let def = Definition::new();
        let mut sink = XmlSink::new(&mut parent, &mut namespaces);
        SoapExtensions
            .marshall(
                ExtensionOwner::Port,
                ext.element_type(),
                &ext,
                &mut sink,
                &def,
                &registry,
            )
            .unwrap();

        let written = parent.elements().next().unwrap();
        assert_eq!(written.qualified_name(), "soap:address");
        assert_eq!(written.attribute("location"), Some("http://example.com/svc"));
        assert_eq!(
            written.attribute_ns(&crate::constants::required_attr()),
            Some("false")
        );
    }
}
