//! Reader integration tests
//!
//! Fixtures live in tests/fixtures and are read from disk through the
//! file-system loader.

use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::Arc;
use wsdl::extensions::soap::SOAP_NAMESPACE;
use wsdl::model::{Definition, ExtensibilityElement, OperationType};
use wsdl::{ExtensionRegistry, FaultCode, QName, WsdlReader, WsdlWriter};

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn reader() -> WsdlReader {
    WsdlReader::new().with_extension_registry(Arc::new(ExtensionRegistry::populated()))
}

fn read_fixture(name: &str) -> Definition {
    reader()
        .read_wsdl(fixture(name).to_str().unwrap())
        .unwrap_or_else(|e| panic!("failed to read {}: {}", name, e))
}

// ============================================================================
// Basic structure
// ============================================================================

#[test]
fn test_minimal_five_element_document() {
    let def = read_fixture("minimal.wsdl");
    let ns = "http://example";

    assert_eq!(def.messages().count(), 1);
    let message = def.message(&QName::namespaced(ns, "Get")).unwrap();
    let part = message.part("body").unwrap();
    assert_eq!(part.type_name, Some(QName::namespaced(ns, "GetType")));

    assert_eq!(def.port_types().count(), 1);
    let port_type = def.port_type(&QName::namespaced(ns, "Svc")).unwrap();
    assert_eq!(port_type.operations().len(), 1);
    assert_eq!(port_type.operations()[0].style, Some(OperationType::OneWay));

    assert_eq!(def.bindings().count(), 1);
    let binding = def.binding(&QName::namespaced(ns, "B")).unwrap();
    assert_eq!(binding.binding_operations().len(), 1);
    assert_eq!(binding.binding_operations()[0].operation, Some(0));

    assert_eq!(def.services().count(), 1);
    let service = def.services().next().unwrap();
    assert_eq!(service.ports().count(), 1);
}

#[test]
fn test_minimal_written_in_fixed_order() {
    let def = read_fixture("minimal.wsdl");
    let doc = WsdlWriter::new().write_document(&def).unwrap();
    let children: Vec<_> = doc.root().elements().map(|e| e.local_name()).collect();
    assert_eq!(children, vec!["message", "portType", "binding", "service"]);
}

#[test]
fn test_stockquote_contents() {
    let def = read_fixture("stockquote.wsdl");
    let tns = "http://example.com/stockquote.wsdl";

    assert_eq!(def.qname, Some(QName::namespaced(tns, "StockQuote")));
    assert_eq!(def.namespace("xsd1"), Some("http://example.com/stockquote.xsd"));
    assert!(def.documentation.is_some());
    assert!(def.document_base_uri.as_deref().unwrap().ends_with("stockquote.wsdl"));

    let types = def.types.as_ref().unwrap();
    let schema = types.extensibility_elements[0].as_unknown().unwrap();
    assert_eq!(schema.element.local_name(), "schema");
    assert_eq!(schema.element.elements().count(), 2);

    let op = &def
        .port_type(&QName::namespaced(tns, "StockQuotePortType"))
        .unwrap()
        .operations()[0];
    assert_eq!(op.style, Some(OperationType::RequestResponse));
    assert_eq!(
        op.output.as_ref().unwrap().message,
        Some(QName::namespaced(tns, "GetLastTradePriceOutput"))
    );

    let binding = def
        .binding(&QName::namespaced(tns, "StockQuoteSoapBinding"))
        .unwrap();
    let ExtensibilityElement::SoapBinding(soap) = &binding.extensibility_elements[0] else {
        panic!("expected soap:binding");
    };
    assert_eq!(soap.style.as_deref(), Some("document"));
    assert_eq!(
        soap.transport_uri.as_deref(),
        Some("http://schemas.xmlsoap.org/soap/http")
    );

    let binding_op = &binding.binding_operations()[0];
    assert!(matches!(
        &binding_op.extensibility_elements[0],
        ExtensibilityElement::SoapOperation(o)
            if o.soap_action_uri.as_deref() == Some("http://example.com/GetLastTradePrice")
    ));
    assert!(matches!(
        &binding_op.binding_input.as_ref().unwrap().extensibility_elements[0],
        ExtensibilityElement::SoapBody(b) if b.use_.as_deref() == Some("literal")
    ));
}

#[test]
fn test_stockquote_port_names_unknown_binding() {
    // the port refers to `StockQuoteBinding`, which the document never defines
    let def = read_fixture("stockquote.wsdl");
    let tns = "http://example.com/stockquote.wsdl";
    let placeholder = def
        .binding(&QName::namespaced(tns, "StockQuoteBinding"))
        .unwrap();
    assert!(placeholder.undefined);
    assert!(placeholder.binding_operations().is_empty());

    let service = def
        .service(&QName::namespaced(tns, "StockQuoteService"))
        .unwrap();
    assert_eq!(service.documentation.as_ref().unwrap().text(), "My first service");
}

// ============================================================================
// Forward references and overloads
// ============================================================================

#[test]
fn test_forward_references_resolve() {
    let def = read_fixture("forward_refs.wsdl");
    let tns = "urn:forward";

    assert!(def.messages().all(|m| !m.undefined));
    assert!(def.bindings().all(|b| !b.undefined));
    assert_eq!(def.messages().count(), 3);

    let port_type = def.port_type(&QName::namespaced(tns, "EventsPortType")).unwrap();
    assert!(!port_type.undefined);
    let styles: Vec<_> = port_type
        .operations()
        .iter()
        .map(|op| (op.name.as_str(), op.undefined, op.style))
        .collect();
    assert_eq!(
        styles,
        vec![
            ("notify", false, Some(OperationType::Notification)),
            ("ask", false, Some(OperationType::RequestResponse)),
        ]
    );

    let binding = def.binding(&QName::namespaced(tns, "EventsBinding")).unwrap();
    let targets: Vec<_> = binding
        .binding_operations()
        .iter()
        .map(|op| op.operation)
        .collect();
    assert_eq!(targets, vec![Some(0), Some(1)]);
}

#[test]
fn test_overloaded_operations() {
    let def = read_fixture("overloads.wsdl");
    let port_type = def.port_type(&QName::namespaced("urn:overloads", "Lookup")).unwrap();
    assert_eq!(port_type.operations().len(), 2);

    assert_eq!(
        port_type.get_operation("find", Some("findByName"), None).unwrap(),
        Some(1)
    );
    assert_eq!(
        port_type.get_operation("find", None, Some("findByIdResponse")).unwrap(),
        Some(0)
    );

    let by_name = &port_type.operations()[1];
    assert_eq!(
        by_name.parameter_ordering,
        Some(vec!["last".to_string(), "first".to_string()])
    );
    assert!(port_type.operations()[0].fault("notFound").is_some());

    let err = port_type.get_operation("find", None, None).unwrap_err();
    assert!(err.is(FaultCode::InvalidWsdl));
    assert!(err.message.contains("Duplicate operation with name=find"));
}

#[test]
fn test_overloaded_binding_operations() {
    let def = read_fixture("overloads.wsdl");
    let port_type = def.port_type(&QName::namespaced("urn:overloads", "Lookup")).unwrap();
    let binding = def
        .binding(&QName::namespaced("urn:overloads", "LookupBinding"))
        .unwrap();

    let targets: Vec<_> = binding
        .binding_operations()
        .iter()
        .map(|op| op.operation)
        .collect();
    assert_eq!(targets, vec![Some(0), Some(1)]);

    assert_eq!(
        binding
            .get_binding_operation("find", Some("findByName"), None, Some(port_type))
            .unwrap(),
        Some(1)
    );
    let fault = binding.binding_operations()[0].binding_fault("notFound").unwrap();
    assert!(matches!(
        &fault.extensibility_elements[0],
        ExtensibilityElement::SoapFault(f) if f.name.as_deref() == Some("notFound")
    ));
}

// ============================================================================
// Extensions
// ============================================================================

#[test]
fn test_unknown_extensions_are_kept() {
    let def = read_fixture("extensions.wsdl");
    let policy = def.extensibility_elements[0].as_unknown().unwrap();
    assert_eq!(
        policy.element_type,
        QName::namespaced("http://www.w3.org/ns/ws-policy", "Policy")
    );
    assert_eq!(policy.required, Some(true));

    let binding = def
        .binding(&QName::namespaced("urn:policies", "GallerySoap"))
        .unwrap();
    assert_eq!(binding.extensibility_elements.len(), 2);
    let input = binding.binding_operations()[0].binding_input.as_ref().unwrap();
    assert!(matches!(
        input.extensibility_elements[0],
        ExtensibilityElement::MimeMultipartRelated(_)
    ));
    let trace = input.extensibility_elements[1].as_unknown().unwrap();
    assert_eq!(trace.element.text(), "enabled");
}

#[test]
fn test_extension_attributes() {
    use wsdl::model::AttributeValue;

    let def = read_fixture("extensions.wsdl");
    let message = def.message(&QName::namespaced("urn:policies", "Upload")).unwrap();
    assert_eq!(
        message
            .extension_attributes
            .get(&QName::namespaced("urn:example:ext", "category")),
        Some(&AttributeValue::QName(QName::namespaced("urn:policies", "Internal")))
    );
    let op = &def
        .port_type(&QName::namespaced("urn:policies", "Gallery"))
        .unwrap()
        .operations()[0];
    assert_eq!(
        op.extension_attributes
            .get(&QName::namespaced("urn:example:ext", "retry")),
        Some(&AttributeValue::String("3".to_string()))
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_missing_file_is_other_error() {
    let err = reader()
        .read_wsdl(fixture("does-not-exist.wsdl").to_str().unwrap())
        .unwrap_err();
    assert!(err.is(FaultCode::OtherError));
}

#[test]
fn test_unknown_element_without_registry() {
    let err = WsdlReader::new()
        .read_wsdl(fixture("minimal.wsdl").to_str().unwrap())
        .unwrap_err();
    assert!(err.is(FaultCode::ConfigurationError));
    assert!(err.message.contains(SOAP_NAMESPACE));
    assert_eq!(
        err.location.as_deref(),
        Some("/wsdl:definitions/wsdl:binding/soap:binding")
    );
}

#[test]
fn test_error_location_points_at_offender() {
    let text = r#"<definitions xmlns="http://schemas.xmlsoap.org/wsdl/" targetNamespace="urn:x">
      <message name="A"/>
      <message name="B">
        <part name="p"><bogus/></part>
      </message>
    </definitions>"#;
    let err = reader().read_wsdl_from_str(None, text).unwrap_err();
    assert!(err.is(FaultCode::InvalidWsdl));
    assert_eq!(
        err.location.as_deref(),
        Some("/definitions/message[2]/part/bogus")
    );
    let rendered = err.to_string();
    assert!(rendered.contains("faultCode=INVALID_WSDL"), "{}", rendered);
}

#[test]
fn test_document_depth_limit() {
    let mut nested = String::from(r#"<definitions xmlns="http://schemas.xmlsoap.org/wsdl/"><documentation>"#);
    for _ in 0..20 {
        nested.push_str("<x>");
    }
    for _ in 0..20 {
        nested.push_str("</x>");
    }
    nested.push_str("</documentation></definitions>");

    let limits = wsdl::limits::Limits {
        max_xml_depth: 10,
        ..wsdl::limits::Limits::default()
    };
    let err = reader()
        .with_limits(limits)
        .read_wsdl_from_str(None, &nested)
        .unwrap_err();
    assert!(!err.message.is_empty());
}
