//! Writing definitions back to XML
//!
//! The writer builds an [`Element`] tree in canonical WSDL order and prints it
//! with the document printer. Every namespace binding of the definition, plus
//! any prefix synthesized while writing (`ns0`, `ns1`, ...), is declared once
//! on the root element. Placeholders (`undefined` entities) are not written.

use crate::constants::{attrs, elements, wsdl_qname};
use crate::documents::{Document, Element, Node};
use crate::error::{Error, Result};
use crate::extensions::{marshall_child, ExtensionOwner, XmlSink};
use crate::model::{
    AttributeValue, Binding, BindingOperation, Definition, ExtensibilityElement,
    ExtensionAttributes, Import, Message, Operation, OperationType, Part, Port, PortType, Service,
    Types,
};
use crate::names::join_nmtokens;
use crate::namespaces::{NamespaceContext, QName};
use crate::WSDL_NAMESPACE;
use std::io::Write;
use tracing::debug;

/// Writes definitions as WSDL 1.1 documents
#[derive(Debug, Clone, Copy, Default)]
pub struct WsdlWriter;

impl WsdlWriter {
    /// Create a writer
    pub fn new() -> Self {
        Self
    }

    /// Build the document for `def`
    pub fn write_document(&self, def: &Definition) -> Result<Document> {
        debug!(target_namespace = ?def.target_namespace, "writing definition");
        let mut namespaces = document_namespaces(def);
        let mut holder = Element::new(QName::local("holder"));

        {
            let mut sink = XmlSink::new(&mut holder, &mut namespaces);
            let mut definitions = sink.element(&wsdl_qname(elements::DEFINITIONS));
            if let Some(qname) = &def.qname {
                definitions.set_local_attribute(attrs::NAME, qname.local_name.as_str());
            }
            if let Some(tns) = &def.target_namespace {
                definitions.set_local_attribute(attrs::TARGET_NAMESPACE, tns.as_str());
            }
            set_extension_attributes(&mut sink, &mut definitions, &def.extension_attributes);
            write_body(def, &mut sink.nested(&mut definitions))?;
            sink.push(definitions);
        }

        let Some(Node::Element(mut definitions)) = holder.children.pop() else {
            return Err(Error::other("Writer produced no root element."));
        };
        // synthesized prefixes are known only now
        for (prefix, uri) in namespaces.iter() {
            definitions.declare_namespace(prefix, uri);
        }
        Ok(Document::new(definitions))
    }

    /// Print `def` to `out`
    pub fn write<W: Write>(&self, def: &Definition, out: W) -> Result<()> {
        self.write_document(def)?.write(out)
    }

    /// Print `def` to a string
    pub fn to_xml_string(&self, def: &Definition) -> Result<String> {
        self.write_document(def)?.to_xml_string()
    }
}

/// Bindings to declare on the root, with a prefix guaranteed for WSDL
fn document_namespaces(def: &Definition) -> NamespaceContext {
    let mut namespaces = def.namespaces().clone();
    if namespaces.get_prefix(WSDL_NAMESPACE).is_none() {
        let prefix = if namespaces.get_namespace("wsdl").is_none() {
            "wsdl".to_string()
        } else {
            namespaces.unused_prefix("wsdl")
        };
        namespaces.add_prefix(prefix, WSDL_NAMESPACE);
    }
    namespaces
}

fn write_body(def: &Definition, sink: &mut XmlSink<'_>) -> Result<()> {
    write_documentation(sink, def.documentation.as_ref());
    for import in def.all_imports() {
        write_import(import, sink);
    }
    if let Some(types) = &def.types {
        write_types(types, sink, def)?;
    }
    for message in def.messages().filter(|m| !m.undefined) {
        write_message(message, sink);
    }
    for port_type in def.port_types().filter(|p| !p.undefined) {
        write_port_type(port_type, sink);
    }
    for binding in def.bindings().filter(|b| !b.undefined) {
        write_binding(binding, sink, def)?;
    }
    for service in def.services() {
        write_service(service, sink, def)?;
    }
    write_extensions(ExtensionOwner::Definition, &def.extensibility_elements, sink, def)
}

fn write_import(import: &Import, sink: &mut XmlSink<'_>) {
    let mut element = sink.element(&wsdl_qname(elements::IMPORT));
    element.set_local_attribute(attrs::NAMESPACE, import.namespace_uri.as_str());
    element.set_local_attribute(attrs::LOCATION, import.location_uri.as_str());
    set_extension_attributes(sink, &mut element, &import.extension_attributes);
    write_documentation(&mut sink.nested(&mut element), import.documentation.as_ref());
    sink.push(element);
}

fn write_types(types: &Types, sink: &mut XmlSink<'_>, def: &Definition) -> Result<()> {
    let mut element = sink.element(&wsdl_qname(elements::TYPES));
    set_extension_attributes(sink, &mut element, &types.extension_attributes);
    {
        let mut inner = sink.nested(&mut element);
        write_documentation(&mut inner, types.documentation.as_ref());
        write_extensions(ExtensionOwner::Types, &types.extensibility_elements, &mut inner, def)?;
    }
    sink.push(element);
    Ok(())
}

fn write_message(message: &Message, sink: &mut XmlSink<'_>) {
    let mut element = sink.element(&wsdl_qname(elements::MESSAGE));
    element.set_local_attribute(attrs::NAME, message.qname.local_name.as_str());
    set_extension_attributes(sink, &mut element, &message.extension_attributes);
    {
        let mut inner = sink.nested(&mut element);
        write_documentation(&mut inner, message.documentation.as_ref());
        for part in message.parts() {
            write_part(part, &mut inner);
        }
    }
    sink.push(element);
}

fn write_part(part: &Part, sink: &mut XmlSink<'_>) {
    let mut element = sink.element(&wsdl_qname(elements::PART));
    element.set_local_attribute(attrs::NAME, part.name.as_str());
    if let Some(name) = &part.element_name {
        let value = sink.qualified_value(name);
        element.set_local_attribute(attrs::ELEMENT, value);
    }
    if let Some(name) = &part.type_name {
        let value = sink.qualified_value(name);
        element.set_local_attribute(attrs::TYPE, value);
    }
    set_extension_attributes(sink, &mut element, &part.extension_attributes);
    write_documentation(&mut sink.nested(&mut element), part.documentation.as_ref());
    sink.push(element);
}

fn write_port_type(port_type: &PortType, sink: &mut XmlSink<'_>) {
    let mut element = sink.element(&wsdl_qname(elements::PORT_TYPE));
    element.set_local_attribute(attrs::NAME, port_type.qname.local_name.as_str());
    set_extension_attributes(sink, &mut element, &port_type.extension_attributes);
    {
        let mut inner = sink.nested(&mut element);
        write_documentation(&mut inner, port_type.documentation.as_ref());
        for operation in port_type.operations().iter().filter(|o| !o.undefined) {
            write_operation(operation, &mut inner);
        }
    }
    sink.push(element);
}

fn write_operation(operation: &Operation, sink: &mut XmlSink<'_>) {
    let mut element = sink.element(&wsdl_qname(elements::OPERATION));
    element.set_local_attribute(attrs::NAME, operation.name.as_str());
    if let Some(order) = operation
        .parameter_ordering
        .as_deref()
        .and_then(join_nmtokens)
    {
        element.set_local_attribute(attrs::PARAMETER_ORDER, order);
    }
    set_extension_attributes(sink, &mut element, &operation.extension_attributes);

    {
        let mut inner = sink.nested(&mut element);
        write_documentation(&mut inner, operation.documentation.as_ref());

        let input = operation.input.as_ref().map(|i| {
            (elements::INPUT, i.name.as_deref(), i.message.as_ref(), i.documentation.as_ref(), &i.extension_attributes)
        });
        let output = operation.output.as_ref().map(|o| {
            (elements::OUTPUT, o.name.as_deref(), o.message.as_ref(), o.documentation.as_ref(), &o.extension_attributes)
        });
        let output_first = matches!(
            operation.style,
            Some(OperationType::SolicitResponse) | Some(OperationType::Notification)
        );
        let sequence = if output_first {
            [output, input]
        } else {
            [input, output]
        };
        for (local_name, name, message, documentation, extension_attributes) in
            sequence.into_iter().flatten()
        {
            write_io(&mut inner, local_name, name, message, documentation, extension_attributes);
        }
        for fault in operation.faults() {
            write_io(
                &mut inner,
                elements::FAULT,
                Some(fault.name.as_str()),
                fault.message.as_ref(),
                fault.documentation.as_ref(),
                &fault.extension_attributes,
            );
        }
    }
    sink.push(element);
}

fn write_io(
    sink: &mut XmlSink<'_>,
    local_name: &str,
    name: Option<&str>,
    message: Option<&QName>,
    documentation: Option<&Element>,
    extension_attributes: &ExtensionAttributes,
) {
    let mut element = sink.element(&wsdl_qname(local_name));
    if let Some(name) = name {
        element.set_local_attribute(attrs::NAME, name);
    }
    if let Some(message) = message {
        let value = sink.qualified_value(message);
        element.set_local_attribute(attrs::MESSAGE, value);
    }
    set_extension_attributes(sink, &mut element, extension_attributes);
    write_documentation(&mut sink.nested(&mut element), documentation);
    sink.push(element);
}

fn write_binding(binding: &Binding, sink: &mut XmlSink<'_>, def: &Definition) -> Result<()> {
    let mut element = sink.element(&wsdl_qname(elements::BINDING));
    element.set_local_attribute(attrs::NAME, binding.qname.local_name.as_str());
    if let Some(port_type) = &binding.port_type {
        let value = sink.qualified_value(port_type);
        element.set_local_attribute(attrs::TYPE, value);
    }
    set_extension_attributes(sink, &mut element, &binding.extension_attributes);
    {
        let mut inner = sink.nested(&mut element);
        write_documentation(&mut inner, binding.documentation.as_ref());
        write_extensions(ExtensionOwner::Binding, &binding.extensibility_elements, &mut inner, def)?;
        for operation in binding.binding_operations() {
            write_binding_operation(operation, &mut inner, def)?;
        }
    }
    sink.push(element);
    Ok(())
}

fn write_binding_operation(
    operation: &BindingOperation,
    sink: &mut XmlSink<'_>,
    def: &Definition,
) -> Result<()> {
    let mut element = sink.element(&wsdl_qname(elements::OPERATION));
    element.set_local_attribute(attrs::NAME, operation.name.as_str());
    set_extension_attributes(sink, &mut element, &operation.extension_attributes);
    {
        let mut inner = sink.nested(&mut element);
        write_documentation(&mut inner, operation.documentation.as_ref());
        write_extensions(
            ExtensionOwner::BindingOperation,
            &operation.extensibility_elements,
            &mut inner,
            def,
        )?;
        if let Some(input) = &operation.binding_input {
            write_binding_io(
                &mut inner,
                elements::INPUT,
                ExtensionOwner::BindingInput,
                input.name.as_deref(),
                input.documentation.as_ref(),
                &input.extensibility_elements,
                &input.extension_attributes,
                def,
            )?;
        }
        if let Some(output) = &operation.binding_output {
            write_binding_io(
                &mut inner,
                elements::OUTPUT,
                ExtensionOwner::BindingOutput,
                output.name.as_deref(),
                output.documentation.as_ref(),
                &output.extensibility_elements,
                &output.extension_attributes,
                def,
            )?;
        }
        for fault in operation.binding_faults() {
            write_binding_io(
                &mut inner,
                elements::FAULT,
                ExtensionOwner::BindingFault,
                Some(fault.name.as_str()),
                fault.documentation.as_ref(),
                &fault.extensibility_elements,
                &fault.extension_attributes,
                def,
            )?;
        }
    }
    sink.push(element);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn write_binding_io(
    sink: &mut XmlSink<'_>,
    local_name: &str,
    owner: ExtensionOwner,
    name: Option<&str>,
    documentation: Option<&Element>,
    extensions: &[ExtensibilityElement],
    extension_attributes: &ExtensionAttributes,
    def: &Definition,
) -> Result<()> {
    let mut element = sink.element(&wsdl_qname(local_name));
    if let Some(name) = name {
        element.set_local_attribute(attrs::NAME, name);
    }
    set_extension_attributes(sink, &mut element, extension_attributes);
    {
        let mut inner = sink.nested(&mut element);
        write_documentation(&mut inner, documentation);
        write_extensions(owner, extensions, &mut inner, def)?;
    }
    sink.push(element);
    Ok(())
}

fn write_service(service: &Service, sink: &mut XmlSink<'_>, def: &Definition) -> Result<()> {
    let mut element = sink.element(&wsdl_qname(elements::SERVICE));
    element.set_local_attribute(attrs::NAME, service.qname.local_name.as_str());
    set_extension_attributes(sink, &mut element, &service.extension_attributes);
    {
        let mut inner = sink.nested(&mut element);
        write_documentation(&mut inner, service.documentation.as_ref());
        for port in service.ports() {
            write_port(port, &mut inner, def)?;
        }
        write_extensions(ExtensionOwner::Service, &service.extensibility_elements, &mut inner, def)?;
    }
    sink.push(element);
    Ok(())
}

fn write_port(port: &Port, sink: &mut XmlSink<'_>, def: &Definition) -> Result<()> {
    let mut element = sink.element(&wsdl_qname(elements::PORT));
    element.set_local_attribute(attrs::NAME, port.name.as_str());
    if let Some(binding) = &port.binding {
        let value = sink.qualified_value(binding);
        element.set_local_attribute(attrs::BINDING, value);
    }
    set_extension_attributes(sink, &mut element, &port.extension_attributes);
    {
        let mut inner = sink.nested(&mut element);
        write_documentation(&mut inner, port.documentation.as_ref());
        write_extensions(ExtensionOwner::Port, &port.extensibility_elements, &mut inner, def)?;
    }
    sink.push(element);
    Ok(())
}

fn write_documentation(sink: &mut XmlSink<'_>, documentation: Option<&Element>) {
    if let Some(documentation) = documentation {
        sink.push_fragment(documentation);
    }
}

fn write_extensions(
    owner: ExtensionOwner,
    extensions: &[ExtensibilityElement],
    sink: &mut XmlSink<'_>,
    def: &Definition,
) -> Result<()> {
    let Some(first) = extensions.first() else {
        return Ok(());
    };
    let Some(registry) = def.extension_registry() else {
        return Err(Error::configuration(format!(
            "No ExtensionRegistry set for this Definition, so unable to serialize a '{}' element in the context of a '{}'.",
            first.element_type(),
            owner
        )));
    };
    for extension in extensions {
        marshall_child(owner, extension, sink, def, registry)?;
    }
    Ok(())
}

fn set_extension_attributes(
    sink: &mut XmlSink<'_>,
    element: &mut Element,
    attributes: &ExtensionAttributes,
) {
    for (name, value) in attributes {
        let text = match value {
            AttributeValue::String(s) => s.clone(),
            AttributeValue::QName(q) => sink.qualified_value(q),
            AttributeValue::StringList(items) => items.join(" "),
            AttributeValue::QNameList(items) => items
                .iter()
                .map(|q| sink.qualified_value(q))
                .collect::<Vec<_>>()
                .join(" "),
        };
        sink.set_qualified_attribute(element, name, &text);
    }
}
