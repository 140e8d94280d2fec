//! Reading WSDL documents into the model
//!
//! [`WsdlReader`] walks the element tree top-down. Named entities referenced
//! before their definition (a binding naming a port type further down, a port
//! naming a binding, an input naming a message) are registered as
//! placeholders with `undefined = true`; the defining element later picks the
//! placeholder up and completes it.
//!
//! Imports are resolved through a [`WsdlLocator`]; see [`crate::resolver`].

use crate::constants::{attrs, elements, native_attrs, wsdl_qname};
use crate::documents::{Document, Element};
use crate::error::{Error, Result};
use crate::extensions::{is_wsdl, qname_attribute, unmarshall_child, ExtensionOwner, ExtensionRegistry};
use crate::limits::Limits;
use crate::loaders::{Loader, WsdlLocator};
use crate::locations::Location;
use crate::model::{
    AttributeType, AttributeValue, Binding, BindingFault, BindingInput, BindingOperation,
    BindingOutput, Definition, DefinitionRef, ExtensibilityElement, ExtensionAttributes, Fault,
    Import, ImportedDefinition, Input, IoKind, Message, Operation, OperationType, Output, Part,
    Port, PortType, Service, Types,
};
use crate::names::parse_nmtokens;
use crate::namespaces::QName;
use crate::WSDL_NAMESPACE;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, info};

/// Feature name: log each retrieved document
pub const FEATURE_VERBOSE: &str = "wsdl.verbose";
/// Feature name: follow `import` elements
pub const FEATURE_IMPORT_DOCUMENTS: &str = "wsdl.importDocuments";
/// Feature name: fail the read when an import cannot be resolved
pub const FEATURE_REQUIRE_IMPORTS: &str = "wsdl.requireImports";

/// Switches controlling a read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderFeatures {
    /// Log "Retrieving document at ..." for every document fetched
    pub verbose: bool,
    /// Resolve imports
    pub import_documents: bool,
    /// Treat an unresolvable import as an error instead of leaving it unset
    pub require_imports: bool,
}

impl Default for ReaderFeatures {
    fn default() -> Self {
        Self {
            verbose: true,
            import_documents: true,
            require_imports: false,
        }
    }
}

impl ReaderFeatures {
    /// Set a feature by name
    pub fn set(&mut self, name: &str, value: bool) -> Result<()> {
        *self.slot(name)? = value;
        Ok(())
    }

    /// Get a feature by name
    pub fn get(&self, name: &str) -> Result<bool> {
        match name {
            FEATURE_VERBOSE => Ok(self.verbose),
            FEATURE_IMPORT_DOCUMENTS => Ok(self.import_documents),
            FEATURE_REQUIRE_IMPORTS => Ok(self.require_imports),
            _ => Err(unknown_feature(name)),
        }
    }

    fn slot(&mut self, name: &str) -> Result<&mut bool> {
        match name {
            FEATURE_VERBOSE => Ok(&mut self.verbose),
            FEATURE_IMPORT_DOCUMENTS => Ok(&mut self.import_documents),
            FEATURE_REQUIRE_IMPORTS => Ok(&mut self.require_imports),
            _ => Err(unknown_feature(name)),
        }
    }
}

fn unknown_feature(name: &str) -> Error {
    Error::configuration(format!("Feature name '{}' not recognized.", name))
}

/// Reads WSDL documents
#[derive(Debug, Clone, Default)]
pub struct WsdlReader {
    features: ReaderFeatures,
    limits: Limits,
    registry: Option<Arc<ExtensionRegistry>>,
}

impl WsdlReader {
    /// Reader with default features, default limits and no extension registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `registry` for extensibility elements
    pub fn with_extension_registry(mut self, registry: Arc<ExtensionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace all feature switches
    pub fn with_features(mut self, features: ReaderFeatures) -> Self {
        self.features = features;
        self
    }

    /// Replace the resource limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set a feature by name
    pub fn set_feature(&mut self, name: &str, value: bool) -> Result<()> {
        self.features.set(name, value)
    }

    /// Get a feature by name
    pub fn feature(&self, name: &str) -> Result<bool> {
        self.features.get(name)
    }

    /// Current feature switches
    pub fn features(&self) -> &ReaderFeatures {
        &self.features
    }

    /// Current limits
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Registry attached to every definition read
    pub fn extension_registry(&self) -> Option<&Arc<ExtensionRegistry>> {
        self.registry.as_ref()
    }

    /// Read the document at a file path or URL
    pub fn read_wsdl(&self, uri: &str) -> Result<Definition> {
        let location = Location::parse(uri)?;
        let mut loader = Loader::new()
            .with_limits(self.limits.clone())
            .with_base(location);
        self.read_wsdl_with_locator(&mut loader)
    }

    /// Read the root document supplied by `locator`
    pub fn read_wsdl_with_locator(&self, locator: &mut dyn WsdlLocator) -> Result<Definition> {
        let base_uri = locator.base_uri();
        if self.features.verbose {
            if let Some(uri) = &base_uri {
                info!("Retrieving document at '{}'.", uri);
            }
        }
        let text = locator.base_document()?;
        let document = Document::parse_with_limits(&text, &self.limits)?;
        self.read_root(locator, base_uri, document.root())
    }

    /// Read a document held in memory; imports resolve against `base_uri`
    pub fn read_wsdl_from_str(&self, base_uri: Option<&str>, text: &str) -> Result<Definition> {
        let document = Document::parse_with_limits(text, &self.limits)?;
        self.read_wsdl_from_element(base_uri, document.root())
    }

    /// Read a document from raw bytes
    pub fn read_wsdl_from_bytes(&self, base_uri: Option<&str>, bytes: &[u8]) -> Result<Definition> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            Error::parser(format!("Document is not valid UTF-8: {}", e)).with_source(e)
        })?;
        self.read_wsdl_from_str(base_uri, text)
    }

    /// Read from an already parsed `definitions` element
    pub fn read_wsdl_from_element(
        &self,
        base_uri: Option<&str>,
        element: &Element,
    ) -> Result<Definition> {
        let mut loader = Loader::new().with_limits(self.limits.clone());
        self.read_root(&mut loader, base_uri.map(str::to_string), element)
    }

    fn read_root(
        &self,
        locator: &mut dyn WsdlLocator,
        base_uri: Option<String>,
        element: &Element,
    ) -> Result<Definition> {
        let root = {
            let mut parser = Parser::new(self, locator);
            let key = base_uri.as_deref().map(|uri| parser.cache_key(None, uri));
            parser.parse_definitions(base_uri, element, key)?
        };
        // imported documents point back at the root through weak edges
        if Rc::weak_count(&root) > 0 {
            let mut def = root.borrow().clone();
            def.anchor_import_graph(root);
            return Ok(def);
        }
        Ok(match Rc::try_unwrap(root) {
            Ok(cell) => cell.into_inner(),
            Err(shared) => shared.borrow().clone(),
        })
    }
}

/// State of one read, shared across the import graph
pub(crate) struct Parser<'a> {
    pub(crate) reader: &'a WsdlReader,
    pub(crate) locator: &'a mut dyn WsdlLocator,
    /// Definitions by canonical location, in progress or complete
    pub(crate) cache: HashMap<String, ImportedDefinition>,
    /// Current import nesting
    pub(crate) depth: usize,
}

impl<'a> Parser<'a> {
    fn new(reader: &'a WsdlReader, locator: &'a mut dyn WsdlLocator) -> Self {
        Self {
            reader,
            locator,
            cache: HashMap::new(),
            depth: 0,
        }
    }

    pub(crate) fn parse_definitions(
        &mut self,
        base_uri: Option<String>,
        element: &Element,
        cache_key: Option<String>,
    ) -> Result<DefinitionRef> {
        check_element(element, elements::DEFINITIONS)?;

        let mut def = Definition::new();
        if let Some(registry) = &self.reader.registry {
            def.set_extension_registry(Some(Arc::clone(registry)));
        }
        def.document_base_uri = base_uri;

        let shared = Rc::new(RefCell::new(def));
        if let Some(key) = &cache_key {
            self.cache
                .insert(key.clone(), ImportedDefinition::InProgress(Rc::downgrade(&shared)));
        }

        {
            let mut def = shared.borrow_mut();
            self.fill_definition(element, &mut def)?;
        }

        if let Some(key) = cache_key {
            self.cache
                .insert(key, ImportedDefinition::Loaded(Rc::clone(&shared)));
        }
        Ok(shared)
    }

    fn fill_definition(&mut self, element: &Element, def: &mut Definition) -> Result<()> {
        let target_namespace = element.attribute(attrs::TARGET_NAMESPACE).map(str::to_string);
        if let Some(name) = element.attribute(attrs::NAME) {
            def.qname = Some(QName::new(target_namespace.clone(), name));
        }
        def.target_namespace = target_namespace;

        for (prefix, uri) in element.declared.iter() {
            def.add_namespace(prefix, uri);
        }
        def.extension_attributes = extension_attributes(element, native_attrs::DEFINITIONS, def)?;

        for child in element.elements() {
            if !is_wsdl(child.namespace()) {
                let ext = parse_extension(ExtensionOwner::Definition, child, def)?;
                def.extensibility_elements.push(ext);
                continue;
            }
            match child.local_name() {
                elements::IMPORT => {
                    let import = self.parse_import(child, def)?;
                    def.add_import(import);
                }
                elements::DOCUMENTATION => def.documentation = Some(child.clone()),
                elements::TYPES => def.types = Some(parse_types(child, def)?),
                elements::MESSAGE => parse_message(child, def)?,
                elements::PORT_TYPE => parse_port_type(child, def)?,
                elements::BINDING => parse_binding(child, def)?,
                elements::SERVICE => parse_service(child, def)?,
                _ => {
                    let ext = parse_extension(ExtensionOwner::Definition, child, def)?;
                    def.extensibility_elements.push(ext);
                }
            }
        }
        Ok(())
    }

    fn parse_import(&mut self, element: &Element, def: &mut Definition) -> Result<Import> {
        let namespace_uri = required_attribute(element, attrs::NAMESPACE)?;
        let location_uri = required_attribute(element, attrs::LOCATION)?;
        let mut import = Import::new(namespace_uri, location_uri);

        if self.reader.features.import_documents {
            import.definition = self
                .resolve_import(def, &import.location_uri)
                .map_err(|e| e.with_location_if_unset(&element.location))?;
        }

        for child in element.elements() {
            if child.is(WSDL_NAMESPACE, elements::DOCUMENTATION) {
                import.documentation = Some(child.clone());
            } else {
                return Err(unexpected(child));
            }
        }
        import.extension_attributes = extension_attributes(element, native_attrs::IMPORT, def)?;
        Ok(import)
    }
}

fn parse_types(element: &Element, def: &mut Definition) -> Result<Types> {
    let mut types = Types::default();
    for child in element.elements() {
        if child.is(WSDL_NAMESPACE, elements::DOCUMENTATION) {
            types.documentation = Some(child.clone());
        } else {
            types
                .extensibility_elements
                .push(parse_extension(ExtensionOwner::Types, child, def)?);
        }
    }
    types.extension_attributes = extension_attributes(element, native_attrs::TYPES, def)?;
    Ok(types)
}

fn parse_message(element: &Element, def: &mut Definition) -> Result<()> {
    let qname = entity_name(element, def)?;
    let mut message = def
        .message(&qname)
        .cloned()
        .unwrap_or_else(|| Message::new(qname));
    message.undefined = false;

    for child in element.elements() {
        if child.is(WSDL_NAMESPACE, elements::DOCUMENTATION) {
            message.documentation = Some(child.clone());
        } else if child.is(WSDL_NAMESPACE, elements::PART) {
            message.add_part(parse_part(child, def)?);
        } else {
            return Err(unexpected(child));
        }
    }
    message.extension_attributes = extension_attributes(element, native_attrs::MESSAGE, def)?;
    def.add_message(message);
    Ok(())
}

fn parse_part(element: &Element, def: &mut Definition) -> Result<Part> {
    let mut part = Part::new(required_attribute(element, attrs::NAME)?);
    part.element_name = qname_attribute(element, attrs::ELEMENT)?;
    part.type_name = qname_attribute(element, attrs::TYPE)?;

    for child in element.elements() {
        if child.is(WSDL_NAMESPACE, elements::DOCUMENTATION) {
            part.documentation = Some(child.clone());
        } else {
            return Err(unexpected(child));
        }
    }
    part.extension_attributes = extension_attributes(element, native_attrs::PART, def)?;
    Ok(part)
}

fn parse_port_type(element: &Element, def: &mut Definition) -> Result<()> {
    let qname = entity_name(element, def)?;
    let mut port_type = def
        .port_type(&qname)
        .cloned()
        .unwrap_or_else(|| PortType::new(qname));
    port_type.undefined = false;

    for child in element.elements() {
        if child.is(WSDL_NAMESPACE, elements::DOCUMENTATION) {
            port_type.documentation = Some(child.clone());
        } else if child.is(WSDL_NAMESPACE, elements::OPERATION) {
            parse_operation(child, &mut port_type, def)?;
        } else {
            return Err(unexpected(child));
        }
    }
    port_type.extension_attributes = extension_attributes(element, native_attrs::PORT_TYPE, def)?;
    def.add_port_type(port_type);
    Ok(())
}

fn parse_operation(element: &Element, port_type: &mut PortType, def: &mut Definition) -> Result<()> {
    let name = required_attribute(element, attrs::NAME)?;

    let mut documentation = None;
    let mut input = None;
    let mut output = None;
    let mut faults = Vec::new();
    let mut sequence = Vec::new();
    for child in element.elements() {
        if !is_wsdl(child.namespace()) {
            return Err(unexpected(child));
        }
        match child.local_name() {
            elements::DOCUMENTATION => documentation = Some(child.clone()),
            elements::INPUT => {
                let (name, message, documentation) = parse_io(child, def)?;
                input = Some(Input {
                    name,
                    message,
                    documentation,
                    extension_attributes: extension_attributes(child, native_attrs::IO, def)?,
                });
                sequence.push(IoKind::Input);
            }
            elements::OUTPUT => {
                let (name, message, documentation) = parse_io(child, def)?;
                output = Some(Output {
                    name,
                    message,
                    documentation,
                    extension_attributes: extension_attributes(child, native_attrs::IO, def)?,
                });
                sequence.push(IoKind::Output);
            }
            elements::FAULT => {
                let (name, message, documentation) = parse_io(child, def)?;
                let name = name.ok_or_else(|| missing_attribute(child, attrs::NAME))?;
                faults.push(Fault {
                    name,
                    message,
                    documentation,
                    extension_attributes: extension_attributes(child, native_attrs::IO, def)?,
                });
            }
            _ => return Err(unexpected(child)),
        }
    }

    let input_name = input.as_ref().and_then(|i: &Input| i.name.as_deref());
    let output_name = output.as_ref().and_then(|o: &Output| o.name.as_deref());
    let reusable = port_type
        .get_operation(&name, input_name, output_name)
        .map_err(|e| e.with_location(&element.location))?
        .filter(|&index| {
            port_type.operation(index).is_some_and(|op| {
                op.undefined
                    && !(input_name.is_none()
                        && op.input.as_ref().is_some_and(|i| i.name.is_some()))
                    && !(output_name.is_none()
                        && op.output.as_ref().is_some_and(|o| o.name.is_some()))
            })
        });
    let index = match reusable {
        Some(index) => index,
        None => port_type.add_operation(Operation::new(name)),
    };
    let extension_attributes = extension_attributes(element, native_attrs::OPERATION, def)?;

    let Some(operation) = port_type.operation_mut(index) else {
        return Ok(());
    };
    operation.undefined = false;
    if let Some(order) = element.attribute(attrs::PARAMETER_ORDER) {
        operation.parameter_ordering = Some(parse_nmtokens(order));
    }
    if documentation.is_some() {
        operation.documentation = documentation;
    }
    if input.is_some() {
        operation.input = input;
    }
    if output.is_some() {
        operation.output = output;
    }
    for fault in faults {
        operation.add_fault(fault);
    }
    if let Some(style) = OperationType::infer(&sequence) {
        operation.style = Some(style);
    }
    operation.extension_attributes = extension_attributes;
    Ok(())
}

/// Common part of `input`, `output` and `fault` under a port type operation
fn parse_io(
    element: &Element,
    def: &mut Definition,
) -> Result<(Option<String>, Option<QName>, Option<Element>)> {
    let name = element.attribute(attrs::NAME).map(str::to_string);
    let message = qname_attribute(element, attrs::MESSAGE)?;
    if let Some(message) = &message {
        ensure_message(message, def);
    }

    let mut documentation = None;
    for child in element.elements() {
        if child.is(WSDL_NAMESPACE, elements::DOCUMENTATION) {
            documentation = Some(child.clone());
        } else {
            return Err(unexpected(child));
        }
    }
    Ok((name, message, documentation))
}

fn parse_binding(element: &Element, def: &mut Definition) -> Result<()> {
    let qname = entity_name(element, def)?;
    let mut binding = def
        .binding(&qname)
        .cloned()
        .unwrap_or_else(|| Binding::new(qname));
    binding.undefined = false;

    let port_type = qname_attribute(element, attrs::TYPE)?;
    if let Some(port_type) = &port_type {
        ensure_port_type(port_type, def);
    }
    binding.port_type = port_type;

    for child in element.elements() {
        if child.is(WSDL_NAMESPACE, elements::DOCUMENTATION) {
            binding.documentation = Some(child.clone());
        } else if child.is(WSDL_NAMESPACE, elements::OPERATION) {
            let operation = parse_binding_operation(child, binding.port_type.as_ref(), def)?;
            binding.add_binding_operation(operation);
        } else {
            binding
                .extensibility_elements
                .push(parse_extension(ExtensionOwner::Binding, child, def)?);
        }
    }
    binding.extension_attributes = extension_attributes(element, native_attrs::BINDING, def)?;
    def.add_binding(binding);
    Ok(())
}

fn parse_binding_operation(
    element: &Element,
    port_type: Option<&QName>,
    def: &mut Definition,
) -> Result<BindingOperation> {
    let mut operation = BindingOperation::new(required_attribute(element, attrs::NAME)?);

    for child in element.elements() {
        if !is_wsdl(child.namespace()) {
            operation
                .extensibility_elements
                .push(parse_extension(ExtensionOwner::BindingOperation, child, def)?);
            continue;
        }
        match child.local_name() {
            elements::DOCUMENTATION => operation.documentation = Some(child.clone()),
            elements::INPUT => {
                let (name, documentation, extensibility_elements) =
                    parse_binding_io(child, ExtensionOwner::BindingInput, def)?;
                operation.binding_input = Some(BindingInput {
                    name,
                    documentation,
                    extensibility_elements,
                    extension_attributes: extension_attributes(child, native_attrs::BINDING_IO, def)?,
                });
            }
            elements::OUTPUT => {
                let (name, documentation, extensibility_elements) =
                    parse_binding_io(child, ExtensionOwner::BindingOutput, def)?;
                operation.binding_output = Some(BindingOutput {
                    name,
                    documentation,
                    extensibility_elements,
                    extension_attributes: extension_attributes(child, native_attrs::BINDING_IO, def)?,
                });
            }
            elements::FAULT => {
                let (name, documentation, extensibility_elements) =
                    parse_binding_io(child, ExtensionOwner::BindingFault, def)?;
                let name = name.ok_or_else(|| missing_attribute(child, attrs::NAME))?;
                operation.add_binding_fault(BindingFault {
                    name,
                    documentation,
                    extensibility_elements,
                    extension_attributes: extension_attributes(child, native_attrs::BINDING_IO, def)?,
                });
            }
            _ => operation
                .extensibility_elements
                .push(parse_extension(ExtensionOwner::BindingOperation, child, def)?),
        }
    }
    operation.extension_attributes =
        extension_attributes(element, native_attrs::BINDING_OPERATION, def)?;

    if let Some(port_type) = port_type {
        operation.operation = bind_operation(&operation, port_type, def)
            .map_err(|e| e.with_location_if_unset(&element.location))?;
    }
    Ok(operation)
}

/// Find (or, for a port type of this document, create) the bound operation
fn bind_operation(
    operation: &BindingOperation,
    port_type: &QName,
    def: &mut Definition,
) -> Result<Option<usize>> {
    let input_name = operation
        .binding_input
        .as_ref()
        .and_then(|i| i.name.as_deref());
    let output_name = operation
        .binding_output
        .as_ref()
        .and_then(|o| o.name.as_deref());

    if let Some(local) = def.port_type_mut(port_type) {
        let index = match local.get_operation(&operation.name, input_name, output_name)? {
            Some(index) => index,
            None => {
                debug!(
                    operation = %operation.name,
                    port_type = %port_type,
                    "creating placeholder operation"
                );
                local.add_operation(Operation::placeholder(operation.name.clone()))
            }
        };
        return Ok(Some(index));
    }

    match def.lookup_port_type(port_type) {
        Some(imported) => imported.get_operation(&operation.name, input_name, output_name),
        None => Ok(None),
    }
}

fn parse_binding_io(
    element: &Element,
    owner: ExtensionOwner,
    def: &mut Definition,
) -> Result<(Option<String>, Option<Element>, Vec<ExtensibilityElement>)> {
    let name = element.attribute(attrs::NAME).map(str::to_string);
    let mut documentation = None;
    let mut extensibility_elements = Vec::new();
    for child in element.elements() {
        if child.is(WSDL_NAMESPACE, elements::DOCUMENTATION) {
            documentation = Some(child.clone());
        } else {
            extensibility_elements.push(parse_extension(owner, child, def)?);
        }
    }
    Ok((name, documentation, extensibility_elements))
}

fn parse_service(element: &Element, def: &mut Definition) -> Result<()> {
    let mut service = Service::new(entity_name(element, def)?);

    for child in element.elements() {
        if child.is(WSDL_NAMESPACE, elements::DOCUMENTATION) {
            service.documentation = Some(child.clone());
        } else if child.is(WSDL_NAMESPACE, elements::PORT) {
            service.add_port(parse_port(child, def)?);
        } else {
            service
                .extensibility_elements
                .push(parse_extension(ExtensionOwner::Service, child, def)?);
        }
    }
    service.extension_attributes = extension_attributes(element, native_attrs::SERVICE, def)?;
    def.add_service(service);
    Ok(())
}

fn parse_port(element: &Element, def: &mut Definition) -> Result<Port> {
    let mut port = Port::new(required_attribute(element, attrs::NAME)?);
    port.binding = qname_attribute(element, attrs::BINDING)?;
    if let Some(binding) = &port.binding {
        ensure_binding(binding, def);
    }

    for child in element.elements() {
        if child.is(WSDL_NAMESPACE, elements::DOCUMENTATION) {
            port.documentation = Some(child.clone());
        } else {
            port.extensibility_elements
                .push(parse_extension(ExtensionOwner::Port, child, def)?);
        }
    }
    port.extension_attributes = extension_attributes(element, native_attrs::PORT, def)?;
    Ok(port)
}

fn ensure_message(name: &QName, def: &mut Definition) {
    if def.message(name).is_none() && def.lookup_message(name).is_none() {
        debug!(message = %name, "creating placeholder message");
        def.add_message(Message::placeholder(name.clone()));
    }
}

fn ensure_port_type(name: &QName, def: &mut Definition) {
    if def.port_type(name).is_none() && def.lookup_port_type(name).is_none() {
        debug!(port_type = %name, "creating placeholder port type");
        def.add_port_type(PortType::placeholder(name.clone()));
    }
}

fn ensure_binding(name: &QName, def: &mut Definition) {
    if def.binding(name).is_none() && def.lookup_binding(name).is_none() {
        debug!(binding = %name, "creating placeholder binding");
        def.add_binding(Binding::placeholder(name.clone()));
    }
}

/// Hand a foreign element to the registry
fn parse_extension(
    owner: ExtensionOwner,
    element: &Element,
    def: &Definition,
) -> Result<ExtensibilityElement> {
    let Some(registry) = def.extension_registry() else {
        return Err(Error::configuration(format!(
            "No ExtensionRegistry set for this Definition, so unable to deserialize a '{}' element in the context of a '{}'.",
            element.name, owner
        ))
        .with_location(&element.location));
    };
    unmarshall_child(owner, element, def, registry)
}

/// Collect foreign-namespace attributes of `element`
///
/// Unqualified and WSDL-namespace attributes must be among `native`. Prefixes
/// of foreign attributes are recorded on the definition, renamed with a
/// trailing `_` while they clash with an existing binding.
fn extension_attributes(
    element: &Element,
    native: &[&str],
    def: &mut Definition,
) -> Result<ExtensionAttributes> {
    let mut found = ExtensionAttributes::new();
    for attr in &element.attributes {
        let namespace = match attr.name.namespace() {
            Some(ns) if ns != WSDL_NAMESPACE => ns,
            _ => {
                if native.contains(&attr.name.local_name.as_str()) {
                    continue;
                }
                return Err(Error::invalid_wsdl(format!(
                    "Encountered illegal {} extension attribute '{}'. Extension attributes must be in a namespace other than WSDL's.",
                    element.local_name(),
                    attr.name
                ))
                .with_location(&element.location));
            }
        };
        if namespace == crate::XML_NAMESPACE {
            continue;
        }

        let declared = def
            .extension_registry()
            .and_then(|registry| registry.attribute_type(&attr.name));
        let value = attribute_value(element, &attr.value, declared)?;
        found.insert(attr.name.clone(), value);

        if let Some(prefix) = &attr.prefix {
            let mut prefix = prefix.clone();
            while def.namespace(&prefix).is_some_and(|bound| bound != namespace) {
                prefix.push('_');
            }
            def.add_namespace(&prefix, namespace);
        }
    }
    Ok(found)
}

fn attribute_value(
    element: &Element,
    value: &str,
    declared: Option<AttributeType>,
) -> Result<AttributeValue> {
    let resolve = |token: &str| {
        element
            .namespaces
            .resolve(token)
            .map_err(|e| e.with_location(&element.location))
    };
    Ok(match declared {
        Some(AttributeType::String) => AttributeValue::String(value.to_string()),
        Some(AttributeType::QName) => AttributeValue::QName(resolve(value.trim())?),
        Some(AttributeType::StringList) => AttributeValue::StringList(parse_nmtokens(value)),
        Some(AttributeType::QNameList) => AttributeValue::QNameList(
            value
                .split_whitespace()
                .map(resolve)
                .collect::<Result<Vec<_>>>()?,
        ),
        None => match value.trim().split_once(':') {
            Some((prefix, local))
                if !local.is_empty() && element.namespaces.get_namespace(prefix).is_some() =>
            {
                AttributeValue::QName(resolve(value.trim())?)
            }
            _ => AttributeValue::String(value.to_string()),
        },
    })
}

/// Qualified name of a top-level entity: its `name` in the target namespace
fn entity_name(element: &Element, def: &Definition) -> Result<QName> {
    let name = required_attribute(element, attrs::NAME)?;
    Ok(QName::new(def.target_namespace.clone(), name))
}

fn required_attribute(element: &Element, name: &str) -> Result<String> {
    element
        .attribute(name)
        .map(str::to_string)
        .ok_or_else(|| missing_attribute(element, name))
}

fn missing_attribute(element: &Element, name: &str) -> Error {
    Error::invalid_wsdl(format!(
        "The '{}' attribute must be specified for every {} element.",
        name,
        element.local_name()
    ))
    .with_location(&element.location)
}

fn unexpected(element: &Element) -> Error {
    Error::invalid_wsdl(format!("Encountered unexpected '{}'.", element.name))
        .with_location(&element.location)
}

fn check_element(element: &Element, local_name: &str) -> Result<()> {
    if element.is(WSDL_NAMESPACE, local_name) {
        Ok(())
    } else {
        Err(Error::invalid_wsdl(format!(
            "Expected element '{}'.",
            wsdl_qname(local_name)
        ))
        .with_location(&element.location))
    }
}
