//! The root of a description document
//!
//! A [`Definition`] owns every entity declared in one document, keyed by
//! qualified name and kept in insertion order. Lookups of messages, port
//! types, bindings and services fall back to imported definitions whose
//! namespace matches the name being looked up.

use crate::documents::Element;
use crate::extensions::ExtensionRegistry;
use crate::model::bindings::Binding;
use crate::model::extensible::{ExtensibilityElement, ExtensionAttributes};
use crate::model::imports::{DefinitionRef, Import, Types};
use crate::model::messages::Message;
use crate::model::port_types::PortType;
use crate::model::services::Service;
use crate::namespaces::{NamespaceContext, QName};
use crate::WSDL_NAMESPACE;
use indexmap::IndexMap;
use std::sync::Arc;

/// Root entity of a WSDL document
#[derive(Debug, Clone)]
pub struct Definition {
    /// URI the document was read from
    pub document_base_uri: Option<String>,
    /// Value of the `name` attribute, qualified by the target namespace
    pub qname: Option<QName>,
    /// Value of `targetNamespace`
    pub target_namespace: Option<String>,
    namespaces: NamespaceContext,
    imports: IndexMap<String, Vec<Import>>,
    /// `types` section
    pub types: Option<Types>,
    messages: IndexMap<QName, Message>,
    port_types: IndexMap<QName, PortType>,
    bindings: IndexMap<QName, Binding>,
    services: IndexMap<QName, Service>,
    /// `documentation` child
    pub documentation: Option<Element>,
    /// Definition-level extensions
    pub extensibility_elements: Vec<ExtensibilityElement>,
    /// Foreign-namespace attributes
    pub extension_attributes: ExtensionAttributes,
    extension_registry: Option<Arc<ExtensionRegistry>>,
    /// Shared copy targeted by back-edges of imported documents
    import_anchor: Option<DefinitionRef>,
}

type Getter<T> = for<'a> fn(&'a Definition, &QName) -> Option<&'a T>;

impl Definition {
    /// Create an empty definition whose default namespace is the WSDL namespace
    pub fn new() -> Self {
        let mut namespaces = NamespaceContext::new();
        namespaces.set_default_namespace(WSDL_NAMESPACE);
        Self {
            document_base_uri: None,
            qname: None,
            target_namespace: None,
            namespaces,
            imports: IndexMap::new(),
            types: None,
            messages: IndexMap::new(),
            port_types: IndexMap::new(),
            bindings: IndexMap::new(),
            services: IndexMap::new(),
            documentation: None,
            extensibility_elements: Vec::new(),
            extension_attributes: ExtensionAttributes::new(),
            extension_registry: None,
            import_anchor: None,
        }
    }

    /// Keep `shared` alive for as long as this definition exists
    ///
    /// Imported documents that import this one again refer to `shared`
    /// weakly; anchoring it here keeps those back-edges resolvable.
    pub(crate) fn anchor_import_graph(&mut self, shared: DefinitionRef) {
        self.import_anchor = Some(shared);
    }

    /// Attach an extension registry
    pub fn with_extension_registry(mut self, registry: Arc<ExtensionRegistry>) -> Self {
        self.extension_registry = Some(registry);
        self
    }

    /// Registry used to read and write extensibility elements
    pub fn extension_registry(&self) -> Option<&Arc<ExtensionRegistry>> {
        self.extension_registry.as_ref()
    }

    /// Replace the registry
    pub fn set_extension_registry(&mut self, registry: Option<Arc<ExtensionRegistry>>) {
        self.extension_registry = registry;
    }

    // -- namespaces

    /// Bind `prefix` to `namespace`; the empty prefix is the default namespace
    pub fn add_namespace(&mut self, prefix: &str, namespace: &str) {
        self.namespaces.add_prefix(prefix, namespace);
    }

    /// Remove a binding
    pub fn remove_namespace(&mut self, prefix: &str) -> Option<String> {
        self.namespaces.remove_prefix(prefix)
    }

    /// Namespace bound to `prefix`
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get_namespace(prefix)
    }

    /// A prefix bound to `namespace`, named prefixes first
    pub fn prefix(&self, namespace: &str) -> Option<&str> {
        self.namespaces.get_prefix(namespace)
    }

    /// All bindings in declaration order
    pub fn namespaces(&self) -> &NamespaceContext {
        &self.namespaces
    }

    // -- imports

    /// Add an import under its namespace
    pub fn add_import(&mut self, import: Import) {
        self.imports
            .entry(import.namespace_uri.clone())
            .or_default()
            .push(import);
    }

    /// Imports of `namespace`, in document order
    pub fn imports(&self, namespace: &str) -> &[Import] {
        self.imports.get(namespace).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mutable access to the imports of `namespace`
    pub fn imports_mut(&mut self, namespace: &str) -> Option<&mut Vec<Import>> {
        self.imports.get_mut(namespace)
    }

    /// Every import, grouped by namespace in first-seen order
    pub fn all_imports(&self) -> impl Iterator<Item = &Import> {
        self.imports.values().flatten()
    }

    /// Remove the import of `namespace` at `location`
    pub fn remove_import(&mut self, namespace: &str, location: &str) -> Option<Import> {
        let list = self.imports.get_mut(namespace)?;
        let index = list.iter().position(|i| i.location_uri == location)?;
        let removed = list.remove(index);
        if list.is_empty() {
            self.imports.shift_remove(namespace);
        }
        Some(removed)
    }

    // -- messages

    /// Add a message, replacing one with the same name in place
    pub fn add_message(&mut self, message: Message) {
        self.messages.insert(message.qname.clone(), message);
    }

    /// Message declared in this document
    pub fn message(&self, name: &QName) -> Option<&Message> {
        self.messages.get(name)
    }

    /// Message declared in this document, mutably
    pub fn message_mut(&mut self, name: &QName) -> Option<&mut Message> {
        self.messages.get_mut(name)
    }

    /// Remove a message
    pub fn remove_message(&mut self, name: &QName) -> Option<Message> {
        self.messages.shift_remove(name)
    }

    /// Messages in insertion order
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.values()
    }

    /// Message declared here or in a matching import
    pub fn lookup_message(&self, name: &QName) -> Option<Message> {
        self.lookup(name, Definition::message)
    }

    // -- port types

    /// Add a port type, replacing one with the same name in place
    pub fn add_port_type(&mut self, port_type: PortType) {
        self.port_types.insert(port_type.qname.clone(), port_type);
    }

    /// Port type declared in this document
    pub fn port_type(&self, name: &QName) -> Option<&PortType> {
        self.port_types.get(name)
    }

    /// Port type declared in this document, mutably
    pub fn port_type_mut(&mut self, name: &QName) -> Option<&mut PortType> {
        self.port_types.get_mut(name)
    }

    /// Remove a port type
    pub fn remove_port_type(&mut self, name: &QName) -> Option<PortType> {
        self.port_types.shift_remove(name)
    }

    /// Port types in insertion order
    pub fn port_types(&self) -> impl Iterator<Item = &PortType> {
        self.port_types.values()
    }

    /// Port type declared here or in a matching import
    pub fn lookup_port_type(&self, name: &QName) -> Option<PortType> {
        self.lookup(name, Definition::port_type)
    }

    // -- bindings

    /// Add a binding, replacing one with the same name in place
    pub fn add_binding(&mut self, binding: Binding) {
        self.bindings.insert(binding.qname.clone(), binding);
    }

    /// Binding declared in this document
    pub fn binding(&self, name: &QName) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Binding declared in this document, mutably
    pub fn binding_mut(&mut self, name: &QName) -> Option<&mut Binding> {
        self.bindings.get_mut(name)
    }

    /// Remove a binding
    pub fn remove_binding(&mut self, name: &QName) -> Option<Binding> {
        self.bindings.shift_remove(name)
    }

    /// Bindings in insertion order
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values()
    }

    /// Binding declared here or in a matching import
    pub fn lookup_binding(&self, name: &QName) -> Option<Binding> {
        self.lookup(name, Definition::binding)
    }

    // -- services

    /// Add a service, replacing one with the same name in place
    pub fn add_service(&mut self, service: Service) {
        self.services.insert(service.qname.clone(), service);
    }

    /// Service declared in this document
    pub fn service(&self, name: &QName) -> Option<&Service> {
        self.services.get(name)
    }

    /// Service declared in this document, mutably
    pub fn service_mut(&mut self, name: &QName) -> Option<&mut Service> {
        self.services.get_mut(name)
    }

    /// Remove a service
    pub fn remove_service(&mut self, name: &QName) -> Option<Service> {
        self.services.shift_remove(name)
    }

    /// Services in insertion order
    pub fn services(&self) -> impl Iterator<Item = &Service> {
        self.services.values()
    }

    /// Service declared here or in a matching import
    pub fn lookup_service(&self, name: &QName) -> Option<Service> {
        self.lookup(name, Definition::service)
    }

    fn lookup<T: Clone>(&self, name: &QName, get: Getter<T>) -> Option<T> {
        let mut visited = Vec::new();
        self.lookup_in(name, get, &mut visited)
    }

    /// Depth-first search through imports of the name's namespace
    ///
    /// Definitions currently borrowed mutably (still being read) are skipped.
    fn lookup_in<T: Clone>(
        &self,
        name: &QName,
        get: Getter<T>,
        visited: &mut Vec<*const Definition>,
    ) -> Option<T> {
        let this = self as *const Definition;
        if visited.contains(&this) {
            return None;
        }
        visited.push(this);

        if let Some(found) = get(self, name) {
            return Some(found.clone());
        }

        let namespace = name.namespace().unwrap_or("");
        for import in self.imports(namespace) {
            let Some(target) = import.definition() else {
                continue;
            };
            let Ok(imported) = target.try_borrow() else {
                continue;
            };
            if let Some(found) = imported.lookup_in(name, get, visited) {
                return Some(found);
            }
        }
        None
    }
}

impl Default for Definition {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Definition {
    /// The registry and base URI are environment, not content
    fn eq(&self, other: &Self) -> bool {
        self.qname == other.qname
            && self.target_namespace == other.target_namespace
            && self.namespaces == other.namespaces
            && self.imports == other.imports
            && self.types == other.types
            && self.messages == other.messages
            && self.port_types == other.port_types
            && self.bindings == other.bindings
            && self.services == other.services
            && self.documentation == other.documentation
            && self.extensibility_elements == other.extensibility_elements
            && self.extension_attributes == other.extension_attributes
    }
}

impl Eq for Definition {}
