//! Pluggable extensibility elements
//!
//! Protocol bindings (SOAP, HTTP, MIME, or anything else) attach foreign
//! elements to WSDL entities. The reader and writer hand those elements to
//! plugins looked up in an [`ExtensionRegistry`] by the kind of entity that
//! owns the element and the element's qualified name.
//!
//! Registries are assembled once with an [`ExtensionRegistryBuilder`] and are
//! immutable afterwards, so they can be shared behind an `Arc`.

pub mod http;
pub mod mime;
pub mod soap;
pub mod unknown;

use crate::constants::required_attr;
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::model::definition::Definition;
use crate::model::extensible::{AttributeType, ExtensibilityElement};
use crate::namespaces::{NamespaceContext, QName};
use crate::WSDL_NAMESPACE;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Kind of entity an extensibility element is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionOwner {
    /// `definitions`
    Definition,
    /// `types`
    Types,
    /// `binding`
    Binding,
    /// `binding/operation`
    BindingOperation,
    /// `binding/operation/input`
    BindingInput,
    /// `binding/operation/output`
    BindingOutput,
    /// `binding/operation/fault`
    BindingFault,
    /// `service/port`
    Port,
    /// `service`
    Service,
    /// `mime:part` inside `mime:multipartRelated`
    MimePart,
}

impl ExtensionOwner {
    /// Name used in messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Definition => "Definition",
            Self::Types => "Types",
            Self::Binding => "Binding",
            Self::BindingOperation => "BindingOperation",
            Self::BindingInput => "BindingInput",
            Self::BindingOutput => "BindingOutput",
            Self::BindingFault => "BindingFault",
            Self::Port => "Port",
            Self::Service => "Service",
            Self::MimePart => "MIMEPart",
        }
    }
}

impl fmt::Display for ExtensionOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writes an extensibility element below its owner
pub trait ExtensionSerializer: Send + Sync {
    /// Append `extension` to the sink
    fn marshall(
        &self,
        owner: ExtensionOwner,
        element_type: &QName,
        extension: &ExtensibilityElement,
        sink: &mut XmlSink<'_>,
        definition: &Definition,
        registry: &ExtensionRegistry,
    ) -> Result<()>;
}

/// Reads an extensibility element from the tree
pub trait ExtensionDeserializer: Send + Sync {
    /// Convert `element` into a model value
    fn unmarshall(
        &self,
        owner: ExtensionOwner,
        element_type: &QName,
        element: &Element,
        definition: &Definition,
        registry: &ExtensionRegistry,
    ) -> Result<ExtensibilityElement>;
}

type Key = (ExtensionOwner, QName);

/// Immutable set of extension plugins
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    serializers: IndexMap<Key, Arc<dyn ExtensionSerializer>>,
    deserializers: IndexMap<Key, Arc<dyn ExtensionDeserializer>>,
    default_serializer: Option<Arc<dyn ExtensionSerializer>>,
    default_deserializer: Option<Arc<dyn ExtensionDeserializer>>,
    attribute_types: IndexMap<QName, AttributeType>,
}

impl ExtensionRegistry {
    /// Start building a registry
    pub fn builder() -> ExtensionRegistryBuilder {
        ExtensionRegistryBuilder::new()
    }

    /// Registry with the unknown-element defaults and the SOAP, HTTP and
    /// MIME plugins
    pub fn populated() -> Self {
        let builder = ExtensionRegistryBuilder::new()
            .default_serializer(Arc::new(unknown::UnknownExtensionSerializer))
            .default_deserializer(Arc::new(unknown::UnknownExtensionDeserializer));
        let builder = soap::register(builder);
        let builder = http::register(builder);
        mime::register(builder).build()
    }

    /// Serializer for `element_type` under `owner`, falling back to the default
    pub fn query_serializer(
        &self,
        owner: ExtensionOwner,
        element_type: &QName,
    ) -> Result<Arc<dyn ExtensionSerializer>> {
        self.serializers
            .get(&(owner, element_type.clone()))
            .or(self.default_serializer.as_ref())
            .cloned()
            .ok_or_else(|| {
                Error::configuration(format!(
                    "No ExtensionSerializer found to serialize a '{}' element in the context of a '{}'.",
                    element_type, owner
                ))
            })
    }

    /// Deserializer for `element_type` under `owner`, falling back to the default
    pub fn query_deserializer(
        &self,
        owner: ExtensionOwner,
        element_type: &QName,
    ) -> Result<Arc<dyn ExtensionDeserializer>> {
        self.deserializers
            .get(&(owner, element_type.clone()))
            .or(self.default_deserializer.as_ref())
            .cloned()
            .ok_or_else(|| {
                Error::configuration(format!(
                    "No ExtensionDeserializer found to deserialize a '{}' element in the context of a '{}'.",
                    element_type, owner
                ))
            })
    }

    /// Element names with a specific deserializer for `owner`
    pub fn allowable_extensions(&self, owner: ExtensionOwner) -> Vec<QName> {
        self.deserializers
            .keys()
            .filter(|(o, _)| *o == owner)
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Declared type of an extension attribute
    pub fn attribute_type(&self, name: &QName) -> Option<AttributeType> {
        self.attribute_types.get(name).copied()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("serializers", &self.serializers.len())
            .field("deserializers", &self.deserializers.len())
            .field("default_serializer", &self.default_serializer.is_some())
            .field("default_deserializer", &self.default_deserializer.is_some())
            .field("attribute_types", &self.attribute_types)
            .finish()
    }
}

/// Builder for [`ExtensionRegistry`]
#[derive(Default)]
pub struct ExtensionRegistryBuilder {
    registry: ExtensionRegistry,
}

impl ExtensionRegistryBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a serializer; a later registration for the same key wins
    pub fn register_serializer(
        mut self,
        owner: ExtensionOwner,
        element_type: QName,
        serializer: Arc<dyn ExtensionSerializer>,
    ) -> Self {
        self.registry
            .serializers
            .insert((owner, element_type), serializer);
        self
    }

    /// Register a deserializer; a later registration for the same key wins
    pub fn register_deserializer(
        mut self,
        owner: ExtensionOwner,
        element_type: QName,
        deserializer: Arc<dyn ExtensionDeserializer>,
    ) -> Self {
        self.registry
            .deserializers
            .insert((owner, element_type), deserializer);
        self
    }

    /// Register the same plugin in both directions
    pub fn register<P>(self, owner: ExtensionOwner, element_type: QName, plugin: Arc<P>) -> Self
    where
        P: ExtensionSerializer + ExtensionDeserializer + 'static,
    {
        self.register_serializer(owner, element_type.clone(), plugin.clone())
            .register_deserializer(owner, element_type, plugin)
    }

    /// Serializer used when no specific one matches
    pub fn default_serializer(mut self, serializer: Arc<dyn ExtensionSerializer>) -> Self {
        self.registry.default_serializer = Some(serializer);
        self
    }

    /// Deserializer used when no specific one matches
    pub fn default_deserializer(mut self, deserializer: Arc<dyn ExtensionDeserializer>) -> Self {
        self.registry.default_deserializer = Some(deserializer);
        self
    }

    /// Declare how values of an extension attribute are interpreted
    pub fn register_attribute_type(mut self, name: QName, attribute_type: AttributeType) -> Self {
        self.registry.attribute_types.insert(name, attribute_type);
        self
    }

    /// Finish building
    pub fn build(self) -> ExtensionRegistry {
        self.registry
    }
}

/// Output position for extension serializers
///
/// Elements are appended to `parent`. Prefixes for namespaces that the
/// document does not bind yet are synthesized (`ns0`, `ns1`, ...) and
/// recorded in `namespaces`, which the writer declares on the root element.
pub struct XmlSink<'a> {
    parent: &'a mut Element,
    namespaces: &'a mut NamespaceContext,
}

impl<'a> XmlSink<'a> {
    /// Create a sink appending to `parent`
    pub fn new(parent: &'a mut Element, namespaces: &'a mut NamespaceContext) -> Self {
        Self { parent, namespaces }
    }

    /// Namespace bindings of the document being written
    pub fn namespaces(&self) -> &NamespaceContext {
        self.namespaces
    }

    /// Prefix for an element in `namespace`; the default namespace may be used
    pub fn element_prefix(&mut self, namespace: &str) -> String {
        match self.namespaces.get_prefix(namespace) {
            Some(prefix) => prefix.to_string(),
            None => self.synthesize(namespace),
        }
    }

    /// Prefix for an attribute in `namespace`; always a named prefix
    pub fn attribute_prefix(&mut self, namespace: &str) -> String {
        match self.namespaces.get_named_prefix(namespace) {
            Some(prefix) => prefix.to_string(),
            None => self.synthesize(namespace),
        }
    }

    fn synthesize(&mut self, namespace: &str) -> String {
        let prefix = self.namespaces.unused_prefix("ns");
        self.namespaces.add_prefix(prefix.clone(), namespace);
        prefix
    }

    /// Fresh element with a usable prefix
    pub fn element(&mut self, name: &QName) -> Element {
        let element = Element::new(name.clone());
        match name.namespace() {
            Some(ns) => {
                let prefix = self.element_prefix(ns);
                element.with_prefix(prefix)
            }
            None => element,
        }
    }

    /// Lexical form of a QName-valued attribute
    pub fn qualified_value(&mut self, name: &QName) -> String {
        match name.namespace() {
            Some(ns) => {
                let prefix = self.element_prefix(ns);
                if prefix.is_empty() {
                    name.local_name.clone()
                } else {
                    format!("{}:{}", prefix, name.local_name)
                }
            }
            None => name.local_name.clone(),
        }
    }

    /// Set a namespace-qualified attribute on `element`
    pub fn set_qualified_attribute(&mut self, element: &mut Element, name: &QName, value: &str) {
        match name.namespace() {
            Some(ns) => {
                let prefix = self.attribute_prefix(ns);
                element.set_attribute(name.clone(), Some(prefix), value);
            }
            None => element.set_attribute(name.clone(), None, value),
        }
    }

    /// Write `wsdl:required` when it is set
    pub fn set_required(&mut self, element: &mut Element, required: Option<bool>) {
        if let Some(required) = required {
            let value = if required { "true" } else { "false" };
            self.set_qualified_attribute(element, &required_attr(), value);
        }
    }

    /// Append a finished element
    pub fn push(&mut self, element: Element) {
        self.parent.push_element(element);
    }

    /// Append a copy of a parsed fragment, redeclaring what it needs
    pub fn push_fragment(&mut self, fragment: &Element) {
        let mut copy = fragment.clone();
        copy.rebase_namespaces(self.namespaces);
        self.parent.push_element(copy);
    }

    /// Sink appending below `element` instead of the current parent
    pub fn nested<'b>(&'b mut self, element: &'b mut Element) -> XmlSink<'b> {
        XmlSink {
            parent: element,
            namespaces: &mut *self.namespaces,
        }
    }
}

/// Value of `wsdl:required` on an extension element
pub fn parse_required(element: &Element) -> Option<bool> {
    element
        .attribute_ns(&required_attr())
        .map(|value| value.trim().eq_ignore_ascii_case("true"))
}

/// Resolve a QName-valued attribute against the element's namespaces
pub fn qname_attribute(element: &Element, local_name: &str) -> Result<Option<QName>> {
    element
        .attribute(local_name)
        .map(|value| {
            element
                .namespaces
                .resolve(value.trim())
                .map_err(|e| e.with_location_if_unset(&element.location))
        })
        .transpose()
}

/// Fail when `element` is not in the expected namespace and name
pub(crate) fn expect_element(element: &Element, namespace: &str, local_name: &str) -> Result<()> {
    if element.is(namespace, local_name) {
        Ok(())
    } else {
        Err(Error::invalid_wsdl(format!(
            "Expected element '{}', found '{}'.",
            QName::namespaced(namespace, local_name),
            element.name
        ))
        .with_location(&element.location))
    }
}

/// Deserialize a child element through the registry
pub(crate) fn unmarshall_child(
    owner: ExtensionOwner,
    element: &Element,
    definition: &Definition,
    registry: &ExtensionRegistry,
) -> Result<ExtensibilityElement> {
    registry
        .query_deserializer(owner, &element.name)
        .and_then(|deserializer| {
            deserializer.unmarshall(owner, &element.name, element, definition, registry)
        })
        .map_err(|e| e.with_location_if_unset(&element.location))
}

/// Serialize an extension through the registry
pub(crate) fn marshall_child(
    owner: ExtensionOwner,
    extension: &ExtensibilityElement,
    sink: &mut XmlSink<'_>,
    definition: &Definition,
    registry: &ExtensionRegistry,
) -> Result<()> {
    let element_type = extension.element_type();
    let serializer = registry.query_serializer(owner, element_type)?;
    serializer.marshall(owner, element_type, extension, sink, definition, registry)
}

pub(crate) fn wrong_variant(expected: &str, extension: &ExtensibilityElement) -> Error {
    Error::other(format!(
        "Expected a {} extension, got a '{}' element.",
        expected,
        extension.element_type()
    ))
}

pub(crate) fn is_wsdl(namespace: Option<&str>) -> bool {
    namespace == Some(WSDL_NAMESPACE)
}
