//! Services and ports

use crate::documents::Element;
use crate::model::extensible::{ExtensibilityElement, ExtensionAttributes};
use crate::namespaces::QName;
use indexmap::IndexMap;

/// Endpoint exposing a binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    /// Port name, unique within its service
    pub name: String,
    /// Binding implemented by the endpoint
    pub binding: Option<QName>,
    /// `documentation` child
    pub documentation: Option<Element>,
    /// Address extensions, e.g. `soap:address`
    pub extensibility_elements: Vec<ExtensibilityElement>,
    /// Foreign-namespace attributes
    pub extension_attributes: ExtensionAttributes,
}

impl Port {
    /// Create a port with no binding
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binding: None,
            documentation: None,
            extensibility_elements: Vec::new(),
            extension_attributes: ExtensionAttributes::new(),
        }
    }
}

/// Named group of ports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    /// Service name
    pub qname: QName,
    ports: IndexMap<String, Port>,
    /// `documentation` child
    pub documentation: Option<Element>,
    /// Service-level extensions
    pub extensibility_elements: Vec<ExtensibilityElement>,
    /// Foreign-namespace attributes
    pub extension_attributes: ExtensionAttributes,
}

impl Service {
    /// Create an empty service
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            ports: IndexMap::new(),
            documentation: None,
            extensibility_elements: Vec::new(),
            extension_attributes: ExtensionAttributes::new(),
        }
    }

    /// Add a port, replacing one with the same name in place
    pub fn add_port(&mut self, port: Port) {
        self.ports.insert(port.name.clone(), port);
    }

    /// Get a port by name
    pub fn port(&self, name: &str) -> Option<&Port> {
        self.ports.get(name)
    }

    /// Remove a port
    pub fn remove_port(&mut self, name: &str) -> Option<Port> {
        self.ports.shift_remove(name)
    }

    /// Ports in insertion order
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.ports.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ports_keyed_by_name() {
        let mut service = Service::new(QName::namespaced("urn:t", "S"));
        let mut port = Port::new("P");
        port.binding = Some(QName::namespaced("urn:t", "B"));
        service.add_port(port);
        service.add_port(Port::new("Q"));
        service.add_port(Port::new("P"));

        let names: Vec<_> = service.ports().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["P", "Q"]);
        assert!(service.port("P").unwrap().binding.is_none());
        assert!(service.remove_port("Q").is_some());
        assert_eq!(service.ports().count(), 1);
    }
}
