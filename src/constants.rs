//! WSDL vocabulary
//!
//! Element and attribute local names of the WSDL 1.1 namespace, plus the
//! schema namespaces recognised when an import points at a bare schema.

use crate::namespaces::QName;
use crate::WSDL_NAMESPACE;

/// WSDL element local names
pub mod elements {
    pub const DEFINITIONS: &str = "definitions";
    pub const IMPORT: &str = "import";
    pub const TYPES: &str = "types";
    pub const MESSAGE: &str = "message";
    pub const PART: &str = "part";
    pub const PORT_TYPE: &str = "portType";
    pub const OPERATION: &str = "operation";
    pub const INPUT: &str = "input";
    pub const OUTPUT: &str = "output";
    pub const FAULT: &str = "fault";
    pub const BINDING: &str = "binding";
    pub const SERVICE: &str = "service";
    pub const PORT: &str = "port";
    pub const DOCUMENTATION: &str = "documentation";
}

/// WSDL attribute names
pub mod attrs {
    pub const NAME: &str = "name";
    pub const TARGET_NAMESPACE: &str = "targetNamespace";
    pub const NAMESPACE: &str = "namespace";
    pub const LOCATION: &str = "location";
    pub const ELEMENT: &str = "element";
    pub const TYPE: &str = "type";
    pub const MESSAGE: &str = "message";
    pub const BINDING: &str = "binding";
    pub const PARAMETER_ORDER: &str = "parameterOrder";
    pub const REQUIRED: &str = "required";
    pub const XMLNS: &str = "xmlns";
}

/// Attributes the WSDL schema declares on each element
pub mod native_attrs {
    use super::attrs::*;

    pub const DEFINITIONS: &[&str] = &[NAME, TARGET_NAMESPACE];
    pub const IMPORT: &[&str] = &[NAMESPACE, LOCATION];
    pub const TYPES: &[&str] = &[];
    pub const MESSAGE: &[&str] = &[NAME];
    pub const PART: &[&str] = &[NAME, ELEMENT, TYPE];
    pub const PORT_TYPE: &[&str] = &[NAME];
    pub const OPERATION: &[&str] = &[NAME, PARAMETER_ORDER];
    pub const IO: &[&str] = &[NAME, super::attrs::MESSAGE];
    pub const BINDING: &[&str] = &[NAME, TYPE];
    pub const BINDING_OPERATION: &[&str] = &[NAME];
    pub const BINDING_IO: &[&str] = &[NAME];
    pub const SERVICE: &[&str] = &[NAME];
    pub const PORT: &[&str] = &[NAME, super::attrs::BINDING];
}

/// XML Schema namespaces that identify a schema document
pub const XSD_NAMESPACES: &[&str] = &[
    "http://www.w3.org/1999/XMLSchema",
    "http://www.w3.org/2000/10/XMLSchema",
    "http://www.w3.org/2001/XMLSchema",
];

/// Name of the schema root element
pub const XSD_SCHEMA: &str = "schema";

/// QName of an element in the WSDL namespace
pub fn wsdl_qname(local_name: &str) -> QName {
    QName::namespaced(WSDL_NAMESPACE, local_name)
}

/// QName of the `wsdl:required` attribute
pub fn required_attr() -> QName {
    wsdl_qname(attrs::REQUIRED)
}

/// Check whether a root element names a schema document
pub fn is_schema_root(name: &QName) -> bool {
    name.local_name == XSD_SCHEMA
        && name
            .namespace()
            .map(|ns| XSD_NAMESPACES.contains(&ns))
            .unwrap_or(false)
}
