//! Extensibility elements and extension attributes
//!
//! WSDL lets foreign-namespace elements appear under most entities and
//! foreign-namespace attributes appear on all of them. Elements understood by
//! a registered plugin become typed variants; everything else is kept as the
//! raw element.

use crate::documents::Element;
use crate::extensions::http::{HttpAddress, HttpBinding, HttpOperation, HttpUrlEncoded, HttpUrlReplacement};
use crate::extensions::mime::{MimeContent, MimeMultipartRelated, MimeXml};
use crate::extensions::soap::{SoapAddress, SoapBinding, SoapBody, SoapFault, SoapHeader, SoapOperation};
use crate::namespaces::QName;
use indexmap::IndexMap;

/// How the lexical value of an extension attribute is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    /// Plain string
    String,
    /// Prefixed name resolved against the in-scope namespaces
    QName,
    /// Whitespace separated strings
    StringList,
    /// Whitespace separated prefixed names
    QNameList,
}

/// Value of an extension attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// Plain string
    String(String),
    /// Resolved name
    QName(QName),
    /// List of strings
    StringList(Vec<String>),
    /// List of resolved names
    QNameList(Vec<QName>),
}

impl AttributeValue {
    /// Type tag of this value
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            Self::String(_) => AttributeType::String,
            Self::QName(_) => AttributeType::QName,
            Self::StringList(_) => AttributeType::StringList,
            Self::QNameList(_) => AttributeType::QNameList,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<QName> for AttributeValue {
    fn from(value: QName) -> Self {
        Self::QName(value)
    }
}

/// Foreign-namespace attributes of an entity, in document order
pub type ExtensionAttributes = IndexMap<QName, AttributeValue>;

/// Extensibility element kept verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownExtensibilityElement {
    /// Name of the element
    pub element_type: QName,
    /// Value of `wsdl:required`
    pub required: Option<bool>,
    /// The element as read
    pub element: Element,
}

/// Child element in a foreign namespace attached to a WSDL entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensibilityElement {
    /// `soap:binding`
    SoapBinding(SoapBinding),
    /// `soap:operation`
    SoapOperation(SoapOperation),
    /// `soap:body`
    SoapBody(SoapBody),
    /// `soap:header`
    SoapHeader(SoapHeader),
    /// `soap:fault`
    SoapFault(SoapFault),
    /// `soap:address`
    SoapAddress(SoapAddress),
    /// `http:binding`
    HttpBinding(HttpBinding),
    /// `http:operation`
    HttpOperation(HttpOperation),
    /// `http:address`
    HttpAddress(HttpAddress),
    /// `http:urlEncoded`
    HttpUrlEncoded(HttpUrlEncoded),
    /// `http:urlReplacement`
    HttpUrlReplacement(HttpUrlReplacement),
    /// `mime:content`
    MimeContent(MimeContent),
    /// `mime:multipartRelated`
    MimeMultipartRelated(MimeMultipartRelated),
    /// `mime:mimeXml`
    MimeXml(MimeXml),
    /// Anything without a dedicated plugin
    Unknown(UnknownExtensibilityElement),
}

impl ExtensibilityElement {
    /// Name of the element this value was read from or will be written as
    pub fn element_type(&self) -> &QName {
        match self {
            Self::SoapBinding(e) => &e.element_type,
            Self::SoapOperation(e) => &e.element_type,
            Self::SoapBody(e) => &e.element_type,
            Self::SoapHeader(e) => &e.element_type,
            Self::SoapFault(e) => &e.element_type,
            Self::SoapAddress(e) => &e.element_type,
            Self::HttpBinding(e) => &e.element_type,
            Self::HttpOperation(e) => &e.element_type,
            Self::HttpAddress(e) => &e.element_type,
            Self::HttpUrlEncoded(e) => &e.element_type,
            Self::HttpUrlReplacement(e) => &e.element_type,
            Self::MimeContent(e) => &e.element_type,
            Self::MimeMultipartRelated(e) => &e.element_type,
            Self::MimeXml(e) => &e.element_type,
            Self::Unknown(e) => &e.element_type,
        }
    }

    /// Value of `wsdl:required`, if present
    pub fn required(&self) -> Option<bool> {
        match self {
            Self::SoapBinding(e) => e.required,
            Self::SoapOperation(e) => e.required,
            Self::SoapBody(e) => e.required,
            Self::SoapHeader(e) => e.required,
            Self::SoapFault(e) => e.required,
            Self::SoapAddress(e) => e.required,
            Self::HttpBinding(e) => e.required,
            Self::HttpOperation(e) => e.required,
            Self::HttpAddress(e) => e.required,
            Self::HttpUrlEncoded(e) => e.required,
            Self::HttpUrlReplacement(e) => e.required,
            Self::MimeContent(e) => e.required,
            Self::MimeMultipartRelated(e) => e.required,
            Self::MimeXml(e) => e.required,
            Self::Unknown(e) => e.required,
        }
    }

    /// The raw element, for unknown extensions
    pub fn as_unknown(&self) -> Option<&UnknownExtensibilityElement> {
        match self {
            Self::Unknown(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::soap::SOAP_NAMESPACE;

    #[test]
    fn test_element_type_and_required() {
        let mut binding = SoapBinding::new();
        binding.required = Some(true);
        let ext = ExtensibilityElement::SoapBinding(binding);

        assert_eq!(ext.element_type(), &QName::namespaced(SOAP_NAMESPACE, "binding"));
        assert_eq!(ext.required(), Some(true));
        assert!(ext.as_unknown().is_none());
    }

    #[test]
    fn test_attribute_value_type() {
        let value: AttributeValue = QName::namespaced("urn:a", "b").into();
        assert_eq!(value.attribute_type(), AttributeType::QName);
        assert_eq!(AttributeValue::from("x").attribute_type(), AttributeType::String);
    }
}
