//! # wsdl
//!
//! Reading and writing WSDL 1.1 service descriptions.
//!
//! A document is read into a [`Definition`]: messages, port types, bindings
//! and services keyed by qualified name, plus imports and the types section.
//! Elements from foreign namespaces inside the WSDL structure (SOAP, HTTP and
//! MIME binding details, or anything else) go through a pluggable
//! [`ExtensionRegistry`]; elements without a registered plugin are kept as
//! verbatim XML and written back unchanged.
//!
//! ## Features
//!
//! - Forward references are resolved through `undefined` placeholders
//! - Overloaded operations are told apart by their input and output names
//! - Imports are followed through a [`loaders::WsdlLocator`], with cycle
//!   detection
//! - SOAP 1.1, HTTP and MIME binding extensions out of the box
//! - Protection against oversized or deeply nested documents
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wsdl::{ExtensionRegistry, WsdlReader, WsdlWriter};
//!
//! let reader = WsdlReader::new()
//!     .with_extension_registry(Arc::new(ExtensionRegistry::populated()));
//! let definition = reader.read_wsdl("service.wsdl")?;
//! for service in definition.services() {
//!     println!("{}", service.qname);
//! }
//! let xml = WsdlWriter::new().to_xml_string(&definition)?;
//! # Ok::<(), wsdl::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Names and namespaces
pub mod names;
pub mod namespaces;
pub mod constants;

// Resource loading
pub mod locations;
pub mod loaders;
pub mod documents;

// Model and extensions
pub mod model;
pub mod extensions;

// Reading and writing
pub mod reader;
mod resolver;
pub mod writer;

pub use error::{Error, FaultCode, Result};
pub use extensions::{ExtensionOwner, ExtensionRegistry};
pub use loaders::{Loader, MemoryLocator, WsdlLocator};
pub use model::Definition;
pub use namespaces::QName;
pub use reader::{ReaderFeatures, WsdlReader};
pub use writer::WsdlWriter;

/// Version of the wsdl library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WSDL 1.1 namespace
pub const WSDL_NAMESPACE: &str = "http://schemas.xmlsoap.org/wsdl/";

/// XML namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// XMLNS namespace
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";
