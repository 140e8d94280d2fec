//! In-memory document model
//!
//! Every WSDL construct has a typed counterpart here. Named entities are
//! keyed by qualified name and carry an `undefined` flag for placeholders
//! created by forward references.

pub mod bindings;
pub mod definition;
pub mod extensible;
pub mod imports;
pub mod messages;
pub mod port_types;
pub mod services;

pub use bindings::{Binding, BindingFault, BindingInput, BindingOperation, BindingOutput};
pub use definition::Definition;
pub use extensible::{
    AttributeType, AttributeValue, ExtensibilityElement, ExtensionAttributes,
    UnknownExtensibilityElement,
};
pub use imports::{DefinitionRef, Import, ImportedDefinition, Types};
pub use messages::{Message, Part};
pub use port_types::{Fault, Input, IoKind, Operation, OperationType, Output, PortType};
pub use services::{Port, Service};
