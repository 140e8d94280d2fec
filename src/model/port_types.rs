//! Port types and abstract operations
//!
//! Operations inside a port type may share a name (overloading) as long as
//! their input or output names differ. [`PortType::get_operation`] implements
//! the matching rules, including the default names given to unnamed inputs
//! and outputs.

use crate::documents::Element;
use crate::error::{Error, Result};
use crate::model::extensible::ExtensionAttributes;
use crate::namespaces::QName;
use indexmap::IndexMap;
use std::fmt;

/// Message exchange pattern of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    /// input only
    OneWay,
    /// input then output
    RequestResponse,
    /// output then input
    SolicitResponse,
    /// output only
    Notification,
}

impl OperationType {
    /// Infer the style from the order in which input and output appeared
    ///
    /// Any other sequence, including an empty one or one with repeats, has
    /// no style.
    pub fn infer(sequence: &[IoKind]) -> Option<Self> {
        match sequence {
            [IoKind::Input] => Some(Self::OneWay),
            [IoKind::Input, IoKind::Output] => Some(Self::RequestResponse),
            [IoKind::Output, IoKind::Input] => Some(Self::SolicitResponse),
            [IoKind::Output] => Some(Self::Notification),
            _ => None,
        }
    }

    /// Name used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneWay => "ONE_WAY",
            Self::RequestResponse => "REQUEST_RESPONSE",
            Self::SolicitResponse => "SOLICIT_RESPONSE",
            Self::Notification => "NOTIFICATION",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of message reference seen while reading an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoKind {
    /// an `input` child
    Input,
    /// an `output` child
    Output,
}

/// Default input name for an operation of the given style
pub fn default_input_name(name: &str, style: Option<OperationType>) -> String {
    match style {
        Some(OperationType::SolicitResponse) => format!("{}Solicit", name),
        _ => name.to_string(),
    }
}

/// Default output name for an operation of the given style
pub fn default_output_name(name: &str, style: Option<OperationType>) -> String {
    match style {
        Some(OperationType::RequestResponse) | Some(OperationType::SolicitResponse) => {
            format!("{}Response", name)
        }
        _ => name.to_string(),
    }
}

/// Check one side (input or output) of an overload match
///
/// `present` is `None` when the candidate lacks that side entirely, otherwise
/// it carries the explicit name, if any.
pub(crate) fn io_name_matches(
    wanted: Option<&str>,
    present: Option<Option<&str>>,
    default_name: impl FnOnce() -> String,
) -> bool {
    let Some(wanted) = wanted else {
        return true;
    };
    match present {
        None => false,
        Some(Some(explicit)) => explicit == wanted,
        Some(None) => wanted == default_name(),
    }
}

/// Reference from an operation to a message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Input {
    /// Explicit name
    pub name: Option<String>,
    /// Referenced message
    pub message: Option<QName>,
    /// `documentation` child
    pub documentation: Option<Element>,
    /// Foreign-namespace attributes
    pub extension_attributes: ExtensionAttributes,
}

/// Reference from an operation to a message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    /// Explicit name
    pub name: Option<String>,
    /// Referenced message
    pub message: Option<QName>,
    /// `documentation` child
    pub documentation: Option<Element>,
    /// Foreign-namespace attributes
    pub extension_attributes: ExtensionAttributes,
}

/// Named error message of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Fault name, unique within its operation
    pub name: String,
    /// Referenced message
    pub message: Option<QName>,
    /// `documentation` child
    pub documentation: Option<Element>,
    /// Foreign-namespace attributes
    pub extension_attributes: ExtensionAttributes,
}

impl Fault {
    /// Create a fault referencing no message
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: None,
            documentation: None,
            extension_attributes: ExtensionAttributes::new(),
        }
    }
}

/// Abstract operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Operation name
    pub name: String,
    /// Input message reference
    pub input: Option<Input>,
    /// Output message reference
    pub output: Option<Output>,
    faults: IndexMap<String, Fault>,
    /// Inferred exchange pattern
    pub style: Option<OperationType>,
    /// Part names from `parameterOrder`
    pub parameter_ordering: Option<Vec<String>>,
    /// `documentation` child
    pub documentation: Option<Element>,
    /// Created from a binding before the port type defined it
    pub undefined: bool,
    /// Foreign-namespace attributes
    pub extension_attributes: ExtensionAttributes,
}

impl Operation {
    /// Create a defined operation with nothing attached
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: None,
            output: None,
            faults: IndexMap::new(),
            style: None,
            parameter_ordering: None,
            documentation: None,
            undefined: false,
            extension_attributes: ExtensionAttributes::new(),
        }
    }

    /// Create a placeholder operation
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            undefined: true,
            ..Self::new(name)
        }
    }

    /// Add a fault, replacing one with the same name in place
    pub fn add_fault(&mut self, fault: Fault) {
        self.faults.insert(fault.name.clone(), fault);
    }

    /// Get a fault by name
    pub fn fault(&self, name: &str) -> Option<&Fault> {
        self.faults.get(name)
    }

    /// Remove a fault
    pub fn remove_fault(&mut self, name: &str) -> Option<Fault> {
        self.faults.shift_remove(name)
    }

    /// Faults in insertion order
    pub fn faults(&self) -> impl Iterator<Item = &Fault> {
        self.faults.values()
    }

    /// Name an unnamed input takes for overload resolution
    pub fn default_input_name(&self) -> String {
        default_input_name(&self.name, self.style)
    }

    /// Name an unnamed output takes for overload resolution
    pub fn default_output_name(&self) -> String {
        default_output_name(&self.name, self.style)
    }

    fn matches(&self, name: &str, input_name: Option<&str>, output_name: Option<&str>) -> bool {
        self.name == name
            && io_name_matches(
                input_name,
                self.input.as_ref().map(|i| i.name.as_deref()),
                || self.default_input_name(),
            )
            && io_name_matches(
                output_name,
                self.output.as_ref().map(|o| o.name.as_deref()),
                || self.default_output_name(),
            )
    }
}

/// Named set of abstract operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortType {
    /// Port type name
    pub qname: QName,
    operations: Vec<Operation>,
    /// `documentation` child
    pub documentation: Option<Element>,
    /// Referenced before (or without) being defined
    pub undefined: bool,
    /// Foreign-namespace attributes
    pub extension_attributes: ExtensionAttributes,
}

impl PortType {
    /// Create a defined, empty port type
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            operations: Vec::new(),
            documentation: None,
            undefined: false,
            extension_attributes: ExtensionAttributes::new(),
        }
    }

    /// Create a forward-reference placeholder
    pub fn placeholder(qname: QName) -> Self {
        Self {
            undefined: true,
            ..Self::new(qname)
        }
    }

    /// Append an operation and return its index
    pub fn add_operation(&mut self, operation: Operation) -> usize {
        self.operations.push(operation);
        self.operations.len() - 1
    }

    /// Operations in document order
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Operation at `index`
    pub fn operation(&self, index: usize) -> Option<&Operation> {
        self.operations.get(index)
    }

    /// Operation at `index`, mutably
    pub fn operation_mut(&mut self, index: usize) -> Option<&mut Operation> {
        self.operations.get_mut(index)
    }

    /// Find the single operation matching a name and optional input/output names
    ///
    /// Returns the index of the match, `None` when nothing matches, and an
    /// error when the names are ambiguous.
    pub fn get_operation(
        &self,
        name: &str,
        input_name: Option<&str>,
        output_name: Option<&str>,
    ) -> Result<Option<usize>> {
        let mut found = None;
        for (index, op) in self.operations.iter().enumerate() {
            if !op.matches(name, input_name, output_name) {
                continue;
            }
            if found.is_some() {
                return Err(duplicate_operation(
                    name,
                    input_name,
                    output_name,
                    "portType",
                    &self.qname,
                ));
            }
            found = Some(index);
        }
        Ok(found)
    }

    /// Like [`get_operation`](Self::get_operation), returning the operation itself
    pub fn find_operation(
        &self,
        name: &str,
        input_name: Option<&str>,
        output_name: Option<&str>,
    ) -> Result<Option<&Operation>> {
        Ok(self
            .get_operation(name, input_name, output_name)?
            .and_then(|index| self.operations.get(index)))
    }
}

pub(crate) fn duplicate_operation(
    name: &str,
    input_name: Option<&str>,
    output_name: Option<&str>,
    owner_kind: &str,
    owner: &QName,
) -> Error {
    let mut message = format!("Duplicate operation with name={}", name);
    if let Some(input) = input_name {
        message.push_str(&format!(", inputName={}", input));
    }
    if let Some(output) = output_name {
        message.push_str(&format!(", outputName={}", output));
    }
    message.push_str(&format!(", found in {} '{}'.", owner_kind, owner));
    Error::invalid_wsdl(message)
}
