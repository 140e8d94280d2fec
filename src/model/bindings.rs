//! Bindings: concrete protocol details for a port type

use crate::documents::Element;
use crate::error::Result;
use crate::model::extensible::{ExtensibilityElement, ExtensionAttributes};
use crate::model::port_types::{
    default_input_name, default_output_name, duplicate_operation, io_name_matches, PortType,
};
use crate::namespaces::QName;
use indexmap::IndexMap;

/// Protocol details for an operation's input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingInput {
    /// Explicit name
    pub name: Option<String>,
    /// `documentation` child
    pub documentation: Option<Element>,
    /// Protocol extensions, e.g. `soap:body`
    pub extensibility_elements: Vec<ExtensibilityElement>,
    /// Foreign-namespace attributes
    pub extension_attributes: ExtensionAttributes,
}

/// Protocol details for an operation's output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingOutput {
    /// Explicit name
    pub name: Option<String>,
    /// `documentation` child
    pub documentation: Option<Element>,
    /// Protocol extensions
    pub extensibility_elements: Vec<ExtensibilityElement>,
    /// Foreign-namespace attributes
    pub extension_attributes: ExtensionAttributes,
}

/// Protocol details for a named fault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingFault {
    /// Fault name, matching a fault of the bound operation
    pub name: String,
    /// `documentation` child
    pub documentation: Option<Element>,
    /// Protocol extensions
    pub extensibility_elements: Vec<ExtensibilityElement>,
    /// Foreign-namespace attributes
    pub extension_attributes: ExtensionAttributes,
}

impl BindingFault {
    /// Create a fault binding with no extensions
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documentation: None,
            extensibility_elements: Vec::new(),
            extension_attributes: ExtensionAttributes::new(),
        }
    }
}

/// Binding of a single operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingOperation {
    /// Operation name
    pub name: String,
    /// Index of the bound operation in the binding's port type
    pub operation: Option<usize>,
    /// Input details
    pub binding_input: Option<BindingInput>,
    /// Output details
    pub binding_output: Option<BindingOutput>,
    binding_faults: IndexMap<String, BindingFault>,
    /// `documentation` child
    pub documentation: Option<Element>,
    /// Protocol extensions, e.g. `soap:operation`
    pub extensibility_elements: Vec<ExtensibilityElement>,
    /// Foreign-namespace attributes
    pub extension_attributes: ExtensionAttributes,
}

impl BindingOperation {
    /// Create an empty binding operation
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operation: None,
            binding_input: None,
            binding_output: None,
            binding_faults: IndexMap::new(),
            documentation: None,
            extensibility_elements: Vec::new(),
            extension_attributes: ExtensionAttributes::new(),
        }
    }

    /// Add a fault binding, replacing one with the same name in place
    pub fn add_binding_fault(&mut self, fault: BindingFault) {
        self.binding_faults.insert(fault.name.clone(), fault);
    }

    /// Get a fault binding by name
    pub fn binding_fault(&self, name: &str) -> Option<&BindingFault> {
        self.binding_faults.get(name)
    }

    /// Remove a fault binding
    pub fn remove_binding_fault(&mut self, name: &str) -> Option<BindingFault> {
        self.binding_faults.shift_remove(name)
    }

    /// Fault bindings in insertion order
    pub fn binding_faults(&self) -> impl Iterator<Item = &BindingFault> {
        self.binding_faults.values()
    }
}

/// Concrete binding of a port type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Binding name
    pub qname: QName,
    /// Bound port type
    pub port_type: Option<QName>,
    binding_operations: Vec<BindingOperation>,
    /// `documentation` child
    pub documentation: Option<Element>,
    /// Protocol extensions, e.g. `soap:binding`
    pub extensibility_elements: Vec<ExtensibilityElement>,
    /// Referenced before (or without) being defined
    pub undefined: bool,
    /// Foreign-namespace attributes
    pub extension_attributes: ExtensionAttributes,
}

impl Binding {
    /// Create a defined binding
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            port_type: None,
            binding_operations: Vec::new(),
            documentation: None,
            extensibility_elements: Vec::new(),
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

    /// Append a binding operation and return its index
    pub fn add_binding_operation(&mut self, operation: BindingOperation) -> usize {
        self.binding_operations.push(operation);
        self.binding_operations.len() - 1
    }

    /// Binding operations in document order
    pub fn binding_operations(&self) -> &[BindingOperation] {
        &self.binding_operations
    }

    /// Binding operation at `index`, mutably
    pub fn binding_operation_mut(&mut self, index: usize) -> Option<&mut BindingOperation> {
        self.binding_operations.get_mut(index)
    }

    /// Find the single binding operation matching a name and optional
    /// input/output names
    ///
    /// Unnamed inputs and outputs take their default names from the style of
    /// the matching operation in `port_type`, when one is given and resolves.
    pub fn get_binding_operation(
        &self,
        name: &str,
        input_name: Option<&str>,
        output_name: Option<&str>,
        port_type: Option<&PortType>,
    ) -> Result<Option<usize>> {
        // either name alone is enough to need the style: an output-only
        // lookup must still match a defaulted "<name>Response"
        let style = match (port_type, input_name.or(output_name)) {
            (Some(pt), Some(_)) => pt
                .find_operation(name, input_name, output_name)?
                .and_then(|op| op.style),
            _ => None,
        };

        let mut found = None;
        for (index, op) in self.binding_operations.iter().enumerate() {
            let matches = op.name == name
                && io_name_matches(
                    input_name,
                    op.binding_input.as_ref().map(|i| i.name.as_deref()),
                    || default_input_name(&op.name, style),
                )
                && io_name_matches(
                    output_name,
                    op.binding_output.as_ref().map(|o| o.name.as_deref()),
                    || default_output_name(&op.name, style),
                );
            if !matches {
                continue;
            }
            if found.is_some() {
                return Err(duplicate_operation(
                    name,
                    input_name,
                    output_name,
                    "binding",
                    &self.qname,
                ));
            }
            found = Some(index);
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FaultCode;
    use crate::model::port_types::{Input, Operation, OperationType, Output};

    fn binding_op(name: &str, input: Option<&str>, output: Option<&str>) -> BindingOperation {
        let mut op = BindingOperation::new(name);
        op.binding_input = Some(BindingInput {
            name: input.map(str::to_string),
            ..BindingInput::default()
        });
        op.binding_output = Some(BindingOutput {
            name: output.map(str::to_string),
            ..BindingOutput::default()
        });
        op
    }

    #[test]
    fn test_lookup_by_name_only() {
        let mut binding = Binding::new(QName::namespaced("urn:t", "B"));
        binding.add_binding_operation(binding_op("a", None, None));
        binding.add_binding_operation(binding_op("b", None, None));

        assert_eq!(binding.get_binding_operation("b", None, None, None).unwrap(), Some(1));
        assert_eq!(binding.get_binding_operation("c", None, None, None).unwrap(), None);
    }

    #[test]
    fn test_defaults_follow_port_type_style() {
        let mut pt = PortType::new(QName::namespaced("urn:t", "PT"));
        let mut op = Operation::new("Get");
        op.input = Some(Input::default());
        op.output = Some(Output::default());
        op.style = Some(OperationType::RequestResponse);
        pt.add_operation(op);

        let mut binding = Binding::new(QName::namespaced("urn:t", "B"));
        binding.add_binding_operation(binding_op("Get", None, None));

        let found = binding
            .get_binding_operation("Get", None, Some("GetResponse"), Some(&pt))
            .unwrap();
        assert_eq!(found, Some(0));

        // without the port type the default output name is the bare name
        let found = binding
            .get_binding_operation("Get", None, Some("GetResponse"), None)
            .unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn test_duplicate_binding_operation() {
        let mut binding = Binding::new(QName::namespaced("urn:t", "B"));
        binding.add_binding_operation(binding_op("a", Some("x"), None));
        binding.add_binding_operation(binding_op("a", Some("y"), None));

        assert_eq!(
            binding.get_binding_operation("a", Some("y"), None, None).unwrap(),
            Some(1)
        );
        let err = binding.get_binding_operation("a", None, None, None).unwrap_err();
        assert!(err.is(FaultCode::InvalidWsdl));
        assert!(err.message.contains("binding '{urn:t}B'"));
    }

    #[test]
    fn test_binding_faults_ordered() {
        let mut op = BindingOperation::new("a");
        op.add_binding_fault(BindingFault::new("f2"));
        op.add_binding_fault(BindingFault::new("f1"));
        let names: Vec<_> = op.binding_faults().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["f2", "f1"]);
    }
}
