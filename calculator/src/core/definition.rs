//! Declared algorithm contract and its semantic invariants.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::value::{DataShape, DataType};

/// One declared input or output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default)]
    pub shape: DataShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DataSpec {
    pub fn new(name: impl Into<String>, data_type: DataType, shape: DataShape) -> Self {
        Self {
            name: name.into(),
            data_type,
            shape,
            description: None,
        }
    }
}

/// Name, description and ordered input/output contract of one algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub name: String,
    pub description: String,
    pub inputs: Vec<DataSpec>,
    pub outputs: Vec<DataSpec>,
}

impl Definition {
    pub fn input(&self, name: &str) -> Option<&DataSpec> {
        self.inputs.iter().find(|spec| spec.name == name)
    }

    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|spec| spec.name.as_str())
    }

    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|spec| spec.name.as_str())
    }
}

/// Check invariants the definition schema cannot express:
/// - Non-blank algorithm name
/// - Non-blank, unique input names
/// - Non-blank, unique output names
pub fn validate_definition(definition: &Definition) -> Vec<String> {
    let mut errors = Vec::new();
    if definition.name.trim().is_empty() {
        errors.push("name must not be blank".to_string());
    }
    check_specs("inputs", &definition.inputs, &mut errors);
    check_specs("outputs", &definition.outputs, &mut errors);
    errors
}

fn check_specs(field: &str, specs: &[DataSpec], errors: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for (index, spec) in specs.iter().enumerate() {
        if spec.name.trim().is_empty() {
            errors.push(format!("{field}[{index}]: name must not be blank"));
            continue;
        }
        if !seen.insert(spec.name.as_str()) {
            errors.push(format!("{field}[{index}]: duplicate name '{}'", spec.name));
        }
    }
}
