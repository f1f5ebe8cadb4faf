//! Self-test fixtures bundled with each plugin.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::definition::Definition;
use crate::core::value::{Cells, DataElement};

/// Kind of failure a fixture expects the call to end with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedFailure {
    Validation,
    Execution,
}

impl fmt::Display for ExpectedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedFailure::Validation => f.write_str("validation"),
            ExpectedFailure::Execution => f.write_str("execution"),
        }
    }
}

/// What a fixture expects: exact outputs or a failure of a given kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expected {
    Outputs(Vec<DataElement>),
    Error(ExpectedFailure),
}

/// One `(parameters, expectation)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub parameters: Vec<DataElement>,
    #[serde(flatten)]
    pub expected: Expected,
}

/// Compare actual outputs against a fixture's expected outputs.
///
/// Every actual output must conform to its declared spec (cells present),
/// and the sequence must match the expected one exactly, in declared order.
pub fn compare_outputs(
    definition: &Definition,
    expected: &[DataElement],
    actual: &[DataElement],
) -> Result<(), String> {
    for (spec, element) in definition.outputs.iter().zip(actual) {
        element
            .value
            .check(spec.data_type, spec.shape, Cells::RequirePresent)
            .map_err(|reason| format!("output '{}' does not conform: {reason}", spec.name))?;
    }

    let expected: Vec<DataElement> = expected
        .iter()
        .map(|element| {
            let shape = definition
                .outputs
                .iter()
                .find(|spec| spec.name == element.name)
                .map(|spec| spec.shape)
                .unwrap_or_default();
            DataElement::new(element.name.clone(), element.value.clone().into_shape(shape))
        })
        .collect();

    if expected.len() != actual.len() {
        return Err(format!(
            "expected {} outputs, got {}",
            expected.len(),
            actual.len()
        ));
    }
    for (want, got) in expected.iter().zip(actual) {
        if want != got {
            return Err(format!(
                "output '{}': expected {}, got {}",
                want.name,
                render(want),
                render(got)
            ));
        }
    }
    Ok(())
}

fn render(element: &DataElement) -> String {
    serde_json::to_string(&element.value).unwrap_or_else(|_| element.value.describe())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::definition::DataSpec;
    use crate::core::value::{DataShape, DataType, Value};

    fn definition() -> Definition {
        Definition {
            name: "alg".to_string(),
            description: String::new(),
            inputs: vec![DataSpec::new("x", DataType::Number, DataShape::Scalar)],
            outputs: vec![DataSpec::new("result", DataType::Number, DataShape::Matrix)],
        }
    }

    #[test]
    fn decodes_outputs_and_error_fixtures() {
        let fixtures: Vec<Fixture> = serde_json::from_str(
            r#"[
                {"parameters": [{"name": "x", "value": 1}], "outputs": [{"name": "y", "value": 2}]},
                {"parameters": [], "error": "validation"}
            ]"#,
        )
        .expect("decode fixtures");
        assert_eq!(
            fixtures[0].expected,
            Expected::Outputs(vec![DataElement::new("y", Value::Number(2.0))])
        );
        assert_eq!(fixtures[1].expected, Expected::Error(ExpectedFailure::Validation));
    }

    #[test]
    fn matching_outputs_pass() {
        let outputs = vec![DataElement::new(
            "result",
            Value::number_matrix(vec![vec![1.0, 0.0]]),
        )];
        assert!(compare_outputs(&definition(), &outputs, &outputs).is_ok());
    }

    #[test]
    fn differing_value_is_reported() {
        let expected = vec![DataElement::new("result", Value::number_matrix(vec![vec![1.0]]))];
        let actual = vec![DataElement::new("result", Value::number_matrix(vec![vec![2.0]]))];
        let err = compare_outputs(&definition(), &expected, &actual).unwrap_err();
        assert_eq!(err, "output 'result': expected [[1.0]], got [[2.0]]");
    }

    #[test]
    fn nonconforming_output_is_reported() {
        let expected = vec![DataElement::new("result", Value::Text("x".to_string()))];
        let err = compare_outputs(&definition(), &expected, &expected).unwrap_err();
        assert!(err.starts_with("output 'result' does not conform"));
    }

    #[test]
    fn empty_expected_matrix_matches_empty_result() {
        let expected = vec![DataElement::new("result", Value::Sequence(Vec::new()))];
        let actual = vec![DataElement::new("result", Value::Matrix(Vec::new()))];
        assert!(compare_outputs(&definition(), &expected, &actual).is_ok());
    }
}
