//! Definition loading with schema + invariant validation.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use jsonschema::{Validator, validator_for};
use serde_json::Value;

use crate::core::definition::{Definition, validate_definition};
use crate::error::DefinitionError;

const DEFINITION_SCHEMA: &str = include_str!("../../schemas/definition.schema.json");

static DEFINITION_VALIDATOR: LazyLock<Result<Validator, String>> = LazyLock::new(|| {
    let schema: Value = serde_json::from_str(DEFINITION_SCHEMA)
        .map_err(|err| format!("invalid definition schema: {err}"))?;
    validator_for(&schema).map_err(|err| format!("invalid definition schema: {err}"))
});

/// The embedded definition schema, compiled on first use.
fn definition_validator() -> Result<&'static Validator, &'static str> {
    DEFINITION_VALIDATOR.as_ref().map_err(String::as_str)
}

/// Load and validate one algorithm definition (schema + invariants).
pub fn load_definition(path: &Path) -> Result<Definition, DefinitionError> {
    if !path.is_file() {
        return Err(DefinitionError::Missing {
            path: path.to_path_buf(),
        });
    }
    let contents = fs::read_to_string(path).map_err(|source| DefinitionError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parse = |source| DefinitionError::Parse {
        path: path.to_path_buf(),
        source,
    };
    let value: Value = serde_json::from_str(&contents).map_err(parse)?;
    validate_schema(path, &value)?;
    let definition: Definition = serde_json::from_value(value).map_err(parse)?;

    let violations = validate_definition(&definition);
    if !violations.is_empty() {
        return Err(DefinitionError::Invariants {
            path: path.to_path_buf(),
            violations,
        });
    }
    Ok(definition)
}

fn validate_schema(path: &Path, definition: &Value) -> Result<(), DefinitionError> {
    let schema_error = |messages| DefinitionError::Schema {
        path: path.to_path_buf(),
        messages,
    };
    let validator = definition_validator().map_err(|msg| schema_error(vec![msg.to_string()]))?;
    let messages: Vec<String> = validator
        .iter_errors(definition)
        .map(|err| err.to_string())
        .collect();
    if messages.is_empty() {
        Ok(())
    } else {
        Err(schema_error(messages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::{DataShape, DataType};

    fn write(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("definition.json");
        fs::write(&path, contents).expect("write definition");
        (temp, path)
    }

    #[test]
    fn definition_schema_is_compiled_once() {
        let first = definition_validator().expect("schema compiles");
        let second = definition_validator().expect("schema compiles");
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn loads_valid_definition() {
        let (_temp, path) = write(
            r#"{
                "name": "matrix_sub",
                "description": "n - m",
                "inputs": [
                    {"name": "n", "type": "number", "shape": "matrix"},
                    {"name": "m", "type": "number", "shape": "matrix"}
                ],
                "outputs": [{"name": "result", "type": "number", "shape": "matrix"}]
            }"#,
        );
        let definition = load_definition(&path).expect("load");
        assert_eq!(definition.name, "matrix_sub");
        assert_eq!(definition.inputs[1].name, "m");
        assert_eq!(definition.outputs[0].data_type, DataType::Number);
        assert_eq!(definition.outputs[0].shape, DataShape::Matrix);
    }

    #[test]
    fn missing_file_is_reported() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = load_definition(&temp.path().join("definition.json")).unwrap_err();
        assert!(matches!(err, DefinitionError::Missing { .. }));
    }

    #[test]
    fn malformed_json_is_reported() {
        let (_temp, path) = write("{ not json");
        let err = load_definition(&path).unwrap_err();
        assert!(matches!(err, DefinitionError::Parse { .. }));
    }

    #[test]
    fn missing_required_fields_fail_schema() {
        let (_temp, path) = write(r#"{"description": "no name", "inputs": []}"#);
        let err = load_definition(&path).unwrap_err();
        let DefinitionError::Schema { messages, .. } = err else {
            panic!("expected schema error");
        };
        assert!(messages.iter().any(|msg| msg.contains("name")));
        assert!(messages.iter().any(|msg| msg.contains("outputs")));
    }

    #[test]
    fn unknown_type_fails_schema() {
        let (_temp, path) = write(
            r#"{"name": "x", "description": "", "inputs": [],
                "outputs": [{"name": "y", "type": "complex"}]}"#,
        );
        assert!(matches!(
            load_definition(&path).unwrap_err(),
            DefinitionError::Schema { .. }
        ));
    }

    #[test]
    fn duplicate_input_names_fail_invariants() {
        let (_temp, path) = write(
            r#"{"name": "x", "description": "",
                "inputs": [{"name": "a", "type": "number"}, {"name": "a", "type": "number"}],
                "outputs": [{"name": "y", "type": "number"}]}"#,
        );
        let err = load_definition(&path).unwrap_err();
        assert!(err.to_string().contains("duplicate name 'a'"));
    }
}
