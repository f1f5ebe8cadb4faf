//! Runtime value model shared by parameters, outputs, and fixtures.
//!
//! Values cross every boundary (caller JSON, worker pipe, fixture files) as
//! untagged JSON. Variant order below is the order serde tries when decoding,
//! so scalars win over collections and flat sequences win over matrices.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared element type of an input or output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Number,
    Text,
    Boolean,
}

/// Declared shape of an input or output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataShape {
    #[default]
    Scalar,
    Sequence,
    Matrix,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Number => "number",
            DataType::Text => "text",
            DataType::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

impl fmt::Display for DataShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataShape::Scalar => "scalar",
            DataShape::Sequence => "sequence",
            DataShape::Matrix => "matrix",
        };
        f.write_str(name)
    }
}

/// A single scalar cell of a sequence or matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Primitive {
    Number(f64),
    Boolean(bool),
    Text(String),
}

impl Primitive {
    pub fn data_type(&self) -> DataType {
        match self {
            Primitive::Number(_) => DataType::Number,
            Primitive::Boolean(_) => DataType::Boolean,
            Primitive::Text(_) => DataType::Text,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Primitive::Number(n) => Some(*n),
            Primitive::Boolean(_) | Primitive::Text(_) => None,
        }
    }
}

/// A runtime value carried by a [`DataElement`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Boolean(bool),
    Text(String),
    Sequence(Vec<Primitive>),
    /// Row-major cells. `None` marks a missing cell (JSON `null`).
    Matrix(Vec<Vec<Option<Primitive>>>),
}

/// Whether missing matrix cells pass a conformance check.
///
/// Inputs may carry holes (the algorithm reports them as a domain error);
/// outputs never may.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cells {
    AllowMissing,
    RequirePresent,
}

impl Value {
    /// Build a fully populated numeric matrix.
    pub fn number_matrix(rows: Vec<Vec<f64>>) -> Self {
        Value::Matrix(
            rows.into_iter()
                .map(|row| row.into_iter().map(|n| Some(Primitive::Number(n))).collect())
                .collect(),
        )
    }

    pub fn shape(&self) -> DataShape {
        match self {
            Value::Number(_) | Value::Boolean(_) | Value::Text(_) => DataShape::Scalar,
            Value::Sequence(_) => DataShape::Sequence,
            Value::Matrix(_) => DataShape::Matrix,
        }
    }

    /// Short human description used in validation messages.
    pub fn describe(&self) -> String {
        match self {
            Value::Number(_) => "number".to_string(),
            Value::Boolean(_) => "boolean".to_string(),
            Value::Text(_) => "text".to_string(),
            Value::Sequence(items) if items.is_empty() => "empty sequence".to_string(),
            Value::Sequence(_) => "sequence".to_string(),
            Value::Matrix(_) => "matrix".to_string(),
        }
    }

    /// Resolve encodings that JSON cannot disambiguate.
    ///
    /// `[]` always decodes as an empty sequence; when a matrix is declared it
    /// becomes an empty matrix.
    pub fn into_shape(self, shape: DataShape) -> Value {
        match (self, shape) {
            (Value::Sequence(items), DataShape::Matrix) if items.is_empty() => {
                Value::Matrix(Vec::new())
            }
            (value, _) => value,
        }
    }

    /// Check this value against a declared type and shape.
    ///
    /// Returns a reason on mismatch; callers attach the element name.
    pub fn check(&self, data_type: DataType, shape: DataShape, cells: Cells) -> Result<(), String> {
        match (shape, self) {
            (DataShape::Scalar, Value::Number(_)) => expect_type(DataType::Number, data_type, "value"),
            (DataShape::Scalar, Value::Boolean(_)) => {
                expect_type(DataType::Boolean, data_type, "value")
            }
            (DataShape::Scalar, Value::Text(_)) => expect_type(DataType::Text, data_type, "value"),
            (DataShape::Sequence, Value::Sequence(items)) => {
                items.iter().enumerate().try_for_each(|(i, item)| {
                    expect_type(item.data_type(), data_type, &format!("element {i}"))
                })
            }
            (DataShape::Matrix, Value::Sequence(items)) if items.is_empty() => Ok(()),
            (DataShape::Matrix, Value::Matrix(rows)) => {
                for (i, row) in rows.iter().enumerate() {
                    for (j, cell) in row.iter().enumerate() {
                        match cell {
                            Some(item) => {
                                expect_type(item.data_type(), data_type, &format!("cell [{i}][{j}]"))?;
                            }
                            None if cells == Cells::AllowMissing => {}
                            None => return Err(format!("cell [{i}][{j}] is missing")),
                        }
                    }
                }
                Ok(())
            }
            (expected, actual) => Err(format!(
                "expected {data_type} {expected}, got {}",
                actual.describe()
            )),
        }
    }

    /// Every number must be finite: JSON has no encoding for NaN or infinities.
    pub fn check_finite(&self) -> Result<(), String> {
        let finite = |item: &Primitive| item.as_number().is_none_or(f64::is_finite);
        match self {
            Value::Number(n) if !n.is_finite() => Err(format!("value {n} is not finite")),
            Value::Sequence(items) => match items.iter().position(|item| !finite(item)) {
                Some(i) => Err(format!("element {i} is not finite")),
                None => Ok(()),
            },
            Value::Matrix(rows) => {
                for (i, row) in rows.iter().enumerate() {
                    for (j, cell) in row.iter().enumerate() {
                        if cell.as_ref().is_some_and(|item| !finite(item)) {
                            return Err(format!("cell [{i}][{j}] is not finite"));
                        }
                    }
                }
                Ok(())
            }
            Value::Number(_) | Value::Boolean(_) | Value::Text(_) => Ok(()),
        }
    }
}

fn expect_type(actual: DataType, expected: DataType, what: &str) -> Result<(), String> {
    if actual == expected {
        Ok(())
    } else {
        Err(format!("{what} is {actual}, expected {expected}"))
    }
}

/// A named runtime value: one input parameter or one output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataElement {
    pub name: String,
    pub value: Value,
}

impl DataElement {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}
