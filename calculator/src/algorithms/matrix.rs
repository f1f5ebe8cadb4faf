//! Element-wise matrix arithmetic over two operands `n` and `m`.

use crate::algorithms::{Function, FunctionError, matrix_argument};
use crate::core::binding::{Arguments, Values};
use crate::core::value::{Primitive, Value};

const PARAMETERS: &[&str] = &["n", "m"];
const OUTPUTS: &[&str] = &["result"];

/// `result = n - m`
pub struct MatrixSub;

/// `result = n + m`
pub struct MatrixAdd;

impl Function for MatrixSub {
    fn parameters(&self) -> &[&str] {
        PARAMETERS
    }

    fn outputs(&self) -> &[&str] {
        OUTPUTS
    }

    fn call(&self, args: &Arguments) -> Result<Values, FunctionError> {
        elementwise(args, |a, b| a - b)
    }
}

impl Function for MatrixAdd {
    fn parameters(&self) -> &[&str] {
        PARAMETERS
    }

    fn outputs(&self) -> &[&str] {
        OUTPUTS
    }

    fn call(&self, args: &Arguments) -> Result<Values, FunctionError> {
        elementwise(args, |a, b| a + b)
    }
}

fn elementwise(args: &Arguments, op: impl Fn(f64, f64) -> f64) -> Result<Values, FunctionError> {
    let n = matrix_argument(args, "n")?;
    let m = matrix_argument(args, "m")?;
    if n.len() != m.len() {
        return Err(FunctionError::Invalid(format!(
            "length mismatch: n has {} rows, m has {}",
            n.len(),
            m.len()
        )));
    }
    let Some(first) = n.first() else {
        return Err(FunctionError::Invalid("matrix n is empty".to_string()));
    };
    let columns = first.len();
    let n = numeric_rows("n", n, columns)?;
    let m = numeric_rows("m", m, columns)?;

    let result = n
        .iter()
        .zip(&m)
        .map(|(left, right)| left.iter().zip(right).map(|(a, b)| op(*a, *b)).collect())
        .collect();
    Ok(Values::from([(
        "result".to_string(),
        Value::number_matrix(result),
    )]))
}

/// Check that every row has `columns` cells, all present and numeric.
fn numeric_rows(
    name: &str,
    rows: &[Vec<Option<Primitive>>],
    columns: usize,
) -> Result<Vec<Vec<f64>>, FunctionError> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| -> Result<Vec<f64>, FunctionError> {
            if row.len() != columns {
                return Err(FunctionError::Invalid(format!(
                    "wrong number of columns in matrix {name}: row {i} has {}, expected {columns}",
                    row.len()
                )));
            }
            row.iter()
                .enumerate()
                .map(|(j, cell)| match cell {
                    None => Err(FunctionError::Invalid(format!(
                        "missing value in matrix {name} at [{i}][{j}]"
                    ))),
                    Some(item) => item.as_number().ok_or_else(|| {
                        FunctionError::Invalid(format!(
                            "non-numeric value in matrix {name} at [{i}][{j}]"
                        ))
                    }),
                })
                .collect()
        })
        .collect()
}
