//! Statically registered algorithm entry points.
//!
//! A plugin's `function.toml` names an entry in the [`EntryTable`]; there is
//! no runtime symbol lookup. Every entry implements [`Function`], which
//! declares the argument and output names it works with so the loader can
//! check them against the plugin's definition before anything runs.

pub mod matrix;
pub mod primes;

use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::core::binding::{Arguments, Values};
use crate::core::value::{Primitive, Value};

/// Failure reported by a function body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FunctionError {
    /// The arguments violate the algorithm's own domain rules.
    #[error("{0}")]
    Invalid(String),
    /// The algorithm could not produce a result.
    #[error("{0}")]
    Failed(String),
}

/// A callable algorithm body with a fixed named-argument signature.
pub trait Function: Send + Sync {
    /// Argument names `call` reads.
    fn parameters(&self) -> &[&str];

    /// Output names `call` returns.
    fn outputs(&self) -> &[&str];

    fn call(&self, args: &Arguments) -> Result<Values, FunctionError>;
}

/// Registration table mapping entry names to implementations.
#[derive(Clone, Default)]
pub struct EntryTable {
    entries: IndexMap<String, Arc<dyn Function>>,
}

impl EntryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entry point shipped with the calculator.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.register("matrix_sub", Arc::new(matrix::MatrixSub));
        table.register("matrix_add", Arc::new(matrix::MatrixAdd));
        table.register("prime_count", Arc::new(primes::PrimeCount));
        table
    }

    /// Register `function` under `entry`, replacing any previous entry.
    pub fn register(&mut self, entry: impl Into<String>, function: Arc<dyn Function>) {
        self.entries.insert(entry.into(), function);
    }

    pub fn get(&self, entry: &str) -> Option<Arc<dyn Function>> {
        self.entries.get(entry).cloned()
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

pub(crate) fn argument<'a>(args: &'a Arguments, name: &str) -> Result<&'a Value, FunctionError> {
    args.get(name)
        .ok_or_else(|| FunctionError::Failed(format!("argument '{name}' was not supplied")))
}

pub(crate) fn number_argument(args: &Arguments, name: &str) -> Result<f64, FunctionError> {
    match argument(args, name)? {
        Value::Number(n) => Ok(*n),
        other => Err(FunctionError::Invalid(format!(
            "{name} must be a number, got {}",
            other.describe()
        ))),
    }
}

pub(crate) fn matrix_argument<'a>(
    args: &'a Arguments,
    name: &str,
) -> Result<&'a [Vec<Option<Primitive>>], FunctionError> {
    match argument(args, name)? {
        Value::Matrix(rows) => Ok(rows),
        Value::Sequence(items) if items.is_empty() => Ok(&[]),
        other => Err(FunctionError::Invalid(format!(
            "{name} must be a matrix, got {}",
            other.describe()
        ))),
    }
}
