//! Binding caller parameters to a definition's declared inputs.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::core::definition::Definition;
use crate::core::value::{Cells, DataElement, Value};

/// Values keyed by element name, as exchanged with a callable.
pub type Values = BTreeMap<String, Value>;

/// Named arguments handed to a callable, one per declared input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments(Values);

impl Arguments {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Match `params` against the declared inputs and reshape each value.
///
/// Every problem is collected so the caller sees all of them at once:
/// unknown names, duplicates, missing inputs, and values that do not conform
/// to the declared type/shape. Missing matrix cells are left for the
/// algorithm's own domain checks.
pub fn bind_parameters(definition: &Definition, params: Vec<DataElement>) -> Result<Arguments, String> {
    let mut problems = Vec::new();
    let mut seen = HashSet::new();
    let mut bound = Values::new();

    for param in params {
        let Some(spec) = definition.input(&param.name) else {
            problems.push(format!("unknown parameter '{}'", param.name));
            continue;
        };
        if !seen.insert(param.name.clone()) {
            problems.push(format!("duplicate parameter '{}'", param.name));
            continue;
        }
        let value = param.value.into_shape(spec.shape);
        match value.check(spec.data_type, spec.shape, Cells::AllowMissing) {
            Ok(()) => {
                bound.insert(param.name, value);
            }
            Err(reason) => problems.push(format!("parameter '{}': {reason}", spec.name)),
        }
    }

    for name in definition.input_names() {
        if !seen.contains(name) {
            problems.push(format!("missing parameter '{name}'"));
        }
    }

    if problems.is_empty() {
        Ok(Arguments(bound))
    } else {
        Err(problems.join("; "))
    }
}
