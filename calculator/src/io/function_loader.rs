//! Function manifest loading and entry point binding.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::algorithms::{EntryTable, Function, FunctionError};
use crate::core::binding::{Arguments, Values};
use crate::core::definition::Definition;
use crate::error::LoadError;

/// Contents of a plugin's function manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct FunctionManifest {
    /// Name of the entry point in the [`EntryTable`].
    entry: String,
}

/// An entry point whose signature matches a definition.
#[derive(Clone)]
pub struct BoundFunction {
    entry: String,
    function: Arc<dyn Function>,
}

impl BoundFunction {
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Run the function body on the calling thread.
    pub fn call(&self, args: &Arguments) -> Result<Values, FunctionError> {
        self.function.call(args)
    }
}

impl fmt::Debug for BoundFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundFunction")
            .field("entry", &self.entry)
            .finish_non_exhaustive()
    }
}

/// Resolve the manifest at `path` against `table` and check it fits `definition`.
pub fn load_function(
    path: &Path,
    definition: &Definition,
    table: &EntryTable,
) -> Result<BoundFunction, LoadError> {
    if !path.is_file() {
        return Err(LoadError::Missing {
            path: path.to_path_buf(),
        });
    }
    let contents = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let manifest: FunctionManifest = toml::from_str(&contents).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    bind_entry(&manifest.entry, definition, table)
}

/// Look up `entry` and check its declared names against `definition`.
pub fn bind_entry(
    entry: &str,
    definition: &Definition,
    table: &EntryTable,
) -> Result<BoundFunction, LoadError> {
    let function = table.get(entry).ok_or_else(|| LoadError::UnknownEntry {
        entry: entry.to_string(),
    })?;
    check_signature(definition, function.as_ref()).map_err(|reason| {
        LoadError::SignatureMismatch {
            entry: entry.to_string(),
            reason,
        }
    })?;
    Ok(BoundFunction {
        entry: entry.to_string(),
        function,
    })
}

/// Declared input/output names must equal the entry's, as sets.
fn check_signature(definition: &Definition, function: &dyn Function) -> Result<(), String> {
    let mut problems = Vec::new();
    compare_names(
        "inputs",
        definition.input_names().collect(),
        function.parameters().iter().copied().collect(),
        &mut problems,
    );
    compare_names(
        "outputs",
        definition.output_names().collect(),
        function.outputs().iter().copied().collect(),
        &mut problems,
    );
    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems.join("; "))
    }
}

fn compare_names(
    field: &str,
    declared: BTreeSet<&str>,
    accepted: BTreeSet<&str>,
    problems: &mut Vec<String>,
) {
    let undeclared: Vec<&str> = accepted.difference(&declared).copied().collect();
    let unknown: Vec<&str> = declared.difference(&accepted).copied().collect();
    if !undeclared.is_empty() {
        problems.push(format!("{field} missing from definition: {}", undeclared.join(", ")));
    }
    if !unknown.is_empty() {
        problems.push(format!("{field} not supported by entry: {}", unknown.join(", ")));
    }
}
