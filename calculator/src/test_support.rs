//! Test-only helpers: on-disk catalogs and fake workers.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use crate::core::binding::{Arguments, Values};
use crate::core::definition::{DataSpec, Definition};
use crate::core::value::{DataShape, DataType};
use crate::io::config::CalculatorConfig;
use crate::io::function_loader::BoundFunction;
use crate::io::worker::{Reply, Worker, WorkerError};

/// Fixtures shipped with the matrix subtraction plugin.
pub const MATRIX_SUB_TESTS: &str = r#"[
  {
    "parameters": [
      {"name": "n", "value": [[1, 2, 3], [2, 3, 4]]},
      {"name": "m", "value": [[0, 2, 2], [2, 1, 4]]}
    ],
    "outputs": [{"name": "result", "value": [[1, 0, 1], [0, 2, 0]]}]
  },
  {
    "parameters": [
      {"name": "n", "value": [[1, 2]]},
      {"name": "m", "value": [[1, 2], [3, 4]]}
    ],
    "error": "validation"
  }
]"#;

/// Fixtures shipped with the matrix addition plugin.
pub const MATRIX_ADD_TESTS: &str = r#"[
  {
    "parameters": [
      {"name": "n", "value": [[1, 2], [3, 4]]},
      {"name": "m", "value": [[10, 20], [30, 40]]}
    ],
    "outputs": [{"name": "result", "value": [[11, 22], [33, 44]]}]
  }
]"#;

/// Fixtures shipped with the prime counting plugin.
pub const PRIME_COUNT_TESTS: &str = r#"[
  {"parameters": [{"name": "n", "value": 10}], "outputs": [{"name": "count", "value": 4}]},
  {"parameters": [{"name": "n", "value": 100}], "outputs": [{"name": "count", "value": 25}]},
  {"parameters": [{"name": "n", "value": -1}], "error": "validation"}
]"#;

pub const PRIME_COUNT_DEFINITION: &str = r#"{
  "name": "prime_count",
  "description": "Number of primes less than or equal to n",
  "inputs": [{"name": "n", "type": "number"}],
  "outputs": [{"name": "count", "type": "number"}]
}"#;

pub fn matrix_sub_definition() -> Definition {
    Definition {
        name: "matrix_sub".to_string(),
        description: "Element-wise n - m".to_string(),
        inputs: vec![
            DataSpec::new("n", DataType::Number, DataShape::Matrix),
            DataSpec::new("m", DataType::Number, DataShape::Matrix),
        ],
        outputs: vec![DataSpec::new("result", DataType::Number, DataShape::Matrix)],
    }
}

pub fn prime_count_definition() -> Definition {
    Definition {
        name: "prime_count".to_string(),
        description: "Number of primes less than or equal to n".to_string(),
        inputs: vec![DataSpec::new("n", DataType::Number, DataShape::Scalar)],
        outputs: vec![DataSpec::new("count", DataType::Number, DataShape::Scalar)],
    }
}

/// A catalog root in a temporary directory.
pub struct TestCatalog {
    temp: tempfile::TempDir,
}

impl Default for TestCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCatalog {
    pub fn new() -> Self {
        Self {
            temp: tempfile::tempdir().expect("create catalog tempdir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Default config pointed at this catalog.
    pub fn config(&self) -> CalculatorConfig {
        CalculatorConfig {
            catalog_root: self.root().to_path_buf(),
            ..CalculatorConfig::default()
        }
    }

    /// Definition JSON for a two-matrix algorithm declared as `name`.
    pub fn matrix_definition_json(name: &str) -> String {
        serde_json::json!({
            "name": name,
            "description": format!("{name} over two number matrices"),
            "inputs": [
                {"name": "n", "type": "number", "shape": "matrix"},
                {"name": "m", "type": "number", "shape": "matrix"}
            ],
            "outputs": [{"name": "result", "type": "number", "shape": "matrix"}]
        })
        .to_string()
    }

    /// Create plugin directory `dir`, writing only the files given.
    pub fn write_plugin(
        &self,
        dir: &str,
        definition: Option<&str>,
        function: Option<&str>,
        tests: Option<&str>,
    ) -> PathBuf {
        let path = self.root().join(dir);
        fs::create_dir_all(&path).expect("create plugin dir");
        let config = CalculatorConfig::default();
        let files = [
            (config.definition_file, definition),
            (config.function_file, function),
            (config.test_file, tests),
        ];
        for (file, contents) in files {
            if let Some(contents) = contents {
                fs::write(path.join(file), contents).expect("write plugin file");
            }
        }
        path
    }

    pub fn write_matrix_sub(&self, dir: &str) -> PathBuf {
        self.write_plugin(
            dir,
            Some(&Self::matrix_definition_json("matrix_sub")),
            Some("entry = \"matrix_sub\"\n"),
            Some(MATRIX_SUB_TESTS),
        )
    }

    pub fn write_matrix_add(&self, dir: &str) -> PathBuf {
        self.write_plugin(
            dir,
            Some(&Self::matrix_definition_json("matrix_add")),
            Some("entry = \"matrix_add\"\n"),
            Some(MATRIX_ADD_TESTS),
        )
    }

    pub fn write_prime_count(&self, dir: &str) -> PathBuf {
        self.write_plugin(
            dir,
            Some(PRIME_COUNT_DEFINITION),
            Some("entry = \"prime_count\"\n"),
            Some(PRIME_COUNT_TESTS),
        )
    }
}

/// Worker returning queued results in order, without running anything.
#[derive(Debug, Default)]
pub struct ScriptedWorker {
    results: Mutex<VecDeque<Result<Values, WorkerError>>>,
}

impl ScriptedWorker {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self::with_errors(replies.into_iter().map(Reply::into_result).collect())
    }

    pub fn with_errors(results: Vec<Result<Values, WorkerError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
        }
    }

    /// Panics if any queued result was never consumed.
    pub fn assert_drained(&self) {
        let remaining = self.results.lock().expect("scripted worker lock").len();
        assert_eq!(remaining, 0, "scripted worker has {remaining} unused results");
    }
}

impl Worker for ScriptedWorker {
    fn run(
        &self,
        _function: &BoundFunction,
        _args: &Arguments,
        _timeout: Duration,
    ) -> Result<Values, WorkerError> {
        self.results
            .lock()
            .expect("scripted worker lock")
            .pop_front()
            .expect("scripted worker ran out of results")
    }
}

/// Worker calling the function on the current thread; ignores the deadline.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineWorker;

impl Worker for InlineWorker {
    fn run(
        &self,
        function: &BoundFunction,
        args: &Arguments,
        _timeout: Duration,
    ) -> Result<Values, WorkerError> {
        Reply::from(function.call(args)).into_result()
    }
}
