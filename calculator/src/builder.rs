//! Turning one plugin directory into an admitted [`AlgorithmExecutor`].

use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::algorithms::EntryTable;
use crate::error::BuildError;
use crate::executor::AlgorithmExecutor;
use crate::io::config::CalculatorConfig;
use crate::io::definition_loader::load_definition;
use crate::io::fixtures::load_fixtures;
use crate::io::function_loader::load_function;
use crate::io::worker::Worker;
use crate::self_test::run_self_tests;

/// Loads, binds and self-tests plugin directories.
#[derive(Clone)]
pub struct AlgorithmBuilder {
    config: CalculatorConfig,
    table: EntryTable,
    worker: Arc<dyn Worker>,
}

impl AlgorithmBuilder {
    pub fn new(config: CalculatorConfig, table: EntryTable, worker: Arc<dyn Worker>) -> Self {
        Self {
            config,
            table,
            worker,
        }
    }

    /// Definition, then entry point, then fixtures. The first failure wins and
    /// nothing partially built escapes.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn build_algorithm(&self, dir: &Path) -> Result<AlgorithmExecutor, BuildError> {
        let definition = load_definition(&dir.join(&self.config.definition_file)).map_err(
            |source| BuildError::Definition {
                dir: dir.to_path_buf(),
                source,
            },
        )?;
        let function = load_function(
            &dir.join(&self.config.function_file),
            &definition,
            &self.table,
        )
        .map_err(|source| BuildError::Load {
            dir: dir.to_path_buf(),
            source,
        })?;

        let timeout = self.config.timeout_for(&definition.name);
        let executor =
            AlgorithmExecutor::new(definition, function, timeout, Arc::clone(&self.worker));

        let self_test = |source| BuildError::SelfTest {
            dir: dir.to_path_buf(),
            source,
        };
        let fixtures = load_fixtures(&dir.join(&self.config.test_file)).map_err(self_test)?;
        run_self_tests(&executor, &fixtures).map_err(self_test)?;

        info!(
            algorithm = executor.name(),
            fixtures = fixtures.len(),
            timeout_ms = timeout.as_millis(),
            "algorithm admitted"
        );
        Ok(executor)
    }
}
