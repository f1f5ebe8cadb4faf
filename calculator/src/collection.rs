//! The name-keyed registry of admitted algorithms.
//!
//! Built once at startup and immutable afterwards, so it can be shared across
//! request threads without locking.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use indexmap::IndexMap;
use tracing::{info, instrument};

use crate::algorithms::EntryTable;
use crate::builder::AlgorithmBuilder;
use crate::core::answer::{Answer, Outputs, Parameters};
use crate::core::definition::Definition;
use crate::core::value::DataElement;
use crate::error::{CatalogError, ExecuteError};
use crate::executor::AlgorithmExecutor;
use crate::io::catalog::plugin_dirs;
use crate::io::config::CalculatorConfig;
use crate::io::worker::ProcessWorker;

/// Every admitted algorithm, in catalog order.
#[derive(Debug, Clone)]
pub struct AlgorithmCollection {
    algorithms: IndexMap<String, AlgorithmExecutor>,
}

impl AlgorithmCollection {
    /// Build every plugin directory under `root`.
    ///
    /// All-or-nothing: the first failing plugin, a duplicate name or an empty
    /// catalog aborts the build.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn build(root: &Path, builder: &AlgorithmBuilder) -> Result<Self, CatalogError> {
        let mut algorithms = IndexMap::new();
        let mut origins: HashMap<String, PathBuf> = HashMap::new();

        for dir in plugin_dirs(root)? {
            let executor = builder.build_algorithm(&dir)?;
            let name = executor.name().to_string();
            if let Some(first) = origins.get(&name) {
                return Err(CatalogError::DuplicateName {
                    name,
                    first: first.clone(),
                    second: dir,
                });
            }
            origins.insert(name.clone(), dir);
            algorithms.insert(name, executor);
        }

        if algorithms.is_empty() {
            return Err(CatalogError::Empty {
                root: root.to_path_buf(),
            });
        }
        info!(algorithms = algorithms.len(), "catalog built");
        Ok(Self { algorithms })
    }

    /// Build the catalog named by `config` with the builtin entry points and
    /// process workers.
    pub fn from_config(config: &CalculatorConfig) -> Result<Self> {
        let worker = ProcessWorker::from_config(config)?;
        let builder =
            AlgorithmBuilder::new(config.clone(), EntryTable::builtin(), Arc::new(worker));
        Ok(Self::build(&config.catalog_root, &builder)?)
    }

    pub fn has(&self, name: &str) -> bool {
        self.algorithms.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.algorithms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.algorithms.is_empty()
    }

    /// Definitions of every admitted algorithm.
    pub fn list(&self) -> Vec<&Definition> {
        self.algorithms
            .values()
            .map(AlgorithmExecutor::definition)
            .collect()
    }

    pub fn get_definition(&self, name: &str) -> Result<&Definition, ExecuteError> {
        self.get(name).map(AlgorithmExecutor::definition)
    }

    pub fn execute(
        &self,
        name: &str,
        params: Vec<DataElement>,
    ) -> Result<Vec<DataElement>, ExecuteError> {
        self.get(name)?.execute(params)
    }

    pub fn answer_definition(&self, name: &str) -> Answer<Definition> {
        self.get_definition(name).cloned().into()
    }

    pub fn answer_execute(&self, name: &str, params: Parameters) -> Answer<Outputs> {
        self.execute(name, params.parameters)
            .map(|outputs| Outputs { outputs })
            .into()
    }

    fn get(&self, name: &str) -> Result<&AlgorithmExecutor, ExecuteError> {
        self.algorithms
            .get(name)
            .ok_or_else(|| ExecuteError::not_found(name))
    }
}
