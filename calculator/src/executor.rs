//! Validate-then-run execution of one admitted algorithm.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::core::binding::bind_parameters;
use crate::core::definition::Definition;
use crate::core::value::{Cells, DataElement};
use crate::error::ExecuteError;
use crate::io::function_loader::BoundFunction;
use crate::io::worker::{Worker, WorkerError};

/// A definition paired with its bound entry point and time budget.
#[derive(Clone)]
pub struct AlgorithmExecutor {
    definition: Definition,
    function: BoundFunction,
    timeout: Duration,
    worker: Arc<dyn Worker>,
}

impl fmt::Debug for AlgorithmExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmExecutor")
            .field("name", &self.definition.name)
            .field("entry", &self.function.entry())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl AlgorithmExecutor {
    pub fn new(
        definition: Definition,
        function: BoundFunction,
        timeout: Duration,
        worker: Arc<dyn Worker>,
    ) -> Self {
        Self {
            definition,
            function,
            timeout,
            worker,
        }
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Bind `params`, run the entry point under the deadline and return the
    /// outputs in declared order.
    #[instrument(skip_all, fields(algorithm = %self.definition.name))]
    pub fn execute(&self, params: Vec<DataElement>) -> Result<Vec<DataElement>, ExecuteError> {
        let algorithm = self.definition.name.clone();
        let args = bind_parameters(&self.definition, params).map_err(|message| {
            ExecuteError::Validation {
                algorithm: algorithm.clone(),
                message,
            }
        })?;

        let mut values = match self.worker.run(&self.function, &args, self.timeout) {
            Ok(values) => values,
            Err(WorkerError::TimedOut(timeout)) => {
                warn!(timeout_ms = timeout.as_millis(), "execution timed out");
                return Err(ExecuteError::Timeout { algorithm, timeout });
            }
            Err(WorkerError::Rejected(message)) => {
                return Err(ExecuteError::Validation { algorithm, message });
            }
            Err(err) => {
                return Err(ExecuteError::Execution {
                    algorithm,
                    message: err.to_string(),
                });
            }
        };

        let mut outputs = Vec::with_capacity(self.definition.outputs.len());
        for spec in &self.definition.outputs {
            let Some(value) = values.remove(&spec.name) else {
                return Err(ExecuteError::Execution {
                    algorithm,
                    message: format!("missing declared output '{}'", spec.name),
                });
            };
            let value = value.into_shape(spec.shape);
            if let Err(reason) = value
                .check(spec.data_type, spec.shape, Cells::RequirePresent)
                .and_then(|()| value.check_finite())
            {
                return Err(ExecuteError::Execution {
                    algorithm,
                    message: format!("output '{}' does not conform: {reason}", spec.name),
                });
            }
            outputs.push(DataElement::new(spec.name.clone(), value));
        }
        for extra in values.keys() {
            debug!(output = %extra, "dropping undeclared output");
        }
        Ok(outputs)
    }
}
