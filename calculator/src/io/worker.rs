//! Isolated execution of entry points in a child process.
//!
//! The calculator binary doubles as its own worker: [`ProcessWorker`] spawns it
//! with the hidden [`WORKER_SUBCOMMAND`], writes one [`Job`] as JSON to its
//! stdin and reads one [`Reply`] from its stdout. The child is killed and
//! reaped when the deadline passes.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::algorithms::{EntryTable, FunctionError};
use crate::core::binding::{Arguments, Values};
use crate::io::config::CalculatorConfig;
use crate::io::function_loader::BoundFunction;
use crate::io::process::run_command_with_timeout;

pub const WORKER_SUBCOMMAND: &str = "worker";

/// One call sent to a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub entry: String,
    pub arguments: Arguments,
}

/// A worker's answer to one [`Job`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reply {
    Ok { outputs: Values },
    Rejected { message: String },
    Failed { message: String },
}

impl From<Result<Values, FunctionError>> for Reply {
    fn from(result: Result<Values, FunctionError>) -> Self {
        match result {
            Ok(outputs) => Reply::Ok { outputs },
            Err(FunctionError::Invalid(message)) => Reply::Rejected { message },
            Err(FunctionError::Failed(message)) => Reply::Failed { message },
        }
    }
}

impl Reply {
    pub fn into_result(self) -> Result<Values, WorkerError> {
        match self {
            Reply::Ok { outputs } => Ok(outputs),
            Reply::Rejected { message } => Err(WorkerError::Rejected(message)),
            Reply::Failed { message } => Err(WorkerError::Failed(message)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerError {
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Failed(String),
    #[error("worker crashed: {0}")]
    Crashed(String),
    #[error("worker unavailable: {0}")]
    Unavailable(String),
}

/// Runs a bound function under a deadline.
pub trait Worker: Send + Sync {
    fn run(
        &self,
        function: &BoundFunction,
        args: &Arguments,
        timeout: Duration,
    ) -> Result<Values, WorkerError>;
}

/// Worker that runs each job in a fresh child process.
#[derive(Debug, Clone)]
pub struct ProcessWorker {
    program: PathBuf,
    output_limit_bytes: usize,
}

impl ProcessWorker {
    pub fn new(program: impl Into<PathBuf>, output_limit_bytes: usize) -> Self {
        Self {
            program: program.into(),
            output_limit_bytes,
        }
    }

    /// Use `worker_program` from config, falling back to the running executable.
    pub fn from_config(config: &CalculatorConfig) -> Result<Self> {
        let program = match &config.worker_program {
            Some(program) => program.clone(),
            None => std::env::current_exe().context("locate calculator executable")?,
        };
        Ok(Self::new(program, config.worker_output_limit_bytes))
    }
}

impl Worker for ProcessWorker {
    #[instrument(skip_all, fields(entry = function.entry(), timeout_ms = timeout.as_millis()))]
    fn run(
        &self,
        function: &BoundFunction,
        args: &Arguments,
        timeout: Duration,
    ) -> Result<Values, WorkerError> {
        let job = Job {
            entry: function.entry().to_string(),
            arguments: args.clone(),
        };
        let input = serde_json::to_vec(&job)
            .map_err(|err| WorkerError::Unavailable(format!("encode job: {err}")))?;

        let mut cmd = Command::new(&self.program);
        cmd.arg(WORKER_SUBCOMMAND);
        let output = run_command_with_timeout(
            cmd,
            Some(input.as_slice()),
            timeout,
            self.output_limit_bytes,
        )
        .map_err(|err| WorkerError::Unavailable(format!("{err:#}")))?;

        if output.timed_out {
            warn!("worker killed after deadline");
            return Err(WorkerError::TimedOut(timeout));
        }
        if !output.status.success() {
            return Err(WorkerError::Crashed(format!(
                "exited with {}: {}",
                output.status,
                output.stderr_text()
            )));
        }
        if output.stdout_truncated > 0 {
            return Err(WorkerError::Crashed(format!(
                "reply exceeded {} bytes",
                self.output_limit_bytes
            )));
        }

        let reply: Reply = serde_json::from_slice(&output.stdout)
            .map_err(|err| WorkerError::Crashed(format!("malformed reply: {err}")))?;
        debug!(?reply, "worker replied");
        reply.into_result()
    }
}

/// Serve exactly one job: read it from `input`, write the reply to `output`.
pub fn serve<R: Read, W: Write>(table: &EntryTable, mut input: R, mut output: W) -> Result<()> {
    let mut raw = String::new();
    input.read_to_string(&mut raw).context("read job")?;
    let job: Job = serde_json::from_str(&raw).context("parse job")?;
    debug!(entry = %job.entry, arguments = job.arguments.len(), "serving job");

    let reply = match table.get(&job.entry) {
        Some(function) => encodable(Reply::from(function.call(&job.arguments))),
        None => Reply::Failed {
            message: format!("no entry point '{}' is registered", job.entry),
        },
    };
    serde_json::to_writer(&mut output, &reply).context("write reply")?;
    output.flush().context("flush reply")?;
    Ok(())
}

/// JSON writes non-finite numbers as `null`, which would read back as a
/// missing cell. Such outputs fail instead.
fn encodable(reply: Reply) -> Reply {
    if let Reply::Ok { outputs } = &reply {
        for (name, value) in outputs {
            if let Err(reason) = value.check_finite() {
                return Reply::Failed {
                    message: format!("output '{name}': {reason}"),
                };
            }
        }
    }
    reply
}
