//! Error taxonomy for catalog build and algorithm execution.
//!
//! Build-time errors ([`DefinitionError`], [`LoadError`], [`SelfTestFailure`])
//! are wrapped in a [`BuildError`] naming the plugin directory and abort the
//! whole catalog build via [`CatalogError`]. Runtime errors are
//! [`ExecuteError`]s and are recoverable: the collection turns them into
//! structured answers.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Malformed or missing algorithm metadata.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("missing definition file {}", .path.display())]
    Missing { path: PathBuf },
    #[error("read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{} does not match the definition schema: {}", .path.display(), .messages.join("; "))]
    Schema { path: PathBuf, messages: Vec<String> },
    #[error("{} violates definition invariants: {}", .path.display(), .violations.join("; "))]
    Invariants {
        path: PathBuf,
        violations: Vec<String>,
    },
}

/// Entry point missing or not matching its definition.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("missing function manifest {}", .path.display())]
    Missing { path: PathBuf },
    #[error("read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("no entry point '{entry}' is registered")]
    UnknownEntry { entry: String },
    #[error("entry point '{entry}' does not match its definition: {reason}")]
    SignatureMismatch { entry: String, reason: String },
}

/// A bundled fixture failed, or the fixtures could not be read.
#[derive(Debug, Error)]
pub enum SelfTestFailure {
    #[error("missing fixture file {}", .path.display())]
    Missing { path: PathBuf },
    #[error("read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{} declares no fixtures", .path.display())]
    NoFixtures { path: PathBuf },
    #[error("fixture {index}: {reason}")]
    Mismatch { index: usize, reason: String },
    #[error("fixture {index}: {source}")]
    Call { index: usize, source: ExecuteError },
}

/// Failure to build one plugin directory.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("plugin {}: {source}", .dir.display())]
    Definition {
        dir: PathBuf,
        source: DefinitionError,
    },
    #[error("plugin {}: {source}", .dir.display())]
    Load { dir: PathBuf, source: LoadError },
    #[error("plugin {}: self-test failed: {source}", .dir.display())]
    SelfTest {
        dir: PathBuf,
        source: SelfTestFailure,
    },
}

/// Startup-fatal catalog failure: the process must not serve traffic.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog root {} is unreadable: {source}", .root.display())]
    Unreadable {
        root: PathBuf,
        source: std::io::Error,
    },
    #[error("catalog root {} contains no algorithms", .root.display())]
    Empty { root: PathBuf },
    #[error(
        "algorithm name '{name}' is declared by both {} and {}",
        .first.display(),
        .second.display()
    )]
    DuplicateName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Recoverable runtime failure of a lookup or execution.
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("algorithm '{name}' not found")]
    NotFound { name: String },
    #[error("invalid parameters for '{algorithm}': {message}")]
    Validation { algorithm: String, message: String },
    #[error("algorithm '{algorithm}' timed out after {timeout:?}")]
    Timeout { algorithm: String, timeout: Duration },
    #[error("algorithm '{algorithm}' failed: {message}")]
    Execution { algorithm: String, message: String },
}

impl ExecuteError {
    pub fn not_found(name: &str) -> Self {
        ExecuteError::NotFound {
            name: name.to_string(),
        }
    }
}
