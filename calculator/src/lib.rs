//! Plugin-based registry of named numerical algorithms.
//!
//! A catalog directory holds one subdirectory per algorithm. Each is built at
//! startup into an [`executor::AlgorithmExecutor`] and admitted into an
//! immutable [`collection::AlgorithmCollection`] only after it passes its own
//! bundled fixtures. The architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (values, definitions, binding,
//!   fixture comparison). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (catalog scanning, file loading,
//!   worker processes). Isolated behind the [`io::worker::Worker`] seam.
//!
//! Orchestration modules ([`builder`], [`collection`], [`executor`],
//! [`self_test`]) coordinate core logic with I/O to serve requests.

pub mod algorithms;
pub mod builder;
pub mod collection;
pub mod core;
pub mod error;
pub mod executor;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod self_test;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
