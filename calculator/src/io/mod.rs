//! I/O helpers for catalog loading and isolated execution.

pub mod catalog;
pub mod config;
pub mod definition_loader;
pub mod fixtures;
pub mod function_loader;
pub mod process;
pub mod worker;
