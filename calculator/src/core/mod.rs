//! Deterministic, pure logic shared by the calculator core.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! values and return deterministic outputs suitable for tests.

pub mod answer;
pub mod binding;
pub mod definition;
pub mod fixture;
pub mod value;
