//! Request/response envelope exchanged with the surrounding service layer.
//!
//! Failures never cross the boundary as errors: they become an [`Answer`]
//! with `result: null` and a human-readable `errors` message.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::value::DataElement;

/// Caller-supplied input values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub parameters: Vec<DataElement>,
}

/// Output values in declared order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outputs {
    pub outputs: Vec<DataElement>,
}

/// Either a result or an error message, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer<T> {
    pub result: Option<T>,
    pub errors: Option<String>,
}

impl<T> Answer<T> {
    pub fn ok(result: T) -> Self {
        Self {
            result: Some(result),
            errors: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            result: None,
            errors: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_none()
    }
}

impl<T, E: fmt::Display> From<Result<T, E>> for Answer<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Answer::ok(value),
            Err(err) => Answer::error(err.to_string()),
        }
    }
}
