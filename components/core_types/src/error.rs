//! Exception values raised by work items and computations.
//!
//! A [`JsError`] is what a failing work item returns, what a rejected
//! deferred resolution carries, and what an unhandled computation failure
//! settles its outer result with.

use std::fmt;
use thiserror::Error;

/// The kind of error being raised.
///
/// Demos raise `Error` and `TypeError`; the runtime raises `InternalError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Plain `Error`
    Error,
    /// Type error (e.g., calling a non-function)
    TypeError,
    /// Failure inside the runtime itself (e.g., a work item panicked)
    InternalError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Error => "Error",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::InternalError => "InternalError",
        };
        f.write_str(name)
    }
}

/// An error with a kind and a human-readable message.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, JsError};
///
/// let error = JsError::new(ErrorKind::TypeError, "3 is not a function");
/// assert_eq!(error.message, "3 is not a function");
/// assert_eq!(error.to_string(), "TypeError: 3 is not a function");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct JsError {
    /// The type of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl JsError {
    /// Creates an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates a plain `Error`.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Error, message)
    }

    /// Creates a `TypeError`.
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    /// Creates an `InternalError`.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalError, message)
    }
}
