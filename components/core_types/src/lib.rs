//! Value and error types shared by the scheduler, the executor and the
//! demo binary.
//!
//! # Overview
//!
//! - [`Value`] - Payload carried through deferred resolutions and computations
//! - [`JsError`] - Exception value raised by work items and computations
//! - [`ErrorKind`] - Classification of a [`JsError`]
//!
//! # Examples
//!
//! ```
//! use core_types::{ErrorKind, JsError, Value};
//!
//! let num = Value::Smi(42);
//! assert_eq!(num.as_number(), Some(42.0));
//! assert_eq!(num.to_string(), "42");
//!
//! let error = JsError::type_error("undefined is not a function");
//! assert_eq!(error.kind, ErrorKind::TypeError);
//! assert_eq!(error.to_string(), "TypeError: undefined is not a function");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod value;

pub use error::{ErrorKind, JsError};
pub use value::Value;
