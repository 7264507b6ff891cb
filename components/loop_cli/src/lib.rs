//! Event loop demo library
//!
//! Provides the argument parser, the demo scenarios and a virtual timer
//! source for the `loop-demo` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod demos;
pub mod error;
pub mod timers;

pub use cli::{Cli, Command};
pub use error::{CliError, CliResult};
pub use timers::Timers;
