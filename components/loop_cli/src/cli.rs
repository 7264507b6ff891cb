//! Command line arguments

use crate::error::{CliError, CliResult};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Replays event-loop and generator-executor demonstrations.
#[derive(Debug, Parser)]
#[command(name = "loop-demo", version)]
pub struct Cli {
    /// Log filter used when `RUST_LOG` is unset (e.g. `debug`, `async_runtime=trace`)
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Demo to run; runs all of them when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available demos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Micro/macro interleaving: prints a, f, b, c, e, d
    Interleave,
    /// Generator-driven async functions
    Generators,
    /// Virtual timers settling promises from macro tasks
    Timers,
    /// Every demo in sequence
    All,
}

impl Cli {
    /// The command to run, defaulting to [`Command::All`].
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::All)
    }
}

/// Parses `directives` into a log filter.
///
/// # Errors
///
/// Returns [`CliError::LogFilter`] when the directives do not parse.
pub fn log_filter(directives: &str) -> CliResult<EnvFilter> {
    EnvFilter::try_new(directives).map_err(|_| CliError::LogFilter(directives.to_string()))
}
