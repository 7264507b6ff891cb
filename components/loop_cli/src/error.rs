//! Error types for the CLI

use async_runtime::RuntimeError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Scheduler or executor failure
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// Invalid `--log-level` directive
    #[error("invalid log filter '{0}'")]
    LogFilter(String),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
