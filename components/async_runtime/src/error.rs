//! Errors surfaced by the scheduler and the executor.

use crate::task_queue::Priority;
use core_types::JsError;
use thiserror::Error;

/// Runtime failures visible to callers and to the scheduler's error sink.
///
/// An error delivered into a computation from an awaited resolution is not
/// represented here: the computation receives it through
/// [`Computation::raise`](crate::Computation::raise) and may recover.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// A work item returned an error or panicked; the loop kept draining.
    #[error("{priority} task #{sequence} failed: {error}")]
    TaskFailed {
        /// Queue the task was taken from
        priority: Priority,
        /// Enqueue sequence number of the task
        sequence: u64,
        /// The error the task raised
        error: JsError,
    },

    /// An error escaped the computation's outermost frame.
    #[error("unhandled error in computation: {0}")]
    Unhandled(JsError),

    /// The scheduler went idle while the outer result was still pending.
    #[error("computation did not settle before the scheduler went idle")]
    NeverSettled,

    /// The run loop was entered from inside a running work item.
    #[error("scheduler run loop entered from inside a running task")]
    ReentrantRun,
}

/// Result alias for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
