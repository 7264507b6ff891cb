//! Deferred, ordered execution.
//!
//! This crate provides two cooperating mechanisms:
//! - [`Scheduler`] - micro/macro priority queues and a run loop that drains
//!   every micro task before each single macro task
//! - [`Executor`] - drives a suspend/resume [`Computation`] to completion,
//!   resuming it through the scheduler's micro queue each time a yielded
//!   resolution settles, and exposes the result as a [`Promise`]
//!
//! Everything is single-threaded and cooperative: a task runs to completion
//! before the next one starts.
//!
//! # Examples
//!
//! ## Scheduler Usage
//!
//! ```
//! use async_runtime::Scheduler;
//!
//! let scheduler = Scheduler::new();
//! scheduler.enqueue_macro(|| Ok(()));
//! let summary = scheduler.run().unwrap();
//! assert_eq!(summary.macro_run, 1);
//! ```
//!
//! ## Executor Usage
//!
//! ```
//! use async_runtime::{computation, Executor, Promise, Resume, Scheduler, Step};
//! use core_types::Value;
//!
//! let executor = Executor::new(Scheduler::new());
//! let result = executor
//!     .run_to_completion(computation::from_fn(|resume| match resume {
//!         Resume::Start => Ok(Step::yielding(Promise::resolved(Value::Smi(1)))),
//!         Resume::Value(v) => Ok(Step::Complete(v)),
//!         Resume::Error(e) => Err(e),
//!     }))
//!     .unwrap();
//! assert_eq!(result, Value::Smi(1));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod computation;
pub mod error;
pub mod executor;
pub mod promise;
pub mod scheduler;
pub mod task_queue;

// Re-export main types at crate root
pub use computation::{Computation, FnComputation, Resume, Step, Yielded};
pub use error::{RuntimeError, RuntimeResult};
pub use executor::Executor;
pub use promise::{OnError, OnValue, Promise, PromiseState, Thenable, ThenableFn};
pub use scheduler::{RunSummary, Scheduler};
pub use task_queue::{Priority, Task, TaskQueue};
