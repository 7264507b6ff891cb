//! Generator-driven executor.
//!
//! The executor turns a [`Computation`] whose yield points produce deferred
//! resolutions into a single outer [`Promise`]. Every resumption after the
//! first goes through the scheduler's micro-priority queue, so a running
//! computation interleaves with other pending work exactly like any other
//! micro task.
//!
//! Error routing:
//! - an awaited resolution that settles with an error is raised *into* the
//!   computation, which may catch it
//! - an error returned from [`Computation::advance`] or
//!   [`Computation::raise`] escaped the computation and rejects the outer
//!   result; it is never retried
//! - a panic inside the computation body is treated the same way, as an
//!   `InternalError`

use crate::computation::{Computation, Resume, Step, Yielded};
use crate::error::{RuntimeError, RuntimeResult};
use crate::promise::{OnError, OnValue, Promise, PromiseState, Thenable};
use crate::scheduler::{panic_message, Scheduler};
use core_types::{JsError, Value};
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// Drives computations on a shared [`Scheduler`].
///
/// # Examples
///
/// ```
/// use async_runtime::{computation, Executor, Resume, Scheduler, Step};
/// use core_types::Value;
///
/// let executor = Executor::new(Scheduler::new());
/// let outer = executor.run(computation::from_fn(|resume| match resume {
///     Resume::Start => Ok(Step::yielding(Value::Smi(2))),
///     Resume::Value(v) => Ok(Step::Complete(v)),
///     Resume::Error(e) => Err(e),
/// }));
///
/// assert!(outer.is_pending());
/// executor.scheduler().run().unwrap();
/// assert_eq!(outer.state(), async_runtime::PromiseState::Fulfilled(Value::Smi(2)));
/// ```
#[derive(Debug, Clone)]
pub struct Executor {
    scheduler: Scheduler,
    next_id: Rc<Cell<u64>>,
}

impl Executor {
    /// Creates an executor that schedules resumptions on `scheduler`.
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            scheduler,
            next_id: Rc::new(Cell::new(0)),
        }
    }

    /// The scheduler resumptions are enqueued on.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Starts `computation` and returns its outer result.
    ///
    /// The first resumption runs synchronously, so a computation that fails
    /// or returns before its first yield has already settled the returned
    /// promise when this call returns.
    pub fn run<C>(&self, computation: C) -> Promise
    where
        C: Computation + 'static,
    {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let computation: Box<dyn Computation> = Box::new(computation);
        let outer = Promise::new();
        let driver = Rc::new(Driver {
            id,
            computation: RefCell::new(computation),
            outer: outer.clone(),
            scheduler: self.scheduler.clone(),
        });
        debug!(computation = id, "computation started");
        step(&driver, Resume::Start);
        outer
    }

    /// Runs `computation`, drains the scheduler and returns the outcome.
    ///
    /// # Errors
    ///
    /// - [`RuntimeError::Unhandled`] if an error escaped the computation
    /// - [`RuntimeError::NeverSettled`] if the scheduler went idle first
    /// - [`RuntimeError::ReentrantRun`] if called from inside a task
    pub fn run_to_completion<C>(&self, computation: C) -> RuntimeResult<Value>
    where
        C: Computation + 'static,
    {
        // Refuse before starting so a rejected call never runs the body.
        if self.scheduler.is_running() {
            return Err(RuntimeError::ReentrantRun);
        }
        let outer = self.run(computation);
        self.scheduler.run()?;
        match outer.state() {
            PromiseState::Fulfilled(value) => Ok(value),
            PromiseState::Rejected(error) => Err(RuntimeError::Unhandled(error)),
            PromiseState::Pending => Err(RuntimeError::NeverSettled),
        }
    }

    /// Wraps a computation factory into a reusable async function.
    ///
    /// Each call builds a fresh computation from the arguments and runs it.
    pub fn wrap<F, C>(&self, factory: F) -> impl Fn(Vec<Value>) -> Promise
    where
        F: Fn(Vec<Value>) -> C + 'static,
        C: Computation + 'static,
    {
        let executor = self.clone();
        move |args| executor.run(factory(args))
    }
}

/// State shared by every resumption of one computation.
struct Driver {
    id: u64,
    computation: RefCell<Box<dyn Computation>>,
    outer: Promise,
    scheduler: Scheduler,
}

fn step(driver: &Rc<Driver>, resume: Resume) {
    let outcome = {
        let mut computation = driver.computation.borrow_mut();
        let resumed = panic::catch_unwind(AssertUnwindSafe(|| match resume {
            Resume::Start => computation.advance(None),
            Resume::Value(value) => computation.advance(Some(value)),
            Resume::Error(error) => computation.raise(error),
        }));
        // A panicking body escaped the computation like any thrown error.
        resumed.unwrap_or_else(|payload| {
            Err(JsError::internal(format!(
                "computation panicked: {}",
                panic_message(payload.as_ref())
            )))
        })
    };

    match outcome {
        Err(error) => {
            debug!(computation = driver.id, %error, "computation failed");
            driver.outer.reject(error);
        }
        Ok(Step::Complete(value)) => {
            debug!(computation = driver.id, %value, "computation finished");
            driver.outer.resolve(value);
        }
        Ok(Step::Yield(Yielded::Value(value))) => {
            trace!(computation = driver.id, %value, "yielded plain value");
            schedule(driver, Resume::Value(value));
        }
        Ok(Step::Yield(Yielded::Deferred(thenable))) => {
            trace!(computation = driver.id, "yielded deferred resolution");
            subscribe(driver, thenable);
        }
    }
}

fn schedule(driver: &Rc<Driver>, resume: Resume) {
    let driver = Rc::clone(driver);
    driver.scheduler.clone().enqueue_micro(move || {
        step(&driver, resume);
        Ok(())
    });
}

fn subscribe(driver: &Rc<Driver>, thenable: Box<dyn Thenable>) {
    let settled = Rc::new(Cell::new(false));

    let (d, s) = (Rc::clone(driver), Rc::clone(&settled));
    let on_value: OnValue = Box::new(move |value| deliver(&d, &s, Resume::Value(value)));

    let d = Rc::clone(driver);
    let on_error: OnError = Box::new(move |error| deliver(&d, &settled, Resume::Error(error)));

    thenable.on_settle(on_value, on_error);
}

// Only the first settlement of an awaited resolution resumes the computation.
fn deliver(driver: &Rc<Driver>, settled: &Cell<bool>, resume: Resume) {
    if settled.replace(true) {
        warn!(computation = driver.id, ?resume, "ignoring repeated settlement");
        return;
    }
    schedule(driver, resume);
}
