//! Two-tier scheduler.
//!
//! The scheduler owns a micro-priority queue and a macro-priority queue and a
//! run loop that drains them with a strict interleaving rule:
//! 1. Run micro items until the micro queue is empty, including any micro
//!    items enqueued while draining
//! 2. Run exactly one macro item, if any, then go back to 1
//! 3. Stop when both queues are empty after a micro drain
//!
//! A task that fails (returns `Err` or panics) is reported to the error sink
//! and the loop continues with the next item.

use crate::error::{RuntimeError, RuntimeResult};
use crate::task_queue::{Priority, Task, TaskQueue};
use core_types::JsError;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use tracing::{error, trace};

type ErrorSink = Box<dyn FnMut(&RuntimeError)>;

/// Counts of what a drain executed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Micro-priority tasks executed
    pub micro_run: usize,
    /// Macro-priority tasks executed
    pub macro_run: usize,
    /// Tasks (of either class) that failed
    pub failed: usize,
}

impl RunSummary {
    /// Total number of tasks executed.
    pub fn total(&self) -> usize {
        self.micro_run + self.macro_run
    }
}

#[derive(Default)]
struct Queues {
    micro: TaskQueue,
    macro_tasks: TaskQueue,
    next_sequence: u64,
}

struct Inner {
    queues: RefCell<Queues>,
    running: Cell<bool>,
    sink: RefCell<ErrorSink>,
}

/// Handle to a scheduler instance.
///
/// Cloning the handle shares the same queues, so tasks can capture a clone
/// and enqueue further work while the loop is running. Separate
/// `Scheduler::new()` calls never share state.
///
/// # Examples
///
/// ```
/// use async_runtime::Scheduler;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let scheduler = Scheduler::new();
/// let log = Rc::new(RefCell::new(Vec::new()));
///
/// let l = log.clone();
/// scheduler.enqueue_macro(move || {
///     l.borrow_mut().push("macro");
///     Ok(())
/// });
/// let l = log.clone();
/// scheduler.enqueue_micro(move || {
///     l.borrow_mut().push("micro");
///     Ok(())
/// });
///
/// scheduler.run().unwrap();
/// assert_eq!(*log.borrow(), vec!["micro", "macro"]);
/// ```
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<Inner>,
}

impl Scheduler {
    /// Creates a scheduler whose error sink logs failed tasks.
    pub fn new() -> Self {
        Self::with_error_sink(|err: &RuntimeError| {
            error!(error = %err, "task failed");
        })
    }

    /// Creates a scheduler that reports failed tasks to `sink`.
    pub fn with_error_sink<F>(sink: F) -> Self
    where
        F: FnMut(&RuntimeError) + 'static,
    {
        Self {
            inner: Rc::new(Inner {
                queues: RefCell::new(Queues::default()),
                running: Cell::new(false),
                sink: RefCell::new(Box::new(sink)),
            }),
        }
    }

    /// Appends a task to the micro-priority queue.
    pub fn enqueue_micro<F>(&self, f: F)
    where
        F: FnOnce() -> Result<(), JsError> + 'static,
    {
        self.enqueue(Priority::Micro, f);
    }

    /// Appends a task to the macro-priority queue.
    pub fn enqueue_macro<F>(&self, f: F)
    where
        F: FnOnce() -> Result<(), JsError> + 'static,
    {
        self.enqueue(Priority::Macro, f);
    }

    /// Appends a task to the queue for `priority`.
    pub fn enqueue<F>(&self, priority: Priority, f: F)
    where
        F: FnOnce() -> Result<(), JsError> + 'static,
    {
        let mut queues = self.inner.queues.borrow_mut();
        let sequence = queues.next_sequence;
        queues.next_sequence += 1;
        let task = Task::new(priority, sequence, f);
        match priority {
            Priority::Micro => queues.micro.enqueue(task),
            Priority::Macro => queues.macro_tasks.enqueue(task),
        }
        trace!(%priority, sequence, "task enqueued");
    }

    /// Drains both queues until no work remains.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::ReentrantRun`] if called from inside a running
    /// task. Task failures are never returned; they go to the error sink.
    pub fn run(&self) -> RuntimeResult<RunSummary> {
        let _guard = RunGuard::enter(&self.inner)?;
        let mut summary = RunSummary::default();
        loop {
            self.drain_micro(&mut summary);
            match self.pop(Priority::Macro) {
                Some(task) => self.execute(task, &mut summary),
                None => break,
            }
        }
        trace!(?summary, "scheduler idle");
        Ok(summary)
    }

    /// Processes one complete cycle: a micro drain, at most one macro task,
    /// and the micro drain that follows it.
    ///
    /// Returns whether a macro task ran.
    pub fn run_once(&self) -> RuntimeResult<bool> {
        let _guard = RunGuard::enter(&self.inner)?;
        let mut summary = RunSummary::default();
        self.drain_micro(&mut summary);
        let ran_macro = match self.pop(Priority::Macro) {
            Some(task) => {
                self.execute(task, &mut summary);
                self.drain_micro(&mut summary);
                true
            }
            None => false,
        };
        Ok(ran_macro)
    }

    /// Drains only the micro-priority queue, returning how many tasks ran.
    pub fn run_microtasks(&self) -> RuntimeResult<usize> {
        let _guard = RunGuard::enter(&self.inner)?;
        let mut summary = RunSummary::default();
        self.drain_micro(&mut summary);
        Ok(summary.micro_run)
    }

    /// Number of tasks waiting in the micro-priority queue.
    pub fn pending_micro(&self) -> usize {
        self.inner.queues.borrow().micro.len()
    }

    /// Number of tasks waiting in the macro-priority queue.
    pub fn pending_macro(&self) -> usize {
        self.inner.queues.borrow().macro_tasks.len()
    }

    /// Returns true while a drain (`run`, `run_once`, `run_microtasks`) is
    /// in progress.
    pub(crate) fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    /// Returns true when both queues are empty.
    pub fn is_idle(&self) -> bool {
        let queues = self.inner.queues.borrow();
        queues.micro.is_empty() && queues.macro_tasks.is_empty()
    }

    fn drain_micro(&self, summary: &mut RunSummary) {
        while let Some(task) = self.pop(Priority::Micro) {
            self.execute(task, summary);
        }
    }

    // The queue borrow must end before the popped task runs.
    fn pop(&self, priority: Priority) -> Option<Task> {
        let mut queues = self.inner.queues.borrow_mut();
        match priority {
            Priority::Micro => queues.micro.dequeue(),
            Priority::Macro => queues.macro_tasks.dequeue(),
        }
    }

    fn execute(&self, task: Task, summary: &mut RunSummary) {
        let priority = task.priority();
        let sequence = task.sequence();
        trace!(%priority, sequence, "task started");

        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| task.run())) {
            Ok(result) => result,
            Err(payload) => Err(JsError::internal(format!(
                "task panicked: {}",
                panic_message(payload.as_ref())
            ))),
        };

        match priority {
            Priority::Micro => summary.micro_run += 1,
            Priority::Macro => summary.macro_run += 1,
        }

        if let Err(error) = outcome {
            summary.failed += 1;
            let failure = RuntimeError::TaskFailed {
                priority,
                sequence,
                error,
            };
            let mut sink = self.inner.sink.borrow_mut();
            (*sink)(&failure);
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending_micro", &self.pending_micro())
            .field("pending_macro", &self.pending_macro())
            .field("running", &self.inner.running.get())
            .finish()
    }
}

/// Marks the scheduler as running for the lifetime of a drain.
struct RunGuard<'a> {
    inner: &'a Inner,
}

impl<'a> RunGuard<'a> {
    fn enter(inner: &'a Inner) -> RuntimeResult<Self> {
        if inner.running.replace(true) {
            return Err(RuntimeError::ReentrantRun);
        }
        Ok(Self { inner })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.inner.running.set(false);
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
