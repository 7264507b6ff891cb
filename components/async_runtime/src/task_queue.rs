//! Work items and the FIFO queues that hold them.
//!
//! Every work item carries the priority class it was enqueued under and a
//! sequence number so failures can be traced back to their enqueue order.

use core_types::JsError;
use std::collections::VecDeque;
use std::fmt;

/// Scheduling class of a work item.
///
/// All pending micro-priority work drains before each single macro-priority
/// item runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    /// Drained exhaustively before any macro item runs
    Micro,
    /// Run one at a time, each followed by a full micro drain
    Macro,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Micro => f.write_str("micro"),
            Priority::Macro => f.write_str("macro"),
        }
    }
}

/// A zero-argument unit of deferred execution.
///
/// Tasks are immutable once enqueued and consumed by [`Task::run`].
pub struct Task {
    priority: Priority,
    sequence: u64,
    callback: Box<dyn FnOnce() -> Result<(), JsError>>,
}

impl Task {
    /// Creates a new Task from a closure.
    ///
    /// # Arguments
    ///
    /// * `priority` - The queue the task belongs to
    /// * `sequence` - Enqueue order, unique per scheduler
    /// * `f` - The function to execute when the task runs
    pub fn new<F>(priority: Priority, sequence: u64, f: F) -> Self
    where
        F: FnOnce() -> Result<(), JsError> + 'static,
    {
        Self {
            priority,
            sequence,
            callback: Box::new(f),
        }
    }

    /// The priority class this task was enqueued under.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// The enqueue sequence number.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Executes the task, consuming it.
    pub fn run(self) -> Result<(), JsError> {
        (self.callback)()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("priority", &self.priority)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

/// A FIFO queue of tasks for one priority class.
#[derive(Debug, Default)]
pub struct TaskQueue {
    queue: VecDeque<Task>,
}

impl TaskQueue {
    /// Creates a new empty TaskQueue.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Adds a task to the end of the queue.
    pub fn enqueue(&mut self, task: Task) {
        self.queue.push_back(task);
    }

    /// Removes and returns the earliest task.
    pub fn dequeue(&mut self) -> Option<Task> {
        self.queue.pop_front()
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the number of tasks in the queue.
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
