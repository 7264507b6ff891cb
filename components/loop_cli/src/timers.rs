//! Virtual timers.
//!
//! There is no wall clock: every timer enqueues one macro task, and each of
//! those tasks fires the pending timer with the earliest deadline (ties in
//! registration order) and advances the virtual clock to that deadline.

use async_runtime::{Promise, Scheduler};
use core_types::{JsError, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::trace;

#[derive(Default)]
struct TimerState {
    now: u64,
    next_id: u64,
    pending: BTreeMap<(u64, u64), (Promise, Result<Value, JsError>)>,
}

/// A virtual timer source backed by macro tasks.
#[derive(Clone)]
pub struct Timers {
    scheduler: Scheduler,
    state: Rc<RefCell<TimerState>>,
}

impl Timers {
    /// Creates a timer source whose clock starts at 0.
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            scheduler,
            state: Rc::new(RefCell::new(TimerState::default())),
        }
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.state.borrow().now
    }

    /// Number of timers that have not fired yet.
    pub fn pending(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Returns a promise fulfilled with `value` after `delay_ms`.
    pub fn set_timeout(&self, delay_ms: u64, value: Value) -> Promise {
        self.schedule(delay_ms, Ok(value))
    }

    /// Returns a promise rejected with `error` after `delay_ms`.
    pub fn reject_after(&self, delay_ms: u64, error: JsError) -> Promise {
        self.schedule(delay_ms, Err(error))
    }

    fn schedule(&self, delay_ms: u64, outcome: Result<Value, JsError>) -> Promise {
        let promise = Promise::new();
        {
            let mut state = self.state.borrow_mut();
            // Deadlines past the end of the clock clamp to the latest instant.
            let deadline = state.now.saturating_add(delay_ms);
            let id = state.next_id;
            state.next_id += 1;
            state.pending.insert((deadline, id), (promise.clone(), outcome));
            trace!(id, deadline, "timer registered");
        }

        let state = Rc::clone(&self.state);
        self.scheduler.enqueue_macro(move || {
            fire_earliest(&state);
            Ok(())
        });
        promise
    }
}

fn fire_earliest(state: &RefCell<TimerState>) {
    let due = {
        let mut state = state.borrow_mut();
        match state.pending.pop_first() {
            Some(((deadline, id), entry)) => {
                state.now = state.now.max(deadline);
                trace!(id, now = state.now, "timer fired");
                Some(entry)
            }
            None => None,
        }
    };
    if let Some((promise, outcome)) = due {
        promise.settle(outcome);
    }
}
