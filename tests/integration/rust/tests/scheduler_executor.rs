//! Scheduler and Executor Integration Tests
//!
//! Verifies that executor resumptions respect the scheduler's draining rule
//! when mixed with ordinary micro and macro work.

use async_runtime::{computation, Executor, Promise, Resume, RuntimeError, Scheduler, Step};
use core_types::{JsError, Value};
use std::cell::RefCell;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<String>>>;

fn note(log: &Log, entry: impl Into<String>) {
    log.borrow_mut().push(entry.into());
}

/// Test: every resumption of a computation finishes before the next macro task
#[test]
fn test_computation_completes_inside_one_micro_drain() {
    let scheduler = Scheduler::new();
    let executor = Executor::new(scheduler.clone());
    let log = Log::default();

    let l = log.clone();
    scheduler.enqueue_macro(move || {
        note(&l, "macro");
        Ok(())
    });

    let l = log.clone();
    let mut count = 0;
    executor.run(computation::from_fn(move |resume| {
        if let Resume::Error(e) = resume {
            return Err(e);
        }
        count += 1;
        note(&l, format!("step {}", count));
        if count < 4 {
            Ok(Step::yielding(Promise::resolved(Value::Smi(count))))
        } else {
            Ok(Step::Complete(Value::Smi(count)))
        }
    }));

    scheduler.run().unwrap();
    assert_eq!(
        *log.borrow(),
        vec!["step 1", "step 2", "step 3", "step 4", "macro"]
    );
}

/// Test: a computation awaiting a promise settled by a macro task resumes
/// after that macro task, before the next one
#[test]
fn test_macro_settlement_resumes_before_next_macro() {
    let scheduler = Scheduler::new();
    let executor = Executor::new(scheduler.clone());
    let log = Log::default();
    let gate = Promise::new();

    let (l, g) = (log.clone(), gate.clone());
    scheduler.enqueue_macro(move || {
        note(&l, "open gate");
        g.resolve(Value::from("opened"));
        Ok(())
    });
    let l = log.clone();
    scheduler.enqueue_macro(move || {
        note(&l, "second macro");
        Ok(())
    });

    let l = log.clone();
    let mut awaited = Some(gate);
    let outer = executor.run(computation::from_fn(move |resume| match resume {
        Resume::Start => Ok(Step::yielding(awaited.take().unwrap_or_default())),
        Resume::Value(v) => {
            note(&l, format!("resumed with {}", v));
            Ok(Step::Complete(v))
        }
        Resume::Error(e) => Err(e),
    }));

    scheduler.run().unwrap();
    assert_eq!(
        *log.borrow(),
        vec!["open gate", "resumed with opened", "second macro"]
    );
    assert!(!outer.is_pending());
}

/// Test: a failing work item does not disturb a running computation
#[test]
fn test_task_failure_is_isolated_from_computations() {
    let failures = Rc::new(RefCell::new(Vec::new()));
    let f = failures.clone();
    let scheduler = Scheduler::with_error_sink(move |err: &RuntimeError| {
        f.borrow_mut().push(err.to_string())
    });
    let executor = Executor::new(scheduler.clone());

    scheduler.enqueue_micro(|| Err(JsError::error("unrelated failure")));
    let outer = executor.run(computation::from_fn(|resume| match resume {
        Resume::Start => Ok(Step::yielding(Value::Smi(5))),
        Resume::Value(v) => Ok(Step::Complete(v)),
        Resume::Error(e) => Err(e),
    }));

    scheduler.run().unwrap();
    assert_eq!(outer.state(), async_runtime::PromiseState::Fulfilled(Value::Smi(5)));
    assert_eq!(
        *failures.borrow(),
        vec!["micro task #0 failed: Error: unrelated failure".to_string()]
    );
}

/// Test: a rejection propagates through nested computations until caught
#[test]
fn test_nested_rejection_caught_by_outer_computation() {
    let executor = Executor::new(Scheduler::new());

    let inner = executor.run(computation::from_fn(|resume| match resume {
        Resume::Start => Ok(Step::yielding(Promise::rejected(JsError::type_error("deep")))),
        Resume::Error(e) => Err(e),
        Resume::Value(v) => Ok(Step::Complete(v)),
    }));

    let mut awaited = Some(inner);
    let result = executor.run_to_completion(computation::from_fn(move |resume| match resume {
        Resume::Start => Ok(Step::yielding(awaited.take().unwrap_or_default())),
        Resume::Error(e) => Ok(Step::Complete(Value::from(format!("caught {}", e)))),
        Resume::Value(v) => Ok(Step::Complete(v)),
    }));

    assert_eq!(result, Ok(Value::from("caught TypeError: deep")));
}
