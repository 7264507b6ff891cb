//! Timers and Executor Integration Tests
//!
//! Drives computations that await the demo's virtual timers.

use async_runtime::{computation, Executor, PromiseState, Resume, Scheduler, Step};
use core_types::{JsError, Value};
use loop_cli::Timers;

/// Test: a computation awaiting several timers resumes in deadline order
#[test]
fn test_sequential_timers_accumulate() {
    let scheduler = Scheduler::new();
    let executor = Executor::new(scheduler.clone());
    let timers = Timers::new(scheduler.clone());

    let t = timers.clone();
    let mut total = 0.0;
    let mut waits = 0;
    let result = executor.run_to_completion(computation::from_fn(move |resume| {
        match resume {
            Resume::Start => {}
            Resume::Value(v) => total += v.as_number().unwrap_or(0.0),
            Resume::Error(e) => return Err(e),
        }
        waits += 1;
        if waits > 3 {
            Ok(Step::Complete(Value::Double(total)))
        } else {
            Ok(Step::yielding(t.set_timeout(10, Value::Smi(waits))))
        }
    }));

    assert_eq!(result, Ok(Value::Double(6.0)));
    assert_eq!(timers.now(), 30);
}

/// Test: two computations racing on timers finish by deadline, not start order
#[test]
fn test_shorter_timer_finishes_first() {
    let scheduler = Scheduler::new();
    let executor = Executor::new(scheduler.clone());
    let timers = Timers::new(scheduler.clone());

    let sleeper = |delay: u64, t: Timers| {
        computation::from_fn(move |resume| match resume {
            Resume::Start => Ok(Step::yielding(t.set_timeout(delay, Value::Smi(delay as i32)))),
            Resume::Value(v) => Ok(Step::Complete(Value::from(format!("{}@{}", v, t.now())))),
            Resume::Error(e) => Err(e),
        })
    };

    let slow = executor.run(sleeper(80, timers.clone()));
    let fast = executor.run(sleeper(20, timers.clone()));

    assert!(scheduler.run_once().unwrap());
    assert_eq!(fast.state(), PromiseState::Fulfilled(Value::from("20@20")));
    assert!(slow.is_pending());

    scheduler.run().unwrap();
    assert_eq!(slow.state(), PromiseState::Fulfilled(Value::from("80@80")));
}

/// Test: an uncaught timer rejection fails the outer result
#[test]
fn test_timer_rejection_surfaces_when_uncaught() {
    let scheduler = Scheduler::new();
    let executor = Executor::new(scheduler.clone());
    let timers = Timers::new(scheduler);

    let result = executor.run_to_completion(computation::from_fn(move |resume| match resume {
        Resume::Start => Ok(Step::yielding(timers.reject_after(5, JsError::error("expired")))),
        Resume::Error(e) => Err(e),
        Resume::Value(v) => Ok(Step::Complete(v)),
    }));

    assert_eq!(
        result,
        Err(async_runtime::RuntimeError::Unhandled(JsError::error("expired")))
    );
}
