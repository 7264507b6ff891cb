//! Demo scenarios.
//!
//! Each demo builds its own scheduler, runs to idle and returns the lines it
//! printed, so the binary and the tests observe the same output.

use crate::cli::Command;
use crate::error::CliResult;
use crate::timers::Timers;
use async_runtime::{computation, Computation, Executor, Promise, Resume, Scheduler, Step};
use core_types::{JsError, Value};
use std::cell::RefCell;
use std::rc::Rc;

type Output = Rc<RefCell<Vec<String>>>;

fn print(output: &Output, line: impl Into<String>) {
    output.borrow_mut().push(line.into());
}

fn collected(output: &Output) -> Vec<String> {
    output.borrow().clone()
}

/// Runs the demo(s) selected by `command`.
pub fn run(command: Command) -> CliResult<Vec<String>> {
    match command {
        Command::Interleave => interleave(),
        Command::Generators => generators(),
        Command::Timers => timers(),
        Command::All => {
            let mut lines = Vec::new();
            for (name, demo) in [
                ("interleave", interleave as fn() -> CliResult<Vec<String>>),
                ("generators", generators),
                ("timers", timers),
            ] {
                lines.push(format!("== {} ==", name));
                lines.extend(demo()?);
            }
            Ok(lines)
        }
    }
}

/// Classic interleaving: synchronous code, then every micro task, then one
/// macro task at a time. Prints `a f b c e d`.
pub fn interleave() -> CliResult<Vec<String>> {
    let scheduler = Scheduler::new();
    let output = Output::default();

    print(&output, "a");

    let s = scheduler.clone();
    let o = output.clone();
    scheduler.enqueue_micro(move || {
        print(&o, "b");
        let o2 = o.clone();
        s.enqueue_micro(move || {
            print(&o2, "c");
            Ok(())
        });
        s.enqueue_macro(move || {
            print(&o, "d");
            Ok(())
        });
        Ok(())
    });

    let o = output.clone();
    scheduler.enqueue_macro(move || {
        print(&o, "e");
        Ok(())
    });

    print(&output, "f");

    scheduler.run()?;
    Ok(collected(&output))
}

/// Generator-driven async functions sharing one scheduler.
pub fn generators() -> CliResult<Vec<String>> {
    let scheduler = Scheduler::new();
    let executor = Executor::new(scheduler.clone());
    let timers = Timers::new(scheduler.clone());
    let output = Output::default();

    let report = |label: &'static str, outer: Promise| {
        let (ok, err) = (output.clone(), output.clone());
        outer.subscribe(
            move |value| print(&ok, format!("{}: {}", label, value)),
            move |error| print(&err, format!("{}: failed with {}", label, error)),
        );
    };

    report("basic async flow", executor.run(basic_async_flow()));
    report("sync values", executor.run(sync_values()));
    report("multiple yields", executor.run(multiple_yields(timers.clone())));
    report("recovered rejection", executor.run(recovered_rejection(timers)));

    scheduler.run()?;
    Ok(collected(&output))
}

/// Timers settle in deadline order, after all pending micro tasks.
pub fn timers() -> CliResult<Vec<String>> {
    let scheduler = Scheduler::new();
    let timers = Timers::new(scheduler.clone());
    let output = Output::default();

    print(&output, format!("t={} start", timers.now()));
    for (delay, label) in [(100, "slow"), (0, "immediate"), (50, "fast")] {
        let (o, t) = (output.clone(), timers.clone());
        timers
            .set_timeout(delay, Value::from(label))
            .subscribe(move |value| print(&o, format!("t={} {}", t.now(), value)), |_| {});
    }

    let (o, t) = (output.clone(), timers.clone());
    scheduler.enqueue_micro(move || {
        print(&o, format!("t={} microtask runs before any timer", t.now()));
        Ok(())
    });

    scheduler.run()?;
    Ok(collected(&output))
}

fn number(value: &Value) -> Result<f64, JsError> {
    value
        .as_number()
        .ok_or_else(|| JsError::type_error(format!("{} is not a number", value)))
}

/// `r1 = yield resolve(1); r2 = yield resolve(r1 + 2); return r2` (3)
fn basic_async_flow() -> impl Computation {
    let mut stage = 0;
    computation::from_fn(move |resume| {
        stage += 1;
        match (stage, resume) {
            (_, Resume::Error(error)) => Err(error),
            (1, _) => Ok(Step::yielding(Promise::resolved(Value::Smi(1)))),
            (2, Resume::Value(r1)) => Ok(Step::yielding(Promise::resolved(Value::Double(
                number(&r1)? + 2.0,
            )))),
            (_, Resume::Value(r2)) => Ok(Step::Complete(r2)),
            (_, Resume::Start) => Err(JsError::internal("restarted")),
        }
    })
}

/// `a = yield 10; b = yield a + 5; return b` (15)
fn sync_values() -> impl Computation {
    let mut stage = 0;
    computation::from_fn(move |resume| {
        stage += 1;
        match (stage, resume) {
            (_, Resume::Error(error)) => Err(error),
            (1, _) => Ok(Step::yielding(Value::Smi(10))),
            (2, Resume::Value(a)) => Ok(Step::yielding(Value::Double(number(&a)? + 5.0))),
            (_, Resume::Value(b)) => Ok(Step::Complete(b)),
            (_, Resume::Start) => Err(JsError::internal("restarted")),
        }
    })
}

/// Mixes timers and plain values: `2` after 100ms, times 3, plus 4 after
/// another 50ms (10).
fn multiple_yields(timers: Timers) -> impl Computation {
    let mut stage = 0;
    computation::from_fn(move |resume| {
        stage += 1;
        match (stage, resume) {
            (_, Resume::Error(error)) => Err(error),
            (1, _) => Ok(Step::yielding(timers.set_timeout(100, Value::Smi(2)))),
            (2, Resume::Value(step1)) => Ok(Step::yielding(Value::Double(number(&step1)? * 3.0))),
            (3, Resume::Value(step2)) => Ok(Step::yielding(
                timers.set_timeout(50, Value::Double(number(&step2)? + 4.0)),
            )),
            (_, Resume::Value(step3)) => Ok(Step::Complete(step3)),
            (_, Resume::Start) => Err(JsError::internal("restarted")),
        }
    })
}

/// Awaits a request that times out and catches the rejection.
fn recovered_rejection(timers: Timers) -> impl Computation {
    computation::from_fn(move |resume| match resume {
        Resume::Start => Ok(Step::yielding(
            timers.reject_after(10, JsError::error("request timed out")),
        )),
        Resume::Error(error) => Ok(Step::Complete(Value::from(format!(
            "fallback after {}",
            error.message
        )))),
        Resume::Value(value) => Ok(Step::Complete(value)),
    })
}
