//! Contract tests for async_runtime component
//!
//! These tests pin the public surface the scheduler and executor expose to
//! collaborators.

use async_runtime::{
    computation, Computation, Executor, Priority, Promise, PromiseState, Resume, RunSummary,
    RuntimeError, RuntimeResult, Scheduler, Step, Thenable, Yielded,
};
use core_types::{JsError, Value};

mod scheduler_contract {
    use super::*;

    #[test]
    fn enqueue_returns_unit() {
        let scheduler = Scheduler::new();
        let () = scheduler.enqueue_micro(|| Ok(()));
        let () = scheduler.enqueue_macro(|| Ok(()));
        let () = scheduler.enqueue(Priority::Macro, || Ok(()));
    }

    #[test]
    fn run_returns_summary() {
        let scheduler = Scheduler::new();
        let result: RuntimeResult<RunSummary> = scheduler.run();
        assert_eq!(result, Ok(RunSummary::default()));
    }

    #[test]
    fn scheduler_handle_is_clone() {
        let scheduler = Scheduler::new();
        let handle = scheduler.clone();
        handle.enqueue_micro(|| Ok(()));
        assert_eq!(scheduler.pending_micro(), 1);
    }
}

mod executor_contract {
    use super::*;

    #[test]
    fn run_returns_promise() {
        let executor = Executor::new(Scheduler::new());
        let outer: Promise = executor.run(computation::from_fn(|_| Ok(Step::Complete(Value::Null))));
        assert_eq!(outer.state(), PromiseState::Fulfilled(Value::Null));
    }

    #[test]
    fn outer_result_satisfies_thenable() {
        let executor = Executor::new(Scheduler::new());
        let outer = executor.run(computation::from_fn(|_| Ok(Step::Complete(Value::Null))));
        let _: Box<dyn Thenable> = Box::new(outer);
    }

    #[test]
    fn run_to_completion_returns_value_or_runtime_error() {
        let executor = Executor::new(Scheduler::new());
        let ok: Result<Value, RuntimeError> =
            executor.run_to_completion(computation::from_fn(|_| Ok(Step::Complete(Value::Smi(1)))));
        assert_eq!(ok, Ok(Value::Smi(1)));

        let err = executor.run_to_completion(computation::from_fn(|_| Err(JsError::error("x"))));
        assert_eq!(err, Err(RuntimeError::Unhandled(JsError::error("x"))));
    }
}

mod computation_contract {
    use super::*;

    struct Countdown(i32);

    impl Computation for Countdown {
        fn advance(&mut self, _input: Option<Value>) -> Result<Step, JsError> {
            if self.0 == 0 {
                return Ok(Step::Complete(Value::from("liftoff")));
            }
            self.0 -= 1;
            Ok(Step::Yield(Yielded::Value(Value::Smi(self.0))))
        }

        fn raise(&mut self, error: JsError) -> Result<Step, JsError> {
            Err(error)
        }
    }

    #[test]
    fn hand_written_computation_runs() {
        let executor = Executor::new(Scheduler::new());
        assert_eq!(
            executor.run_to_completion(Countdown(3)),
            Ok(Value::from("liftoff"))
        );
    }

    #[test]
    fn resume_has_three_variants() {
        let all = [
            Resume::Start,
            Resume::Value(Value::Undefined),
            Resume::Error(JsError::error("e")),
        ];
        assert_eq!(all.len(), 3);
    }
}
