//! Unit tests for Promise and the thenable contract

use async_runtime::{OnError, OnValue, Promise, PromiseState, Thenable, ThenableFn};
use core_types::{JsError, Value};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn new_promise_is_pending() {
    let promise = Promise::new();
    assert!(promise.is_pending());
    assert_eq!(promise.state(), PromiseState::Pending);
    assert!(!promise.state().is_settled());
}

#[test]
fn resolve_settles_once() {
    let promise = Promise::new();
    assert!(promise.resolve(Value::Smi(1)));
    assert!(!promise.resolve(Value::Smi(2)));
    assert!(!promise.reject(JsError::error("late")));
    assert_eq!(promise.state(), PromiseState::Fulfilled(Value::Smi(1)));
}

#[test]
fn reject_settles_once() {
    let promise = Promise::rejected(JsError::type_error("bad"));
    assert!(!promise.resolve(Value::Null));
    assert_eq!(
        promise.state(),
        PromiseState::Rejected(JsError::type_error("bad"))
    );
}

#[test]
fn subscribers_see_exactly_one_outcome() {
    let promise = Promise::new();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let (v, e) = (seen.clone(), seen.clone());
    promise.subscribe(
        move |value| v.borrow_mut().push(format!("value {}", value)),
        move |error| e.borrow_mut().push(format!("error {}", error)),
    );

    promise.reject(JsError::error("first"));
    promise.resolve(Value::Smi(1));
    assert_eq!(*seen.borrow(), vec!["error Error: first".to_string()]);
}

#[test]
fn subscribing_to_settled_promise_fires_immediately() {
    let promise = Promise::resolved(Value::from("done"));
    let seen = Rc::new(RefCell::new(None));
    let s = seen.clone();
    promise.subscribe(move |value| *s.borrow_mut() = Some(value), |_| {});
    assert_eq!(*seen.borrow(), Some(Value::from("done")));
    assert!(!promise.has_pending_reactions());
}

#[test]
fn settle_accepts_result() {
    let ok = Promise::new();
    ok.settle(Ok(Value::Boolean(true)));
    assert_eq!(ok.state(), PromiseState::Fulfilled(Value::Boolean(true)));

    let err = Promise::new();
    err.settle(Err(JsError::error("x")));
    assert_eq!(err.state(), PromiseState::Rejected(JsError::error("x")));
}

#[test]
fn promise_is_a_thenable() {
    let promise = Promise::new();
    let seen = Rc::new(RefCell::new(None));
    let s = seen.clone();

    let thenable: Box<dyn Thenable> = Box::new(promise.clone());
    thenable.on_settle(
        Box::new(move |value| *s.borrow_mut() = Some(value)),
        Box::new(|_| {}),
    );
    assert!(seen.borrow().is_none());

    promise.resolve(Value::Smi(3));
    assert_eq!(*seen.borrow(), Some(Value::Smi(3)));
}

#[test]
fn closure_thenable_forwards_callbacks() {
    let seen = Rc::new(RefCell::new(None));
    let s = seen.clone();
    let thenable: Box<dyn Thenable> = Box::new(ThenableFn(
        |_on_value: OnValue, on_error: OnError| on_error(JsError::error("refused")),
    ));
    thenable.on_settle(
        Box::new(|_| {}),
        Box::new(move |error| *s.borrow_mut() = Some(error)),
    );
    assert_eq!(*seen.borrow(), Some(JsError::error("refused")));
}
