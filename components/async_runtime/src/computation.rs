//! Suspend/resume computations.
//!
//! A [`Computation`] is a paused program that is resumed either with a value
//! ([`Computation::advance`]) or with an error ([`Computation::raise`]). Each
//! resumption runs until the next yield point and reports a [`Step`].
//! Returning `Err` from either method means the error escaped the
//! computation's outermost frame.

use crate::promise::{Promise, Thenable};
use core_types::{JsError, Value};
use std::fmt;

/// A value produced at a yield point.
pub enum Yielded {
    /// A plain value, treated as already settled with itself.
    Value(Value),
    /// A deferred resolution to subscribe to.
    Deferred(Box<dyn Thenable>),
}

impl Yielded {
    /// Wraps any thenable.
    pub fn deferred<T>(thenable: T) -> Self
    where
        T: Thenable + 'static,
    {
        Yielded::Deferred(Box::new(thenable))
    }
}

impl From<Value> for Yielded {
    fn from(value: Value) -> Self {
        Yielded::Value(value)
    }
}

impl From<Promise> for Yielded {
    fn from(promise: Promise) -> Self {
        Yielded::Deferred(Box::new(promise))
    }
}

impl fmt::Debug for Yielded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Yielded::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Yielded::Deferred(_) => write!(f, "Deferred(..)"),
        }
    }
}

/// Outcome of one resumption.
#[derive(Debug)]
pub enum Step {
    /// Suspended at a yield point (`finished = false`).
    Yield(Yielded),
    /// Returned (`finished = true`).
    Complete(Value),
}

impl Step {
    /// Shorthand for yielding anything convertible to [`Yielded`].
    pub fn yielding(value: impl Into<Yielded>) -> Self {
        Step::Yield(value.into())
    }

    /// Returns true for [`Step::Complete`].
    pub fn is_finished(&self) -> bool {
        matches!(self, Step::Complete(_))
    }
}

/// A pausable, resumable program.
pub trait Computation {
    /// Resumes with `input`; the first resumption receives `None`.
    fn advance(&mut self, input: Option<Value>) -> Result<Step, JsError>;

    /// Resumes by raising `error` at the current yield point.
    fn raise(&mut self, error: JsError) -> Result<Step, JsError>;
}

/// How a [`from_fn`] computation is being resumed.
#[derive(Debug, Clone, PartialEq)]
pub enum Resume {
    /// First resumption.
    Start,
    /// Resumed with the settled value of the last yield.
    Value(Value),
    /// The last yield settled with an error.
    Error(JsError),
}

/// A computation driven by a state-machine closure.
///
/// Created by [`from_fn`].
pub struct FnComputation<F> {
    body: F,
    started: bool,
}

/// Builds a [`Computation`] from a closure called once per resumption.
///
/// The closure keeps its own state between calls. To catch an error raised
/// at a yield point it inspects [`Resume::Error`] and carries on; returning
/// `Err` lets the error escape.
///
/// ```
/// use async_runtime::{computation, Resume, Step};
/// use async_runtime::Computation;
/// use core_types::Value;
///
/// let mut stage = 0;
/// let mut comp = computation::from_fn(move |resume| {
///     stage += 1;
///     match (stage, resume) {
///         (1, Resume::Start) => Ok(Step::yielding(Value::Smi(1))),
///         (_, Resume::Value(v)) => Ok(Step::Complete(v)),
///         (_, other) => panic!("unexpected resume {:?}", other),
///     }
/// });
///
/// assert!(!comp.advance(None).unwrap().is_finished());
/// assert!(comp.advance(Some(Value::Smi(1))).unwrap().is_finished());
/// ```
pub fn from_fn<F>(body: F) -> FnComputation<F>
where
    F: FnMut(Resume) -> Result<Step, JsError>,
{
    FnComputation {
        body,
        started: false,
    }
}

impl<F> Computation for FnComputation<F>
where
    F: FnMut(Resume) -> Result<Step, JsError>,
{
    fn advance(&mut self, input: Option<Value>) -> Result<Step, JsError> {
        let resume = if self.started {
            Resume::Value(input.unwrap_or(Value::Undefined))
        } else {
            self.started = true;
            Resume::Start
        };
        (self.body)(resume)
    }

    fn raise(&mut self, error: JsError) -> Result<Step, JsError> {
        // Raising into a computation that never started cannot be caught.
        if !self.started {
            self.started = true;
            return Err(error);
        }
        (self.body)(Resume::Error(error))
    }
}
