//! Deferred resolutions.
//!
//! A deferred resolution is anything implementing [`Thenable`]: it accepts a
//! pair of callbacks and eventually invokes exactly one of them exactly once.
//! [`Promise`] is the runtime's own single-resolution implementation, used as
//! the outer result of every executor run.

use core_types::{JsError, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Callback invoked when a resolution settles with a value.
pub type OnValue = Box<dyn FnOnce(Value)>;

/// Callback invoked when a resolution settles with an error.
pub type OnError = Box<dyn FnOnce(JsError)>;

/// The subscribe contract of a deferred resolution.
///
/// Implementations must eventually call exactly one of `on_value` or
/// `on_error`, exactly once. They may do so synchronously inside
/// `on_settle` or later from another work item.
pub trait Thenable {
    /// Registers the settlement callbacks, consuming the resolution.
    fn on_settle(self: Box<Self>, on_value: OnValue, on_error: OnError);
}

/// Adapts a subscribe closure into a [`Thenable`].
///
/// ```
/// use async_runtime::{OnError, OnValue, Thenable, ThenableFn};
/// use core_types::Value;
///
/// let thenable = Box::new(ThenableFn(|on_value: OnValue, _on_error: OnError| {
///     on_value(Value::Smi(1))
/// }));
/// thenable.on_settle(Box::new(|v| assert_eq!(v, Value::Smi(1))), Box::new(|_| {}));
/// ```
pub struct ThenableFn<F>(pub F);

impl<F> Thenable for ThenableFn<F>
where
    F: FnOnce(OnValue, OnError) + 'static,
{
    fn on_settle(self: Box<Self>, on_value: OnValue, on_error: OnError) {
        (self.0)(on_value, on_error)
    }
}

/// The state of a Promise.
///
/// Once settled (Fulfilled or Rejected), a Promise cannot change state.
#[derive(Debug, Clone, PartialEq)]
pub enum PromiseState {
    /// Not yet settled.
    Pending,
    /// Settled with a value.
    Fulfilled(Value),
    /// Settled with an error.
    Rejected(JsError),
}

impl PromiseState {
    /// Returns `true` if the promise is no longer pending.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Callbacks registered while the promise was pending.
struct PromiseReaction {
    on_value: OnValue,
    on_error: OnError,
}

impl PromiseReaction {
    fn fire(self, outcome: Result<Value, JsError>) {
        match outcome {
            Ok(value) => (self.on_value)(value),
            Err(error) => (self.on_error)(error),
        }
    }
}

struct PromiseInner {
    state: PromiseState,
    reactions: Vec<PromiseReaction>,
}

/// A single-resolution deferred value.
///
/// Clones share one state, so a clone can be handed to whoever settles the
/// promise while the original is awaited.
///
/// # Examples
///
/// ```
/// use async_runtime::{Promise, PromiseState};
/// use core_types::Value;
///
/// let promise = Promise::new();
/// assert!(promise.is_pending());
///
/// assert!(promise.resolve(Value::Smi(42)));
/// assert!(!promise.resolve(Value::Smi(7)));
/// assert_eq!(promise.state(), PromiseState::Fulfilled(Value::Smi(42)));
/// ```
#[derive(Clone)]
pub struct Promise {
    inner: Rc<RefCell<PromiseInner>>,
}

impl Promise {
    /// Creates a new pending Promise.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(PromiseInner {
                state: PromiseState::Pending,
                reactions: Vec::new(),
            })),
        }
    }

    /// Creates a promise already fulfilled with `value`.
    pub fn resolved(value: Value) -> Self {
        let promise = Self::new();
        promise.resolve(value);
        promise
    }

    /// Creates a promise already rejected with `error`.
    pub fn rejected(error: JsError) -> Self {
        let promise = Self::new();
        promise.reject(error);
        promise
    }

    /// Fulfills the promise. Returns `false` if it was already settled.
    pub fn resolve(&self, value: Value) -> bool {
        self.settle(Ok(value))
    }

    /// Rejects the promise. Returns `false` if it was already settled.
    pub fn reject(&self, error: JsError) -> bool {
        self.settle(Err(error))
    }

    /// Settles the promise with `outcome`, firing pending reactions in
    /// registration order.
    ///
    /// Settling an already settled promise is a no-op returning `false`.
    pub fn settle(&self, outcome: Result<Value, JsError>) -> bool {
        let reactions = {
            let mut inner = self.inner.borrow_mut();
            if inner.state.is_settled() {
                return false;
            }
            inner.state = match &outcome {
                Ok(value) => PromiseState::Fulfilled(value.clone()),
                Err(error) => PromiseState::Rejected(error.clone()),
            };
            std::mem::take(&mut inner.reactions)
        };
        for reaction in reactions {
            reaction.fire(outcome.clone());
        }
        true
    }

    /// Registers settlement callbacks.
    ///
    /// On a settled promise the matching callback runs immediately.
    pub fn subscribe<V, E>(&self, on_value: V, on_error: E)
    where
        V: FnOnce(Value) + 'static,
        E: FnOnce(JsError) + 'static,
    {
        let state = self.state();
        match state {
            PromiseState::Pending => self.inner.borrow_mut().reactions.push(PromiseReaction {
                on_value: Box::new(on_value),
                on_error: Box::new(on_error),
            }),
            PromiseState::Fulfilled(value) => on_value(value),
            PromiseState::Rejected(error) => on_error(error),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> PromiseState {
        self.inner.borrow().state.clone()
    }

    /// Returns true while the promise is unsettled.
    pub fn is_pending(&self) -> bool {
        !self.inner.borrow().state.is_settled()
    }

    /// Returns true if callbacks are waiting for settlement.
    pub fn has_pending_reactions(&self) -> bool {
        !self.inner.borrow().reactions.is_empty()
    }
}

impl Default for Promise {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Promise")
            .field("state", &inner.state)
            .field("reactions", &inner.reactions.len())
            .finish()
    }
}

impl Thenable for Promise {
    fn on_settle(self: Box<Self>, on_value: OnValue, on_error: OnError) {
        self.subscribe(on_value, on_error);
    }
}
