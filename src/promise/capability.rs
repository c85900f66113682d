//! Settlement capabilities handed out by [`Promise::new`] and
//! [`Promise::deferred`].

use std::fmt;

use super::Promise;
use crate::value::{Function, Value};

/// Fulfills its promise. Calls after the promise settled are ignored.
///
/// The value is stored as is: a promise or thenable passed here becomes
/// the fulfillment value itself and is only unwrapped by a later `then`.
///
/// Fulfilling a promise with itself is accepted, but the promise then
/// holds a strong reference to its own state and is never freed.
#[derive(Clone)]
pub struct Resolve {
    promise: Promise,
}

/// Rejects its promise. Calls after the promise settled are ignored.
#[derive(Clone)]
pub struct Reject {
    promise: Promise,
}

impl Resolve {
    pub(crate) const fn new(promise: Promise) -> Self {
        Self { promise }
    }

    /// Fulfills the promise with `value`.
    ///
    /// Passing the promise itself leaks it; see [`Resolve`].
    pub fn call(&self, value: impl Into<Value>) {
        self.promise.fulfill(value.into());
    }
}

impl Reject {
    pub(crate) const fn new(promise: Promise) -> Self {
        Self { promise }
    }

    /// Rejects the promise with `reason`.
    pub fn call(&self, reason: impl Into<Value>) {
        self.promise.reject(reason.into());
    }
}

impl From<Resolve> for Function {
    fn from(resolve: Resolve) -> Self {
        Self::unary(move |value| {
            resolve.call(value);
            Ok(Value::Undefined)
        })
    }
}

impl From<Reject> for Function {
    fn from(reject: Reject) -> Self {
        Self::unary(move |reason| {
            reject.call(reason);
            Ok(Value::Undefined)
        })
    }
}

impl From<Resolve> for Value {
    fn from(resolve: Resolve) -> Self {
        Self::Function(resolve.into())
    }
}

impl From<Reject> for Value {
    fn from(reject: Reject) -> Self {
        Self::Function(reject.into())
    }
}

impl fmt::Debug for Resolve {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "Resolve(promise #{})", self.promise.id())
    }
}

impl fmt::Debug for Reject {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "Reject(promise #{})", self.promise.id())
    }
}

/// A pending promise together with its two capabilities, for settling it
/// from outside.
///
/// # Examples
///
/// ```rust
/// use aplus::promise::Promise;
/// use aplus::value::Value;
///
/// let deferred = Promise::deferred();
/// assert!(deferred.promise.is_pending());
///
/// deferred.resolve.call(1);
/// deferred.reject.call("ignored");
/// assert_eq!(deferred.promise.value(), Some(Value::from(1)));
/// ```
#[derive(Debug, Clone)]
pub struct Deferred {
    /// Fulfills `promise`.
    pub resolve: Resolve,
    /// Rejects `promise`.
    pub reject: Reject,
    /// The pending promise.
    pub promise: Promise,
}

impl Deferred {
    pub(crate) fn new() -> Self {
        let promise = Promise::pending();
        Self {
            resolve: Resolve::new(promise.clone()),
            reject: Reject::new(promise.clone()),
            promise,
        }
    }
}
