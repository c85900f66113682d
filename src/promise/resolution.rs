//! The Promise Resolution Procedure.
//!
//! Given the value `x` returned by a reaction, decides how the downstream
//! promise settles:
//!
//! 1. `x` is the downstream itself: reject with a chaining-cycle error.
//! 2. `x` is a native promise: adopt its eventual state.
//! 3. `x` is an object or function with a callable `then`: call it with two
//!    one-shot callbacks and resolve with whatever it reports first.
//! 4. Anything else: fulfill with `x`.
//!
//! A foreign `then` may call its callbacks any number of times, in any
//! order, synchronously or later, and may also raise after calling them.
//! Only the first of those events counts; the `used` flag of each
//! resolution attempt enforces that.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, trace};

use super::Promise;
use crate::error::PromiseError;
use crate::value::{Function, Thenable, Value};

/// Resolves `promise` with `x`.
pub(crate) fn resolve(promise: &Promise, x: Value) {
    if let Value::Promise(candidate) = &x
        && candidate.ptr_eq(promise)
    {
        debug!(promise = promise.id(), "chaining cycle detected");
        promise.reject(Value::from(PromiseError::ChainingCycle));
        return;
    }

    let used = Rc::new(Cell::new(false));
    match x.thenable() {
        Ok(Thenable::Native(inner)) => adopt(promise, &inner),
        Ok(Thenable::Foreign(then)) => call_then(promise, &x, &then, &used),
        Ok(Thenable::Terminal) => promise.fulfill(x),
        Err(reason) => {
            debug!(promise = promise.id(), "reading then raised");
            if !used.replace(true) {
                promise.reject(reason);
            }
        }
    }
}

/// Makes `promise` follow `inner`: values are resolved again, reasons are
/// passed through.
fn adopt(promise: &Promise, inner: &Promise) {
    trace!(promise = promise.id(), inner = inner.id(), "adopting promise");
    let on_fulfilled = {
        let promise = promise.clone();
        Function::unary(move |value| {
            resolve(&promise, value);
            Ok(Value::Undefined)
        })
    };
    let on_rejected = {
        let promise = promise.clone();
        Function::unary(move |reason| {
            promise.reject(reason);
            Ok(Value::Undefined)
        })
    };
    drop(inner.then(on_fulfilled, on_rejected));
}

/// Calls a foreign `then` with `x` as receiver.
fn call_then(promise: &Promise, x: &Value, then: &Function, used: &Rc<Cell<bool>>) {
    trace!(promise = promise.id(), thenable = x.kind(), "calling foreign then");
    let resolve_promise = {
        let promise = promise.clone();
        let used = Rc::clone(used);
        Function::unary(move |y| {
            if used.replace(true) {
                trace!(promise = promise.id(), "ignoring extra thenable callback");
            } else {
                resolve(&promise, y);
            }
            Ok(Value::Undefined)
        })
    };
    let reject_promise = {
        let promise = promise.clone();
        let used = Rc::clone(used);
        Function::unary(move |reason| {
            if used.replace(true) {
                trace!(promise = promise.id(), "ignoring extra thenable callback");
            } else {
                promise.reject(reason);
            }
            Ok(Value::Undefined)
        })
    };

    let arguments = [
        Value::Function(resolve_promise),
        Value::Function(reject_promise),
    ];
    if let Err(reason) = then.call(x, &arguments) {
        if used.replace(true) {
            trace!(promise = promise.id(), "ignoring raise after thenable callback");
        } else {
            debug!(promise = promise.id(), "foreign then raised");
            promise.reject(reason);
        }
    }
}
