//! Unit tests for Promise.
//!
//! Tests cover:
//! - Construction (new, resolved, rejected, deferred)
//! - Monotonic, single-winner settlement
//! - Asynchronous reaction delivery
//! - Multi-subscriber FIFO ordering
//! - Chain flattening and pass-through defaults
//! - Chaining-cycle rejection
//! - map and catch shorthands

use aplus::prelude::*;
use rstest::rstest;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn number(value: &Value) -> f64 {
    value.as_number().unwrap_or(f64::NAN)
}

fn recorder() -> (Rc<RefCell<Vec<Value>>>, impl Fn(Value) -> Result<Value, Value> + Clone) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    (log, move |value: Value| {
        sink.borrow_mut().push(value.clone());
        Ok(value)
    })
}

// =============================================================================
// Construction
// =============================================================================

#[rstest]
fn initializer_runs_synchronously() {
    let ran = Cell::new(false);
    let _promise = Promise::new(|_, _| {
        ran.set(true);
        Ok(())
    });
    assert!(ran.get());
}

#[rstest]
fn initializer_error_rejects() {
    let promise = Promise::new(|_, _| Err(Value::from("initializer failed")));
    assert_eq!(promise.reason(), Some(Value::from("initializer failed")));
}

#[rstest]
fn initializer_error_after_settlement_is_ignored() {
    let promise = Promise::new(|_, reject| {
        reject.call("first");
        Err(Value::from("second"))
    });
    assert_eq!(promise.reason(), Some(Value::from("first")));
}

#[rstest]
fn capabilities_may_escape_the_initializer() {
    let escaped = RefCell::new(None);
    let promise = Promise::new(|resolve, _| {
        *escaped.borrow_mut() = Some(resolve);
        Ok(())
    });
    assert!(promise.is_pending());

    if let Some(resolve) = escaped.borrow().as_ref() {
        resolve.call("later");
    }
    assert_eq!(promise.value(), Some(Value::from("later")));
}

#[rstest]
fn resolved_and_rejected_factories() {
    assert_eq!(Promise::resolved(1).state(), PromiseState::Fulfilled(Value::from(1)));
    assert_eq!(Promise::rejected(2).state(), PromiseState::Rejected(Value::from(2)));
}

// =============================================================================
// Settlement
// =============================================================================

#[rstest]
#[case::fulfill_then_reject(true)]
#[case::reject_then_fulfill(false)]
fn first_settlement_wins(#[case] fulfill_first: bool) {
    let deferred = Promise::deferred();
    if fulfill_first {
        deferred.resolve.call("value");
        deferred.reject.call("reason");
        deferred.resolve.call("other value");
        assert_eq!(deferred.promise.value(), Some(Value::from("value")));
    } else {
        deferred.reject.call("reason");
        deferred.resolve.call("value");
        deferred.reject.call("other reason");
        assert_eq!(deferred.promise.reason(), Some(Value::from("reason")));
    }
}

#[rstest]
fn reactions_fire_once_even_if_settled_repeatedly() {
    let deferred = Promise::deferred();
    let (log, record) = recorder();
    let _ = deferred.promise.map(record.clone()).catch(record);

    deferred.resolve.call(1);
    deferred.resolve.call(2);
    deferred.reject.call(3);
    task::run_until_idle();

    assert_eq!(*log.borrow(), vec![Value::from(1)]);
}

// =============================================================================
// Asynchrony
// =============================================================================

#[rstest]
fn reaction_on_settled_promise_is_deferred() {
    let called = Rc::new(Cell::new(false));
    let flag = Rc::clone(&called);
    let promise = Promise::resolved("done");

    let _ = promise.map(move |value| {
        flag.set(true);
        Ok(value)
    });
    assert!(!called.get());

    task::run_until_idle();
    assert!(called.get());
}

#[rstest]
fn reaction_is_not_run_by_settlement() {
    let deferred = Promise::deferred();
    let called = Rc::new(Cell::new(false));
    let flag = Rc::clone(&called);
    let _ = deferred.promise.map(move |value| {
        flag.set(true);
        Ok(value)
    });

    deferred.resolve.call(1);
    assert!(!called.get());

    task::run_until_idle();
    assert!(called.get());
}

// =============================================================================
// Multi-subscriber FIFO
// =============================================================================

#[rstest]
fn three_subscribers_run_in_registration_order() {
    let deferred = Promise::deferred();
    let order = Rc::new(RefCell::new(Vec::new()));
    for index in 1..=3 {
        let order = Rc::clone(&order);
        let _ = deferred.promise.map(move |value| {
            order.borrow_mut().push(index);
            Ok(value)
        });
    }

    deferred.resolve.call(());
    task::run_until_idle();

    assert_eq!(*order.borrow(), vec![1, 2, 3]);
}

#[rstest]
fn rejection_subscribers_run_in_registration_order() {
    let deferred = Promise::deferred();
    let order = Rc::new(RefCell::new(Vec::new()));
    for index in 1..=3 {
        let order = Rc::clone(&order);
        let _ = deferred.promise.catch(move |reason| {
            order.borrow_mut().push(index);
            Err(reason)
        });
    }

    deferred.reject.call(());
    task::run_until_idle();

    assert_eq!(*order.borrow(), vec![1, 2, 3]);
}

#[rstest]
fn each_then_returns_a_new_promise() {
    let promise = Promise::resolved(1);
    let first = promise.then(Value::Undefined, Value::Undefined);
    let second = promise.then(Value::Undefined, Value::Undefined);
    assert_ne!(first, promise);
    assert_ne!(first, second);
    task::run_until_idle();
}

// =============================================================================
// Chain flattening
// =============================================================================

#[rstest]
fn returned_pending_promise_is_flattened() {
    let inner = Promise::deferred();
    let inner_promise = inner.promise.clone();
    let outer = Promise::resolved(()).map(move |_| Ok(Value::from(inner_promise.clone())));

    task::run_until_idle();
    assert!(outer.is_pending());

    inner.resolve.call(42);
    task::run_until_idle();
    assert_eq!(outer.value(), Some(Value::from(42)));
}

#[rstest]
fn returned_rejected_promise_rejects_downstream() {
    let outer = Promise::resolved(()).map(|_| Ok(Value::from(Promise::rejected("inner"))));
    task::run_until_idle();
    assert_eq!(outer.reason(), Some(Value::from("inner")));
}

#[rstest]
fn nested_promises_flatten_to_terminal_value() {
    let deepest = Promise::resolved("bottom");
    let middle = Promise::resolved(deepest);
    let top = Promise::resolved(middle);

    let outer = Promise::resolved(()).map(move |_| Ok(Value::from(top.clone())));
    task::run_until_idle();
    assert_eq!(outer.value(), Some(Value::from("bottom")));
}

// =============================================================================
// Cycle detection
// =============================================================================

#[rstest]
fn returning_own_downstream_rejects_with_cycle_error() {
    let slot: Rc<RefCell<Option<Promise>>> = Rc::new(RefCell::new(None));
    let captured = Rc::clone(&slot);
    let downstream = Promise::resolved(()).map(move |_| {
        Ok(captured.borrow().clone().map_or(Value::Undefined, Value::from))
    });
    *slot.borrow_mut() = Some(downstream.clone());

    task::run_until_idle();

    let reason = downstream.reason();
    assert!(
        reason
            .as_ref()
            .and_then(Value::as_error)
            .is_some_and(PromiseError::is_chaining_cycle),
        "unexpected reason: {reason:?}"
    );
}

// =============================================================================
// Pass-through defaults
// =============================================================================

#[rstest]
fn rejection_passes_through_handlerless_then() {
    let (log, record) = recorder();
    let _ = Promise::rejected("original")
        .then(Value::Undefined, Value::Undefined)
        .then(Value::Null, Function::unary(record));

    task::run_until_idle();
    assert_eq!(*log.borrow(), vec![Value::from("original")]);
}

#[rstest]
fn fulfillment_passes_through_catch() {
    let promise = Promise::resolved(5).catch(|_| Ok(Value::from("wrong")));
    task::run_until_idle();
    assert_eq!(promise.value(), Some(Value::from(5)));
}

#[rstest]
fn catch_recovers() {
    let promise = Promise::rejected("bad").catch(|_| Ok(Value::from("recovered")));
    task::run_until_idle();
    assert_eq!(promise.value(), Some(Value::from("recovered")));
}

#[rstest]
fn handler_error_rejects_downstream() {
    let promise = Promise::resolved(1).map(|_| Err(Value::error("handler failed")));
    task::run_until_idle();
    assert_eq!(promise.reason(), Some(Value::error("handler failed")));
}

// =============================================================================
// End-to-end
// =============================================================================

#[rstest]
fn increment_then_capture() {
    let captured = Rc::new(RefCell::new(None));
    let console = Rc::clone(&captured);

    let _ = Promise::new(|resolve, _| {
        resolve.call(1);
        Ok(())
    })
    .map(|value| Ok(Value::from(number(&value) + 1.0)))
    .map(move |value| {
        *console.borrow_mut() = Some(value.clone());
        Ok(Value::Undefined)
    });

    task::run_until_idle();
    assert_eq!(*captured.borrow(), Some(Value::from(2)));
}

#[rstest]
fn long_chain_settles() {
    let mut promise = Promise::resolved(0);
    for _ in 0..1_000 {
        promise = promise.map(|value| Ok(Value::from(number(&value) + 1.0)));
    }
    task::run_until_idle();
    assert_eq!(promise.value(), Some(Value::from(1_000)));
}

#[rstest]
fn long_pending_chain_drops_without_overflow() {
    let deferred = Promise::deferred();
    let mut promise = deferred.promise.clone();
    for _ in 0..100_000 {
        promise = promise.then(Value::Undefined, Value::Undefined);
    }
    assert!(promise.is_pending());
    drop(promise);
    drop(deferred);
}

#[rstest]
fn long_pending_chain_still_settles_after_tail_is_dropped() {
    let deferred = Promise::deferred();
    let mut promise = deferred.promise.clone();
    for _ in 0..10_000 {
        promise = promise.then(Value::Undefined, Value::Undefined);
    }
    let tail = promise.map(|value| Ok(Value::from(number(&value) * 2.0)));
    drop(promise);

    deferred.resolve.call(21);
    task::run_until_idle();
    assert_eq!(tail.value(), Some(Value::from(42)));
}

#[rstest]
fn user_type_error_travels_as_reason() {
    let reason = Value::from(PromiseError::TypeError("not a number".to_string()));
    let promise = Promise::resolved("text")
        .map(|value| {
            value
                .as_number()
                .map(Value::from)
                .ok_or_else(|| Value::from(PromiseError::TypeError("not a number".to_string())))
        })
        .then(Value::Undefined, Value::Undefined);

    task::run_until_idle();
    assert_eq!(promise.reason(), Some(reason));
}
