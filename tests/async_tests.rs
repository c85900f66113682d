#![cfg(feature = "async")]
//! Tests for driving promises from tokio.
//!
//! Tests cover:
//! - LocalSetScheduler delivering reactions
//! - Awaiting fulfilled, rejected and adopted promises
//! - Settling from a spawned local task

use aplus::prelude::*;
use rstest::rstest;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::LocalSet;

async fn on_local_set<F, T>(body: F) -> T
where
    F: std::future::Future<Output = T>,
{
    LocalSet::new()
        .run_until(async move {
            let _guard = task::install(Rc::new(LocalSetScheduler));
            body.await
        })
        .await
}

#[rstest]
#[tokio::test]
async fn test_await_fulfilled_chain() {
    let result = on_local_set(async {
        Promise::resolved(1)
            .map(|value| Ok(Value::from(value.as_number().unwrap_or_default() + 1.0)))
            .into_future()
            .await
    })
    .await;
    assert_eq!(result, Ok(Value::from(2)));
}

#[rstest]
#[tokio::test]
async fn test_await_rejection() {
    let result = on_local_set(async { Promise::rejected("no").into_future().await }).await;
    assert_eq!(result, Err(Rejection::Rejected(Value::from("no"))));
}

#[rstest]
#[tokio::test]
async fn test_await_cycle_error() {
    let result = on_local_set(async {
        let deferred = Promise::deferred();
        let slot = deferred.promise.clone();
        let downstream = Promise::resolved(()).map(move |_| Ok(Value::from(slot.clone())));
        deferred.resolve.call(downstream.clone());
        downstream.into_future().await
    })
    .await;
    // The downstream adopts a promise fulfilled with the downstream itself.
    assert_eq!(
        result,
        Err(Rejection::Rejected(Value::from(PromiseError::ChainingCycle)))
    );
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_settle_from_spawned_task() {
    let result = on_local_set(async {
        let deferred = Promise::deferred();
        let resolve = deferred.resolve.clone();
        tokio::task::spawn_local(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            resolve.call("timer fired");
        });
        deferred
            .promise
            .map(|value| Ok(Value::from(format!("{value}!"))))
            .into_future()
            .await
    })
    .await;
    assert_eq!(result, Ok(Value::from("timer fired!")));
}

#[rstest]
#[tokio::test]
async fn test_dropped_pending_promise_is_abandoned() {
    let result = on_local_set(async {
        let future = Promise::deferred().promise.into_future();
        future.await
    })
    .await;
    assert_eq!(result, Err(Rejection::Abandoned));
}
