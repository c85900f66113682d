//! Awaiting promises from async Rust.

use std::cell::RefCell;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::channel::oneshot;

use super::Promise;
use crate::error::Rejection;
use crate::value::{Function, Value};

type Outcome = Result<Value, Value>;

/// A future that completes when its promise settles.
///
/// Created by [`Promise::into_future`]. The outcome is delivered by a
/// reaction, so the scheduler running promise tasks has to make progress
/// for the future to complete; with the `LocalSetScheduler` installed the
/// tokio runtime takes care of that.
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct PromiseFuture {
    receiver: oneshot::Receiver<Outcome>,
}

impl Promise {
    /// Converts the promise into a [`Future`] of its outcome.
    ///
    /// The future resolves to `Ok(value)` on fulfillment and to
    /// [`Rejection::Rejected`] on rejection. If the reaction delivering the
    /// outcome is dropped without running, it resolves to
    /// [`Rejection::Abandoned`].
    pub fn into_future(self) -> PromiseFuture {
        let (sender, receiver) = oneshot::channel();
        let sender = Rc::new(RefCell::new(Some(sender)));

        let deliver = move |outcome: Outcome| {
            if let Some(sender) = sender.borrow_mut().take() {
                // The receiver may already be gone; nobody is waiting then.
                let _ = sender.send(outcome);
            }
        };
        let on_fulfilled = {
            let deliver = deliver.clone();
            Function::unary(move |value| {
                deliver(Ok(value));
                Ok(Value::Undefined)
            })
        };
        let on_rejected = Function::unary(move |reason| {
            deliver(Err(reason));
            Ok(Value::Undefined)
        });
        drop(self.then(on_fulfilled, on_rejected));

        PromiseFuture { receiver }
    }
}

impl IntoFuture for Promise {
    type Output = Result<Value, Rejection>;
    type IntoFuture = PromiseFuture;

    fn into_future(self) -> Self::IntoFuture {
        Self::into_future(self)
    }
}

impl Future for PromiseFuture {
    type Output = Result<Value, Rejection>;

    fn poll(mut self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(context)
            .map(|received| match received {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(reason)) => Err(Rejection::Rejected(reason)),
                Err(oneshot::Canceled) => Err(Rejection::Abandoned),
            })
    }
}
