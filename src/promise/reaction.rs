//! Reaction records queued on a pending promise.

use tracing::trace;

use super::Promise;
use super::resolution;
use crate::task::{self, Task};
use crate::value::{Function, Value};

/// Which outcome a reaction waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReactionKind {
    Fulfill,
    Reject,
}

/// What runs when a reaction fires.
enum Handler {
    Callback(Function),
    /// Forwards the input unchanged: the value for `Fulfill`, the reason
    /// (re-raised) for `Reject`.
    PassThrough,
}

/// A registered `then` handler together with the promise it settles.
///
/// Owned by the upstream promise's queue until the upstream settles, then
/// moved into exactly one scheduled task.
pub(crate) struct Reaction {
    kind: ReactionKind,
    handler: Handler,
    downstream: Promise,
}

impl Reaction {
    /// Builds a reaction; anything but a function becomes a pass-through.
    pub(crate) fn new(kind: ReactionKind, handler: Value, downstream: Promise) -> Self {
        let handler = match handler {
            Value::Function(function) => Handler::Callback(function),
            _ => Handler::PassThrough,
        };
        Self {
            kind,
            handler,
            downstream,
        }
    }

    /// Gives up the reaction, keeping only the promise it would settle.
    pub(crate) fn into_downstream(self) -> Promise {
        self.downstream
    }

    /// Defers [`Reaction::run`] to the current scheduler.
    pub(crate) fn schedule(self, argument: Value) {
        trace!(
            promise = self.downstream.id(),
            kind = ?self.kind,
            "reaction scheduled"
        );
        task::schedule(Task::new(move || self.run(argument)));
    }

    fn run(self, argument: Value) {
        let outcome = match (self.handler, self.kind) {
            (Handler::Callback(function), _) => function.call(&Value::Undefined, &[argument]),
            (Handler::PassThrough, ReactionKind::Fulfill) => Ok(argument),
            (Handler::PassThrough, ReactionKind::Reject) => Err(argument),
        };
        match outcome {
            Ok(returned) => resolution::resolve(&self.downstream, returned),
            Err(reason) => self.downstream.reject(reason),
        }
    }
}
