//! The Promise/A+ deferred value.
//!
//! A [`Promise`] starts pending and settles at most once, either fulfilled
//! with a value or rejected with a reason. Reactions registered with
//! [`Promise::then`] run after settlement, always from a deferred task, in
//! the order they were registered.
//!
//! # Invariants
//!
//! - **Monotonic state**: once fulfilled or rejected, a promise never
//!   changes again; later settlement attempts are ignored.
//! - **Single delivery**: every reaction runs exactly once, whether it was
//!   registered before or after settlement.
//! - **FIFO**: reactions of one promise run in registration order.
//! - **Asynchrony**: no reaction runs on the stack of the `then` call that
//!   registered it, nor on the stack of the settlement that released it.
//!
//! # Examples
//!
//! ```rust
//! use aplus::promise::Promise;
//! use aplus::task;
//! use aplus::value::Value;
//!
//! let promise = Promise::new(|resolve, _reject| {
//!     resolve.call(1);
//!     Ok(())
//! })
//! .map(|value| Ok(Value::from(value.as_number().unwrap_or_default() + 1.0)));
//!
//! task::run_until_idle();
//! assert_eq!(promise.value(), Some(Value::from(2)));
//! ```

mod capability;
#[cfg(feature = "async")]
mod future;
mod reaction;
mod resolution;

pub use capability::{Deferred, Reject, Resolve};
#[cfg(feature = "async")]
pub use future::PromiseFuture;

use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;
use tracing::trace;

use crate::value::{Function, Value};
use reaction::{Reaction, ReactionKind};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// The state of a promise, carrying the value or reason once settled.
#[derive(Debug, Clone, PartialEq)]
pub enum PromiseState {
    /// Not settled yet.
    Pending,
    /// Fulfilled with the contained value.
    Fulfilled(Value),
    /// Rejected with the contained reason.
    Rejected(Value),
}

impl PromiseState {
    /// Returns `true` if the promise has not settled.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Lower-case name of the state.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fulfilled(_) => "fulfilled",
            Self::Rejected(_) => "rejected",
        }
    }
}

type ReactionQueue = SmallVec<[Reaction; 1]>;

struct Core {
    id: u64,
    state: PromiseState,
    fulfill_reactions: ReactionQueue,
    reject_reactions: ReactionQueue,
}

impl Drop for Core {
    // Each reaction owns its downstream core, so a pending chain would
    // otherwise drop recursively, one stack frame per `then`.
    fn drop(&mut self) {
        let mut released: Vec<Reaction> = mem::take(&mut self.fulfill_reactions)
            .into_iter()
            .collect();
        released.extend(mem::take(&mut self.reject_reactions));
        while let Some(reaction) = released.pop() {
            if let Ok(cell) = Rc::try_unwrap(reaction.into_downstream().core) {
                let mut core = cell.into_inner();
                released.extend(mem::take(&mut core.fulfill_reactions));
                released.extend(mem::take(&mut core.reject_reactions));
            }
        }
    }
}

/// A single-threaded Promise/A+ promise.
///
/// `Promise` is a cheap handle: clones share the same state, and equality is
/// identity.
#[derive(Clone)]
pub struct Promise {
    core: Rc<RefCell<Core>>,
}

static_assertions::assert_not_impl_any!(Promise: Send, Sync);

impl Promise {
    pub(crate) fn pending() -> Self {
        Self {
            core: Rc::new(RefCell::new(Core {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
                state: PromiseState::Pending,
                fulfill_reactions: SmallVec::new(),
                reject_reactions: SmallVec::new(),
            })),
        }
    }

    /// Creates a promise and runs `initializer` synchronously with its two
    /// capabilities.
    ///
    /// If the initializer returns `Err`, the promise is rejected with the
    /// error, unless one of the capabilities already settled it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use aplus::promise::Promise;
    /// use aplus::value::Value;
    ///
    /// let failed = Promise::new(|_, _| Err(Value::error("boom")));
    /// assert_eq!(failed.reason(), Some(Value::error("boom")));
    ///
    /// let settled_first = Promise::new(|resolve, _| {
    ///     resolve.call(1);
    ///     Err(Value::error("too late"))
    /// });
    /// assert_eq!(settled_first.value(), Some(Value::from(1)));
    /// ```
    pub fn new<F>(initializer: F) -> Self
    where
        F: FnOnce(Resolve, Reject) -> Result<(), Value>,
    {
        let promise = Self::pending();
        let outcome = initializer(
            Resolve::new(promise.clone()),
            Reject::new(promise.clone()),
        );
        if let Err(error) = outcome {
            promise.reject(error);
        }
        promise
    }

    /// Creates a promise already fulfilled with `value`.
    pub fn resolved(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self::new(move |resolve, _| {
            resolve.call(value);
            Ok(())
        })
    }

    /// Creates a promise already rejected with `reason`.
    pub fn rejected(reason: impl Into<Value>) -> Self {
        let reason = reason.into();
        Self::new(move |_, reject| {
            reject.call(reason);
            Ok(())
        })
    }

    /// Creates a pending promise and hands out its capabilities.
    #[must_use]
    pub fn deferred() -> Deferred {
        Deferred::new()
    }

    /// Registers reactions and returns the promise they settle.
    ///
    /// Handlers that are not [`Value::Function`]s are replaced with
    /// pass-throughs: a missing fulfillment handler forwards the value, a
    /// missing rejection handler forwards the reason. A handler's `Ok`
    /// return value is unwrapped through the resolution procedure; its `Err`
    /// rejects the returned promise.
    ///
    /// Handlers never run before `then` returns.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use aplus::promise::Promise;
    /// use aplus::task;
    /// use aplus::value::{Function, Value};
    ///
    /// let recovered = Promise::rejected("reason")
    ///     .then(Value::Undefined, Value::Null)
    ///     .then(Value::Undefined, Function::unary(|reason| Ok(reason)));
    ///
    /// task::run_until_idle();
    /// assert_eq!(recovered.value(), Some(Value::from("reason")));
    /// ```
    pub fn then(&self, on_fulfilled: impl Into<Value>, on_rejected: impl Into<Value>) -> Self {
        let downstream = Self::pending();
        let fulfill = Reaction::new(ReactionKind::Fulfill, on_fulfilled.into(), downstream.clone());
        let reject = Reaction::new(ReactionKind::Reject, on_rejected.into(), downstream.clone());

        let ready = {
            let mut guard = self.core.borrow_mut();
            let core = &mut *guard;
            match &core.state {
                PromiseState::Pending => {
                    core.fulfill_reactions.push(fulfill);
                    core.reject_reactions.push(reject);
                    None
                }
                PromiseState::Fulfilled(value) => Some((fulfill, value.clone())),
                PromiseState::Rejected(reason) => Some((reject, reason.clone())),
            }
        };
        if let Some((reaction, argument)) = ready {
            reaction.schedule(argument);
        }
        downstream
    }

    /// Shorthand for `then` with only a fulfillment handler.
    pub fn map<F>(&self, on_fulfilled: F) -> Self
    where
        F: Fn(Value) -> Result<Value, Value> + 'static,
    {
        self.then(Function::unary(on_fulfilled), Value::Undefined)
    }

    /// Shorthand for `then` with only a rejection handler.
    pub fn catch<F>(&self, on_rejected: F) -> Self
    where
        F: Fn(Value) -> Result<Value, Value> + 'static,
    {
        self.then(Value::Undefined, Function::unary(on_rejected))
    }

    pub(crate) fn fulfill(&self, value: Value) {
        self.settle(ReactionKind::Fulfill, value);
    }

    pub(crate) fn reject(&self, reason: Value) {
        self.settle(ReactionKind::Reject, reason);
    }

    fn settle(&self, kind: ReactionKind, payload: Value) {
        let released = {
            let mut guard = self.core.borrow_mut();
            let core = &mut *guard;
            if !core.state.is_pending() {
                trace!(
                    promise = core.id,
                    state = core.state.name(),
                    "ignoring settlement of settled promise"
                );
                return;
            }
            core.state = match kind {
                ReactionKind::Fulfill => PromiseState::Fulfilled(payload.clone()),
                ReactionKind::Reject => PromiseState::Rejected(payload.clone()),
            };
            trace!(
                promise = core.id,
                state = core.state.name(),
                payload = payload.kind(),
                "promise settled"
            );
            let fulfill_reactions = mem::take(&mut core.fulfill_reactions);
            let reject_reactions = mem::take(&mut core.reject_reactions);
            match kind {
                ReactionKind::Fulfill => fulfill_reactions,
                ReactionKind::Reject => reject_reactions,
            }
        };
        for reaction in released {
            reaction.schedule(payload.clone());
        }
    }

    /// A snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> PromiseState {
        self.core.borrow().state.clone()
    }

    /// Returns `true` while the promise is unsettled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.core.borrow().state.is_pending()
    }

    /// Returns `true` once the promise is fulfilled.
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        matches!(self.core.borrow().state, PromiseState::Fulfilled(_))
    }

    /// Returns `true` once the promise is rejected.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self.core.borrow().state, PromiseState::Rejected(_))
    }

    /// The fulfillment value, if fulfilled.
    #[must_use]
    pub fn value(&self) -> Option<Value> {
        match &self.core.borrow().state {
            PromiseState::Fulfilled(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// The rejection reason, if rejected.
    #[must_use]
    pub fn reason(&self) -> Option<Value> {
        match &self.core.borrow().state {
            PromiseState::Rejected(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    /// A process-unique identifier, used in log events.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.core.borrow().id
    }

    /// Returns `true` if both handles refer to the same promise.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }

    /// Writes `Promise(#id, state)` without the payload. A promise may hold
    /// itself as its value, so nested promises are only ever summarised.
    pub(crate) fn fmt_summary(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.core.try_borrow() {
            Ok(core) => write!(formatter, "Promise(#{}, {})", core.id, core.state.name()),
            Err(_) => formatter.write_str("Promise(<borrowed>)"),
        }
    }
}

impl PartialEq for Promise {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.core.try_borrow() {
            Ok(core) => formatter
                .debug_struct("Promise")
                .field("id", &core.id)
                .field("state", &core.state)
                .field("fulfill_reactions", &core.fulfill_reactions.len())
                .field("reject_reactions", &core.reject_reactions.len())
                .finish(),
            Err(_) => formatter.write_str("Promise(<borrowed>)"),
        }
    }
}
