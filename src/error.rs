//! Error types produced by the promise engine.
//!
//! Errors raised by user handlers or foreign thenables are plain [`Value`]s
//! and travel through a chain untouched. [`PromiseError`] wraps into
//! [`Value::Error`] so it can flow as a rejection reason like any other
//! value; the engine itself only raises [`PromiseError::ChainingCycle`].
//!
//! [`Rejection`] is the error half of awaiting a promise from Rust code.

use crate::value::Value;

/// An error value created by the promise engine or by user code through
/// [`Value::error`].
///
/// # Examples
///
/// ```rust
/// use aplus::error::PromiseError;
///
/// let error = PromiseError::ChainingCycle;
/// assert_eq!(error.to_string(), "Chaining cycle detected for promise");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromiseError {
    /// A promise was resolved with itself.
    #[error("Chaining cycle detected for promise")]
    ChainingCycle,
    /// A value had the wrong shape for the operation applied to it.
    ///
    /// The engine never raises this itself. Handlers and foreign thenables
    /// use it to reject with a typed reason.
    #[error("TypeError: {0}")]
    TypeError(String),
    /// A free-form error raised by user code.
    #[error("{0}")]
    Custom(String),
}

impl PromiseError {
    /// Returns `true` if this is the chaining-cycle error.
    #[must_use]
    pub const fn is_chaining_cycle(&self) -> bool {
        matches!(self, Self::ChainingCycle)
    }
}

/// The failure side of awaiting a promise through
/// [`Promise::into_future`](crate::promise::Promise::into_future).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    /// The promise was rejected with the contained reason.
    #[error("promise rejected: {0}")]
    Rejected(Value),
    /// The reaction that would have delivered the outcome was dropped
    /// before it ran, e.g. because the scheduler discarded its tasks.
    #[error("promise was abandoned before it settled")]
    Abandoned,
}

impl Rejection {
    /// Returns the rejection reason, if the promise was actually rejected.
    #[must_use]
    pub fn reason(&self) -> Option<&Value> {
        match self {
            Self::Rejected(reason) => Some(reason),
            Self::Abandoned => None,
        }
    }
}
