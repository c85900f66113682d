//! # aplus
//!
//! A single-threaded Promise/A+ deferred value for Rust, with interop for
//! foreign thenables.
//!
//! ## Overview
//!
//! - **Promise**: one-time settlement, FIFO reaction queues, chaining via
//!   `then`, and the recursive resolution procedure that unwraps returned
//!   promises and thenables while guarding against cycles
//! - **Values**: a tagged dynamic [`Value`](value::Value) so that any value,
//!   including foreign objects and functions, can flow through a chain
//! - **Tasks**: reactions are always deferred to a host task queue, by
//!   default a thread-local FIFO queue drained with
//!   [`task::run_until_idle`]
//!
//! ## Feature Flags
//!
//! - `async`: tokio `LocalSet` scheduling and `Promise::into_future`
//!   (enabled by default)
//! - `serde`: `Serialize` for values and promise states
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use aplus::prelude::*;
//!
//! let deferred = Promise::deferred();
//! let doubled = deferred
//!     .promise
//!     .map(|value| Ok(Value::from(value.as_number().unwrap_or_default() * 2.0)));
//!
//! deferred.resolve.call(21);
//! assert!(doubled.is_pending());
//!
//! task::run_until_idle();
//! assert_eq!(doubled.value(), Some(Value::from(42)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and the [`task`](crate::task) module.
///
/// # Usage
///
/// ```rust
/// use aplus::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{PromiseError, Rejection};
    pub use crate::promise::{Deferred, Promise, PromiseState, Reject, Resolve};
    pub use crate::task;
    pub use crate::value::{Function, Object, Value};

    #[cfg(feature = "async")]
    pub use crate::promise::PromiseFuture;
    #[cfg(feature = "async")]
    pub use crate::task::LocalSetScheduler;
}

pub mod error;
pub mod promise;
pub mod task;
pub mod value;
