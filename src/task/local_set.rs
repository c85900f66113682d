//! Scheduling on a tokio `LocalSet`.

use super::{Scheduler, Task};

/// A [`Scheduler`] that spawns each task onto the current tokio
/// [`LocalSet`](tokio::task::LocalSet).
///
/// Promises are `!Send`, so their reactions have to stay on the thread that
/// created them; `spawn_local` gives exactly that while letting the tokio
/// runtime drive the queue.
///
/// # Panics
///
/// Scheduling panics when called outside of a `LocalSet` context, as
/// [`tokio::task::spawn_local`] does.
///
/// # Examples
///
/// ```rust
/// use aplus::promise::Promise;
/// use aplus::task::{self, LocalSetScheduler};
/// use aplus::value::Value;
/// use std::rc::Rc;
///
/// let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// let local = tokio::task::LocalSet::new();
///
/// let value = local.block_on(&runtime, async {
///     let _guard = task::install(Rc::new(LocalSetScheduler));
///     Promise::resolved(20).map(|value| Ok(Value::from(value.as_number().unwrap_or_default() + 1.0)))
///         .into_future()
///         .await
/// });
/// assert_eq!(value, Ok(Value::from(21)));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalSetScheduler;

impl Scheduler for LocalSetScheduler {
    fn schedule(&self, task: Task) {
        drop(tokio::task::spawn_local(async move { task.run() }));
    }
}
